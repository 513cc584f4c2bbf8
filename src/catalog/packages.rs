//! Package Catalog Files

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, PLN, USD},
};
use serde::Deserialize;

use crate::{
    catalog::CatalogError,
    packages::{PackageLimits, PricingPackage},
};

/// Wrapper for packages in YAML
#[derive(Debug, Deserialize)]
pub struct PackagesFile {
    /// Packages, in display order
    pub packages: Vec<PackageEntry>,
}

/// Package entry from YAML
#[derive(Debug, Deserialize)]
pub struct PackageEntry {
    /// Package id
    pub id: String,

    /// Package name
    pub name: String,

    /// Base price (e.g., "2000 PLN")
    pub base_price: String,

    /// Feature keys
    #[serde(default)]
    pub features: Vec<String>,

    /// Advertised caps
    #[serde(default)]
    pub limits: LimitsEntry,

    /// Whether promotions may apply
    #[serde(default = "default_true")]
    pub promo_eligible: bool,

    /// Popular highlight
    #[serde(default)]
    pub popular: bool,

    /// Recommended highlight
    #[serde(default)]
    pub recommended: bool,

    /// Call-to-action key
    #[serde(default)]
    pub cta: String,
}

/// Package limits from YAML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsEntry {
    /// Pages included
    pub pages: Option<u32>,

    /// Revision rounds included
    pub revisions: Option<u32>,

    /// Delivery time in days
    pub delivery_days: Option<u32>,

    /// Months of support
    pub support_months: Option<u32>,
}

const fn default_true() -> bool {
    true
}

impl TryFrom<PackageEntry> for PricingPackage<'static> {
    type Error = CatalogError;

    fn try_from(entry: PackageEntry) -> Result<Self, Self::Error> {
        Ok(PricingPackage {
            id: entry.id,
            name: entry.name,
            base_price: parse_price(&entry.base_price)?,
            features: entry.features,
            limits: PackageLimits {
                pages: entry.limits.pages,
                revisions: entry.limits.revisions,
                delivery_days: entry.limits.delivery_days,
                support_months: entry.limits.support_months,
            },
            is_promo_eligible: entry.promo_eligible,
            popular: entry.popular,
            recommended: entry.recommended,
            cta: entry.cta,
        })
    }
}

/// Parse price string (e.g., "2000 PLN" or "49.99 EUR") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code is not one
/// of PLN, USD or EUR.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "PLN" => PLN,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(CatalogError::UnknownCurrency(other.to_string())),
    };

    Ok(Money::from_decimal(amount, currency))
}
