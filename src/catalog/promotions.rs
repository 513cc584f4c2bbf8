//! Promotion Catalog Files

use decimal_percentage::Percentage;
use jiff::Timestamp;
use serde::Deserialize;

use crate::{
    catalog::{CatalogError, packages::parse_price},
    context::CustomerType,
    promotions::{Promotion, PromotionType, conditions::PromotionConditions},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFile {
    /// Promotions; file order is the tie-break order for selection
    pub promotions: Vec<PromotionEntry>,
}

/// Promotion entry from YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionEntry {
    /// Promotion id
    pub id: String,

    /// Promotion name
    pub name: String,

    /// Discount calculation type
    #[serde(rename = "type", default)]
    pub promotion_type: PromotionType,

    /// Discount percentage (e.g., "70%" or "0.7")
    #[serde(default)]
    pub discount: Option<String>,

    /// Fixed amount off (e.g., "500 PLN")
    #[serde(default)]
    pub fixed_amount: Option<String>,

    /// Minimum quantity for tiered promotions
    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,

    /// Discount cap (e.g., "1500 PLN")
    #[serde(default)]
    pub max_discount: Option<String>,

    /// Applicable package ids
    pub packages: Vec<String>,

    /// Start of the validity window (RFC 3339)
    pub valid_from: Timestamp,

    /// End of the validity window (RFC 3339)
    pub valid_to: Timestamp,

    /// Manual switch
    #[serde(default = "default_true")]
    pub active: bool,

    /// Stacking priority
    #[serde(default)]
    pub priority: i32,

    /// Usage and personalisation conditions
    #[serde(default)]
    pub conditions: ConditionsEntry,
}

/// Promotion conditions from YAML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionsEntry {
    /// Minimum order value (e.g., "3000 PLN")
    pub minimum_order_value: Option<String>,

    /// Redemption limit
    pub max_uses: Option<u32>,

    /// Redemptions recorded so far
    #[serde(default)]
    pub current_uses: u32,

    /// Required customer type
    #[serde(default)]
    pub customer_type: CustomerType,

    /// Allowed region codes
    #[serde(default)]
    pub allowed_regions: Vec<String>,

    /// Required promo code
    pub promo_code: Option<String>,
}

const fn default_true() -> bool {
    true
}

const fn default_min_quantity() -> u32 {
    1
}

impl TryFrom<PromotionEntry> for Promotion<'static> {
    type Error = CatalogError;

    fn try_from(entry: PromotionEntry) -> Result<Self, Self::Error> {
        let conditions = PromotionConditions {
            minimum_order_value: entry
                .conditions
                .minimum_order_value
                .as_deref()
                .map(parse_price)
                .transpose()?,
            max_uses: entry.conditions.max_uses,
            current_uses: entry.conditions.current_uses,
            customer_type: entry.conditions.customer_type,
            allowed_regions: entry.conditions.allowed_regions.into_iter().collect(),
            promo_code: entry.conditions.promo_code,
        };

        Ok(Promotion {
            id: entry.id,
            name: entry.name,
            promotion_type: entry.promotion_type,
            discount_percentage: entry
                .discount
                .as_deref()
                .map(parse_percentage)
                .transpose()?
                .unwrap_or_else(|| Percentage::from(0.0)),
            fixed_amount: entry.fixed_amount.as_deref().map(parse_price).transpose()?,
            min_quantity: entry.min_quantity,
            max_discount_amount: entry.max_discount.as_deref().map(parse_price).transpose()?,
            applicable_packages: entry.packages.into_iter().collect(),
            valid_from: entry.valid_from,
            valid_to: entry.valid_to,
            is_active: entry.active,
            conditions,
            priority: entry.priority,
        })
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a number.
pub fn parse_percentage(s: &str) -> Result<Percentage, CatalogError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| CatalogError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| CatalogError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::PLN};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn promotion_entry_uses_documented_defaults() -> TestResult {
        let yaml = r#"
id: launch
name: Launch
discount: 70%
packages: [landing]
valid_from: "2026-01-01T00:00:00Z"
valid_to: "2026-12-31T23:59:59Z"
"#;
        let entry: PromotionEntry = serde_norway::from_str(yaml)?;
        let promotion = Promotion::try_from(entry)?;

        assert_eq!(promotion.promotion_type, PromotionType::Percentage);
        assert_eq!(promotion.discount_percentage, Percentage::from(0.7));
        assert_eq!(promotion.min_quantity, 1);
        assert_eq!(promotion.priority, 0);
        assert!(promotion.is_active);
        assert_eq!(promotion.conditions.customer_type, CustomerType::Any);
        assert!(promotion.conditions.max_uses.is_none());
        assert!(promotion.applies_to("landing"));

        Ok(())
    }

    #[test]
    fn promotion_entry_reads_conditions_and_amounts() -> TestResult {
        let yaml = r#"
id: spring
name: Spring
type: fixed_amount
fixed_amount: 500 PLN
max_discount: 400 PLN
packages: [business, premium]
valid_from: "2026-03-01T00:00:00Z"
valid_to: "2026-05-31T23:59:59Z"
active: false
priority: 5
conditions:
  minimum_order_value: 3000 PLN
  max_uses: 50
  current_uses: 7
  customer_type: new
  allowed_regions: [PL]
  promo_code: WIOSNA
"#;
        let entry: PromotionEntry = serde_norway::from_str(yaml)?;
        let promotion = Promotion::try_from(entry)?;

        assert_eq!(promotion.promotion_type, PromotionType::FixedAmount);
        assert_eq!(promotion.fixed_amount, Some(Money::from_major(500, PLN)));
        assert_eq!(promotion.max_discount_amount, Some(Money::from_major(400, PLN)));
        assert!(!promotion.is_active);
        assert_eq!(promotion.priority, 5);
        assert_eq!(
            promotion.conditions.minimum_order_value,
            Some(Money::from_major(3000, PLN))
        );
        assert_eq!(promotion.conditions.max_uses, Some(50));
        assert_eq!(promotion.conditions.current_uses, 7);
        assert_eq!(promotion.conditions.customer_type, CustomerType::New);
        assert_eq!(promotion.conditions.allowed_regions.as_slice(), ["PL"]);
        assert_eq!(promotion.conditions.promo_code.as_deref(), Some("WIOSNA"));

        Ok(())
    }

    #[test]
    fn promotion_entry_rejects_unknown_type() {
        let yaml = r#"
id: mystery
name: Mystery
type: mystery_discount
packages: []
valid_from: "2026-01-01T00:00:00Z"
valid_to: "2026-12-31T23:59:59Z"
"#;
        let result: Result<PromotionEntry, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn promotion_entry_rejects_bad_timestamp() {
        let yaml = r#"
id: launch
name: Launch
packages: []
valid_from: "next tuesday"
valid_to: "2026-12-31T23:59:59Z"
"#;
        let result: Result<PromotionEntry, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn parse_percentage_accepts_percentage_format() -> Result<(), CatalogError> {
        let percent = parse_percentage("15%")?;

        assert_eq!(percent, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> Result<(), CatalogError> {
        let percent = parse_percentage("0.15")?;

        assert_eq!(percent, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_handles_whitespace() -> Result<(), CatalogError> {
        let percent = parse_percentage("  70 %  ")?;

        assert_eq!(percent, Percentage::from(0.7));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("plenty");

        assert!(matches!(result, Err(CatalogError::InvalidPercentage(_))));
    }
}
