//! Offer
//!
//! Structured price data for embedding in page metadata, shaped like a
//! schema.org `Offer`.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;

use crate::{eligibility::EligibilityResult, packages::PricingPackage, selection::StackedPromotions};

/// schema.org `Offer` for a package price.
///
/// `original_price` and `discount` are only present when a promotion lowers
/// the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Always `"Offer"`
    #[serde(rename = "@type")]
    pub offer_type: &'static str,

    /// Price to pay
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// ISO currency code
    pub price_currency: String,

    /// Price before promotions
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Decimal>,

    /// Saving in whole percent
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Decimal>,
}

impl Offer {
    /// Offer at the package's list price.
    pub fn list_price(package: &PricingPackage<'_>) -> Self {
        Self::at(package.base_price, None)
    }

    /// Offer for a package after a single promotion.
    ///
    /// An ineligible result yields the list price.
    pub fn from_eligibility(package: &PricingPackage<'_>, result: &EligibilityResult<'_>) -> Self {
        match result.final_price {
            Some(final_price) if result.is_eligible => Self::discounted(package.base_price, final_price),
            _ => Self::list_price(package),
        }
    }

    /// Offer for a package after stacked promotions.
    pub fn from_stacked(stacked: &StackedPromotions<'_, '_>) -> Self {
        Self::discounted(stacked.original_price, stacked.final_price)
    }

    fn discounted(original: Money<'_, Currency>, final_price: Money<'_, Currency>) -> Self {
        if final_price.amount() >= original.amount() {
            return Self::at(original, None);
        }

        Self::at(final_price, Some(original))
    }

    fn at(price: Money<'_, Currency>, original: Option<Money<'_, Currency>>) -> Self {
        Self {
            offer_type: "Offer",
            price: *price.amount(),
            price_currency: price.currency().iso_alpha_code.to_string(),
            original_price: original.map(|money| *money.amount()),
            discount: original.map(|money| savings_percent(*money.amount(), *price.amount())),
        }
    }
}

/// Saving from `original` to `final_price` in whole percent, rounded half away
/// from zero. Zero when `original` is zero.
pub fn savings_percent(original: Decimal, final_price: Decimal) -> Decimal {
    if original.is_zero() {
        return Decimal::ZERO;
    }

    let saved = original.saturating_sub(final_price);

    saved
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(original))
        .map_or(Decimal::ZERO, crate::discounts::round_to_whole_units)
}
