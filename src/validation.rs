//! Validation
//!
//! Load-time checks for packages and promotions. Evaluation assumes records
//! have passed these checks and does not repeat them.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{packages::PricingPackage, promotions::Promotion};

/// Currencies packages may be priced in.
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["PLN", "USD", "EUR"];

/// Invariant violations found in a package or promotion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Package price is zero or negative.
    #[error("package {0} must have a positive base price")]
    NonPositivePrice(String),

    /// Package is priced in a currency outside [`SUPPORTED_CURRENCIES`].
    #[error("package {id} is priced in unsupported currency {currency}")]
    UnsupportedCurrency {
        /// Package id
        id: String,

        /// ISO currency code
        currency: String,
    },

    /// Discount percentage outside 0–100%.
    #[error("promotion {0} discount percentage must be between 0% and 100%")]
    PercentageOutOfRange(String),

    /// Validity window ends before it starts.
    #[error("promotion {0} ends before it starts")]
    InvalidValidityWindow(String),

    /// More redemptions recorded than allowed.
    #[error("promotion {id} records {current_uses} uses against a limit of {max_uses}")]
    UsageOverLimit {
        /// Promotion id
        id: String,

        /// Recorded redemptions
        current_uses: u32,

        /// Redemption limit
        max_uses: u32,
    },

    /// Tiered promotion with a minimum quantity of zero.
    #[error("promotion {0} must require a minimum quantity of at least 1")]
    ZeroMinQuantity(String),

    /// A money field of the promotion is negative.
    #[error("promotion {id} has a negative {field}")]
    NegativeAmount {
        /// Promotion id
        id: String,

        /// Offending field
        field: &'static str,
    },
}

/// Check package invariants.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate_package(package: &PricingPackage<'_>) -> Result<(), ValidationError> {
    if *package.base_price.amount() <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice(package.id.clone()));
    }

    let currency = package.currency().iso_alpha_code;

    if !SUPPORTED_CURRENCIES.contains(&currency) {
        return Err(ValidationError::UnsupportedCurrency {
            id: package.id.clone(),
            currency: currency.to_string(),
        });
    }

    Ok(())
}

/// Check promotion invariants.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate_promotion(promotion: &Promotion<'_>) -> Result<(), ValidationError> {
    let percentage = promotion.discount_percentage * Decimal::ONE;

    if percentage < Decimal::ZERO || percentage > Decimal::ONE {
        return Err(ValidationError::PercentageOutOfRange(promotion.id.clone()));
    }

    if promotion.valid_from > promotion.valid_to {
        return Err(ValidationError::InvalidValidityWindow(promotion.id.clone()));
    }

    if let Some(max_uses) = promotion.conditions.max_uses
        && promotion.conditions.current_uses > max_uses
    {
        return Err(ValidationError::UsageOverLimit {
            id: promotion.id.clone(),
            current_uses: promotion.conditions.current_uses,
            max_uses,
        });
    }

    if promotion.min_quantity == 0 {
        return Err(ValidationError::ZeroMinQuantity(promotion.id.clone()));
    }

    let amounts = [
        ("fixed amount", promotion.fixed_amount.as_ref()),
        ("maximum discount", promotion.max_discount_amount.as_ref()),
        (
            "minimum order value",
            promotion.conditions.minimum_order_value.as_ref(),
        ),
    ];

    for (field, amount) in amounts {
        if amount.is_some_and(is_negative) {
            return Err(ValidationError::NegativeAmount {
                id: promotion.id.clone(),
                field,
            });
        }
    }

    Ok(())
}

fn is_negative(money: &Money<'_, Currency>) -> bool {
    *money.amount() < Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::Timestamp;
    use rusty_money::iso::{GBP, PLN};
    use testresult::TestResult;

    use crate::promotions::conditions::PromotionConditions;

    use super::*;

    fn promotion() -> Result<Promotion<'static>, jiff::Error> {
        let from: Timestamp = "2026-01-01T00:00:00Z".parse()?;
        let to: Timestamp = "2026-12-31T23:59:59Z".parse()?;

        Ok(Promotion::new("launch", "Launch", from, to)
            .for_packages(["landing"])
            .percentage_off(Percentage::from(0.7)))
    }

    #[test]
    fn valid_package_passes() {
        let package = PricingPackage::new("landing", "Landing", Money::from_major(2000, PLN));

        assert_eq!(validate_package(&package), Ok(()));
    }

    #[test]
    fn zero_price_is_rejected() {
        let package = PricingPackage::new("free", "Free", Money::from_major(0, PLN));

        assert_eq!(
            validate_package(&package),
            Err(ValidationError::NonPositivePrice("free".to_string()))
        );
    }

    #[test]
    fn unsupported_currency_is_rejected() {
        let package = PricingPackage::new("uk", "UK", Money::from_major(100, GBP));

        assert_eq!(
            validate_package(&package),
            Err(ValidationError::UnsupportedCurrency {
                id: "uk".to_string(),
                currency: "GBP".to_string(),
            })
        );
    }

    #[test]
    fn valid_promotion_passes() -> TestResult {
        assert_eq!(validate_promotion(&promotion()?), Ok(()));

        Ok(())
    }

    #[test]
    fn percentage_over_100_is_rejected() -> TestResult {
        let promotion = promotion()?.percentage_off(Percentage::from(1.5));

        assert_eq!(
            validate_promotion(&promotion),
            Err(ValidationError::PercentageOutOfRange("launch".to_string()))
        );

        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() -> TestResult {
        let mut promotion = promotion()?;
        promotion.valid_from = "2027-01-01T00:00:00Z".parse()?;

        assert_eq!(
            validate_promotion(&promotion),
            Err(ValidationError::InvalidValidityWindow("launch".to_string()))
        );

        Ok(())
    }

    #[test]
    fn usage_over_limit_is_rejected() -> TestResult {
        let promotion =
            promotion()?.with_conditions(PromotionConditions::none().with_usage(101, 100));

        assert!(matches!(
            validate_promotion(&promotion),
            Err(ValidationError::UsageOverLimit {
                current_uses: 101,
                max_uses: 100,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn usage_at_limit_is_allowed() -> TestResult {
        let promotion =
            promotion()?.with_conditions(PromotionConditions::none().with_usage(100, 100));

        assert_eq!(validate_promotion(&promotion), Ok(()));

        Ok(())
    }

    #[test]
    fn zero_min_quantity_is_rejected() -> TestResult {
        let promotion = promotion()?.tiered(Percentage::from(0.1), 0);

        assert_eq!(
            validate_promotion(&promotion),
            Err(ValidationError::ZeroMinQuantity("launch".to_string()))
        );

        Ok(())
    }

    #[test]
    fn negative_amounts_are_rejected() -> TestResult {
        let promotion = promotion()?.amount_off(Money::from_major(-100, PLN));

        assert_eq!(
            validate_promotion(&promotion),
            Err(ValidationError::NegativeAmount {
                id: "launch".to_string(),
                field: "fixed amount",
            })
        );

        Ok(())
    }
}
