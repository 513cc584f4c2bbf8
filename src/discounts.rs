//! Discounts
//!
//! Turns a base price and a promotion into a discount amount. Amounts are
//! rounded to whole currency units.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::promotions::{Promotion, PromotionType};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Decimal arithmetic overflowed.
    #[error("discount calculation overflowed")]
    Overflow,

    /// A promotion amount is in a different currency from the price it discounts.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the price being discounted
        expected: String,

        /// Currency of the promotion amount
        found: String,
    },
}

/// Calculate the discount `promotion` gives on `base_price` for `quantity` units.
///
/// The result is in the currency of `base_price`, capped at the promotion's
/// `max_discount_amount` and rounded to the nearest whole currency unit. It is
/// not capped at the base price; use [`discounted_price`] for the floored price.
///
/// # Errors
///
/// Returns an error if:
/// - a promotion amount is in another currency (`DiscountError::CurrencyMismatch`).
/// - the arithmetic cannot be represented (`DiscountError::Overflow`).
pub fn calculate_discount<'a>(
    base_price: Money<'a, Currency>,
    promotion: &Promotion<'_>,
    quantity: u32,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = base_price.currency();
    let base = *base_price.amount();

    let amount = match promotion.promotion_type {
        PromotionType::Percentage => percent_of(&promotion.discount_percentage, base)?,
        PromotionType::FixedAmount => match &promotion.fixed_amount {
            Some(fixed) => amount_in(fixed, currency)?,
            None => Decimal::ZERO,
        },
        PromotionType::Tiered => {
            if quantity >= promotion.min_quantity.max(1) {
                percent_of(&promotion.discount_percentage, base)?
            } else {
                Decimal::ZERO
            }
        }
        PromotionType::BuyOneGetOne => base
            .checked_mul(Decimal::from(quantity / 2))
            .ok_or(DiscountError::Overflow)?,
    };

    let amount = match &promotion.max_discount_amount {
        Some(cap) => amount.min(amount_in(cap, currency)?),
        None => amount,
    };

    Ok(Money::from_decimal(
        round_to_whole_units(amount.max(Decimal::ZERO)),
        currency,
    ))
}

/// Subtract `discount` from `price`, flooring the result at zero.
///
/// # Errors
///
/// Returns `DiscountError::CurrencyMismatch` if the currencies differ.
pub fn discounted_price<'a>(
    price: Money<'a, Currency>,
    discount: &Money<'_, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount = amount_in(discount, price.currency())?;
    let remaining = price
        .amount()
        .checked_sub(discount)
        .ok_or(DiscountError::Overflow)?;

    Ok(Money::from_decimal(
        remaining.max(Decimal::ZERO),
        price.currency(),
    ))
}

/// Apply a percentage to a decimal amount.
///
/// # Errors
///
/// Returns `DiscountError::Overflow` if the multiplication cannot be represented.
pub fn percent_of(percent: &Percentage, amount: Decimal) -> Result<Decimal, DiscountError> {
    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(amount)
        .ok_or(DiscountError::Overflow)
}

/// Round half away from zero to a whole currency unit.
pub fn round_to_whole_units(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Read the amount of `money`, insisting on `currency`.
fn amount_in(money: &Money<'_, Currency>, currency: &Currency) -> Result<Decimal, DiscountError> {
    if money.currency().iso_alpha_code != currency.iso_alpha_code {
        return Err(DiscountError::CurrencyMismatch {
            expected: currency.iso_alpha_code.to_string(),
            found: money.currency().iso_alpha_code.to_string(),
        });
    }

    Ok(*money.amount())
}
