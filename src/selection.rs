//! Promotion Selection
//!
//! Picks the single best promotion for a package, or, when the caller opts
//! in, stacks every eligible promotion in priority order.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::{debug, warn};

use crate::{
    context::UserContext,
    discounts::{DiscountError, calculate_discount, discounted_price},
    eligibility::{EligibilityResult, check_eligibility},
    packages::PricingPackage,
    promotions::Promotion,
};

/// Result of [`find_best_promotion`].
#[derive(Debug, Clone)]
pub struct BestPromotion<'p, 'a> {
    /// Promotion with the largest discount, if any is eligible
    pub promotion: Option<&'p Promotion<'a>>,

    /// Eligibility of the chosen promotion
    pub eligibility: Option<EligibilityResult<'a>>,
}

impl<'a> BestPromotion<'_, 'a> {
    /// Final price after the chosen promotion, or `None` when nothing applies.
    pub fn final_price(&self) -> Option<Money<'a, Currency>> {
        self.eligibility.as_ref().and_then(|result| result.final_price)
    }
}

/// Pick the eligible promotion with the largest discount.
///
/// A promotion must give a positive discount to be chosen, so a tiered
/// promotion below its minimum quantity never beats paying the list price.
/// Ties keep the promotion that comes first in `promotions`. A promotion that
/// cannot be evaluated is skipped with a warning and does not affect the rest.
pub fn find_best_promotion<'p, 'a>(
    package: &PricingPackage<'a>,
    promotions: &'p [Promotion<'a>],
    context: &UserContext<'_>,
    now: Timestamp,
) -> BestPromotion<'p, 'a> {
    let mut best = BestPromotion {
        promotion: None,
        eligibility: None,
    };

    let mut best_discount = Decimal::ZERO;

    for (promotion, result) in eligible_promotions(package, promotions, context, now) {
        let Some(discount) = result.discount_amount.map(|amount| *amount.amount()) else {
            continue;
        };

        if discount > best_discount {
            best_discount = discount;
            best = BestPromotion {
                promotion: Some(promotion),
                eligibility: Some(result),
            };
        }
    }

    debug!(
        package = %package.id,
        promotion = best.promotion.map(|promotion| promotion.id.as_str()),
        "selected best promotion"
    );

    best
}

/// One step of a stacked calculation.
#[derive(Debug, Clone)]
pub struct AppliedPromotion<'p, 'a> {
    /// Applied promotion
    pub promotion: &'p Promotion<'a>,

    /// Discount taken at this step
    pub discount: Money<'a, Currency>,

    /// Running price after this step
    pub price_after: Money<'a, Currency>,
}

/// Result of [`calculate_stacked_promotions`].
#[derive(Debug, Clone)]
pub struct StackedPromotions<'p, 'a> {
    /// Applied promotions, in application order
    pub applied: Vec<AppliedPromotion<'p, 'a>>,

    /// Package base price
    pub original_price: Money<'a, Currency>,

    /// Sum of the discounts taken
    pub total_discount: Money<'a, Currency>,

    /// Price after every applied promotion, floored at zero
    pub final_price: Money<'a, Currency>,
}

/// Apply every eligible promotion in descending priority order.
///
/// Each discount is calculated against the running price left by the previous
/// step. Equal priorities keep their order in `promotions`. The discount taken
/// at a step never exceeds the running price, so `total_discount` always
/// equals `original_price - final_price`.
pub fn calculate_stacked_promotions<'p, 'a>(
    package: &PricingPackage<'a>,
    promotions: &'p [Promotion<'a>],
    context: &UserContext<'_>,
    now: Timestamp,
) -> StackedPromotions<'p, 'a> {
    let mut eligible: Vec<&'p Promotion<'a>> =
        eligible_promotions(package, promotions, context, now)
            .map(|(promotion, _)| promotion)
            .collect();

    eligible.sort_by(|a, b| b.priority.cmp(&a.priority));

    let currency = package.currency();
    let mut current_price = package.base_price;
    let mut total_discount = Decimal::ZERO;
    let mut applied = Vec::with_capacity(eligible.len());

    for promotion in eligible {
        match stack_step(current_price, promotion, context.quantity) {
            Ok((discount, price_after)) => {
                total_discount += *discount.amount();
                current_price = price_after;

                applied.push(AppliedPromotion {
                    promotion,
                    discount,
                    price_after,
                });
            }
            Err(error) => {
                warn!(promotion = %promotion.id, %error, "skipping promotion while stacking");
            }
        }
    }

    debug!(
        package = %package.id,
        applied = applied.len(),
        "stacked promotions"
    );

    StackedPromotions {
        applied,
        original_price: package.base_price,
        total_discount: Money::from_decimal(total_discount, currency),
        final_price: current_price,
    }
}

fn stack_step<'a>(
    current_price: Money<'a, Currency>,
    promotion: &Promotion<'_>,
    quantity: u32,
) -> Result<(Money<'a, Currency>, Money<'a, Currency>), DiscountError> {
    let discount = calculate_discount(current_price, promotion, quantity)?;
    let price_after = discounted_price(current_price, &discount)?;
    let taken = current_price
        .amount()
        .checked_sub(*price_after.amount())
        .ok_or(DiscountError::Overflow)?;

    Ok((
        Money::from_decimal(taken, current_price.currency()),
        price_after,
    ))
}

/// Evaluate each promotion independently, yielding the eligible ones in input order.
fn eligible_promotions<'p, 'a, 'c>(
    package: &'c PricingPackage<'a>,
    promotions: &'p [Promotion<'a>],
    context: &'c UserContext<'_>,
    now: Timestamp,
) -> impl Iterator<Item = (&'p Promotion<'a>, EligibilityResult<'a>)> {
    promotions.iter().filter_map(move |promotion| {
        match check_eligibility(package, promotion, context, now) {
            Ok(result) if result.is_eligible => Some((promotion, result)),
            Ok(result) => {
                debug!(
                    package = %package.id,
                    promotion = %promotion.id,
                    reason = result.reason.map(|reason| reason.code()),
                    "promotion not eligible"
                );
                None
            }
            Err(error) => {
                warn!(promotion = %promotion.id, %error, "skipping malformed promotion");
                None
            }
        }
    })
}
