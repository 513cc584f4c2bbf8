//! Eligibility
//!
//! Decides whether a promotion applies to a package for a given customer.
//!
//! Structural checks (package opt-out, package list, timing, usage) fail fast
//! with a single reason. Contextual checks (customer type, region, minimum
//! order value, promo code) are all evaluated and reported together so every
//! missing condition can be shown at once.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::{
    context::{CustomerType, UserContext},
    discounts::{DiscountError, calculate_discount, discounted_price},
    packages::PricingPackage,
    promotions::{
        Promotion,
        timing::{TimingStatus, validate_timing},
        usage::validate_usage,
    },
};

/// Why a promotion does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IneligibilityReason {
    /// The package is excluded from promotions
    PackageNotEligible,

    /// The promotion does not list the package
    PromotionInapplicable,

    /// The validity window has not started
    NotYetActive,

    /// The validity window has ended
    Expired,

    /// The promotion is switched off
    Disabled,

    /// The redemption limit has been reached
    UsageLimitReached,

    /// One or more contextual conditions are unmet; see the requirements list
    RequirementsNotMet,
}

impl IneligibilityReason {
    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::PackageNotEligible => "package-not-eligible",
            Self::PromotionInapplicable => "promotion-inapplicable",
            Self::NotYetActive => "not-yet-active",
            Self::Expired => "expired",
            Self::Disabled => "disabled",
            Self::UsageLimitReached => "usage-limit-reached",
            Self::RequirementsNotMet => "requirements-not-met",
        }
    }

    fn from_timing(status: TimingStatus) -> Option<Self> {
        match status {
            TimingStatus::Active => None,
            TimingStatus::Upcoming => Some(Self::NotYetActive),
            TimingStatus::Expired => Some(Self::Expired),
            TimingStatus::Inactive => Some(Self::Disabled),
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PackageNotEligible => "package not eligible",
            Self::PromotionInapplicable => "promotion does not apply to package",
            Self::NotYetActive => "promotion not yet active",
            Self::Expired => "promotion expired",
            Self::Disabled => "promotion disabled",
            Self::UsageLimitReached => "usage limit reached",
            Self::RequirementsNotMet => "requirements not met",
        })
    }
}

/// A contextual condition the purchase does not meet.
///
/// Serialises as an object tagged by its [`code`](Requirement::code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum Requirement {
    /// The promotion is limited to one customer type
    CustomerType {
        /// Required customer type
        required: CustomerType,
    },

    /// The promotion is limited to some regions
    Region {
        /// Allowed region codes
        allowed: Vec<String>,
    },

    /// The order value is below the minimum
    MinimumOrderValue {
        /// Minimum amount
        #[serde(with = "rust_decimal::serde::float")]
        minimum: Decimal,

        /// ISO currency code of the minimum
        currency: String,
    },

    /// The promotion needs a code the customer has not entered
    PromoCode,
}

impl Requirement {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CustomerType { .. } => "customer-type",
            Self::Region { .. } => "region",
            Self::MinimumOrderValue { .. } => "minimum-order-value",
            Self::PromoCode => "promo-code",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomerType { required } => write!(f, "available to {required} customers only"),
            Self::Region { allowed } => {
                write!(f, "available in regions: {}", allowed.join(", "))
            }
            Self::MinimumOrderValue { minimum, currency } => {
                write!(f, "minimum order value of {} {currency}", minimum.normalize())
            }
            Self::PromoCode => f.write_str("valid promo code required"),
        }
    }
}

/// Outcome of [`check_eligibility`].
///
/// `reason` is present iff the promotion is ineligible; `discount_amount` and
/// `final_price` are present iff it is eligible. Absent fields are left out
/// of the serialised form and amounts serialise as plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityResult<'a> {
    /// Whether the promotion applies
    pub is_eligible: bool,

    /// Why it does not apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,

    /// Unmet contextual conditions
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    pub requirements: SmallVec<[Requirement; 4]>,

    /// Discount given by the promotion
    #[serde(serialize_with = "serialize_amount", skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money<'a, Currency>>,

    /// Package price after the discount, floored at zero
    #[serde(serialize_with = "serialize_amount", skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Money<'a, Currency>>,
}

#[allow(clippy::ref_option, reason = "signature required by serialize_with")]
fn serialize_amount<S: Serializer>(
    money: &Option<Money<'_, Currency>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    rust_decimal::serde::float_option::serialize(&money.as_ref().map(|money| *money.amount()), serializer)
}

impl<'a> EligibilityResult<'a> {
    /// An eligible result.
    pub fn eligible(discount_amount: Money<'a, Currency>, final_price: Money<'a, Currency>) -> Self {
        Self {
            is_eligible: true,
            reason: None,
            requirements: SmallVec::new(),
            discount_amount: Some(discount_amount),
            final_price: Some(final_price),
        }
    }

    /// A structural failure.
    pub fn ineligible(reason: IneligibilityReason) -> Self {
        Self {
            is_eligible: false,
            reason: Some(reason),
            requirements: SmallVec::new(),
            discount_amount: None,
            final_price: None,
        }
    }

    /// One or more unmet contextual conditions.
    pub fn requirements_not_met(requirements: SmallVec<[Requirement; 4]>) -> Self {
        Self {
            is_eligible: false,
            reason: Some(IneligibilityReason::RequirementsNotMet),
            requirements,
            discount_amount: None,
            final_price: None,
        }
    }
}

/// Check whether `promotion` applies to `package` for `context` at `now`.
///
/// When no order value is supplied, the minimum order value is checked against
/// the package base price.
///
/// # Errors
///
/// Ineligibility is never an error. A [`DiscountError`] is returned only when
/// an otherwise eligible promotion cannot be quantified (malformed record).
pub fn check_eligibility<'a>(
    package: &PricingPackage<'a>,
    promotion: &Promotion<'_>,
    context: &UserContext<'_>,
    now: Timestamp,
) -> Result<EligibilityResult<'a>, DiscountError> {
    if !package.is_promo_eligible {
        return Ok(EligibilityResult::ineligible(
            IneligibilityReason::PackageNotEligible,
        ));
    }

    if !promotion.applies_to(&package.id) {
        return Ok(EligibilityResult::ineligible(
            IneligibilityReason::PromotionInapplicable,
        ));
    }

    if let Some(reason) = IneligibilityReason::from_timing(validate_timing(promotion, now).status)
    {
        return Ok(EligibilityResult::ineligible(reason));
    }

    if !validate_usage(promotion).can_use {
        return Ok(EligibilityResult::ineligible(
            IneligibilityReason::UsageLimitReached,
        ));
    }

    let requirements = unmet_requirements(package, promotion, context);

    if !requirements.is_empty() {
        return Ok(EligibilityResult::requirements_not_met(requirements));
    }

    let discount = calculate_discount(package.base_price, promotion, context.quantity)?;
    let final_price = discounted_price(package.base_price, &discount)?;

    Ok(EligibilityResult::eligible(discount, final_price))
}

fn unmet_requirements(
    package: &PricingPackage<'_>,
    promotion: &Promotion<'_>,
    context: &UserContext<'_>,
) -> SmallVec<[Requirement; 4]> {
    let conditions = &promotion.conditions;
    let mut requirements = SmallVec::new();

    if conditions.customer_type != CustomerType::Any
        && conditions.customer_type != context.customer_type
    {
        requirements.push(Requirement::CustomerType {
            required: conditions.customer_type,
        });
    }

    if !conditions.allowed_regions.is_empty()
        && !context
            .region
            .as_deref()
            .is_some_and(|region| conditions.allowed_regions.iter().any(|allowed| allowed == region))
    {
        requirements.push(Requirement::Region {
            allowed: conditions.allowed_regions.to_vec(),
        });
    }

    if let Some(minimum) = &conditions.minimum_order_value {
        let order_value = context.order_value.as_ref().unwrap_or(&package.base_price);

        if !meets_minimum(order_value, minimum) {
            requirements.push(Requirement::MinimumOrderValue {
                minimum: *minimum.amount(),
                currency: minimum.currency().iso_alpha_code.to_string(),
            });
        }
    }

    if let Some(code) = &conditions.promo_code
        && context.promo_code.as_deref() != Some(code.as_str())
    {
        requirements.push(Requirement::PromoCode);
    }

    requirements
}

/// An order value in another currency never meets the minimum.
fn meets_minimum(order_value: &Money<'_, Currency>, minimum: &Money<'_, Currency>) -> bool {
    order_value.currency().iso_alpha_code == minimum.currency().iso_alpha_code
        && order_value.amount() >= minimum.amount()
}
