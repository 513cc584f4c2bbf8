//! Promotion Conditions
//!
//! Optional usage and personalisation conditions. Every field has an explicit
//! default meaning "no restriction".

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::context::CustomerType;

/// Conditions a purchase must meet for a promotion to apply.
#[derive(Debug, Clone, Default)]
pub struct PromotionConditions<'a> {
    /// Minimum order value; no minimum when unset
    pub minimum_order_value: Option<Money<'a, Currency>>,

    /// Redemption limit; unlimited when unset
    pub max_uses: Option<u32>,

    /// Redemptions recorded so far, as supplied by the redemption ledger
    pub current_uses: u32,

    /// Required customer type; `Any` places no restriction
    pub customer_type: CustomerType,

    /// Allowed region codes; empty allows every region
    pub allowed_regions: SmallVec<[String; 4]>,

    /// Code the customer has to enter
    pub promo_code: Option<String>,
}

impl<'a> PromotionConditions<'a> {
    /// Conditions with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require a minimum order value.
    #[must_use]
    pub fn with_minimum_order_value(mut self, minimum: Money<'a, Currency>) -> Self {
        self.minimum_order_value = Some(minimum);
        self
    }

    /// Limit redemptions, recording how many have happened already.
    #[must_use]
    pub fn with_usage(mut self, current_uses: u32, max_uses: u32) -> Self {
        self.current_uses = current_uses;
        self.max_uses = Some(max_uses);
        self
    }

    /// Require a customer type.
    #[must_use]
    pub fn for_customer_type(mut self, customer_type: CustomerType) -> Self {
        self.customer_type = customer_type;
        self
    }

    /// Restrict to the given regions.
    #[must_use]
    pub fn in_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Require a promo code.
    #[must_use]
    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }
}
