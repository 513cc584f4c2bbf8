//! Promotions

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::promotions::conditions::PromotionConditions;

pub mod conditions;
pub mod conflicts;
pub mod timing;
pub mod usage;

/// How a promotion turns a price into a discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    /// Percentage of the base price (e.g. "70% off")
    #[default]
    Percentage,

    /// Fixed amount off (e.g. "500 zł off")
    FixedAmount,

    /// Every second unit is free
    BuyOneGetOne,

    /// Percentage off, only from a minimum quantity upwards
    Tiered,
}

impl PromotionType {
    /// Lowercase name, as written in catalogs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed_amount",
            Self::BuyOneGetOne => "buy_one_get_one",
            Self::Tiered => "tiered",
        }
    }
}

/// A time-boxed, conditionally applicable discount rule.
///
/// Promotions are read-only snapshots: the engine reads `conditions.current_uses`
/// but never increments it.
#[derive(Debug, Clone)]
pub struct Promotion<'a> {
    /// Unique promotion identifier
    pub id: String,

    /// Promotion name
    pub name: String,

    /// Discount calculation type
    pub promotion_type: PromotionType,

    /// Percentage used by `Percentage` and `Tiered` promotions
    pub discount_percentage: Percentage,

    /// Amount used by `FixedAmount` promotions; no discount when unset
    pub fixed_amount: Option<Money<'a, Currency>>,

    /// Minimum quantity for `Tiered` promotions
    pub min_quantity: u32,

    /// Upper bound on the discount of a single application
    pub max_discount_amount: Option<Money<'a, Currency>>,

    /// Package identifiers this promotion applies to
    pub applicable_packages: SmallVec<[String; 4]>,

    /// Start of the validity window (inclusive)
    pub valid_from: Timestamp,

    /// End of the validity window (inclusive)
    pub valid_to: Timestamp,

    /// Manual switch, independent of the validity window
    pub is_active: bool,

    /// Usage and personalisation conditions
    pub conditions: PromotionConditions<'a>,

    /// Stacking order, higher first
    pub priority: i32,
}

impl<'a> Promotion<'a> {
    /// Create an active 0% percentage promotion that applies to no packages.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        valid_from: Timestamp,
        valid_to: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            promotion_type: PromotionType::Percentage,
            discount_percentage: Percentage::from(0.0),
            fixed_amount: None,
            min_quantity: 1,
            max_discount_amount: None,
            applicable_packages: SmallVec::new(),
            valid_from,
            valid_to,
            is_active: true,
            conditions: PromotionConditions::default(),
            priority: 0,
        }
    }

    /// Whether the promotion lists the given package.
    pub fn applies_to(&self, package_id: &str) -> bool {
        self.applicable_packages.iter().any(|id| id == package_id)
    }

    /// Restrict the promotion to the given packages.
    #[must_use]
    pub fn for_packages<I, S>(mut self, package_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_packages = package_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Percentage of the base price off.
    #[must_use]
    pub fn percentage_off(mut self, percentage: Percentage) -> Self {
        self.promotion_type = PromotionType::Percentage;
        self.discount_percentage = percentage;
        self
    }

    /// Fixed amount off.
    #[must_use]
    pub fn amount_off(mut self, amount: Money<'a, Currency>) -> Self {
        self.promotion_type = PromotionType::FixedAmount;
        self.fixed_amount = Some(amount);
        self
    }

    /// Percentage off once at least `min_quantity` units are bought.
    #[must_use]
    pub fn tiered(mut self, percentage: Percentage, min_quantity: u32) -> Self {
        self.promotion_type = PromotionType::Tiered;
        self.discount_percentage = percentage;
        self.min_quantity = min_quantity;
        self
    }

    /// Every second unit free.
    #[must_use]
    pub fn buy_one_get_one(mut self) -> Self {
        self.promotion_type = PromotionType::BuyOneGetOne;
        self
    }

    /// Cap the discount of a single application.
    #[must_use]
    pub fn with_max_discount(mut self, cap: Money<'a, Currency>) -> Self {
        self.max_discount_amount = Some(cap);
        self
    }

    /// Replace the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: PromotionConditions<'a>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Set the stacking priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Switch the promotion off regardless of its validity window.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}
