//! Packages

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Package Key
    pub struct PackageKey;
}

/// Numeric caps advertised by a package.
///
/// `None` means the package does not advertise a cap for that dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageLimits {
    /// Number of pages included
    pub pages: Option<u32>,

    /// Number of revision rounds included
    pub revisions: Option<u32>,

    /// Delivery time in days
    pub delivery_days: Option<u32>,

    /// Months of support after delivery
    pub support_months: Option<u32>,
}

/// A sellable offering with a fixed list price.
#[derive(Debug, Clone)]
pub struct PricingPackage<'a> {
    /// Unique package identifier
    pub id: String,

    /// Package name
    pub name: String,

    /// List price before any promotion
    pub base_price: Money<'a, Currency>,

    /// Ordered feature keys, resolved by the presentation layer
    pub features: Vec<String>,

    /// Advertised caps
    pub limits: PackageLimits,

    /// Whether promotions may be applied to this package at all
    pub is_promo_eligible: bool,

    /// Highlighted as the most popular choice
    pub popular: bool,

    /// Highlighted as the recommended choice
    pub recommended: bool,

    /// Call-to-action key, resolved by the presentation layer
    pub cta: String,
}

impl<'a> PricingPackage<'a> {
    /// Create a promotion-eligible package with no features, limits or highlights.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price,
            features: Vec::new(),
            limits: PackageLimits::default(),
            is_promo_eligible: true,
            popular: false,
            recommended: false,
            cta: String::new(),
        }
    }

    /// Exclude this package from every promotion.
    #[must_use]
    pub fn without_promotions(mut self) -> Self {
        self.is_promo_eligible = false;
        self
    }

    /// Currency the package is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.base_price.currency()
    }
}
