//! User Context
//!
//! Per-evaluation description of who is buying and how. Created for a single
//! pricing call and never persisted.

use std::fmt;

use clap::ValueEnum;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Customer relationship, used both by promotion conditions and by callers
/// describing the current customer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// First purchase
    New,

    /// Returning customer
    Existing,

    /// Unknown, or no restriction when used as a condition
    #[default]
    Any,
}

impl CustomerType {
    /// Lowercase name, as written in catalogs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Existing => "existing",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation input describing the purchase.
#[derive(Debug, Clone)]
pub struct UserContext<'a> {
    /// Customer relationship
    pub customer_type: CustomerType,

    /// Region code (e.g. `PL`)
    pub region: Option<String>,

    /// Promo code entered by the customer
    pub promo_code: Option<String>,

    /// Number of units being bought
    pub quantity: u32,

    /// Explicit order value; the package base price is used when absent
    pub order_value: Option<Money<'a, Currency>>,
}

impl Default for UserContext<'_> {
    fn default() -> Self {
        Self {
            customer_type: CustomerType::Any,
            region: None,
            promo_code: None,
            quantity: 1,
            order_value: None,
        }
    }
}

impl<'a> UserContext<'a> {
    /// Set the customer type.
    #[must_use]
    pub fn with_customer_type(mut self, customer_type: CustomerType) -> Self {
        self.customer_type = customer_type;
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the entered promo code.
    #[must_use]
    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set an explicit order value.
    #[must_use]
    pub fn with_order_value(mut self, order_value: Money<'a, Currency>) -> Self {
        self.order_value = Some(order_value);
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::PLN;

    use super::*;

    #[test]
    fn default_context_is_a_single_unit_for_an_unknown_customer() {
        let context = UserContext::default();

        assert_eq!(context.customer_type, CustomerType::Any);
        assert_eq!(context.quantity, 1);
        assert!(context.region.is_none());
        assert!(context.promo_code.is_none());
        assert!(context.order_value.is_none());
    }

    #[test]
    fn builders_set_fields() {
        let context = UserContext::default()
            .with_customer_type(CustomerType::Existing)
            .with_region("PL")
            .with_promo_code("WIOSNA")
            .with_quantity(3)
            .with_order_value(Money::from_major(5000, PLN));

        assert_eq!(context.customer_type, CustomerType::Existing);
        assert_eq!(context.region.as_deref(), Some("PL"));
        assert_eq!(context.promo_code.as_deref(), Some("WIOSNA"));
        assert_eq!(context.quantity, 3);
        assert_eq!(context.order_value, Some(Money::from_major(5000, PLN)));
    }

    #[test]
    fn customer_type_uses_catalog_spelling() -> Result<(), serde_norway::Error> {
        let parsed: CustomerType = serde_norway::from_str("existing")?;

        assert_eq!(parsed, CustomerType::Existing);
        assert_eq!(CustomerType::New.to_string(), "new");

        Ok(())
    }
}
