//! Promo Pricing
//!
//! Resolves the price a customer pays for a service package once time-boxed,
//! conditional promotions are taken into account.
//!
//! Packages and promotions are loaded from YAML catalogs and validated once.
//! Evaluation is pure: the caller supplies the current instant and the
//! customer context, and gets back eligibility, the best promotion (or a
//! stacked combination) and structured offer data.

pub mod catalog;
pub mod context;
pub mod discounts;
pub mod eligibility;
pub mod observability;
pub mod offer;
pub mod packages;
pub mod prelude;
pub mod promotions;
pub mod report;
pub mod selection;
pub mod validation;
