//! Promo Pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{Catalog, CatalogError},
    context::{CustomerType, UserContext},
    discounts::{DiscountError, calculate_discount, discounted_price},
    eligibility::{EligibilityResult, IneligibilityReason, Requirement, check_eligibility},
    offer::Offer,
    packages::{PackageKey, PackageLimits, PricingPackage},
    promotions::{
        Promotion, PromotionType,
        conditions::PromotionConditions,
        conflicts::{PromotionConflict, detect_conflict, find_conflicts},
        timing::{TimingStatus, TimingValidation, validate_timing},
        usage::{UsageValidation, validate_usage},
    },
    report::{ConflictReport, QuoteReport, ReportError, RequirementLine, StatusReport},
    selection::{
        AppliedPromotion, BestPromotion, StackedPromotions, calculate_stacked_promotions,
        find_best_promotion,
    },
    validation::{ValidationError, validate_package, validate_promotion},
};
