//! Promotion Usage

use crate::promotions::Promotion;

/// Result of [`validate_usage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageValidation {
    /// Whether another redemption is allowed
    pub can_use: bool,

    /// Redemptions left; `None` when unlimited
    pub usage_remaining: Option<u32>,

    /// Whether the redemption limit has been reached
    pub is_at_limit: bool,
}

/// Check the promotion's recorded redemptions against its limit.
pub fn validate_usage(promotion: &Promotion<'_>) -> UsageValidation {
    let Some(max_uses) = promotion.conditions.max_uses else {
        return UsageValidation {
            can_use: true,
            usage_remaining: None,
            is_at_limit: false,
        };
    };

    let current_uses = promotion.conditions.current_uses;

    UsageValidation {
        can_use: current_uses < max_uses,
        usage_remaining: Some(max_uses.saturating_sub(current_uses)),
        is_at_limit: current_uses >= max_uses,
    }
}
