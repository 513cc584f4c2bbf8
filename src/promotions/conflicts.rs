//! Promotion Conflicts
//!
//! Advisory scheduling overlap detection for catalog maintainers. Selection
//! never consults it.

use jiff::Timestamp;
use smallvec::SmallVec;

use crate::promotions::Promotion;

/// Two promotions that can both apply to the same package at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionConflict<'p> {
    /// First promotion id, in input order
    pub first: &'p str,

    /// Second promotion id, in input order
    pub second: &'p str,

    /// Packages both promotions apply to, in the first promotion's order
    pub shared_packages: SmallVec<[&'p str; 4]>,

    /// Start of the overlapping window
    pub overlap_from: Timestamp,

    /// End of the overlapping window
    pub overlap_to: Timestamp,
}

/// Report whether `first` and `second` share a package and overlapping
/// validity windows (bounds inclusive).
pub fn detect_conflict<'p>(
    first: &'p Promotion<'_>,
    second: &'p Promotion<'_>,
) -> Option<PromotionConflict<'p>> {
    let overlap_from = first.valid_from.max(second.valid_from);
    let overlap_to = first.valid_to.min(second.valid_to);

    if overlap_from > overlap_to {
        return None;
    }

    let shared_packages: SmallVec<[&'p str; 4]> = first
        .applicable_packages
        .iter()
        .map(String::as_str)
        .filter(|id| second.applies_to(id))
        .collect();

    if shared_packages.is_empty() {
        return None;
    }

    Some(PromotionConflict {
        first: &first.id,
        second: &second.id,
        shared_packages,
        overlap_from,
        overlap_to,
    })
}

/// Check every unordered pair of promotions, in input order.
pub fn find_conflicts<'p>(promotions: &'p [Promotion<'_>]) -> Vec<PromotionConflict<'p>> {
    promotions
        .iter()
        .enumerate()
        .flat_map(|(index, first)| {
            promotions
                .iter()
                .skip(index + 1)
                .filter_map(move |second| detect_conflict(first, second))
        })
        .collect()
}
