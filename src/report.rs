//! Reports
//!
//! Owned, serialisable views of quotes, promotion status and conflicts, with
//! table and JSON renderers for the command line.

use std::{io, ops::Range};

use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    context::UserContext,
    eligibility::{IneligibilityReason, Requirement, check_eligibility},
    offer::Offer,
    packages::PricingPackage,
    promotions::{
        Promotion,
        conflicts::PromotionConflict,
        timing::{TimingStatus, validate_timing},
        usage::validate_usage,
    },
    selection::{calculate_stacked_promotions, find_best_promotion},
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output could not be written
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// Report could not be serialised
    #[error("failed to serialise report: {0}")]
    Json(#[from] serde_json::Error),
}

/// How promotions were combined for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Single promotion with the largest discount
    Best,

    /// Every eligible promotion, in priority order
    Stacked,
}

/// A promotion applied to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedLine {
    /// Promotion id
    pub id: String,

    /// Promotion name
    pub name: String,

    /// Discount taken
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Price after this promotion
    #[serde(with = "rust_decimal::serde::float")]
    pub price_after: Decimal,
}

/// An unmet condition with its machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementLine {
    /// Stable code, e.g. `promo-code`
    pub code: &'static str,

    /// Customer-facing message
    pub message: String,
}

impl From<&Requirement> for RequirementLine {
    fn from(requirement: &Requirement) -> Self {
        Self {
            code: requirement.code(),
            message: requirement.to_string(),
        }
    }
}

/// Outcome of evaluating one promotion against the quoted package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationLine {
    /// Promotion id
    pub id: String,

    /// Whether the promotion is eligible
    pub eligible: bool,

    /// Discount it would give on its own
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Decimal>,

    /// Why it is not eligible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,

    /// Unmet conditions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<RequirementLine>,

    /// Evaluation error for a malformed promotion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Price quote for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteReport {
    /// Package id
    pub package: String,

    /// Package name
    pub name: String,

    /// ISO currency code
    pub currency: String,

    /// How promotions were combined
    pub mode: QuoteMode,

    /// Package base price
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,

    /// Applied promotions, in application order
    pub applied: Vec<AppliedLine>,

    /// Sum of the discounts taken
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,

    /// Price to pay
    #[serde(with = "rust_decimal::serde::float")]
    pub final_price: Decimal,

    /// Structured offer data
    pub offer: Offer,

    /// Every promotion listing the package, in catalog order
    pub evaluations: Vec<EvaluationLine>,
}

impl QuoteReport {
    /// Quote `package` against `promotions` for `context` at `now`.
    ///
    /// Without `stack` the single best promotion is applied.
    pub fn build(
        package: &PricingPackage<'_>,
        promotions: &[Promotion<'_>],
        context: &UserContext<'_>,
        now: Timestamp,
        stack: bool,
    ) -> Self {
        let original_price = *package.base_price.amount();

        let (mode, applied, final_price, offer) = if stack {
            let stacked = calculate_stacked_promotions(package, promotions, context, now);

            let applied: Vec<AppliedLine> = stacked
                .applied
                .iter()
                .map(|step| AppliedLine {
                    id: step.promotion.id.clone(),
                    name: step.promotion.name.clone(),
                    discount: *step.discount.amount(),
                    price_after: *step.price_after.amount(),
                })
                .collect();

            (
                QuoteMode::Stacked,
                applied,
                *stacked.final_price.amount(),
                Offer::from_stacked(&stacked),
            )
        } else {
            let best = find_best_promotion(package, promotions, context, now);

            match (best.promotion, &best.eligibility) {
                (Some(promotion), Some(result)) => {
                    let final_price = result
                        .final_price
                        .map_or(original_price, |price| *price.amount());

                    let applied = vec![AppliedLine {
                        id: promotion.id.clone(),
                        name: promotion.name.clone(),
                        discount: result
                            .discount_amount
                            .map_or(Decimal::ZERO, |amount| *amount.amount()),
                        price_after: final_price,
                    }];

                    (
                        QuoteMode::Best,
                        applied,
                        final_price,
                        Offer::from_eligibility(package, result),
                    )
                }
                _ => (
                    QuoteMode::Best,
                    Vec::new(),
                    original_price,
                    Offer::list_price(package),
                ),
            }
        };

        let evaluations = promotions
            .iter()
            .filter(|promotion| promotion.applies_to(&package.id))
            .map(|promotion| evaluate(package, promotion, context, now))
            .collect();

        Self {
            package: package.id.clone(),
            name: package.name.clone(),
            currency: package.currency().iso_alpha_code.to_string(),
            mode,
            original_price,
            applied,
            total_discount: original_price.saturating_sub(final_price),
            final_price,
            offer,
            evaluations,
        }
    }

    /// Write the quote as tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        writeln!(out, "{} ({})", self.name, self.package)?;

        if !self.applied.is_empty() {
            let mut builder = Builder::default();

            builder.push_record(["Promotion", "Discount", "Price after"]);

            for line in &self.applied {
                builder.push_record([
                    line.name.clone(),
                    self.money(line.discount),
                    self.money(line.price_after),
                ]);
            }

            write_table(&mut out, builder, 1..3)?;
        }

        writeln!(out, "Original price: {}", self.money(self.original_price))?;
        writeln!(out, "Discount:       {}", self.money(self.total_discount))?;
        writeln!(out, "Final price:    {}", self.money(self.final_price))?;

        if !self.evaluations.is_empty() {
            let mut builder = Builder::default();

            builder.push_record(["Promotion", "Eligible", "Discount", "Notes"]);

            for line in &self.evaluations {
                builder.push_record([
                    line.id.clone(),
                    if line.eligible { "yes" } else { "no" }.to_string(),
                    line.discount.map_or_else(String::new, |amount| self.money(amount)),
                    line.notes(),
                ]);
            }

            write_table(&mut out, builder, 2..3)?;
        }

        Ok(())
    }

    /// Write the quote as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote cannot be serialised or written.
    pub fn write_json(&self, out: impl io::Write) -> Result<(), ReportError> {
        write_pretty_json(out, self)
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{} {}", amount.normalize(), self.currency)
    }
}

impl EvaluationLine {
    fn notes(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }

        match self.reason {
            Some(IneligibilityReason::RequirementsNotMet) => self
                .requirements
                .iter()
                .map(|requirement| requirement.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            Some(reason) => reason.to_string(),
            None => String::new(),
        }
    }
}

fn evaluate(
    package: &PricingPackage<'_>,
    promotion: &Promotion<'_>,
    context: &UserContext<'_>,
    now: Timestamp,
) -> EvaluationLine {
    match check_eligibility(package, promotion, context, now) {
        Ok(result) => EvaluationLine {
            id: promotion.id.clone(),
            eligible: result.is_eligible,
            discount: result.discount_amount.map(|amount| *amount.amount()),
            reason: result.reason,
            requirements: result.requirements.iter().map(RequirementLine::from).collect(),
            error: None,
        },
        Err(error) => EvaluationLine {
            id: promotion.id.clone(),
            eligible: false,
            discount: None,
            reason: None,
            requirements: Vec::new(),
            error: Some(error.to_string()),
        },
    }
}

/// Timing and usage of one promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    /// Promotion id
    pub id: String,

    /// Promotion name
    pub name: String,

    /// Timing status
    pub status: TimingStatus,

    /// Seconds until the window opens or closes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<i64>,

    /// Humanised countdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<String>,

    /// Recorded redemptions
    pub current_uses: u32,

    /// Redemption limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,

    /// Redemptions left
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_remaining: Option<u32>,
}

/// Status of every promotion at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Evaluation instant
    pub at: Timestamp,

    /// Promotions, in catalog order
    pub promotions: Vec<StatusLine>,
}

impl StatusReport {
    /// Build the status of `promotions` at `now`.
    pub fn build(promotions: &[Promotion<'_>], now: Timestamp) -> Self {
        let promotions = promotions
            .iter()
            .map(|promotion| {
                let timing = validate_timing(promotion, now);
                let usage = validate_usage(promotion);

                StatusLine {
                    id: promotion.id.clone(),
                    name: promotion.name.clone(),
                    status: timing.status,
                    seconds_remaining: timing.time_remaining.map(|remaining| remaining.as_secs()),
                    countdown: timing
                        .time_remaining
                        .map(|remaining| remaining.unsigned_abs().human(Truncate::Minute).to_string()),
                    current_uses: promotion.conditions.current_uses,
                    max_uses: promotion.conditions.max_uses,
                    usage_remaining: usage.usage_remaining,
                }
            })
            .collect();

        Self { at: now, promotions }
    }

    /// Write the status as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        writeln!(out, "Promotion status at {}", self.at)?;

        let mut builder = Builder::default();

        builder.push_record(["Promotion", "Status", "Countdown", "Uses"]);

        for line in &self.promotions {
            let countdown = match (line.status, &line.countdown) {
                (TimingStatus::Upcoming, Some(countdown)) => format!("starts in {countdown}"),
                (TimingStatus::Active, Some(countdown)) => format!("ends in {countdown}"),
                _ => String::new(),
            };

            let uses = match line.max_uses {
                Some(max_uses) => format!("{}/{max_uses}", line.current_uses),
                None => line.current_uses.to_string(),
            };

            builder.push_record([line.id.clone(), line.status.to_string(), countdown, uses]);
        }

        write_table(&mut out, builder, 3..4)
    }

    /// Write the status as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be serialised or written.
    pub fn write_json(&self, out: impl io::Write) -> Result<(), ReportError> {
        write_pretty_json(out, self)
    }
}

/// One scheduling overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictLine {
    /// First promotion id
    pub first: String,

    /// Second promotion id
    pub second: String,

    /// Packages both promotions apply to
    pub shared_packages: Vec<String>,

    /// Start of the overlap
    pub overlap_from: Timestamp,

    /// End of the overlap
    pub overlap_to: Timestamp,
}

/// Advisory list of overlapping promotions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Overlaps, in pair order
    pub conflicts: Vec<ConflictLine>,
}

impl ConflictReport {
    /// Build a report from detected conflicts.
    pub fn build(conflicts: &[PromotionConflict<'_>]) -> Self {
        let conflicts = conflicts
            .iter()
            .map(|conflict| ConflictLine {
                first: conflict.first.to_string(),
                second: conflict.second.to_string(),
                shared_packages: conflict
                    .shared_packages
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                overlap_from: conflict.overlap_from,
                overlap_to: conflict.overlap_to,
            })
            .collect();

        Self { conflicts }
    }

    /// Write the conflicts as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        if self.conflicts.is_empty() {
            writeln!(out, "No conflicting promotions")?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["First", "Second", "Packages", "From", "To"]);

        for line in &self.conflicts {
            builder.push_record([
                line.first.clone(),
                line.second.clone(),
                line.shared_packages.join(", "),
                line.overlap_from.to_string(),
                line.overlap_to.to_string(),
            ]);
        }

        write_table(&mut out, builder, 0..0)
    }

    /// Write the conflicts as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the conflicts cannot be serialised or written.
    pub fn write_json(&self, out: impl io::Write) -> Result<(), ReportError> {
        write_pretty_json(out, self)
    }
}

/// Render `builder` with the `numeric` columns aligned right.
fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Range<usize>,
) -> Result<(), ReportError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());

    if !numeric.is_empty() {
        table.modify(Columns::new(numeric), Alignment::right());
    }

    writeln!(out, "{table}")?;

    Ok(())
}

fn write_pretty_json(mut out: impl io::Write, value: &impl Serialize) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;

    Ok(())
}
