//! Integration tests against the shipped `website` catalog set.
//!
//! All quotes are taken at 2026-10-16 12:00 UTC unless stated otherwise. At that
//! instant the launch offer, the new-customer offer, the team bundle, the
//! autumn code and the landing pair are running; the summer sale has ended and
//! Black Friday has not started.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::PLN};
use testresult::TestResult;

use promo_pricing::prelude::*;

fn now() -> Result<Timestamp, jiff::Error> {
    "2026-10-16T12:00:00Z".parse()
}

fn catalog() -> Result<Catalog<'static>, CatalogError> {
    Catalog::from_set("website")
}

#[test]
fn launch_offer_is_best_for_landing_page() -> TestResult {
    let catalog = catalog()?;
    let landing = catalog.package("landing")?;

    let best = find_best_promotion(landing, catalog.promotions(), &UserContext::default(), now()?);

    assert_eq!(best.promotion.map(|p| p.id.as_str()), Some("launch-70"));
    assert_eq!(best.final_price(), Some(Money::from_major(600, PLN)));

    Ok(())
}

#[test]
fn new_polish_customer_gets_fifteen_percent_on_business() -> TestResult {
    let catalog = catalog()?;
    let business = catalog.package("business")?;

    let context = UserContext::default()
        .with_customer_type(CustomerType::New)
        .with_region("PL");

    let best = find_best_promotion(business, catalog.promotions(), &context, now()?);

    assert_eq!(best.promotion.map(|p| p.id.as_str()), Some("new-customer-pl"));
    assert_eq!(best.final_price(), Some(Money::from_major(3825, PLN)));

    Ok(())
}

#[test]
fn autumn_code_needs_the_code() -> TestResult {
    let catalog = catalog()?;
    let business = catalog.package("business")?;
    let autumn = catalog.promotion("autumn-code")?;

    let without_code = check_eligibility(business, autumn, &UserContext::default(), now()?)?;
    let with_code = check_eligibility(
        business,
        autumn,
        &UserContext::default().with_promo_code("JESIEN"),
        now()?,
    )?;

    assert_eq!(without_code.requirements.as_slice(), [Requirement::PromoCode]);
    assert!(with_code.is_eligible);
    assert_eq!(with_code.final_price, Some(Money::from_major(4000, PLN)));

    Ok(())
}

#[test]
fn stacking_combines_every_running_offer_by_priority() -> TestResult {
    let catalog = catalog()?;
    let business = catalog.package("business")?;

    let context = UserContext::default()
        .with_customer_type(CustomerType::New)
        .with_region("PL")
        .with_promo_code("JESIEN");

    let stacked = calculate_stacked_promotions(business, catalog.promotions(), &context, now()?);

    let order: Vec<&str> = stacked
        .applied
        .iter()
        .map(|step| step.promotion.id.as_str())
        .collect();

    // 4500 - 15% = 3825, - 500 = 3325; the team bundle needs three sites
    assert_eq!(order, ["new-customer-pl", "autumn-code", "team-bundle"]);
    assert_eq!(stacked.final_price, Money::from_major(3325, PLN));
    assert_eq!(stacked.total_discount, Money::from_major(1175, PLN));

    Ok(())
}

#[test]
fn team_bundle_applies_from_three_sites() -> TestResult {
    let catalog = catalog()?;
    let premium = catalog.package("premium")?;
    let bundle = catalog.promotion("team-bundle")?;

    let two = check_eligibility(premium, bundle, &UserContext::default().with_quantity(2), now()?)?;
    let three = check_eligibility(premium, bundle, &UserContext::default().with_quantity(3), now()?)?;

    assert_eq!(two.discount_amount, Some(Money::from_major(0, PLN)));
    assert_eq!(three.discount_amount, Some(Money::from_major(1600, PLN)));

    Ok(())
}

#[test]
fn care_plan_never_takes_promotions() -> TestResult {
    let catalog = catalog()?;
    let care_plan = catalog.package("care-plan")?;

    let report = QuoteReport::build(
        care_plan,
        catalog.promotions(),
        &UserContext::default(),
        now()?,
        false,
    );

    assert!(report.applied.is_empty());
    assert!(report.evaluations.is_empty());
    assert_eq!(report.final_price, Decimal::from(300));
    assert_eq!(report.offer, Offer::list_price(care_plan));

    Ok(())
}

#[test]
fn business_pays_list_price_when_only_the_bundle_is_eligible() -> TestResult {
    let catalog = catalog()?;
    let business = catalog.package("business")?;

    let best = find_best_promotion(business, catalog.promotions(), &UserContext::default(), now()?);

    assert!(best.promotion.is_none());
    assert!(best.eligibility.is_none());

    let report = QuoteReport::build(
        business,
        catalog.promotions(),
        &UserContext::default(),
        now()?,
        false,
    );

    assert!(report.applied.is_empty());
    assert_eq!(report.total_discount, Decimal::ZERO);
    assert_eq!(report.final_price, Decimal::from(4500));
    assert_eq!(report.offer, Offer::list_price(business));

    Ok(())
}

#[test]
fn black_friday_wins_on_premium_during_the_weekend() -> TestResult {
    let catalog = catalog()?;
    let premium = catalog.package("premium")?;
    let at: Timestamp = "2026-11-28T10:00:00Z".parse()?;

    let best = find_best_promotion(premium, catalog.promotions(), &UserContext::default(), at);

    assert_eq!(best.promotion.map(|p| p.id.as_str()), Some("black-friday"));
    assert_eq!(best.final_price(), Some(Money::from_major(5600, PLN)));

    Ok(())
}

#[test]
fn quote_explains_ended_and_upcoming_offers() -> TestResult {
    let catalog = catalog()?;
    let landing = catalog.package("landing")?;

    let report = QuoteReport::build(
        landing,
        catalog.promotions(),
        &UserContext::default(),
        now()?,
        false,
    );

    let reason = |id: &str| {
        report
            .evaluations
            .iter()
            .find(|line| line.id == id)
            .and_then(|line| line.reason)
    };

    assert_eq!(reason("summer-sale"), Some(IneligibilityReason::Expired));
    assert_eq!(reason("black-friday"), Some(IneligibilityReason::NotYetActive));
    assert_eq!(reason("launch-70"), None);

    Ok(())
}

#[test]
fn status_reflects_the_calendar() -> TestResult {
    let catalog = catalog()?;
    let report = StatusReport::build(catalog.promotions(), now()?);

    let status = |id: &str| {
        report
            .promotions
            .iter()
            .find(|line| line.id == id)
            .map(|line| line.status)
    };

    assert_eq!(status("launch-70"), Some(TimingStatus::Active));
    assert_eq!(status("summer-sale"), Some(TimingStatus::Expired));
    assert_eq!(status("black-friday"), Some(TimingStatus::Upcoming));

    let launch = report
        .promotions
        .iter()
        .find(|line| line.id == "launch-70")
        .ok_or("missing launch-70")?;

    assert_eq!(launch.usage_remaining, Some(63));

    Ok(())
}

#[test]
fn conflicts_flag_overlapping_landing_offers() -> TestResult {
    let catalog = catalog()?;
    let conflicts = find_conflicts(catalog.promotions());

    assert!(
        conflicts
            .iter()
            .any(|conflict| conflict.first == "launch-70" && conflict.second == "landing-pair")
    );
    assert!(
        !conflicts
            .iter()
            .any(|conflict| conflict.first == "summer-sale" && conflict.second == "black-friday")
    );

    Ok(())
}
