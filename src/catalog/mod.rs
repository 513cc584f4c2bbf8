//! Catalog
//!
//! Loads package and promotion definitions from YAML catalog sets and
//! validates them once, at load time.
//!
//! A catalog set `name` lives in `<base>/packages/<name>.yml` and
//! `<base>/promotions/<name>.yml`. Packages must be loaded before the
//! promotions that reference them.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::{packages::PackagesFile, promotions::PromotionsFile},
    packages::{PackageKey, PricingPackage},
    promotions::Promotion,
    validation::{ValidationError, validate_package, validate_promotion},
};

pub mod packages;
pub mod promotions;

/// Default directory holding catalog sets.
pub const DEFAULT_BASE_PATH: &str = "./catalogs";

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading catalog files
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Record failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Package id defined twice
    #[error("Duplicate package: {0}")]
    DuplicatePackage(String),

    /// Promotion id defined twice
    #[error("Duplicate promotion: {0}")]
    DuplicatePromotion(String),

    /// Package not found
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Promotion amount in a different currency from a package it applies to
    #[error("Currency mismatch in promotion {promotion}: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Promotion id
        promotion: String,

        /// Package currency
        expected: String,

        /// Promotion amount currency
        found: String,
    },
}

/// Validated packages and promotions.
#[derive(Debug)]
pub struct Catalog<'a> {
    /// Base path for catalog files
    base_path: PathBuf,

    /// Packages, in load order
    packages: SlotMap<PackageKey, PricingPackage<'a>>,

    /// Package id -> `SlotMap` key
    package_keys: FxHashMap<String, PackageKey>,

    /// Promotions, in load order
    promotions: Vec<Promotion<'a>>,

    /// Promotion id -> index into `promotions`
    promotion_keys: FxHashMap<String, usize>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog with the default base path
    pub fn new() -> Self {
        Self::with_base_path(DEFAULT_BASE_PATH)
    }

    /// Create an empty catalog with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            packages: SlotMap::with_key(),
            package_keys: FxHashMap::default(),
            promotions: Vec::new(),
            promotion_keys: FxHashMap::default(),
        }
    }

    /// Add a package after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is invalid or its id is already taken.
    pub fn add_package(&mut self, package: PricingPackage<'a>) -> Result<PackageKey, CatalogError> {
        validate_package(&package)?;

        if self.package_keys.contains_key(&package.id) {
            return Err(CatalogError::DuplicatePackage(package.id));
        }

        let id = package.id.clone();
        let key = self.packages.insert(package);

        self.package_keys.insert(id, key);

        Ok(key)
    }

    /// Add a promotion after validating it against itself and the loaded packages.
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is invalid, its id is already taken,
    /// it references an unknown package, or one of its amounts is in a
    /// different currency from a package it applies to.
    pub fn add_promotion(&mut self, promotion: Promotion<'a>) -> Result<(), CatalogError> {
        validate_promotion(&promotion)?;

        if self.promotion_keys.contains_key(&promotion.id) {
            return Err(CatalogError::DuplicatePromotion(promotion.id));
        }

        for package_id in &promotion.applicable_packages {
            let package = self.package(package_id)?;
            let expected = package.currency().iso_alpha_code;

            let amounts = [
                promotion.fixed_amount.as_ref(),
                promotion.max_discount_amount.as_ref(),
                promotion.conditions.minimum_order_value.as_ref(),
            ];

            for amount in amounts.into_iter().flatten() {
                let found = amount.currency().iso_alpha_code;

                if found != expected {
                    return Err(CatalogError::CurrencyMismatch {
                        promotion: promotion.id.clone(),
                        expected: expected.to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }

        self.promotion_keys
            .insert(promotion.id.clone(), self.promotions.len());
        self.promotions.push(promotion);

        Ok(())
    }

    /// Get a package by id
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not found.
    pub fn package(&self, id: &str) -> Result<&PricingPackage<'a>, CatalogError> {
        let key = self
            .package_keys
            .get(id)
            .ok_or_else(|| CatalogError::PackageNotFound(id.to_string()))?;

        self.packages
            .get(*key)
            .ok_or_else(|| CatalogError::PackageNotFound(id.to_string()))
    }

    /// Get a promotion by id
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, id: &str) -> Result<&Promotion<'a>, CatalogError> {
        self.promotion_keys
            .get(id)
            .and_then(|index| self.promotions.get(*index))
            .ok_or_else(|| CatalogError::PromotionNotFound(id.to_string()))
    }

    /// All packages, in load order
    pub fn packages(&self) -> impl Iterator<Item = &PricingPackage<'a>> {
        self.packages.values()
    }

    /// All promotions, in load order
    pub fn promotions(&self) -> &[Promotion<'a>] {
        &self.promotions
    }

    /// Promotions that list the given package, in load order
    pub fn promotions_for(&self, package_id: &str) -> impl Iterator<Item = &Promotion<'a>> {
        self.promotions
            .iter()
            .filter(move |promotion| promotion.applies_to(package_id))
    }
}

impl Catalog<'static> {
    /// Load packages from a YAML catalog file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a package is invalid.
    pub fn load_packages(&mut self, name: &str) -> Result<&mut Self, CatalogError> {
        let file_path = self.base_path.join("packages").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let file: PackagesFile = serde_norway::from_str(&contents)?;

        for entry in file.packages {
            let package = PricingPackage::try_from(entry)?;

            debug!(package = %package.id, "loaded package");

            self.add_package(package)?;
        }

        info!(path = %file_path.display(), packages = self.packages.len(), "loaded packages");

        Ok(self)
    }

    /// Load promotions from a YAML catalog file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a promotion
    /// is invalid or references a package that has not been loaded.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, CatalogError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let file: PromotionsFile = serde_norway::from_str(&contents)?;

        for entry in file.promotions {
            let promotion = Promotion::try_from(entry)?;

            debug!(promotion = %promotion.id, "loaded promotion");

            self.add_promotion(promotion)?;
        }

        info!(path = %file_path.display(), promotions = self.promotions.len(), "loaded promotions");

        Ok(self)
    }

    /// Load a complete catalog set (packages and promotions with the same name)
    /// from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the catalog files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, CatalogError> {
        Self::from_set_in(DEFAULT_BASE_PATH, name)
    }

    /// Load a complete catalog set from `base_path`
    ///
    /// # Errors
    ///
    /// Returns an error if any of the catalog files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::with_base_path(base_path);

        catalog.load_packages(name)?.load_promotions(name)?;

        Ok(catalog)
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use decimal_percentage::Percentage;
    use rusty_money::{
        Money,
        iso::{EUR, PLN},
    };
    use testresult::TestResult;

    use super::*;

    fn write_catalog(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn launch() -> Result<Promotion<'static>, jiff::Error> {
        Ok(Promotion::new(
            "launch",
            "Launch",
            "2026-01-01T00:00:00Z".parse()?,
            "2026-12-31T23:59:59Z".parse()?,
        )
        .for_packages(["landing"])
        .percentage_off(Percentage::from(0.7)))
    }

    #[test]
    fn catalog_loads_website_set() -> TestResult {
        let catalog = Catalog::from_set("website")?;

        let landing = catalog.package("landing")?;

        assert_eq!(landing.name, "Landing Page");
        assert_eq!(landing.base_price, Money::from_major(2000, PLN));
        assert!(catalog.packages().count() >= 3);
        assert!(!catalog.promotions().is_empty());
        assert!(catalog.promotion("launch-70")?.applies_to("landing"));

        Ok(())
    }

    #[test]
    fn packages_keep_file_order() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_catalog(
            dir.path(),
            "packages",
            "ordered",
            "packages:\n  - id: c\n    name: C\n    base_price: 300 PLN\n  - id: a\n    name: A\n    base_price: 100 PLN\n  - id: b\n    name: B\n    base_price: 200 PLN\n",
        )?;

        let mut catalog = Catalog::with_base_path(dir.path());

        catalog.load_packages("ordered")?;

        let ids: Vec<&str> = catalog.packages().map(|package| package.id.as_str()).collect();

        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(catalog.packages().count(), 3);

        Ok(())
    }

    #[test]
    fn duplicate_package_is_rejected() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.add_package(PricingPackage::new("landing", "Landing", Money::from_major(2000, PLN)))?;

        let result =
            catalog.add_package(PricingPackage::new("landing", "Again", Money::from_major(1000, PLN)));

        assert!(matches!(result, Err(CatalogError::DuplicatePackage(id)) if id == "landing"));

        Ok(())
    }

    #[test]
    fn invalid_package_is_rejected() {
        let mut catalog = Catalog::new();

        let result = catalog.add_package(PricingPackage::new("free", "Free", Money::from_major(0, PLN)));

        assert!(matches!(
            result,
            Err(CatalogError::Validation(ValidationError::NonPositivePrice(_)))
        ));
    }

    #[test]
    fn promotion_for_unknown_package_is_rejected() -> TestResult {
        let mut catalog = Catalog::new();

        let result = catalog.add_promotion(launch()?);

        assert!(matches!(result, Err(CatalogError::PackageNotFound(id)) if id == "landing"));

        Ok(())
    }

    #[test]
    fn duplicate_promotion_is_rejected() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.add_package(PricingPackage::new("landing", "Landing", Money::from_major(2000, PLN)))?;
        catalog.add_promotion(launch()?)?;

        let result = catalog.add_promotion(launch()?);

        assert!(matches!(result, Err(CatalogError::DuplicatePromotion(_))));

        Ok(())
    }

    #[test]
    fn promotion_amount_in_other_currency_is_rejected() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.add_package(PricingPackage::new("landing", "Landing", Money::from_major(2000, PLN)))?;

        let result = catalog.add_promotion(launch()?.amount_off(Money::from_major(100, EUR)));

        assert!(matches!(
            result,
            Err(CatalogError::CurrencyMismatch { expected, found, .. })
                if expected == "PLN" && found == "EUR"
        ));

        Ok(())
    }

    #[test]
    fn promotions_for_filters_by_package() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.add_package(PricingPackage::new("landing", "Landing", Money::from_major(2000, PLN)))?;
        catalog.add_package(PricingPackage::new("premium", "Premium", Money::from_major(8000, PLN)))?;
        catalog.add_promotion(launch()?)?;

        assert_eq!(catalog.promotions_for("landing").count(), 1);
        assert_eq!(catalog.promotions_for("premium").count(), 0);

        Ok(())
    }

    #[test]
    fn promotions_file_with_invalid_window_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_catalog(
            dir.path(),
            "packages",
            "broken",
            "packages:\n  - id: landing\n    name: Landing\n    base_price: 2000 PLN\n",
        )?;

        write_catalog(
            dir.path(),
            "promotions",
            "broken",
            "promotions:\n  - id: backwards\n    name: Backwards\n    discount: 10%\n    packages: [landing]\n    valid_from: \"2026-12-31T00:00:00Z\"\n    valid_to: \"2026-01-01T00:00:00Z\"\n",
        )?;

        let result = Catalog::from_set_in(dir.path(), "broken");

        assert!(matches!(
            result,
            Err(CatalogError::Validation(ValidationError::InvalidValidityWindow(id))) if id == "backwards"
        ));

        Ok(())
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() -> TestResult {
        let dir = tempfile::tempdir()?;

        let result = Catalog::from_set_in(dir.path(), "nowhere");

        assert!(matches!(result, Err(CatalogError::Io(_))));

        Ok(())
    }

    #[test]
    fn package_and_promotion_lookups_report_missing_ids() {
        let catalog = Catalog::default();

        assert!(matches!(catalog.package("nope"), Err(CatalogError::PackageNotFound(_))));
        assert!(matches!(catalog.promotion("nope"), Err(CatalogError::PromotionNotFound(_))));
    }

    #[test]
    fn default_matches_new() {
        let catalog = Catalog::default();

        assert_eq!(catalog.base_path, PathBuf::from(DEFAULT_BASE_PATH));
        assert!(catalog.promotions.is_empty());
    }
}
