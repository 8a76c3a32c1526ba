//! Fixtures
//!
//! Order drafts (YAML) and catalogs (JSON) loaded from a fixtures directory:
//!
//! ```text
//! fixtures/
//! ├── catalogs/<name>.json
//! └── orders/<name>.yml
//! ```

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    money::DEFAULT_CURRENCY,
    orders::OrderDraft,
    products::{Catalog, CatalogError},
};

pub mod orders;

use orders::OrderFixture;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Catalog parsing error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// No catalog loaded
    #[error("No catalog loaded")]
    NoCatalog,

    /// No order loaded
    #[error("No order loaded")]
    NoOrder,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Option<Catalog>,
    order: Option<OrderDraft>,
    currency: &'static Currency,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            order: None,
            currency: DEFAULT_CURRENCY,
        }
    }

    /// Load a catalog from a JSON fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.json"));
        let contents = fs::read_to_string(&file_path)?;
        let catalog = Catalog::from_json(&contents)?;

        debug!(path = %file_path.display(), products = catalog.len(), "loaded catalog");

        self.catalog = Some(catalog);

        Ok(self)
    }

    /// Load an order draft from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or names an unknown currency.
    pub fn load_order(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OrderFixture = serde_norway::from_str(&contents)?;

        if let Some(code) = fixture.currency.as_deref() {
            self.currency = orders::parse_currency(code)?;
        }

        debug!(
            path = %file_path.display(),
            lines = fixture.order.lines.len(),
            currency = self.currency.iso_alpha_code,
            "loaded order"
        );

        self.order = Some(fixture.order);

        Ok(self)
    }

    /// Load a catalog and an order draft with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a named catalog and order draft from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture.load_catalog(name)?.load_order(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog has been loaded.
    pub fn catalog(&self) -> Result<&Catalog, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Get the loaded order draft
    ///
    /// # Errors
    ///
    /// Returns an error if no order has been loaded.
    pub fn order(&self) -> Result<&OrderDraft, FixtureError> {
        self.order.as_ref().ok_or(FixtureError::NoOrder)
    }

    /// Currency of the order, [`DEFAULT_CURRENCY`] unless the order names one
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_money::iso;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::{discounts::DiscountKind, products::VariantId};

    const CATALOG: &str = r#"[
        {"id": 1, "name": "Coffee", "variants": [
            {"id": 10, "sku": "COF-250", "unit_price": "2.50", "in_stock": 5}
        ]}
    ]"#;

    const ORDER: &str = "
currency: GBP
lines:
  - variant: 10
    quantity: 3
discount:
  type: percentage
  value: '10.00'
note: Leave at reception
customer: 7
";

    fn write_set(dir: &TempDir, name: &str, order: &str) -> TestResult {
        fs::create_dir_all(dir.path().join("catalogs"))?;
        fs::create_dir_all(dir.path().join("orders"))?;
        fs::write(dir.path().join("catalogs").join(format!("{name}.json")), CATALOG)?;
        fs::write(dir.path().join("orders").join(format!("{name}.yml")), order)?;

        Ok(())
    }

    #[test]
    fn loads_catalog_and_order() -> TestResult {
        let dir = TempDir::new()?;
        write_set(&dir, "cafe", ORDER)?;

        let fixture = Fixture::from_set_in(dir.path(), "cafe")?;
        let order = fixture.order()?;

        assert_eq!(fixture.catalog()?.len(), 1);
        assert_eq!(order.quantity(VariantId(10)), 3);
        assert_eq!(order.discount.kind, DiscountKind::Percentage);
        assert_eq!(order.discount.value, "10.00");
        assert_eq!(order.note, "Leave at reception");
        assert_eq!(order.customer, Some(7));
        assert_eq!(fixture.currency(), iso::GBP);

        Ok(())
    }

    #[test]
    fn order_without_currency_uses_default() -> TestResult {
        let dir = TempDir::new()?;
        write_set(&dir, "plain", "lines: []\n")?;

        let fixture = Fixture::from_set_in(dir.path(), "plain")?;

        assert_eq!(fixture.currency(), DEFAULT_CURRENCY);
        assert!(fixture.order()?.lines.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_currency_errors() -> TestResult {
        let dir = TempDir::new()?;
        write_set(&dir, "odd", "currency: XYZ\n")?;

        assert!(matches!(
            Fixture::from_set_in(dir.path(), "odd"),
            Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"
        ));

        Ok(())
    }

    #[test]
    fn missing_files_error() -> TestResult {
        let dir = TempDir::new()?;

        assert!(matches!(
            Fixture::from_set_in(dir.path(), "missing"),
            Err(FixtureError::Io(_))
        ));

        Ok(())
    }

    #[test]
    fn accessors_error_before_loading() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.catalog(), Err(FixtureError::NoCatalog)));
        assert!(matches!(fixture.order(), Err(FixtureError::NoOrder)));
    }
}
