//! Order Fixtures

use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::{fixtures::FixtureError, orders::OrderDraft};

/// Order draft in YAML, with an optional currency code
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Currency code (e.g. "EUR")
    #[serde(default)]
    pub currency: Option<String>,

    /// The draft itself
    #[serde(flatten)]
    pub order: OrderDraft,
}

/// Parse a currency code into its ISO currency
///
/// # Errors
///
/// Returns an error if the currency code is not recognized.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
