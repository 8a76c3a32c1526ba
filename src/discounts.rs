//! Discounts
//!
//! Order-level discounts entered in the order form. Discount values are typed
//! in as decimal strings: a fixed discount of `"5.00"` takes 500 minor units
//! off the cart total, a percentage discount of `"10.00"` (1000 hundredths of a
//! percent) takes 10% off, rounded down to whole minor units.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::money::{AmountError, format_minor_units, parse_optional_minor_units};

/// Scale of a percentage value parsed as minor units: `"10.00"` -> 1000 -> 10%.
const PERCENT_VALUE_SCALE: u32 = 4;

/// Percentage value meaning 100% (`"100.00"`).
const FULL_PERCENTAGE_VALUE: i64 = 10_000;

/// Errors specific to discount calculations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// The discount value could not be parsed.
    #[error("invalid discount value: {0}")]
    Value(#[source] AmountError),

    /// The cart total could not be parsed.
    #[error("invalid cart total: {0}")]
    CartTotal(#[source] AmountError),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// The discount kind is not one the order form offers.
    #[error("unknown discount type: {0:?}")]
    UnknownKind(String),
}

/// How the discount value is applied to the cart total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Subtract a fixed amount (e.g. "5.00 off")
    #[default]
    Fixed,

    /// Subtract a percentage of the total (e.g. "10.00%")
    Percentage,
}

impl DiscountKind {
    /// Name used by the order form.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountKind::Fixed => "fixed",
            DiscountKind::Percentage => "percentage",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountKind {
    type Err = DiscountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fixed" => Ok(DiscountKind::Fixed),
            "percentage" => Ok(DiscountKind::Percentage),
            other => Err(DiscountError::UnknownKind(other.to_owned())),
        }
    }
}

/// Result of applying a discount to a cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountOutcome {
    kind: DiscountKind,
    value: i64,
    cart_total: i64,
    discounted_total: i64,
}

impl DiscountOutcome {
    /// Kind of discount applied
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// Parsed discount value: minor units for fixed discounts, hundredths of a
    /// percent for percentage discounts. Zero when nothing was applied.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Cart total before the discount, in minor units
    pub fn cart_total(&self) -> i64 {
        self.cart_total
    }

    /// Cart total after the discount, in minor units; never negative
    pub fn discounted_total(&self) -> i64 {
        self.discounted_total
    }

    /// Amount taken off the cart total, in minor units
    pub fn savings(&self) -> i64 {
        self.cart_total - self.discounted_total
    }

    /// Discounted total as a decimal string
    pub fn formatted(&self) -> String {
        format_minor_units(self.discounted_total)
    }
}

/// Discount as entered in the order form: a kind and a raw decimal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDiscount {
    /// How the value is applied
    #[serde(rename = "type", default)]
    pub kind: DiscountKind,

    /// Raw decimal value
    #[serde(default = "zero_value")]
    pub value: String,
}

impl Default for OrderDiscount {
    fn default() -> Self {
        Self {
            kind: DiscountKind::Fixed,
            value: zero_value(),
        }
    }
}

fn zero_value() -> String {
    format_minor_units(0)
}

impl OrderDiscount {
    /// Create a discount from its kind and raw value.
    pub fn new(kind: DiscountKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Apply the discount to a cart total.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::Value`]: the raw value is not a valid decimal amount.
    /// - [`DiscountError::PercentConversion`]: the percentage cannot be represented.
    pub fn apply(&self, cart_total: &Money<'_, Currency>) -> Result<DiscountOutcome, DiscountError> {
        let value = parse_optional_minor_units(&self.value).map_err(DiscountError::Value)?;

        discount_minor(self.kind, value, cart_total.to_minor_units())
    }
}

/// Apply a discount given as raw decimal strings.
///
/// A blank or zero value, or a blank or zero cart total, applies no discount.
///
/// # Errors
///
/// - [`DiscountError::Value`] / [`DiscountError::CartTotal`]: an input is not a valid decimal amount.
/// - [`DiscountError::PercentConversion`]: the percentage cannot be represented.
pub fn calculate_discount(
    kind: DiscountKind,
    raw_value: &str,
    cart_total: &str,
) -> Result<DiscountOutcome, DiscountError> {
    let cart_total = parse_optional_minor_units(cart_total).map_err(DiscountError::CartTotal)?;
    let value = parse_optional_minor_units(raw_value).map_err(DiscountError::Value)?;

    discount_minor(kind, value, cart_total)
}

/// Apply a discount and render the discounted total as a decimal string.
///
/// # Errors
///
/// Returns the same errors as [`calculate_discount`].
pub fn format_discounted_total(
    kind: DiscountKind,
    raw_value: &str,
    cart_total: &str,
) -> Result<String, DiscountError> {
    Ok(calculate_discount(kind, raw_value, cart_total)?.formatted())
}

/// Apply a discount to a cart total, both in minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if a percentage discount cannot be represented.
pub fn discount_minor(
    kind: DiscountKind,
    value: i64,
    cart_total: i64,
) -> Result<DiscountOutcome, DiscountError> {
    if value == 0 || cart_total == 0 {
        return Ok(DiscountOutcome {
            kind,
            value: 0,
            cart_total,
            discounted_total: cart_total.max(0),
        });
    }

    let reduction = match kind {
        DiscountKind::Fixed => value,
        DiscountKind::Percentage if value >= FULL_PERCENTAGE_VALUE => cart_total,
        DiscountKind::Percentage => percent_of_minor(&percentage_from_value(value)?, cart_total)?,
    };

    let unclamped = cart_total.saturating_sub(reduction);

    if unclamped < 0 {
        warn!(
            %kind,
            value,
            cart_total,
            "discount exceeds cart total; clamping to zero"
        );
    }

    let discounted_total = unclamped.max(0);

    debug!(%kind, value, cart_total, discounted_total, "applied discount");

    Ok(DiscountOutcome {
        kind,
        value,
        cart_total,
        discounted_total,
    })
}

/// Interpret a percentage value parsed as minor units (`"10.00"` -> 1000) as a [`Percentage`].
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the value cannot be represented as a decimal.
pub fn percentage_from_value(value: i64) -> Result<Percentage, DiscountError> {
    Decimal::try_new(value, PERCENT_VALUE_SCALE)
        .map(Percentage::from)
        .ok()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate the discount amount in minor units, rounded down, for a percentage of a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    // `Percentage` is a fraction (e.g. 0.10), so this is the share of `minor` taken off.
    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::ToNegativeInfinity)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
