//! Cart
//!
//! Running total of the order form and the parsed unit prices behind it.
//!
//! Every call to [`Cart::line_price`] adds the line to the running total, so a
//! full pass over the cart must start from [`Cart::reset_total`].
//! [`Cart::price_lines`] does both in one call.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    money::{AmountError, format_minor_units, format_money, parse_minor_units},
    pricing::{CartLine, TotalPriceError},
    products::{Variant, VariantId},
};

/// Errors related to pricing the cart.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A variant's unit price could not be parsed.
    #[error("Variant {variant} has an invalid unit price: {source}")]
    UnitPrice {
        /// Variant whose price was rejected
        variant: VariantId,
        /// Parse failure
        #[source]
        source: AmountError,
    },

    /// A line total could not be computed.
    #[error("Variant {variant} could not be priced: {source}")]
    Line {
        /// Variant on the line
        variant: VariantId,
        /// Pricing failure
        #[source]
        source: TotalPriceError,
    },

    /// The running total does not fit in minor units.
    #[error("Cart total overflowed")]
    TotalOverflow,
}

/// The priced contribution of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrice<'a> {
    variant: VariantId,
    line: CartLine<'a>,
    total: Money<'a, Currency>,
}

impl<'a> LinePrice<'a> {
    /// Variant on the line
    pub fn variant(&self) -> VariantId {
        self.variant
    }

    /// Unit price × quantity
    pub fn line(&self) -> &CartLine<'a> {
        &self.line
    }

    /// Line total
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Line total as a decimal string
    pub fn formatted(&self) -> String {
        format_money(&self.total)
    }
}

/// Order form cart state.
#[derive(Debug)]
pub struct Cart<'a> {
    currency: &'a Currency,
    running_total: i64,
    unit_prices: FxHashMap<VariantId, i64>,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            currency,
            running_total: 0,
            unit_prices: FxHashMap::default(),
        }
    }

    /// Currency all lines are priced in.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Set the running total back to zero. Memoised unit prices are kept.
    pub fn reset_total(&mut self) {
        trace!(previous = self.running_total, "reset cart total");

        self.running_total = 0;
    }

    /// Price one line and add it to the running total.
    ///
    /// The unit price is parsed the first time a variant is seen and reused for
    /// every later call with the same variant, whatever `unit_price` is passed.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnitPrice`]: the unit price is not a valid decimal amount.
    /// - [`CartError::Line`]: unit price × quantity overflows.
    /// - [`CartError::TotalOverflow`]: the running total overflows.
    pub fn line_price(
        &mut self,
        variant: VariantId,
        unit_price: &str,
        quantity: u32,
    ) -> Result<LinePrice<'a>, CartError> {
        let unit_price_minor = self.unit_price_minor(variant, unit_price)?;
        let line = CartLine::new(Money::from_minor(unit_price_minor, self.currency), quantity);

        let total = line
            .total()
            .map_err(|source| CartError::Line { variant, source })?;

        self.running_total = self
            .running_total
            .checked_add(total.to_minor_units())
            .ok_or(CartError::TotalOverflow)?;

        trace!(
            %variant,
            quantity,
            line_total = total.to_minor_units(),
            running_total = self.running_total,
            "priced line"
        );

        Ok(LinePrice {
            variant,
            line,
            total,
        })
    }

    /// Reset the total, then price every `(variant, quantity)` pair.
    ///
    /// # Errors
    ///
    /// Returns the first [`CartError`] raised by [`Cart::line_price`]; the
    /// running total then only covers the lines priced before it.
    pub fn price_lines<'v>(
        &mut self,
        lines: impl IntoIterator<Item = (&'v Variant, u32)>,
    ) -> Result<SmallVec<[LinePrice<'a>; 10]>, CartError> {
        self.reset_total();

        let priced = lines
            .into_iter()
            .map(|(variant, quantity)| self.line_price(variant.id, &variant.unit_price, quantity))
            .collect::<Result<SmallVec<_>, _>>()?;

        debug!(
            lines = priced.len(),
            total = self.running_total,
            "priced cart"
        );

        Ok(priced)
    }

    /// Running total.
    pub fn total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.running_total, self.currency)
    }

    /// Running total as a decimal string, `"0.00"` when nothing has been added.
    pub fn total_decimal(&self) -> String {
        format_minor_units(self.running_total)
    }

    /// The memoised unit price of a variant, if it has been priced.
    pub fn unit_price(&self, variant: VariantId) -> Option<Money<'a, Currency>> {
        self.unit_prices
            .get(&variant)
            .map(|minor| Money::from_minor(*minor, self.currency))
    }

    /// Drop the memoised unit price of a variant that left the cart.
    ///
    /// Returns whether a price was memoised.
    pub fn forget_variant(&mut self, variant: VariantId) -> bool {
        self.unit_prices.remove(&variant).is_some()
    }

    fn unit_price_minor(&mut self, variant: VariantId, unit_price: &str) -> Result<i64, CartError> {
        if let Some(minor) = self.unit_prices.get(&variant) {
            return Ok(*minor);
        }

        let minor = parse_minor_units(unit_price)
            .map_err(|source| CartError::UnitPrice { variant, source })?;

        self.unit_prices.insert(variant, minor);

        Ok(minor)
    }
}
