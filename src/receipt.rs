//! Receipt
//!
//! Priced summary of an order draft, rendered as a table.

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    discounts::{DiscountError, DiscountKind, DiscountOutcome},
    money::{format_minor_units, format_money},
    orders::OrderDraft,
    pricing::{CartLine, TotalPriceError, total_price},
    products::{Catalog, VariantId},
};

/// Errors that can occur when building or writing a summary.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A draft line refers to a variant missing from the catalog.
    #[error("Variant {0} is not in the catalog")]
    UnknownVariant(VariantId),

    /// Error pricing the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Error totalling the priced lines.
    #[error(transparent)]
    Total(#[from] TotalPriceError),

    /// Error applying the discount.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Error writing the summary.
    #[error("Failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// One priced row of the summary.
#[derive(Debug, Clone)]
pub struct SummaryLine<'a> {
    /// Product name
    pub name: String,

    /// Variant SKU
    pub sku: String,

    /// Quantity ordered
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Unit price × quantity
    pub total: Money<'a, Currency>,
}

/// Priced order draft.
#[derive(Debug, Clone)]
pub struct OrderSummary<'a> {
    lines: SmallVec<[SummaryLine<'a>; 10]>,
    discount: DiscountOutcome,
    currency: &'a Currency,
}

impl<'a> OrderSummary<'a> {
    /// Price every ordered line of a draft and apply its discount.
    ///
    /// Lines with a zero quantity are left out.
    ///
    /// # Errors
    ///
    /// - [`ReceiptError::UnknownVariant`]: a line is not in the catalog.
    /// - [`ReceiptError::Cart`]: a unit price is invalid or a total overflows.
    /// - [`ReceiptError::Total`]: the subtotal overflows.
    /// - [`ReceiptError::Discount`]: the discount value is invalid.
    pub fn price(
        cart: &mut Cart<'a>,
        catalog: &Catalog,
        draft: &OrderDraft,
    ) -> Result<Self, ReceiptError> {
        let ordered = draft.ordered_lines();

        let entries = ordered
            .iter()
            .map(|line| {
                catalog
                    .variant(line.variant)
                    .map(|(product, variant)| (product, variant, line.quantity))
                    .ok_or(ReceiptError::UnknownVariant(line.variant))
            })
            .collect::<Result<SmallVec<[_; 10]>, _>>()?;

        let priced = cart.price_lines(
            entries
                .iter()
                .map(|(_, variant, quantity)| (*variant, *quantity)),
        )?;

        let cart_lines: SmallVec<[CartLine<'a>; 10]> =
            priced.iter().map(|price| *price.line()).collect();
        let subtotal = total_price(&cart_lines, cart.currency())?;

        let lines = entries
            .iter()
            .zip(priced)
            .map(|((product, variant, quantity), price)| SummaryLine {
                name: product.name.clone(),
                sku: variant.sku.clone(),
                quantity: *quantity,
                unit_price: *price.line().unit_price(),
                total: price.total(),
            })
            .collect();

        let discount = draft.discount.apply(&subtotal)?;

        Ok(Self {
            lines,
            discount,
            currency: cart.currency(),
        })
    }

    /// Priced lines
    pub fn lines(&self) -> &[SummaryLine<'a>] {
        &self.lines
    }

    /// Total before the discount
    pub fn subtotal(&self) -> Money<'a, Currency> {
        Money::from_minor(self.discount.cart_total(), self.currency)
    }

    /// Total after the discount
    pub fn total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.discount.discounted_total(), self.currency)
    }

    /// Amount the discount took off
    pub fn savings(&self) -> Money<'a, Currency> {
        Money::from_minor(self.discount.savings(), self.currency)
    }

    /// The applied discount
    pub fn discount(&self) -> &DiscountOutcome {
        &self.discount
    }

    /// Writes the summary table and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "SKU", "Qty", "Unit Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.sku.clone(),
                line.quantity.to_string(),
                format_money(&line.unit_price),
                format_money(&line.total),
            ]);
        }

        let mut table = builder.build();

        table
            .with(Style::modern_rounded())
            .modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}")?;
        writeln!(out, " Subtotal: {}", format_money(&self.subtotal()))?;
        writeln!(out, " Discount: {}", self.discount_label())?;
        writeln!(out, " Total:    {}", format_money(&self.total()))?;

        Ok(())
    }

    fn discount_label(&self) -> String {
        let savings = format_money(&self.savings());

        match self.discount.kind() {
            DiscountKind::Fixed => format!("-{savings}"),
            DiscountKind::Percentage => format!(
                "-{savings} ({}%)",
                format_minor_units(self.discount.value())
            ),
        }
    }
}
