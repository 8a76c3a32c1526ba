//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, LinePrice},
    discounts::{
        DiscountError, DiscountKind, DiscountOutcome, OrderDiscount, calculate_discount,
        format_discounted_total,
    },
    fixtures::{Fixture, FixtureError},
    money::{
        AmountError, DEFAULT_CURRENCY, format_minor_units, format_money, parse_minor_units,
        parse_money,
    },
    orders::{DraftLine, OrderDraft, OrderSubmission, SubmissionOutcome},
    pricing::{CartLine, TotalPriceError, total_price},
    products::{Catalog, CatalogError, CategoryId, Product, Variant, VariantId},
    receipt::{OrderSummary, ReceiptError},
};
