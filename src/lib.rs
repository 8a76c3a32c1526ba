//! Tally
//!
//! Tally is the pricing engine behind a dashboard order form: decimal price strings to
//! integer minor units and back, line totals accumulated into a cart total, and fixed or
//! percentage order discounts that never take the total below zero.

pub mod cart;
pub mod config;
pub mod discounts;
pub mod fixtures;
pub mod money;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
