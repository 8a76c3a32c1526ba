//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing lines.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Unit price × quantity does not fit in minor units.
    #[error("line total overflowed: {unit_price_minor} x {quantity}")]
    LineOverflow {
        /// Unit price in minor units
        unit_price_minor: i64,
        /// Quantity on the line
        quantity: u32,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One variant's contribution to the cart: unit price × quantity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a line from a unit price and quantity.
    pub fn new(unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Quantity on the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price × quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::LineOverflow`] if the product does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        let unit_price_minor = self.unit_price.to_minor_units();

        let total = unit_price_minor
            .checked_mul(i64::from(self.quantity))
            .ok_or(TotalPriceError::LineOverflow {
                unit_price_minor,
                quantity: self.quantity,
            })?;

        Ok(Money::from_minor(total, self.unit_price.currency()))
    }
}

/// Calculates the total price of a list of lines.
///
/// An empty list totals zero in `currency`.
///
/// # Errors
///
/// - [`TotalPriceError::LineOverflow`]: a line total does not fit in minor units.
/// - [`TotalPriceError::Money`]: a line is priced in a different currency.
pub fn total_price<'a>(
    lines: &[CartLine<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line.total()?)?)
        })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_total_multiplies_quantity() -> TestResult {
        let line = CartLine::new(Money::from_minor(250, iso::EUR), 3);

        assert_eq!(line.total()?, Money::from_minor(750, iso::EUR));

        Ok(())
    }

    #[test]
    fn zero_quantity_totals_zero() -> TestResult {
        let line = CartLine::new(Money::from_minor(250, iso::EUR), 0);

        assert_eq!(line.total()?, Money::from_minor(0, iso::EUR));

        Ok(())
    }

    #[test]
    fn line_total_overflow_errors() {
        let line = CartLine::new(Money::from_minor(i64::MAX, iso::EUR), 2);

        assert_eq!(
            line.total(),
            Err(TotalPriceError::LineOverflow {
                unit_price_minor: i64::MAX,
                quantity: 2,
            })
        );
    }

    #[test]
    fn test_total_price() -> TestResult {
        let lines = [
            CartLine::new(Money::from_minor(250, iso::EUR), 3),
            CartLine::new(Money::from_minor(100, iso::EUR), 2),
        ];

        assert_eq!(total_price(&lines, iso::EUR)?, Money::from_minor(950, iso::EUR));

        Ok(())
    }

    #[test]
    fn test_total_price_empty() -> TestResult {
        assert_eq!(total_price(&[], iso::EUR)?, Money::from_minor(0, iso::EUR));

        Ok(())
    }

    #[test]
    fn test_total_price_currency_mismatch() {
        let lines = [CartLine::new(Money::from_minor(100, iso::GBP), 1)];

        assert!(matches!(
            total_price(&lines, iso::EUR),
            Err(TotalPriceError::Money(_))
        ));
    }
}
