//! Money
//!
//! Conversion between the two-fraction-digit decimal strings used by the order
//! form and integer minor units (cents).

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency used when a caller does not name one.
pub const DEFAULT_CURRENCY: &Currency = iso::EUR;

/// Separator between the major and minor parts of a decimal string.
pub const SEPARATOR: char = '.';

/// Number of minor units in one major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// Errors produced while parsing a decimal amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input was empty (or only whitespace).
    #[error("amount is empty")]
    Empty,

    /// The input contained more than one decimal separator.
    #[error("amount {0:?} has more than one decimal separator")]
    MultipleSeparators(String),

    /// Nothing preceded the decimal separator.
    #[error("amount {0:?} has no integer digits")]
    MissingIntegerPart(String),

    /// More than two digits followed the decimal separator.
    #[error("amount {0:?} has more than two fraction digits")]
    TooManyFractionDigits(String),

    /// A sign, letter or other non-digit character was present.
    #[error("amount {0:?} contains a non-digit character")]
    InvalidDigit(String),

    /// The value does not fit in `i64` minor units.
    #[error("amount {0:?} is too large")]
    Overflow(String),
}

/// Parse a decimal string with zero, one or two fraction digits into minor units.
///
/// `"12"` is read as `12.00`, `"1.5"` as `1.50`. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns an [`AmountError`] if the input is empty, signed, contains anything
/// other than digits and a single separator, has more than two fraction digits,
/// or overflows `i64`.
pub fn parse_minor_units(input: &str) -> Result<i64, AmountError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (integer, fraction) = match trimmed.split_once(SEPARATOR) {
        Some((_, fraction)) if fraction.contains(SEPARATOR) => {
            return Err(AmountError::MultipleSeparators(trimmed.to_owned()));
        }
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    if integer.is_empty() {
        return Err(AmountError::MissingIntegerPart(trimmed.to_owned()));
    }

    if fraction.len() > 2 {
        return Err(AmountError::TooManyFractionDigits(trimmed.to_owned()));
    }

    if !integer
        .bytes()
        .chain(fraction.bytes())
        .all(|byte| byte.is_ascii_digit())
    {
        return Err(AmountError::InvalidDigit(trimmed.to_owned()));
    }

    // Right-pad so "5" reads as fifty minor units and "" as zero.
    let fraction = format!("{fraction:0<2}");

    integer
        .parse::<i64>()
        .ok()
        .and_then(|major| major.checked_mul(MINOR_PER_MAJOR))
        .zip(fraction.parse::<i64>().ok())
        .and_then(|(major, minor)| major.checked_add(minor))
        .ok_or_else(|| AmountError::Overflow(trimmed.to_owned()))
}

/// Like [`parse_minor_units`], but blank input counts as zero.
///
/// Form fields that have not been filled in yet are treated as "no amount".
///
/// # Errors
///
/// Returns an [`AmountError`] for any non-blank input [`parse_minor_units`] rejects.
pub fn parse_optional_minor_units(input: &str) -> Result<i64, AmountError> {
    if input.trim().is_empty() {
        Ok(0)
    } else {
        parse_minor_units(input)
    }
}

/// Render minor units as a decimal string with exactly two fraction digits.
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let magnitude = minor.unsigned_abs();
    let per_major = MINOR_PER_MAJOR.unsigned_abs();

    format!(
        "{sign}{}{SEPARATOR}{:02}",
        magnitude / per_major,
        magnitude % per_major
    )
}

/// Parse a decimal string into [`Money`] in the given currency.
///
/// # Errors
///
/// Returns an [`AmountError`] if the string is not a valid decimal amount.
pub fn parse_money<'a>(
    input: &str,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, AmountError> {
    Ok(Money::from_minor(parse_minor_units(input)?, currency))
}

/// Render [`Money`] as a plain decimal string, without a currency symbol.
pub fn format_money(money: &Money<'_, Currency>) -> String {
    format_minor_units(money.to_minor_units())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_two_fraction_digits() -> TestResult {
        assert_eq!(parse_minor_units("12.34")?, 1234);
        assert_eq!(parse_minor_units("0.05")?, 5);

        Ok(())
    }

    #[test]
    fn pads_single_fraction_digit() -> TestResult {
        assert_eq!(parse_minor_units("1.5")?, 150);

        Ok(())
    }

    #[test]
    fn integer_input_has_no_fraction() -> TestResult {
        assert_eq!(parse_minor_units("12")?, 1200);
        assert_eq!(parse_minor_units("12.")?, 1200);
        assert_eq!(parse_minor_units("0")?, 0);

        Ok(())
    }

    #[test]
    fn trims_whitespace() -> TestResult {
        assert_eq!(parse_minor_units("  2.50 ")?, 250);

        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_minor_units(""), Err(AmountError::Empty));
        assert_eq!(parse_minor_units("   "), Err(AmountError::Empty));
        assert_eq!(
            parse_minor_units("1.2.3"),
            Err(AmountError::MultipleSeparators("1.2.3".to_owned()))
        );
        assert_eq!(
            parse_minor_units(".5"),
            Err(AmountError::MissingIntegerPart(".5".to_owned()))
        );
        assert_eq!(
            parse_minor_units("1.234"),
            Err(AmountError::TooManyFractionDigits("1.234".to_owned()))
        );
        assert_eq!(
            parse_minor_units("-1.00"),
            Err(AmountError::InvalidDigit("-1.00".to_owned()))
        );
        assert_eq!(
            parse_minor_units("1,00"),
            Err(AmountError::InvalidDigit("1,00".to_owned()))
        );
    }

    #[test]
    fn rejects_overflow() {
        let input = "92233720368547758.08";

        assert_eq!(
            parse_minor_units(input),
            Err(AmountError::Overflow(input.to_owned()))
        );
    }

    #[test]
    fn parses_largest_amount() -> TestResult {
        assert_eq!(parse_minor_units("92233720368547758.07")?, i64::MAX);

        Ok(())
    }

    #[test]
    fn blank_optional_input_is_zero() -> TestResult {
        assert_eq!(parse_optional_minor_units("")?, 0);
        assert_eq!(parse_optional_minor_units(" ")?, 0);
        assert_eq!(parse_optional_minor_units("3.10")?, 310);
        assert!(parse_optional_minor_units("abc").is_err());

        Ok(())
    }

    #[test]
    fn formats_small_amounts() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(50), "0.50");
        assert_eq!(format_minor_units(100), "1.00");
        assert_eq!(format_minor_units(123_456), "1234.56");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_minor_units(-5), "-0.05");
        assert_eq!(format_minor_units(i64::MIN), "-92233720368547758.08");
    }

    #[test]
    fn round_trips_every_cent_below_one_hundred_units() -> TestResult {
        for minor in 0..10_000 {
            assert_eq!(
                parse_minor_units(&format_minor_units(minor))?,
                minor,
                "round trip failed for {minor}"
            );
        }

        Ok(())
    }

    #[test]
    fn formatting_normalises_parsed_input() -> TestResult {
        assert_eq!(format_minor_units(parse_minor_units("7")?), "7.00");
        assert_eq!(format_minor_units(parse_minor_units("7.5")?), "7.50");
        assert_eq!(format_minor_units(parse_minor_units("07.25")?), "7.25");

        Ok(())
    }

    #[test]
    fn money_helpers_use_currency() -> TestResult {
        let money = parse_money("2.50", DEFAULT_CURRENCY)?;

        assert_eq!(money, Money::from_minor(250, iso::EUR));
        assert_eq!(format_money(&money), "2.50");

        Ok(())
    }
}
