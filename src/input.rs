//! Parsing of typed numbers. Anything unusable becomes zero so it can never reach the
//! totals as garbage.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::currency::ExchangeRate;
use crate::error::{BillingError, Result};

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\+?(\d{1,9})\s*$").unwrap());

// Accepts "12", "12.5", "12,50", " 1 800 " (space-grouped thousands)
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+?(\d{1,3}(?: \d{3})+|\d+)(?:[.,](\d+))?\s*$").unwrap());

pub fn parse_count(text: &str) -> u32 {
    COUNT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

pub fn parse_amount(text: &str) -> Decimal {
    parse_positive(text).unwrap_or(Decimal::ZERO)
}

pub fn parse_rate(text: &str) -> Result<ExchangeRate> {
    let value = parse_positive(text).unwrap_or(Decimal::ZERO);
    ExchangeRate::new(value).map_err(|_| BillingError::InvalidRate(value))
}

fn parse_positive(text: &str) -> Option<Decimal> {
    let caps = AMOUNT_RE.captures(text)?;
    let whole = caps[1].replace(' ', "");
    let literal = match caps.get(2) {
        Some(fraction) => format!("{}.{}", whole, fraction.as_str()),
        None => whole,
    };
    literal.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count(" 12 "), 12);
        assert_eq!(parse_count("+2"), 2);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-4"), 0);
        assert_eq!(parse_count("2.5"), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("99999999999"), 0);
    }

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("12"), dec!(12));
        assert_eq!(parse_amount("12.5"), dec!(12.5));
        assert_eq!(parse_amount("12,50"), dec!(12.50));
        assert_eq!(parse_amount(" 1 800 "), dec!(1800));
        assert_eq!(parse_amount("1 800,5"), dec!(1800.5));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("-15"), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
        assert_eq!(parse_amount("1e5"), Decimal::ZERO);
        assert_eq!(parse_amount("12..5"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("24,35").unwrap().value(), dec!(24.35));
        assert!(matches!(parse_rate("0"), Err(BillingError::InvalidRate(_))));
        assert!(parse_rate("abc").is_err());
    }
}
