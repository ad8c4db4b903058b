//! Currency conversion between Kč and €.
//!
//! Every amount shown anywhere (live view, CSV, printable document) is converted
//! through [`convert`], so the rounding rules below exist in exactly one place:
//!
//! * Kč → € rounds to two decimals
//! * € → Kč rounds to whole crowns
//! * midpoints round away from zero (half-up for the non-negative amounts we bill)
//! * a result too large for `Decimal` is `None`, never a panic

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "Kč")]
    Czk,
    #[serde(rename = "€")]
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Czk, Currency::Eur];

    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Czk => "Kč",
            Currency::Eur => "€",
        }
    }

    /// Fraction digits kept after conversion into this currency.
    pub const fn decimals(self) -> u32 {
        match self {
            Currency::Czk => 0,
            Currency::Eur => 2,
        }
    }

    pub fn round(self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimals(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// The bare number at this currency's precision: `8.00`, `375`.
    pub fn amount_text(self, amount: Decimal) -> String {
        let mut rounded = self.round(amount);
        rounded.rescale(self.decimals());
        rounded.to_string()
    }

    /// `8.00 €`, `375 Kč`
    pub fn format(self, amount: Decimal) -> String {
        format!("{} {}", self.amount_text(amount), self.symbol())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Currency {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kč" | "kc" | "czk" => Ok(Currency::Czk),
            "€" | "eur" | "euro" => Ok(Currency::Eur),
            other => Err(BillingError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Crowns per euro. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    pub const DEFAULT: ExchangeRate = ExchangeRate(dec!(25));

    pub fn new(value: Decimal) -> Result<Self, BillingError> {
        if value <= Decimal::ZERO {
            return Err(BillingError::InvalidRate(value));
        }
        Ok(ExchangeRate(value))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<Decimal> for ExchangeRate {
    type Error = BillingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        ExchangeRate::new(value)
    }
}

impl From<ExchangeRate> for Decimal {
    fn from(rate: ExchangeRate) -> Self {
        rate.0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Kč/€", self.0.normalize())
    }
}

pub fn convert(amount: Decimal, from: Currency, to: Currency, rate: ExchangeRate) -> Option<Decimal> {
    if from == to {
        return Some(amount);
    }
    let converted = match to {
        Currency::Eur => amount.checked_div(rate.value()),
        Currency::Czk => amount.checked_mul(rate.value()),
    };
    converted.map(|value| to.round(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: Decimal) -> ExchangeRate {
        ExchangeRate::new(value).unwrap()
    }

    // ==================== convert tests ====================

    #[test]
    fn test_convert_czk_to_eur_two_decimals() {
        assert_eq!(convert(dec!(200), Currency::Czk, Currency::Eur, rate(dec!(25))), Some(dec!(8)));
        assert_eq!(convert(dec!(100), Currency::Czk, Currency::Eur, rate(dec!(24.5))), Some(dec!(4.08)));
        assert_eq!(convert(dec!(1), Currency::Czk, Currency::Eur, rate(dec!(3))), Some(dec!(0.33)));
    }

    #[test]
    fn test_convert_eur_to_czk_whole_units() {
        assert_eq!(convert(dec!(15), Currency::Eur, Currency::Czk, rate(dec!(25))), Some(dec!(375)));
        assert_eq!(convert(dec!(9.99), Currency::Eur, Currency::Czk, rate(dec!(24.7))), Some(dec!(247)));
    }

    #[test]
    fn test_convert_rounds_half_up() {
        // 0.5 Kč lands exactly on the midpoint
        assert_eq!(convert(dec!(0.02), Currency::Eur, Currency::Czk, rate(dec!(25))), Some(dec!(1)));
        // 0.125 € lands exactly on the midpoint
        assert_eq!(convert(dec!(3.125), Currency::Czk, Currency::Eur, rate(dec!(25))), Some(dec!(0.13)));
        assert_eq!(convert(dec!(2.5), Currency::Eur, Currency::Czk, rate(dec!(1))), Some(dec!(3)));
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        for amount in [dec!(0), dec!(1.005), dec!(123.456), dec!(99999)] {
            for r in [dec!(0.5), dec!(25), dec!(31.17)] {
                for currency in Currency::ALL {
                    assert_eq!(convert(amount, currency, currency, rate(r)), Some(amount));
                }
            }
        }
    }

    #[test]
    fn test_convert_round_trip_drift_is_bounded() {
        let r = rate(dec!(24.7));
        for crowns in (0..5000).step_by(7) {
            let amount = Decimal::from(crowns);
            let euros = convert(amount, Currency::Czk, Currency::Eur, r).unwrap();
            let back = convert(euros, Currency::Eur, Currency::Czk, r).unwrap();
            assert!((back - amount).abs() <= dec!(1), "{amount} came back as {back}");
        }
    }

    #[test]
    fn test_convert_out_of_range_is_none() {
        let tiny = rate(dec!(0.0000000000000000000000000001));
        assert_eq!(convert(Decimal::MAX, Currency::Czk, Currency::Eur, tiny), None);
        assert_eq!(convert(Decimal::MAX, Currency::Eur, Currency::Czk, rate(dec!(25))), None);
        assert_eq!(convert(Decimal::MAX, Currency::Eur, Currency::Eur, rate(dec!(25))), Some(Decimal::MAX));
    }

    // ==================== rate tests ====================

    #[test]
    fn test_rate_rejects_non_positive() {
        assert!(matches!(ExchangeRate::new(dec!(0)), Err(BillingError::InvalidRate(_))));
        assert!(matches!(ExchangeRate::new(dec!(-3)), Err(BillingError::InvalidRate(_))));
        assert!(ExchangeRate::new(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_rate_deserialization_validates() {
        let ok: ExchangeRate = serde_json::from_str("\"24.35\"").unwrap();
        assert_eq!(ok.value(), dec!(24.35));
        assert!(serde_json::from_str::<ExchangeRate>("\"0\"").is_err());
        assert!(serde_json::from_str::<ExchangeRate>("-1").is_err());
    }

    // ==================== formatting tests ====================

    #[test]
    fn test_format_uses_currency_precision() {
        assert_eq!(Currency::Eur.format(dec!(8)), "8.00 €");
        assert_eq!(Currency::Eur.format(dec!(12.345)), "12.35 €");
        assert_eq!(Currency::Czk.format(dec!(375)), "375 Kč");
        assert_eq!(Currency::Czk.format(dec!(374.5)), "375 Kč");
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("kc".parse::<Currency>().unwrap(), Currency::Czk);
        assert_eq!(" Kč ".parse::<Currency>().unwrap(), Currency::Czk);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!("€".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("usd".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Currency::Czk).unwrap(), "\"Kč\"");
        assert_eq!(serde_json::from_str::<Currency>("\"€\"").unwrap(), Currency::Eur);
    }
}
