//! Line pricing and invoice totals.
//!
//! Pure functions over line items - no storage access, no clock. Safe to call on
//! every edit.

use rust_decimal::Decimal;
use tracing::warn;

use crate::currency::{convert, Currency, ExchangeRate};
use crate::model::{Charge, InvoiceSettings, ItemKind};

/// Totals in the display currency. `discount_total` is already subtracted from `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: Decimal,
    pub discount_total: Decimal,
}

/// Pre-discount amount of a line in `display` currency, `None` for gifts.
///
/// A line whose amount does not fit in a `Decimal` is treated like invalid input and
/// counts as zero.
pub fn gross_of(charge: &Charge, display: Currency, rate: ExchangeRate) -> Option<Decimal> {
    let base = match &charge.kind {
        ItemKind::Standard { quantity } => Decimal::from(*quantity).checked_mul(charge.unit_price),
        ItemKind::CityTax { person_count, night_count } => Decimal::from(*person_count)
            .checked_mul(Decimal::from(*night_count))
            .and_then(|nights| nights.checked_mul(charge.unit_price)),
        ItemKind::Manual { amount } => Some(*amount),
        ItemKind::Gift { .. } => return None,
    };
    let gross = base.and_then(|base| convert(base, charge.currency, display, rate));
    Some(gross.unwrap_or_else(|| {
        warn!("Amount of '{}' is out of range, counting it as zero", charge.name);
        Decimal::ZERO
    }))
}

/// Discount actually applied to a line: converted like the price and capped at the gross
/// amount so a line never goes negative.
pub fn discount_of(charge: &Charge, display: Currency, rate: ExchangeRate) -> Decimal {
    match gross_of(charge, display, rate) {
        Some(gross) if charge.discount > Decimal::ZERO => {
            // too large to convert means larger than any gross
            convert(charge.discount, charge.currency, display, rate).map_or(gross, |d| d.min(gross))
        }
        _ => Decimal::ZERO,
    }
}

/// Price of a line after its discount, `None` for gifts.
pub fn price_of(charge: &Charge, display: Currency, rate: ExchangeRate) -> Option<Decimal> {
    gross_of(charge, display, rate).map(|gross| gross - discount_of(charge, display, rate))
}

pub fn compute_totals<'a, I>(charges: I, settings: &InvoiceSettings, rate: ExchangeRate) -> Totals
where
    I: IntoIterator<Item = &'a Charge>,
{
    totals_in(charges, settings.display_currency, rate)
}

pub fn totals_in<'a, I>(charges: I, display: Currency, rate: ExchangeRate) -> Totals
where
    I: IntoIterator<Item = &'a Charge>,
{
    charges
        .into_iter()
        .filter(|c| c.is_active())
        .fold(Totals::default(), |acc, charge| Totals {
            total: acc.total.saturating_add(price_of(charge, display, rate).unwrap_or_default()),
            discount_total: acc.discount_total.saturating_add(discount_of(charge, display, rate)),
        })
}
