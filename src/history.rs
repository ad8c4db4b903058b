//! The ledger of saved invoices, newest first.

use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::{BillingError, Result};
use crate::model::{Charge, Invoice, ItemKind};

pub const CSV_HEADER: [&str; 6] = ["Date", "Host", "Reservation", "Total", "Currency", "Items"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Invoice>);

impl History {
    #[cfg(test)]
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self(invoices)
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Invoice> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New history with `invoice` in front; `self` is left untouched.
    pub fn append(&self, invoice: Invoice) -> History {
        let mut invoices = Vec::with_capacity(self.0.len() + 1);
        invoices.push(invoice);
        invoices.extend(self.0.iter().cloned());
        History(invoices)
    }

    /// New history without the entry at `index`.
    pub fn remove(&self, index: usize) -> Result<History> {
        if index >= self.0.len() {
            return Err(BillingError::HistoryIndexOutOfRange { index, len: self.0.len() });
        }
        let mut invoices = self.0.clone();
        invoices.remove(index);
        Ok(History(invoices))
    }

    /// Header row, then one row per invoice.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![CSV_HEADER.iter().map(|h| h.to_string()).collect()];
        for invoice in &self.0 {
            rows.push(vec![
                invoice.display_date.clone(),
                invoice.host_name.clone().unwrap_or_default(),
                invoice.reservation_number.clone().unwrap_or_default(),
                invoice.currency.amount_text(invoice.total),
                invoice.currency.symbol().to_string(),
                items_summary(&invoice.line_items),
            ]);
        }
        rows
    }

    /// Sum of saved totals per currency, in `Currency::ALL` order.
    pub fn totals_by_currency(&self) -> Vec<(Currency, Decimal)> {
        Currency::ALL
            .into_iter()
            .map(|c| {
                let sum = self
                    .0
                    .iter()
                    .filter(|i| i.currency == c)
                    .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.total));
                (c, sum)
            })
            .collect()
    }

    /// Invoices of `year` grouped by month (local time).
    pub fn monthly_summary(&self, year: i32) -> BTreeMap<u32, MonthSummary> {
        let mut months: BTreeMap<u32, MonthSummary> = BTreeMap::new();
        for invoice in &self.0 {
            let local = invoice.created_at.with_timezone(&Local);
            if local.year() != year {
                continue;
            }
            months.entry(local.month()).or_default().add(invoice);
        }
        months
    }
}

/// `Double room (2×), City tax, Welcome drink (gift)`
pub fn items_summary(lines: &[Charge]) -> String {
    lines
        .iter()
        .map(|line| match &line.kind {
            ItemKind::Gift { .. } => format!("{} (gift)", line.name),
            ItemKind::Standard { quantity } if *quantity > 0 => format!("{} ({}×)", line.name, quantity),
            _ => line.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthSummary {
    pub invoices: usize,
    pub czk: Decimal,
    pub eur: Decimal,
    pub discounts_czk: Decimal,
    pub discounts_eur: Decimal,
}

impl MonthSummary {
    fn add(&mut self, invoice: &Invoice) {
        self.invoices += 1;
        match invoice.currency {
            Currency::Czk => {
                self.czk = self.czk.saturating_add(invoice.total);
                self.discounts_czk = self.discounts_czk.saturating_add(invoice.discount_total);
            }
            Currency::Eur => {
                self.eur = self.eur.saturating_add(invoice.total);
                self.discounts_eur = self.discounts_eur.saturating_add(invoice.discount_total);
            }
        }
    }

    pub fn total_in(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Czk => self.czk,
            Currency::Eur => self.eur,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::ExchangeRate;
    use crate::model::Category;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn invoice(host: &str, currency: Currency, total: Decimal) -> Invoice {
        let mut room = Charge::standard("Double room", Category::Accommodation, Currency::Czk, dec!(1800));
        room.kind = ItemKind::Standard { quantity: 2 };
        let mut drink = Charge::gift("Welcome drink");
        drink.kind = ItemKind::Gift { selected: true };
        let mut tax = Charge::city_tax("City tax", Currency::Czk, dec!(50));
        tax.kind = ItemKind::CityTax { person_count: 2, night_count: 2 };

        Invoice {
            id: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(),
            display_date: "14.03.2026 13:00".into(),
            host_name: Some(host.into()),
            reservation_number: None,
            note: None,
            currency,
            exchange_rate_at_save: ExchangeRate::DEFAULT,
            total,
            discount_total: Decimal::ZERO,
            line_items: vec![room, tax, drink],
        }
    }

    // ==================== append / remove tests ====================

    #[test]
    fn test_append_prepends_without_mutating() {
        let h = History::new(vec![invoice("Old", Currency::Czk, dec!(100))]);
        let newer = invoice("New", Currency::Eur, dec!(20));
        let appended = h.append(newer.clone());

        assert_eq!(h.len(), 1);
        assert_eq!(appended.len(), 2);
        assert_eq!(appended.get(0), Some(&newer));
        assert_eq!(appended.get(1), h.get(0));
    }

    #[test]
    fn test_remove_after_append_is_identity() {
        let histories = vec![
            History::default(),
            History::new(vec![invoice("A", Currency::Czk, dec!(1))]),
            History::new(vec![invoice("A", Currency::Czk, dec!(1)), invoice("B", Currency::Eur, dec!(2))]),
        ];
        for h in histories {
            let round_trip = h.append(invoice("X", Currency::Eur, dec!(9))).remove(0).unwrap();
            assert_eq!(round_trip, h);
        }
    }

    #[test]
    fn test_remove_out_of_range_is_rejected() {
        let h = History::new(vec![invoice("A", Currency::Czk, dec!(1))]);
        match h.remove(1) {
            Err(BillingError::HistoryIndexOutOfRange { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(History::default().remove(0).is_err());
    }

    #[test]
    fn test_remove_takes_the_right_entry() {
        let h = History::new(vec![
            invoice("A", Currency::Czk, dec!(1)),
            invoice("B", Currency::Czk, dec!(2)),
            invoice("C", Currency::Czk, dec!(3)),
        ]);
        let removed = h.remove(1).unwrap();
        let hosts: Vec<_> = removed.invoices().iter().map(|i| i.host_name.clone().unwrap()).collect();
        assert_eq!(hosts, vec!["A", "C"]);
    }

    // ==================== csv_rows tests ====================

    #[test]
    fn test_csv_rows_layout() {
        let h = History::new(vec![invoice("Novák", Currency::Eur, dec!(150))]);
        let rows = h.csv_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CSV_HEADER.map(String::from).to_vec());
        assert_eq!(
            rows[1],
            vec![
                "14.03.2026 13:00".to_string(),
                "Novák".to_string(),
                String::new(),
                "150.00".to_string(),
                "€".to_string(),
                "Double room (2×), City tax, Welcome drink (gift)".to_string(),
            ]
        );
    }

    #[test]
    fn test_history_json_round_trip() {
        let h = History::new(vec![invoice("A", Currency::Czk, dec!(3700)), invoice("B", Currency::Eur, dec!(12.5))]);
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.starts_with('['));
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    // ==================== summary tests ====================

    #[test]
    fn test_monthly_summary_groups_by_month_and_currency() {
        let mut april = invoice("C", Currency::Czk, dec!(500));
        april.created_at = Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap();
        let mut last_year = invoice("D", Currency::Czk, dec!(999));
        last_year.created_at = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let h = History::new(vec![
            april,
            invoice("A", Currency::Czk, dec!(1000)),
            invoice("B", Currency::Eur, dec!(40)),
            last_year,
        ]);
        let summary = h.monthly_summary(2026);

        assert_eq!(summary.len(), 2);
        let march = &summary[&3];
        assert_eq!(march.invoices, 2);
        assert_eq!(march.total_in(Currency::Czk), dec!(1000));
        assert_eq!(march.total_in(Currency::Eur), dec!(40));
        assert_eq!(summary[&4].czk, dec!(500));
    }

    #[test]
    fn test_totals_by_currency() {
        let h = History::new(vec![
            invoice("A", Currency::Czk, dec!(1000)),
            invoice("B", Currency::Eur, dec!(40.5)),
            invoice("C", Currency::Czk, dec!(250)),
        ]);
        assert_eq!(h.totals_by_currency(), vec![(Currency::Czk, dec!(1250)), (Currency::Eur, dec!(40.5))]);
    }

    #[test]
    fn test_sums_saturate_instead_of_overflowing() {
        let h = History::new(vec![
            invoice("A", Currency::Czk, Decimal::MAX),
            invoice("B", Currency::Czk, Decimal::MAX),
        ]);
        assert_eq!(h.totals_by_currency()[0], (Currency::Czk, Decimal::MAX));
        assert_eq!(h.monthly_summary(2026)[&3].czk, Decimal::MAX);
    }
}
