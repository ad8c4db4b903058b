//! The single owner of the mutable billing state.
//!
//! Every mutation goes through here and is persisted immediately; pricing, totals and
//! history operations stay pure and are only called from this layer.

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::currency::{Currency, ExchangeRate};
use crate::error::{BillingError, Result};
use crate::export::InvoiceDocument;
use crate::history::History;
use crate::model::{default_items, Charge, Invoice, InvoiceSettings, ItemKind, LineItem, Theme};
use crate::pricing::{compute_totals, Totals};
use crate::store::{self, KeyValueStore, StoreKey};

pub struct Workspace<S: KeyValueStore> {
    store: S,
    rate: ExchangeRate,
    items: Vec<LineItem>,
    history: History,
    settings: InvoiceSettings,
    theme: Theme,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Hydrates every slice from `store`, falling back to defaults.
    pub fn open(store: S) -> Self {
        let rate = store::load(&store, StoreKey::ExchangeRate, ExchangeRate::DEFAULT);
        let items = store::load(&store, StoreKey::LineItems, default_items());
        let history = store::load(&store, StoreKey::History, History::default());
        let settings = store::load(&store, StoreKey::Settings, InvoiceSettings::default());
        let theme = store::load(&store, StoreKey::Theme, Theme::default());
        debug!("Workspace opened: {} items, {} saved invoices", items.len(), history.len());

        Self { store, rate, items, history, settings, theme }
    }

    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn rate(&self) -> ExchangeRate {
        self.rate
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &InvoiceSettings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn persist<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        if store::save(&self.store, key, value) {
            Ok(())
        } else {
            Err(BillingError::Persist(key.name()))
        }
    }

    // ==========================================
    // Rate & settings
    // ==========================================

    pub fn set_rate(&mut self, rate: ExchangeRate) -> Result<()> {
        let previous = std::mem::replace(&mut self.rate, rate);
        if let Err(e) = self.persist(StoreKey::ExchangeRate, &self.rate) {
            self.rate = previous;
            return Err(e);
        }
        debug!("Exchange rate set to {}", rate);
        Ok(())
    }

    /// Applies `update` to the settings and persists them; on failure the old settings stay.
    fn update_settings<F: FnOnce(&mut InvoiceSettings)>(&mut self, update: F) -> Result<()> {
        let previous = self.settings.clone();
        update(&mut self.settings);
        if let Err(e) = self.persist(StoreKey::Settings, &self.settings) {
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_display_currency(&mut self, currency: Currency) -> Result<()> {
        self.update_settings(|s| s.display_currency = currency)
    }

    pub fn set_host_name(&mut self, host_name: Option<String>) -> Result<()> {
        self.update_settings(|s| s.host_name = non_blank(host_name))
    }

    pub fn set_reservation_number(&mut self, reservation_number: Option<String>) -> Result<()> {
        self.update_settings(|s| s.reservation_number = non_blank(reservation_number))
    }

    pub fn set_note(&mut self, note: Option<String>) -> Result<()> {
        self.update_settings(|s| s.note = non_blank(note))
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        let previous = std::mem::replace(&mut self.theme, theme);
        if let Err(e) = self.persist(StoreKey::Theme, &self.theme) {
            self.theme = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled())?;
        Ok(self.theme)
    }

    // ==========================================
    // Line item edits
    // ==========================================

    /// Persists the item list, or puts `previous` back when that fails.
    fn commit_items(&mut self, previous: Vec<LineItem>) -> Result<()> {
        if let Err(e) = self.persist(StoreKey::LineItems, &self.items) {
            self.items = previous;
            return Err(e);
        }
        Ok(())
    }

    fn edit_item<F>(&mut self, index: usize, edit: F) -> Result<()>
    where
        F: FnOnce(&mut LineItem) -> Result<()>,
    {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(BillingError::ItemIndexOutOfRange { index, len })?;
        let previous = item.clone();
        edit(item)?;
        debug!("Edited item {} ('{}')", index, item.charge.name);

        if let Err(e) = self.persist(StoreKey::LineItems, &self.items) {
            self.items[index] = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<()> {
        self.edit_item(index, |item| match &mut item.charge.kind {
            ItemKind::Standard { quantity: q } => {
                *q = quantity;
                Ok(())
            }
            _ => Err(kind_mismatch(item, "quantity")),
        })
    }

    pub fn set_city_tax(&mut self, index: usize, person_count: u32, night_count: u32) -> Result<()> {
        self.edit_item(index, |item| match &mut item.charge.kind {
            ItemKind::CityTax { person_count: p, night_count: n } => {
                *p = person_count;
                *n = night_count;
                Ok(())
            }
            _ => Err(kind_mismatch(item, "city tax")),
        })
    }

    pub fn set_amount(&mut self, index: usize, amount: Decimal) -> Result<()> {
        self.edit_item(index, |item| match &mut item.charge.kind {
            ItemKind::Manual { amount: a } => {
                *a = amount.max(Decimal::ZERO);
                Ok(())
            }
            _ => Err(kind_mismatch(item, "manual amount")),
        })
    }

    pub fn set_gift(&mut self, index: usize, selected: bool) -> Result<()> {
        self.edit_item(index, |item| match &mut item.charge.kind {
            ItemKind::Gift { selected: s } => {
                *s = selected;
                Ok(())
            }
            _ => Err(kind_mismatch(item, "gift")),
        })
    }

    pub fn set_discount(&mut self, index: usize, discount: Decimal) -> Result<()> {
        self.edit_item(index, |item| {
            if item.charge.is_gift() {
                return Err(kind_mismatch(item, "priced"));
            }
            item.charge.discount = discount.max(Decimal::ZERO);
            Ok(())
        })
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Decimal) -> Result<()> {
        self.edit_item(index, |item| {
            if !matches!(item.charge.kind, ItemKind::Standard { .. } | ItemKind::CityTax { .. }) {
                return Err(kind_mismatch(item, "unit priced"));
            }
            item.charge.unit_price = unit_price.max(Decimal::ZERO);
            Ok(())
        })
    }

    pub fn set_item_note(&mut self, index: usize, note: Option<String>) -> Result<()> {
        self.edit_item(index, |item| {
            item.charge.note = non_blank(note);
            Ok(())
        })
    }

    pub fn set_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        self.edit_item(index, |item| {
            item.hidden = hidden;
            Ok(())
        })
    }

    /// Appends a new, unselected gift and returns its position.
    pub fn add_gift(&mut self, name: &str) -> Result<usize> {
        self.add_item(Charge::gift(name))
    }

    pub fn add_item(&mut self, mut charge: Charge) -> Result<usize> {
        charge.name = charge.name.trim().to_string();
        if charge.name.is_empty() {
            return Err(BillingError::EmptyName);
        }
        let previous = self.items.clone();
        self.items.push(LineItem::new(charge));
        self.commit_items(previous)?;
        Ok(self.items.len() - 1)
    }

    /// Removes a user-added item. Catalogue items can only be hidden.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem> {
        let item = self
            .items
            .get(index)
            .ok_or(BillingError::ItemIndexOutOfRange { index, len: self.items.len() })?;
        if item.fixed {
            return Err(BillingError::FixedItem(item.charge.name.clone()));
        }
        let previous = self.items.clone();
        let removed = self.items.remove(index);
        self.commit_items(previous)?;
        Ok(removed)
    }

    pub fn reset_items(&mut self) -> Result<()> {
        let previous = self.items.clone();
        self.items.iter_mut().for_each(LineItem::reset);
        self.commit_items(previous)?;
        debug!("Line items reset");
        Ok(())
    }

    // ==========================================
    // Views
    // ==========================================

    fn visible_charges(&self) -> impl Iterator<Item = &Charge> {
        self.items.iter().filter(|i| !i.hidden).map(|i| &i.charge)
    }

    pub fn totals(&self) -> Totals {
        compute_totals(self.visible_charges(), &self.settings, self.rate)
    }

    /// Visible lines that currently add money to the bill.
    pub fn active_items(&self) -> Vec<(usize, &LineItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.hidden && i.charge.is_active())
            .collect()
    }

    /// Positions and items that would be printed on the bill right now.
    pub fn included_items(&self) -> Vec<(usize, &LineItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.hidden && i.charge.is_included())
            .collect()
    }

    pub fn document(&self, now: DateTime<Local>) -> InvoiceDocument {
        InvoiceDocument::from_live(&self.items, &self.settings, self.rate, now)
    }

    // ==========================================
    // History
    // ==========================================

    pub fn save_invoice(&mut self) -> Result<&Invoice> {
        self.save_invoice_at(Local::now())
    }

    /// Freezes the current bill into the history and clears the working items.
    ///
    /// The history is written first: if that fails nothing changes, in memory or on disk.
    pub fn save_invoice_at(&mut self, now: DateTime<Local>) -> Result<&Invoice> {
        let line_items: Vec<Charge> = self
            .included_items()
            .into_iter()
            .map(|(_, item)| item.snapshot())
            .collect();
        if line_items.is_empty() {
            return Err(BillingError::NoActiveItems);
        }

        let totals = self.totals();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            created_at: now.with_timezone(&Utc),
            display_date: now.format("%d.%m.%Y %H:%M").to_string(),
            host_name: self.settings.host_name.clone(),
            reservation_number: self.settings.reservation_number.clone(),
            note: self.settings.note.clone(),
            currency: self.settings.display_currency,
            exchange_rate_at_save: self.rate,
            total: totals.total,
            discount_total: totals.discount_total,
            line_items,
        };
        info!(
            "Saving invoice {} ({} lines, {})",
            invoice.id,
            invoice.line_items.len(),
            invoice.currency.format(invoice.total)
        );

        let appended = self.history.append(invoice);
        let previous = std::mem::replace(&mut self.history, appended);
        if let Err(e) = self.persist(StoreKey::History, &self.history) {
            self.history = previous;
            return Err(e);
        }
        // the invoice is safe at this point; a failed reset only leaves the bill filled in
        if let Err(e) = self.reset_items() {
            warn!("Invoice saved but the bill could not be cleared: {}", e);
        }

        Ok(&self.history.invoices()[0])
    }

    pub fn delete_invoice(&mut self, index: usize) -> Result<Invoice> {
        let removed = self
            .history
            .get(index)
            .cloned()
            .ok_or(BillingError::HistoryIndexOutOfRange { index, len: self.history.len() })?;
        let remaining = self.history.remove(index)?;
        self.persist(StoreKey::History, &remaining)?;
        self.history = remaining;
        info!("Deleted invoice {}", removed.id);
        Ok(removed)
    }
}

fn kind_mismatch(item: &LineItem, expected: &'static str) -> BillingError {
    BillingError::ItemKindMismatch { name: item.charge.name.clone(), expected }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
