use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{Currency, ExchangeRate};
use crate::error::BillingError;

// ==========================================
// Categories
// ==========================================

/// Sections of the bill, in display order. `Gifts` is always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accommodation,
    Refreshments,
    Wellness,
    Services,
    Fees,
    Gifts,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Accommodation,
        Category::Refreshments,
        Category::Wellness,
        Category::Services,
        Category::Fees,
        Category::Gifts,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Category::Accommodation => "Accommodation",
            Category::Refreshments => "Refreshments",
            Category::Wellness => "Wellness",
            Category::Services => "Services",
            Category::Fees => "Fees",
            Category::Gifts => "Gifts",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s.trim()))
    }
}

// ==========================================
// Line items
// ==========================================

/// What kind of line this is, carrying only the fields that kind uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Standard {
        #[serde(default)]
        quantity: u32,
    },
    CityTax {
        #[serde(default)]
        person_count: u32,
        #[serde(default)]
        night_count: u32,
    },
    Manual {
        #[serde(default)]
        amount: Decimal,
    },
    Gift {
        #[serde(default)]
        selected: bool,
    },
}

impl ItemKind {
    pub const fn label(&self) -> &'static str {
        match self {
            ItemKind::Standard { .. } => "quantity",
            ItemKind::CityTax { .. } => "city tax",
            ItemKind::Manual { .. } => "manual amount",
            ItemKind::Gift { .. } => "gift",
        }
    }
}

/// A chargeable line as it appears on a bill. Saved invoices keep plain copies of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Currency `unit_price`, `amount` and `discount` are denominated in.
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub kind: ItemKind,
}

impl Charge {
    pub fn standard(name: &str, category: Category, currency: Currency, unit_price: Decimal) -> Self {
        Self::with_kind(name, category, currency, unit_price, ItemKind::Standard { quantity: 0 })
    }

    /// `unit_price` is per person-night.
    pub fn city_tax(name: &str, currency: Currency, unit_price: Decimal) -> Self {
        Self::with_kind(
            name,
            Category::Fees,
            currency,
            unit_price,
            ItemKind::CityTax { person_count: 0, night_count: 0 },
        )
    }

    pub fn manual(name: &str, category: Category, currency: Currency) -> Self {
        Self::with_kind(name, category, currency, Decimal::ZERO, ItemKind::Manual { amount: Decimal::ZERO })
    }

    pub fn gift(name: &str) -> Self {
        Self::with_kind(name, Category::Gifts, Currency::default(), Decimal::ZERO, ItemKind::Gift { selected: false })
    }

    fn with_kind(name: &str, category: Category, currency: Currency, unit_price: Decimal, kind: ItemKind) -> Self {
        Self {
            name: name.to_string(),
            category,
            note: None,
            currency,
            unit_price,
            discount: Decimal::ZERO,
            kind,
        }
    }

    pub fn is_gift(&self) -> bool {
        matches!(self.kind, ItemKind::Gift { .. })
    }

    /// Whether the line contributes money to the total. Gifts never do.
    pub fn is_active(&self) -> bool {
        match &self.kind {
            ItemKind::Standard { quantity } => *quantity > 0,
            ItemKind::CityTax { person_count, night_count } => *person_count > 0 && *night_count > 0,
            ItemKind::Manual { amount } => *amount > Decimal::ZERO,
            ItemKind::Gift { .. } => false,
        }
    }

    /// Whether the line is printed on the bill: active priced lines and selected gifts.
    pub fn is_included(&self) -> bool {
        match &self.kind {
            ItemKind::Gift { selected } => *selected,
            _ => self.is_active(),
        }
    }
}

/// A line in the live working list. `fixed` and `hidden` are workspace-only flags and
/// never reach a saved invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub charge: Charge,
    /// Part of the default catalogue; cannot be removed, only hidden.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl LineItem {
    pub fn new(charge: Charge) -> Self {
        Self { charge, fixed: false, hidden: false }
    }

    pub fn catalogue(charge: Charge) -> Self {
        Self { charge, fixed: true, hidden: false }
    }

    /// Plain copy of the chargeable part, as stored in the history.
    pub fn snapshot(&self) -> Charge {
        self.charge.clone()
    }

    /// Clears everything entered for one stay, keeping name, category, price and notes.
    pub fn reset(&mut self) {
        self.charge.discount = Decimal::ZERO;
        self.charge.kind = match self.charge.kind {
            ItemKind::Standard { .. } => ItemKind::Standard { quantity: 0 },
            ItemKind::CityTax { .. } => ItemKind::CityTax { person_count: 0, night_count: 0 },
            ItemKind::Manual { .. } => ItemKind::Manual { amount: Decimal::ZERO },
            ItemKind::Gift { .. } => ItemKind::Gift { selected: false },
        };
    }
}

/// Items a fresh installation starts with.
pub fn default_items() -> Vec<LineItem> {
    use Category::*;
    use Currency::*;

    vec![
        LineItem::catalogue(Charge::standard("Double room", Accommodation, Czk, dec!(1800))),
        LineItem::catalogue(Charge::standard("Single room", Accommodation, Czk, dec!(1400))),
        LineItem::catalogue(Charge::standard("Extra bed", Accommodation, Czk, dec!(400))),
        LineItem::catalogue(Charge::standard("Breakfast", Refreshments, Czk, dec!(250))),
        LineItem::catalogue(Charge::standard("Beer", Refreshments, Czk, dec!(60))),
        LineItem::catalogue(Charge::standard("Wine (glass)", Refreshments, Czk, dec!(90))),
        LineItem::catalogue(Charge::standard("Soft drink", Refreshments, Czk, dec!(45))),
        LineItem::catalogue(Charge::manual("Sauna", Wellness, Czk)),
        LineItem::catalogue(Charge::manual("Massage", Wellness, Czk)),
        LineItem::catalogue(Charge::standard("Parking (day)", Services, Eur, dec!(10))),
        LineItem::catalogue(Charge::standard("Airport transfer", Services, Eur, dec!(35))),
        LineItem::catalogue(Charge::manual("Laundry", Services, Czk)),
        LineItem::catalogue(Charge::city_tax("City tax", Czk, dec!(50))),
        LineItem::catalogue(Charge::gift("Welcome drink")),
    ]
}

// ==========================================
// Settings & theme
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSettings {
    #[serde(default)]
    pub display_currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(BillingError::UnknownTheme(other.to_string())),
        }
    }
}

// ==========================================
// Saved invoices
// ==========================================

/// Frozen record of one finished bill. Totals are authoritative and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub display_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub currency: Currency,
    pub exchange_rate_at_save: ExchangeRate,
    pub total: Decimal,
    #[serde(default)]
    pub discount_total: Decimal,
    pub line_items: Vec<Charge>,
}

impl Invoice {
    /// Host name, else reservation number, else a positional fallback (1-based).
    pub fn title(&self, position: usize) -> String {
        self.host_name
            .clone()
            .or_else(|| self.reservation_number.clone())
            .unwrap_or_else(|| format!("Invoice #{}", position))
    }

    pub fn priced_count(&self) -> usize {
        self.line_items.iter().filter(|c| !c.is_gift()).count()
    }

    pub fn gift_count(&self) -> usize {
        self.line_items.iter().filter(|c| c.is_gift()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_rules() {
        let mut beer = Charge::standard("Beer", Category::Refreshments, Currency::Czk, dec!(60));
        assert!(!beer.is_active());
        beer.kind = ItemKind::Standard { quantity: 1 };
        assert!(beer.is_active());

        let mut tax = Charge::city_tax("City tax", Currency::Czk, dec!(50));
        tax.kind = ItemKind::CityTax { person_count: 2, night_count: 0 };
        assert!(!tax.is_active());
        tax.kind = ItemKind::CityTax { person_count: 2, night_count: 1 };
        assert!(tax.is_active());

        let mut sauna = Charge::manual("Sauna", Category::Wellness, Currency::Czk);
        assert!(!sauna.is_active());
        sauna.kind = ItemKind::Manual { amount: dec!(0.01) };
        assert!(sauna.is_active());
    }

    #[test]
    fn test_gift_is_never_active_but_included_when_selected() {
        let mut gift = Charge::gift("Flowers");
        assert!(!gift.is_active());
        assert!(!gift.is_included());
        gift.kind = ItemKind::Gift { selected: true };
        assert!(!gift.is_active());
        assert!(gift.is_included());
    }

    #[test]
    fn test_reset_keeps_template_fields() {
        let mut item = LineItem::catalogue(Charge::standard("Beer", Category::Refreshments, Currency::Czk, dec!(60)));
        item.charge.kind = ItemKind::Standard { quantity: 4 };
        item.charge.discount = dec!(20);
        item.charge.note = Some("tap".into());
        item.reset();

        assert_eq!(item.charge.kind, ItemKind::Standard { quantity: 0 });
        assert_eq!(item.charge.discount, Decimal::ZERO);
        assert_eq!(item.charge.name, "Beer");
        assert_eq!(item.charge.unit_price, dec!(60));
        assert_eq!(item.charge.note.as_deref(), Some("tap"));
        assert!(item.fixed);
    }

    #[test]
    fn test_line_item_json_round_trip() {
        let mut item = LineItem::catalogue(Charge::city_tax("City tax", Currency::Czk, dec!(50)));
        item.charge.kind = ItemKind::CityTax { person_count: 2, night_count: 3 };
        item.hidden = true;

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"city_tax\""));
        let back: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_default_catalogue_ends_with_gifts() {
        let items = default_items();
        assert!(items.iter().all(|i| i.fixed));
        assert!(items.last().unwrap().charge.is_gift());
        assert_eq!(Category::ALL.last(), Some(&Category::Gifts));
    }

    #[test]
    fn test_invoice_title_fallbacks() {
        let invoice = Invoice {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            display_date: "01.01.2026 10:00".into(),
            host_name: None,
            reservation_number: Some("R-17".into()),
            note: None,
            currency: Currency::Czk,
            exchange_rate_at_save: ExchangeRate::DEFAULT,
            total: dec!(100),
            discount_total: Decimal::ZERO,
            line_items: vec![],
        };
        assert_eq!(invoice.title(3), "R-17");
        let anonymous = Invoice { reservation_number: None, ..invoice };
        assert_eq!(anonymous.title(3), "Invoice #3");
    }

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
