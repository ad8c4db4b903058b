//! CSV and printable exports.
//!
//! Both formats render the same [`InvoiceDocument`], so every row present in one is
//! present in the other.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local};
use serde::Serialize;
use slug::slugify;
use tera::{Context, Tera};
use tracing::info;

use crate::currency::{Currency, ExchangeRate};
use crate::error::{BillingError, Result};
use crate::history::History;
use crate::model::{Charge, Invoice, InvoiceSettings, ItemKind, LineItem};
use crate::pricing::{compute_totals, discount_of, price_of};

pub const INVOICE_CSV_HEADER: [&str; 4] = ["Item", "Quantity/amount", "Note", "Price"];
pub const TEMPLATE_NAME: &str = "invoice.html";

// Embed template at compile time to ensure availability
const DEFAULT_TEMPLATE: &str = include_str!("../templates/invoice.html");

const NOT_APPLICABLE: &str = "—";

// ==========================================
// Document model
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub description: String,
    pub quantity: String,
    pub note: String,
    pub price: String,
    pub discount: Option<String>,
    pub gift: bool,
}

impl DocumentRow {
    pub fn from_charge(charge: &Charge, display: Currency, rate: ExchangeRate) -> Self {
        let quantity = match &charge.kind {
            ItemKind::Standard { quantity } => format!("{}×", quantity),
            ItemKind::CityTax { person_count, night_count } => {
                format!("{} persons × {} nights", person_count, night_count)
            }
            ItemKind::Manual { amount } => charge.currency.format(*amount),
            ItemKind::Gift { .. } => NOT_APPLICABLE.to_string(),
        };
        let discount = discount_of(charge, display, rate);

        Self {
            description: charge.name.clone(),
            quantity,
            note: charge.note.clone().unwrap_or_default(),
            price: price_of(charge, display, rate)
                .map(|p| display.format(p))
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            discount: (!discount.is_zero()).then(|| display.format(discount)),
            gift: charge.is_gift(),
        }
    }

    fn csv_cells(&self) -> Vec<String> {
        let description = if self.gift {
            format!("🎁 {}", self.description)
        } else {
            self.description.clone()
        };
        let price = match &self.discount {
            Some(discount) => format!("{} (discount: -{})", self.price, discount),
            None => self.price.clone(),
        };
        vec![description, self.quantity.clone(), self.note.clone(), price]
    }
}

/// Everything a printed or exported bill shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    pub date: String,
    pub year: i32,
    pub host_name: Option<String>,
    pub reservation_number: Option<String>,
    pub note: Option<String>,
    pub currency: Currency,
    pub rows: Vec<DocumentRow>,
    pub total: String,
    pub discount_total: Option<String>,
}

impl InvoiceDocument {
    /// The bill as it currently stands in the workspace.
    pub fn from_live(items: &[LineItem], settings: &InvoiceSettings, rate: ExchangeRate, now: DateTime<Local>) -> Self {
        let display = settings.display_currency;
        let included: Vec<&Charge> = items
            .iter()
            .filter(|item| !item.hidden && item.charge.is_included())
            .map(|item| &item.charge)
            .collect();
        let totals = compute_totals(included.iter().copied(), settings, rate);

        Self {
            date: now.format("%d.%m.%Y").to_string(),
            year: now.year(),
            host_name: settings.host_name.clone(),
            reservation_number: settings.reservation_number.clone(),
            note: settings.note.clone(),
            currency: display,
            rows: included.iter().map(|c| DocumentRow::from_charge(c, display, rate)).collect(),
            total: display.format(totals.total),
            discount_total: (!totals.discount_total.is_zero()).then(|| display.format(totals.discount_total)),
        }
    }

    /// A saved bill. Totals come from the snapshot, never from recomputation.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let display = invoice.currency;
        let rate = invoice.exchange_rate_at_save;

        Self {
            date: invoice.display_date.clone(),
            year: invoice.created_at.with_timezone(&Local).year(),
            host_name: invoice.host_name.clone(),
            reservation_number: invoice.reservation_number.clone(),
            note: invoice.note.clone(),
            currency: display,
            rows: invoice
                .line_items
                .iter()
                .map(|c| DocumentRow::from_charge(c, display, rate))
                .collect(),
            total: display.format(invoice.total),
            discount_total: (!invoice.discount_total.is_zero()).then(|| display.format(invoice.discount_total)),
        }
    }

    /// File name without extension, e.g. `bill-jan-novak`.
    pub fn file_stem(&self) -> String {
        let label = self
            .host_name
            .as_deref()
            .or(self.reservation_number.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.date.clone());
        format!("bill-{}", slugify(label))
    }
}

// ==========================================
// CSV
// ==========================================

pub fn invoice_csv_rows(doc: &InvoiceDocument) -> Vec<Vec<String>> {
    let mut rows = vec![INVOICE_CSV_HEADER.iter().map(|h| h.to_string()).collect()];
    rows.extend(doc.rows.iter().map(DocumentRow::csv_cells));
    rows.push(vec!["Total".into(), String::new(), String::new(), doc.total.clone()]);
    rows
}

pub fn history_csv_rows(history: &History) -> Vec<Vec<String>> {
    let mut rows = history.csv_rows();
    let sums = history
        .totals_by_currency()
        .into_iter()
        .map(|(currency, sum)| currency.format(sum))
        .collect::<Vec<_>>()
        .join(" / ");
    rows.push(vec![
        "Total".into(),
        String::new(),
        String::new(),
        sums,
        String::new(),
        String::new(),
    ]);
    rows
}

/// Semicolon separated, every cell quoted, embedded quotes doubled.
pub fn to_csv(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Always)
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| BillingError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| BillingError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

// ==========================================
// Printable document
// ==========================================

pub struct DocumentRenderer {
    tera: Tera,
    business_name: String,
}

impl DocumentRenderer {
    pub fn embedded(business_name: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self { tera, business_name: business_name.to_string() })
    }

    /// Loads templates from `<root>/templates`, writing the default one there first if
    /// it is missing so it can be customised.
    pub fn from_dir(root: &Path, business_name: &str) -> Result<Self> {
        let template_dir = root.join("templates");
        fs::create_dir_all(&template_dir)?;
        let template_path = template_dir.join(TEMPLATE_NAME);
        if !template_path.exists() {
            info!("Initializing default template at {}", template_path.display());
            fs::write(&template_path, DEFAULT_TEMPLATE)?;
        }

        let glob = template_dir.join("*.html");
        let glob = glob
            .to_str()
            .ok_or_else(|| BillingError::Config(format!("Non UTF-8 template path: {}", glob.display())))?;
        let tera = Tera::new(glob)?;
        Ok(Self { tera, business_name: business_name.to_string() })
    }

    pub fn render(&self, doc: &InvoiceDocument) -> Result<String> {
        let mut context = Context::from_serialize(doc)?;
        context.insert("business_name", &self.business_name);
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Writes `content` to `<dir>/<file_name>`, creating `dir` when needed.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    info!("Exported {}", path.display());
    Ok(path)
}
