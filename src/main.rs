mod config;
mod currency;
mod error;
mod export;
mod history;
mod input;
mod model;
mod pricing;
mod store;
mod workspace;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Datelike, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, Color, Table};
use inquire::{Confirm, InquireError, Text};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppSettings;
use crate::currency::Currency;
use crate::error::{BillingError, Result};
use crate::export::{
    history_csv_rows, invoice_csv_rows, to_csv, write_export, DocumentRenderer, DocumentRow, InvoiceDocument,
};
use crate::history::History;
use crate::model::{Category, Charge, ItemKind, LineItem, Theme};
use crate::store::FileStore;
use crate::workspace::Workspace;

type Bill = Workspace<FileStore>;

// ==========================================
// CLI definition
// ==========================================

#[derive(Parser)]
#[command(name = "guesthouse-bill", version, about = "Guesthouse bills in Kč and €")]
struct Cli {
    /// Use this data directory instead of the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current bill
    Show {
        /// Include hidden lines
        #[arg(long)]
        all: bool,
    },
    /// Set the quantity of a line
    Qty {
        #[arg(value_parser = parse_position)]
        position: usize,
        quantity: String,
    },
    /// Set persons and nights of a city tax line
    Tax {
        #[arg(value_parser = parse_position)]
        position: usize,
        persons: String,
        nights: String,
    },
    /// Set the amount of a manually priced line
    Amount {
        #[arg(value_parser = parse_position)]
        position: usize,
        amount: String,
    },
    /// Set the discount of a line, in the line's currency
    Discount {
        #[arg(value_parser = parse_position)]
        position: usize,
        amount: String,
    },
    /// Change the unit price of a line
    Price {
        #[arg(value_parser = parse_position)]
        position: usize,
        price: String,
    },
    /// Set the note of a line (omit the text to clear it)
    Note {
        #[arg(value_parser = parse_position)]
        position: usize,
        text: Option<String>,
    },
    /// Select a gift for this bill
    Gift {
        #[arg(value_parser = parse_position)]
        position: usize,
        /// Unselect instead
        #[arg(long)]
        off: bool,
    },
    /// Add a new gift to the list
    AddGift { name: String },
    /// Add a custom line
    AddItem {
        name: String,
        #[arg(long, value_enum, default_value_t = NewItemKind::Standard)]
        kind: NewItemKind,
        #[arg(long, default_value = "services")]
        category: Category,
        #[arg(long, default_value = "Kč")]
        currency: Currency,
        /// Unit price (ignored for manual lines)
        #[arg(long, default_value = "0")]
        price: String,
    },
    /// Remove a custom line
    RemoveItem {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Hide a line from the bill
    Hide {
        #[arg(value_parser = parse_position)]
        position: usize,
        /// Show it again instead
        #[arg(long)]
        show: bool,
    },
    /// Set host name, reservation number and note (prompts when no flag is given)
    Details {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        reservation: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Switch the display currency
    Currency { currency: Currency },
    /// Set the exchange rate (Kč per €)
    Rate { rate: String },
    /// Save the current bill to the history
    Save,
    /// Clear all quantities, amounts and gift selections
    Reset,
    /// List saved invoices
    History,
    /// Show one saved invoice
    Detail {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Delete a saved invoice
    Delete {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Export the current bill, a saved invoice or the whole history
    Export {
        #[arg(value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Export this saved invoice instead of the current bill
        #[arg(long, value_parser = parse_position, conflicts_with = "history")]
        invoice: Option<usize>,
        /// Export the whole history (always CSV)
        #[arg(long)]
        history: bool,
    },
    /// Show monthly totals
    Summary {
        /// Year to summarize (defaults to current year)
        year: Option<i32>,
    },
    /// Set the table theme, or toggle it when omitted
    Theme { theme: Option<Theme> },
    /// Configure data directory and business name
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NewItemKind {
    Standard,
    CityTax,
    Manual,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Html,
}

/// Positions are 1-based on the command line and 0-based everywhere else.
fn parse_position(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("'{}' is not a position (1, 2, ...)", s)),
        Ok(n) => Ok(n - 1),
    }
}

// ==========================================
// Main Function
// ==========================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().ok();
        return ExitCode::SUCCESS;
    };

    match run(command, cli.data_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, data_dir: Option<PathBuf>) -> Result<()> {
    if let Commands::Config = command {
        setup_config_wizard()?;
        return Ok(());
    }

    // 1. Initialize configuration
    let settings = match config::load_settings() {
        Some(settings) => settings,
        None if data_dir.is_some() => AppSettings::default(),
        None => setup_config_wizard()?,
    };
    let root = data_dir.unwrap_or_else(|| settings.data_dir());

    // 2. Hydrate the workspace
    let store = FileStore::new(root.join("data"))?;
    info!("Using data directory {}", store.dir().display());
    let mut bill = Workspace::open(store);
    let palette = Palette::for_theme(bill.theme());

    match command {
        Commands::Show { all } => show_bill(&bill, all, &palette),
        Commands::Qty { position, quantity } => {
            bill.set_quantity(position, input::parse_count(&quantity))?;
            show_total(&bill);
        }
        Commands::Tax { position, persons, nights } => {
            bill.set_city_tax(position, input::parse_count(&persons), input::parse_count(&nights))?;
            show_total(&bill);
        }
        Commands::Amount { position, amount } => {
            bill.set_amount(position, input::parse_amount(&amount))?;
            show_total(&bill);
        }
        Commands::Discount { position, amount } => {
            bill.set_discount(position, input::parse_amount(&amount))?;
            show_total(&bill);
        }
        Commands::Price { position, price } => {
            bill.set_unit_price(position, input::parse_amount(&price))?;
            show_total(&bill);
        }
        Commands::Note { position, text } => {
            bill.set_item_note(position, text)?;
            println!("✅ Note updated.");
        }
        Commands::Gift { position, off } => {
            bill.set_gift(position, !off)?;
            let name = &bill.items()[position].charge.name;
            if off {
                println!("✅ '{}' removed from this bill.", name);
            } else {
                println!("🎁 '{}' added to this bill.", name);
            }
        }
        Commands::AddGift { name } => {
            let position = bill.add_gift(&name)?;
            println!("🎁 Added gift #{}: {}", position + 1, bill.items()[position].charge.name);
        }
        Commands::AddItem { name, kind, category, currency, price } => {
            let price = input::parse_amount(&price);
            let charge = match kind {
                NewItemKind::Standard => Charge::standard(&name, category, currency, price),
                NewItemKind::CityTax => Charge::city_tax(&name, currency, price),
                NewItemKind::Manual => Charge::manual(&name, category, currency),
            };
            let label = charge.kind.label();
            let position = bill.add_item(charge)?;
            println!("➕ Added #{}: {} ({} line)", position + 1, bill.items()[position].charge.name, label);
        }
        Commands::RemoveItem { position } => {
            let name = item_name(&bill, position)?;
            if confirm(&format!("Remove '{}' from the list?", name))? {
                bill.remove_item(position)?;
                println!("🗑️  Removed '{}'.", name);
            }
        }
        Commands::Hide { position, show } => {
            bill.set_hidden(position, !show)?;
            let name = &bill.items()[position].charge.name;
            if show {
                println!("👁️  '{}' is visible again.", name);
            } else {
                println!("🙈 '{}' hidden.", name);
            }
        }
        Commands::Details { host, reservation, note } => {
            edit_details(&mut bill, host, reservation, note)?;
            println!("✅ Details updated.");
        }
        Commands::Currency { currency } => {
            bill.set_display_currency(currency)?;
            show_total(&bill);
        }
        Commands::Rate { rate } => {
            let rate = input::parse_rate(&rate)?;
            bill.set_rate(rate)?;
            println!("💱 Exchange rate: {}", rate);
            show_total(&bill);
        }
        Commands::Save => {
            let position = bill.history().len() + 1;
            let invoice = bill.save_invoice()?;
            println!(
                "✅ Saved '{}': {} lines, total {}",
                invoice.title(position),
                invoice.line_items.len(),
                invoice.currency.format(invoice.total)
            );
        }
        Commands::Reset => {
            if confirm("Clear all quantities, amounts and gift selections?")? {
                bill.reset_items()?;
                println!("🧹 Bill cleared.");
            }
        }
        Commands::History => show_history(bill.history(), &palette),
        Commands::Detail { position } => {
            let invoice = bill
                .history()
                .get(position)
                .ok_or(BillingError::HistoryIndexOutOfRange { index: position, len: bill.history().len() })?;
            println!("\n--- {} ({}) ---", invoice.title(position + 1), invoice.display_date);
            println!("Exchange rate at save: {}", invoice.exchange_rate_at_save);
            print_document(&InvoiceDocument::from_invoice(invoice), &palette);
        }
        Commands::Delete { position } => {
            let title = bill
                .history()
                .get(position)
                .map(|invoice| format!("{} ({})", invoice.title(position + 1), invoice.display_date))
                .ok_or(BillingError::HistoryIndexOutOfRange { index: position, len: bill.history().len() })?;
            if confirm(&format!("Delete invoice '{}'?", title))? {
                bill.delete_invoice(position)?;
                println!("🗑️  Deleted '{}'.", title);
            }
        }
        Commands::Export { format, invoice, history } => {
            export(&bill, &settings, &root, format, invoice, history)?;
        }
        Commands::Summary { year } => show_summary(bill.history(), year, &palette),
        Commands::Theme { theme } => {
            let theme = match theme {
                Some(theme) => {
                    bill.set_theme(theme)?;
                    theme
                }
                None => bill.toggle_theme()?,
            };
            println!("🎨 Theme: {}", theme);
        }
        // handled before the workspace is opened
        Commands::Config => {}
    }

    Ok(())
}

/// Error text with positions shown the way they were typed.
fn describe(err: &BillingError) -> String {
    match err {
        BillingError::ItemIndexOutOfRange { index, len } => {
            format!("No line #{} (the bill has {} lines)", index + 1, len)
        }
        BillingError::HistoryIndexOutOfRange { index, len } => {
            format!("No saved invoice #{} (the history has {})", index + 1, len)
        }
        other => other.to_string(),
    }
}

// ==========================================
// 1. Prompts
// ==========================================

/// A cancelled prompt counts as "no".
fn confirm(message: &str) -> Result<bool> {
    match Confirm::new(message).with_default(false).prompt() {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn item_name(bill: &Bill, position: usize) -> Result<String> {
    bill.items()
        .get(position)
        .map(|item| item.charge.name.clone())
        .ok_or(BillingError::ItemIndexOutOfRange { index: position, len: bill.items().len() })
}

fn edit_details(
    bill: &mut Bill,
    host: Option<String>,
    reservation: Option<String>,
    note: Option<String>,
) -> Result<()> {
    if host.is_none() && reservation.is_none() && note.is_none() {
        let current = bill.settings().clone();
        let host = Text::new("Host name:")
            .with_initial_value(current.host_name.as_deref().unwrap_or_default())
            .prompt()?;
        let reservation = Text::new("Reservation number:")
            .with_initial_value(current.reservation_number.as_deref().unwrap_or_default())
            .prompt()?;
        let note = Text::new("Note for the guest:")
            .with_initial_value(current.note.as_deref().unwrap_or_default())
            .prompt()?;
        bill.set_host_name(Some(host))?;
        bill.set_reservation_number(Some(reservation))?;
        bill.set_note(Some(note))?;
        return Ok(());
    }

    if let Some(host) = host {
        bill.set_host_name(Some(host))?;
    }
    if let Some(reservation) = reservation {
        bill.set_reservation_number(Some(reservation))?;
    }
    if let Some(note) = note {
        bill.set_note(Some(note))?;
    }
    Ok(())
}

fn setup_config_wizard() -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = config::load_settings().unwrap_or_default();

    let data_root = Text::new("Root data directory:").with_default(&current.data_root).prompt()?;
    let business_name = Text::new("Business name (printed on bills):")
        .with_default(&current.business_name)
        .prompt()?;

    let settings = AppSettings { data_root, business_name };
    let path = config::save_settings(&settings)?;
    println!("✅ Settings saved to {}", path.display());
    Ok(settings)
}

// ==========================================
// 2. Tables
// ==========================================

struct Palette {
    positive: Color,
    negative: Color,
    gift: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                positive: Color::Rgb { r: 4, g: 120, b: 87 },
                negative: Color::Rgb { r: 185, g: 28, b: 28 },
                gift: Color::Rgb { r: 180, g: 83, b: 9 },
            },
            Theme::Dark => Palette {
                positive: Color::Rgb { r: 52, g: 211, b: 153 },
                negative: Color::Rgb { r: 248, g: 113, b: 113 },
                gift: Color::Rgb { r: 251, g: 191, b: 36 },
            },
        }
    }
}

fn show_bill(bill: &Bill, all: bool, palette: &Palette) {
    let settings = bill.settings();
    let display = settings.display_currency;
    let rate = bill.rate();

    let mut lines: Vec<(usize, &LineItem)> =
        bill.items().iter().enumerate().filter(|(_, item)| all || !item.hidden).collect();
    lines.sort_by_key(|(position, item)| (item.charge.category, *position));

    let mut table = Table::new();
    table.set_header(vec!["#", "Item", "Qty / amount", "Unit price", "Price", "Note"]);

    let mut section = None;
    for (position, item) in lines {
        let charge = &item.charge;
        if section != Some(charge.category) {
            section = Some(charge.category);
            table.add_row(vec![
                Cell::new(""),
                Cell::new(charge.category.label()).add_attribute(Attribute::Bold),
            ]);
        }

        let row = DocumentRow::from_charge(charge, display, rate);
        let quantity = match charge.kind {
            ItemKind::Gift { selected: true } => "🎁 selected".to_string(),
            ItemKind::Gift { selected: false } => "-".to_string(),
            _ => row.quantity.clone(),
        };
        let unit_price = match charge.kind {
            ItemKind::Standard { .. } | ItemKind::CityTax { .. } => charge.currency.format(charge.unit_price),
            _ => "-".to_string(),
        };

        let label = if item.hidden { format!("{} (hidden)", charge.name) } else { charge.name.clone() };
        let name_cell = match (charge.is_included(), charge.is_gift()) {
            (true, true) => Cell::new(label).fg(palette.gift).add_attribute(Attribute::Bold),
            (true, false) => Cell::new(label).add_attribute(Attribute::Bold),
            _ => Cell::new(label),
        };
        let price_cell = match &row.discount {
            Some(discount) if charge.is_active() => {
                Cell::new(format!("{} (-{})", row.price, discount)).fg(palette.negative)
            }
            _ => Cell::new(&row.price),
        };

        table.add_row(vec![
            Cell::new(position + 1),
            name_cell,
            Cell::new(quantity),
            Cell::new(unit_price),
            price_cell,
            Cell::new(&row.note),
        ]);
    }

    let header = settings
        .host_name
        .as_deref()
        .or(settings.reservation_number.as_deref())
        .unwrap_or("current bill");
    println!("\n--- {} ---", header);
    println!("{table}");
    if let Some(note) = &settings.note {
        println!("📝 {}", note);
    }
    println!("💱 {} ({} active lines)", rate, bill.active_items().len());
    show_total(bill);
}

fn show_total(bill: &Bill) {
    let display = bill.settings().display_currency;
    let totals = bill.totals();
    if totals.discount_total.is_zero() {
        println!("💰 Total: {}", display.format(totals.total));
    } else {
        println!(
            "💰 Total: {} (discounts: -{})",
            display.format(totals.total),
            display.format(totals.discount_total)
        );
    }
}

fn print_document(doc: &InvoiceDocument, palette: &Palette) {
    let mut table = Table::new();
    table.set_header(vec!["Item", "Qty / amount", "Note", "Price"]);
    for row in &doc.rows {
        let description = if row.gift {
            Cell::new(format!("🎁 {}", row.description)).fg(palette.gift)
        } else {
            Cell::new(&row.description)
        };
        let price = match &row.discount {
            Some(discount) => Cell::new(format!("{} (-{})", row.price, discount)),
            None => Cell::new(&row.price),
        };
        table.add_row(vec![description, Cell::new(&row.quantity), Cell::new(&row.note), price]);
    }
    if let Some(discount_total) = &doc.discount_total {
        table.add_row(vec![
            Cell::new("Discounts"),
            Cell::new(""),
            Cell::new(""),
            Cell::new(format!("-{}", discount_total)).fg(palette.negative),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(&doc.total).add_attribute(Attribute::Bold).fg(palette.positive),
    ]);
    println!("{table}");
    if let Some(note) = &doc.note {
        println!("📝 {}", note);
    }
}

fn show_history(history: &History, palette: &Palette) {
    if history.is_empty() {
        println!("📭 No saved invoices yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Guest", "Lines", "Total"]);
    for (index, invoice) in history.invoices().iter().enumerate() {
        let lines = match invoice.gift_count() {
            0 => invoice.priced_count().to_string(),
            gifts => format!("{} + {} 🎁", invoice.priced_count(), gifts),
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&invoice.display_date),
            Cell::new(invoice.title(index + 1)),
            Cell::new(lines),
            Cell::new(invoice.currency.format(invoice.total)).fg(palette.positive),
        ]);
    }

    println!("\n--- Saved invoices ({}) ---", history.len());
    println!("{table}");
    let sums = history
        .totals_by_currency()
        .into_iter()
        .filter(|(_, sum)| !sum.is_zero())
        .map(|(currency, sum)| currency.format(sum))
        .collect::<Vec<_>>()
        .join(" / ");
    println!("💰 All time: {}", sums);
}

fn show_summary(history: &History, year: Option<i32>, palette: &Palette) {
    let target_year = year.unwrap_or_else(|| Local::now().year());
    let months = history.monthly_summary(target_year);
    if months.is_empty() {
        println!("No invoices saved in {}.", target_year);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "Invoices", Currency::Czk.symbol(), Currency::Eur.symbol(), "Discounts"]);

    let mut count = 0;
    let mut total_czk = Decimal::ZERO;
    let mut total_eur = Decimal::ZERO;
    for (month, summary) in &months {
        let month_str = NaiveDate::from_ymd_opt(target_year, *month, 1)
            .map(|d| d.format("%B").to_string())
            .unwrap_or_else(|| month.to_string());
        let discounts = discount_text(summary.discounts_czk, summary.discounts_eur);

        table.add_row(vec![
            Cell::new(month_str),
            Cell::new(summary.invoices),
            Cell::new(Currency::Czk.format(summary.total_in(Currency::Czk))),
            Cell::new(Currency::Eur.format(summary.total_in(Currency::Eur))),
            if discounts.is_empty() { Cell::new("") } else { Cell::new(discounts).fg(palette.negative) },
        ]);
        count += summary.invoices;
        total_czk = total_czk.saturating_add(summary.czk);
        total_eur = total_eur.saturating_add(summary.eur);
    }

    table.add_row(vec![
        Cell::new(format!("Total ({})", target_year)).add_attribute(Attribute::Bold),
        Cell::new(count).add_attribute(Attribute::Bold),
        Cell::new(Currency::Czk.format(total_czk)).add_attribute(Attribute::Bold).fg(palette.positive),
        Cell::new(Currency::Eur.format(total_eur)).add_attribute(Attribute::Bold).fg(palette.positive),
        Cell::new(""),
    ]);

    println!("\n--- Monthly Summary ({}) ---", target_year);
    println!("{table}");
}

fn discount_text(czk: Decimal, eur: Decimal) -> String {
    [(Currency::Czk, czk), (Currency::Eur, eur)]
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(currency, amount)| format!("-{}", currency.format(amount)))
        .collect::<Vec<_>>()
        .join(" / ")
}

// ==========================================
// 3. Export
// ==========================================

fn export(
    bill: &Bill,
    settings: &AppSettings,
    root: &Path,
    format: ExportFormat,
    invoice: Option<usize>,
    history: bool,
) -> Result<()> {
    let output_dir = root.join("exports");

    if history {
        if bill.history().is_empty() {
            println!("📭 No saved invoices to export.");
            return Ok(());
        }
        if format == ExportFormat::Html {
            println!("ℹ️  The history is exported as CSV.");
        }
        let file_name = format!("history-{}.csv", Local::now().format("%Y-%m-%d"));
        let path = write_export(&output_dir, &file_name, &to_csv(&history_csv_rows(bill.history()))?)?;
        println!("📄 History exported to {}", path.display());
        return Ok(());
    }

    let doc = match invoice {
        Some(index) => {
            let saved = bill
                .history()
                .get(index)
                .ok_or(BillingError::HistoryIndexOutOfRange { index, len: bill.history().len() })?;
            InvoiceDocument::from_invoice(saved)
        }
        None => bill.document(Local::now()),
    };
    if doc.rows.is_empty() {
        return Err(BillingError::NoActiveItems);
    }

    let (content, extension) = match format {
        ExportFormat::Csv => (to_csv(&invoice_csv_rows(&doc))?, "csv"),
        ExportFormat::Html => {
            let renderer = DocumentRenderer::from_dir(root, &settings.business_name).or_else(|e| {
                warn!("Falling back to the built-in template: {}", e);
                DocumentRenderer::embedded(&settings.business_name)
            })?;
            (renderer.render(&doc)?, "html")
        }
    };

    let path = write_export(&output_dir, &format!("{}.{}", doc.file_stem(), extension), &content)?;
    println!("📄 Exported to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_is_one_based() {
        assert_eq!(parse_position("1"), Ok(0));
        assert_eq!(parse_position(" 12 "), Ok(11));
        assert!(parse_position("0").is_err());
        assert!(parse_position("-1").is_err());
        assert!(parse_position("first").is_err());
    }

    #[test]
    fn test_describe_shows_typed_positions() {
        let err = BillingError::ItemIndexOutOfRange { index: 19, len: 14 };
        assert_eq!(describe(&err), "No line #20 (the bill has 14 lines)");
        let err = BillingError::HistoryIndexOutOfRange { index: 0, len: 0 };
        assert_eq!(describe(&err), "No saved invoice #1 (the history has 0)");
        assert_eq!(describe(&BillingError::NoActiveItems), "The invoice has no items");
    }

    #[test]
    fn test_discount_text() {
        use rust_decimal_macros::dec;
        assert_eq!(discount_text(Decimal::ZERO, Decimal::ZERO), "");
        assert_eq!(discount_text(dec!(300), dec!(2.5)), "-300 Kč / -2.50 €");
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["guesthouse-bill", "--data-dir", "/tmp/x", "qty", "3", "2"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Some(Commands::Qty { position, quantity }) => {
                assert_eq!(position, 2);
                assert_eq!(quantity, "2");
            }
            _ => panic!("expected qty"),
        }

        let cli = Cli::try_parse_from(["guesthouse-bill", "add-item", "Bike", "--currency", "eur", "--price", "12,5"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::AddItem { currency: Currency::Eur, category: Category::Services, .. })
        ));

        assert!(Cli::try_parse_from(["guesthouse-bill", "export", "--invoice", "1", "--history"]).is_err());
        assert!(Cli::try_parse_from(["guesthouse-bill", "qty", "0", "1"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
