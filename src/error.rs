//! Error type shared by the billing core and the terminal front-end.

use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),

    #[error("The invoice has no items")]
    NoActiveItems,

    #[error("No invoice at position {index} (history has {len})")]
    HistoryIndexOutOfRange { index: usize, len: usize },

    #[error("No item at position {index} (list has {len})")]
    ItemIndexOutOfRange { index: usize, len: usize },

    #[error("Item '{name}' is not a {expected} item")]
    ItemKindMismatch { name: String, expected: &'static str },

    #[error("Item name must not be empty")]
    EmptyName,

    #[error("Item '{0}' belongs to the catalogue and cannot be removed")]
    FixedItem(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not save '{0}', nothing was changed")]
    Persist(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

pub type Result<T> = std::result::Result<T, BillingError>;
