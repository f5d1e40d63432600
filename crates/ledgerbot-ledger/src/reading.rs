//! The typed row record and its cell-level encoding.
//!
//! A sheet row is `[name, timestamp, "{amount} {symbol}"]` with an optional
//! reserved fourth column.  [`Reading`] keeps those fields typed; positional
//! indexing into cell arrays is confined to this module.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use ledgerbot_store::Cells;

/// Exact format of the timestamp cell, in the sheet's local zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cell index of the name field.
pub(crate) const COL_NAME: usize = 0;
/// Cell index of the timestamp field.
pub(crate) const COL_TIMESTAMP: usize = 1;
/// Cell index of the combined amount+symbol field.
pub(crate) const COL_PROFIT: usize = 2;

/// One profit reading as stored in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Who the reading belongs to.  Used as a natural key by convention,
    /// compared case-insensitively after trimming.
    pub name: String,
    /// When the reading was recorded, formatted per [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// The numeric amount, stored as text.
    pub amount: String,
    /// The ticker symbol, e.g. `BTC`.
    pub symbol: String,
}

impl Reading {
    /// Build a reading recorded at the given formatted timestamp.
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        symbol: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            timestamp: timestamp.into(),
            amount: amount.into(),
            symbol: symbol.into(),
        }
    }

    /// The combined amount cell, e.g. `5 BTC`.
    pub fn profit_cell(&self) -> String {
        profit_cell(&self.amount, &self.symbol)
    }

    /// Encode as a stored row.  Always emits the three-cell layout; the
    /// reserved fourth column is never written by the bot.
    pub fn to_cells(&self) -> Cells {
        vec![
            self.name.clone(),
            self.timestamp.clone(),
            self.profit_cell(),
        ]
    }

    /// Decode a stored row.  Returns `None` for rows with fewer than three
    /// cells (the header's width is the minimum any data row has).
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() <= COL_PROFIT {
            return None;
        }

        let profit = cells[COL_PROFIT].as_str();
        let (amount, symbol) = match profit.split_once(' ') {
            Some((amount, symbol)) => (amount.to_string(), symbol.to_string()),
            None => (profit.to_string(), String::new()),
        };

        Some(Self {
            name: cells[COL_NAME].clone(),
            timestamp: cells[COL_TIMESTAMP].clone(),
            amount,
            symbol,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell, timestamp and name helpers
// ---------------------------------------------------------------------------

/// Render the combined amount cell, e.g. `5 BTC`.
pub fn profit_cell(amount: &str, symbol: &str) -> String {
    if symbol.is_empty() {
        amount.to_string()
    } else {
        format!("{amount} {symbol}")
    }
}

/// Format an instant as a timestamp cell in its zone.
pub fn format_timestamp(at: DateTime<FixedOffset>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp cell by exact format.  The stored string carries no
/// zone; it is naive local time.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT).ok()
}

/// Case-insensitive, whitespace-trimmed name comparison -- the convention
/// that makes `name` a natural key.
pub fn name_matches(cell: &str, target: &str) -> bool {
    cell.trim().to_lowercase() == target.trim().to_lowercase()
}
