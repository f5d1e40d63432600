//! Range addressing and the store seam.
//!
//! The tabular store is rectangular: whole-range get/put of string cells,
//! no server-side queries.  [`RangeSpec`] names a worksheet plus a column
//! span in A1 notation; [`RangeStore`] is the async seam the row logic is
//! written against, so tests can substitute an in-memory store.

use async_trait::async_trait;

use crate::error::StoreResult;

/// One row of string cells as stored in the sheet.
pub type Cells = Vec<String>;

/// A worksheet title plus a column span, rendered in A1 notation.
///
/// The span covers whole columns (`A:C`), so a get returns every populated
/// row and a put overwrites the sheet from the first row down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    worksheet: String,
    span: String,
}

impl RangeSpec {
    /// Address the given column span (e.g. `"A:C"`) on a worksheet.
    pub fn new(worksheet: impl Into<String>, span: impl Into<String>) -> Self {
        Self {
            worksheet: worksheet.into(),
            span: span.into(),
        }
    }

    /// The full A1-notation string, e.g. `Profits!A:C`.
    pub fn a1(&self) -> String {
        format!("{}!{}", self.worksheet, self.span)
    }
}

impl std::fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}!{}", self.worksheet, self.span)
    }
}

/// Whole-range access to a rectangular store of string cells.
///
/// `get_range` returns every populated row (an empty sheet yields an empty
/// vector).  `put_range` fully overwrites the target range with the given
/// rows; it is not a merge, and the store applies it atomically.
#[async_trait]
pub trait RangeStore: Send + Sync {
    /// Read all rows currently held in the range.
    async fn get_range(&self, spreadsheet_id: &str, range: &RangeSpec) -> StoreResult<Vec<Cells>>;

    /// Overwrite the range with `rows`, returning the number of cells written.
    async fn put_range(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Cells],
    ) -> StoreResult<u64>;
}
