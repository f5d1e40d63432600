//! Row-level operations on the profit sheet.
//!
//! Every operation is a full read-modify-write cycle: read the whole range,
//! mutate in memory, overwrite the whole range.  The sheet is never cached
//! across calls.  Row 0 is the header; it is skipped by every match and is
//! never edited or deleted, regardless of what its cells contain.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ledgerbot_store::{Cells, RangeSpec, RangeStore};

use crate::error::LedgerResult;
use crate::reading::{
    COL_PROFIT, COL_TIMESTAMP, Reading, format_timestamp, name_matches, parse_timestamp,
    profit_cell,
};

/// Default half-width of the lookup window around "now".
const DEFAULT_TOLERANCE_SECS: i64 = 60;

/// Result of an edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The first matching row was rewritten at this timestamp.
    Updated { timestamp: String },
    /// No row matched; the sheet was not rewritten.
    NotFound,
}

/// Result of a delete operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// This many rows were removed.
    Deleted { rows: usize },
    /// No row matched; the sheet was not rewritten.
    NotFound,
}

/// The profit sheet, addressed through an explicitly constructed store
/// client.
///
/// Write operations serialize behind a mutex so two commands racing within
/// this process cannot interleave their read and write phases.  Races with
/// other writers of the same spreadsheet are out of scope.
pub struct LedgerSheet<S> {
    store: S,
    spreadsheet_id: String,
    range: RangeSpec,
    zone: FixedOffset,
    tolerance: Duration,
    write_lock: Mutex<()>,
}

impl<S: RangeStore> LedgerSheet<S> {
    /// Bind the ledger to one worksheet range of one spreadsheet.
    ///
    /// `zone` is the fixed offset timestamps are recorded in.
    pub fn new(
        store: S,
        spreadsheet_id: impl Into<String>,
        range: RangeSpec,
        zone: FixedOffset,
    ) -> Self {
        Self {
            store,
            spreadsheet_id: spreadsheet_id.into(),
            range,
            zone,
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
            write_lock: Mutex::new(()),
        }
    }

    /// Override the lookup window half-width.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The current instant in the sheet's zone.
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.zone)
    }

    async fn read_all(&self) -> LedgerResult<Vec<Cells>> {
        Ok(self.store.get_range(&self.spreadsheet_id, &self.range).await?)
    }

    async fn write_all(&self, rows: &[Cells]) -> LedgerResult<u64> {
        Ok(self
            .store
            .put_range(&self.spreadsheet_id, &self.range, rows)
            .await?)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Append a reading stamped "now", returning the formatted timestamp so
    /// the caller can echo it without a second read.
    ///
    /// Existing rows are written back unchanged and in order, with the new
    /// row last.
    pub async fn append_reading(
        &self,
        name: &str,
        amount: &str,
        symbol: &str,
    ) -> LedgerResult<String> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.read_all().await?;
        let timestamp = format_timestamp(self.now());
        let reading = Reading::new(name, amount, symbol, timestamp.clone());
        rows.push(reading.to_cells());

        self.write_all(&rows).await?;
        info!(name, timestamp = %timestamp, "reading appended");
        Ok(timestamp)
    }

    /// Find the most recent reading near "now", using the configured
    /// tolerance.
    pub async fn find_recent_reading(&self) -> LedgerResult<Option<Reading>> {
        self.find_reading_near(self.now(), self.tolerance).await
    }

    /// Return the FIRST data row (top to bottom) whose timestamp falls in
    /// `[at - tolerance, at + tolerance]`.
    ///
    /// There is no preference for the closest timestamp: given two rows in
    /// the window, the earlier-stored one wins.  Rows whose timestamp cell
    /// does not parse are logged and skipped, never aborting the scan.
    /// `Ok(None)` is a normal outcome, not an error.
    pub async fn find_reading_near(
        &self,
        at: DateTime<FixedOffset>,
        tolerance: Duration,
    ) -> LedgerResult<Option<Reading>> {
        let rows = self.read_all().await?;
        Ok(scan_window(&rows, at.naive_local(), tolerance))
    }

    /// Rewrite the first row whose name matches (case-insensitive, trimmed),
    /// stamping it "now" and replacing its amount cell.
    ///
    /// On a miss the sheet is NOT rewritten -- a read-only no-op.
    pub async fn edit_reading(
        &self,
        name: &str,
        new_amount: &str,
        new_symbol: &str,
    ) -> LedgerResult<EditOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.read_all().await?;
        let timestamp = format_timestamp(self.now());

        let Some(row) = rows
            .iter_mut()
            .skip(1)
            .find(|row| row.first().is_some_and(|cell| name_matches(cell, name)))
        else {
            debug!(name, "edit target not found, sheet untouched");
            return Ok(EditOutcome::NotFound);
        };

        if row.len() <= COL_PROFIT {
            row.resize(COL_PROFIT + 1, String::new());
        }
        row[COL_TIMESTAMP] = timestamp.clone();
        row[COL_PROFIT] = profit_cell(new_amount, new_symbol);

        self.write_all(&rows).await?;
        info!(name, timestamp = %timestamp, "reading updated");
        Ok(EditOutcome::Updated { timestamp })
    }

    /// Remove EVERY data row whose name matches (case-insensitive, trimmed).
    ///
    /// Unlike edit, all matches are removed, not just the first.  The header
    /// is excluded by position, never by comparing its cells.  On a miss the
    /// sheet is NOT rewritten.
    pub async fn delete_readings(&self, name: &str) -> LedgerResult<DeleteOutcome> {
        let _guard = self.write_lock.lock().await;

        let rows = self.read_all().await?;
        let mut kept: Vec<Cells> = Vec::with_capacity(rows.len());
        let mut removed = 0usize;

        for (index, row) in rows.into_iter().enumerate() {
            if index > 0 && row.first().is_some_and(|cell| name_matches(cell, name)) {
                removed += 1;
            } else {
                kept.push(row);
            }
        }

        if removed == 0 {
            debug!(name, "delete target not found, sheet untouched");
            return Ok(DeleteOutcome::NotFound);
        }

        self.write_all(&kept).await?;
        info!(name, removed, "readings deleted");
        Ok(DeleteOutcome::Deleted { rows: removed })
    }

    /// All rows verbatim, header included: cells comma-joined, rows
    /// newline-joined.
    pub async fn list_all(&self) -> LedgerResult<String> {
        let rows = self.read_all().await?;
        Ok(rows
            .iter()
            .map(|row| row.join(", "))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Window scan
// ---------------------------------------------------------------------------

/// Scan data rows top-to-bottom for the first one inside the window.
///
/// The window is inclusive at both ends.  Stored timestamps are naive local
/// time, so the probe instant must already be in the sheet's zone.
fn scan_window(rows: &[Cells], at_local: NaiveDateTime, tolerance: Duration) -> Option<Reading> {
    let lo = at_local - tolerance;
    let hi = at_local + tolerance;

    for (index, row) in rows.iter().enumerate().skip(1) {
        let Some(cell) = row.get(COL_TIMESTAMP) else {
            debug!(row = index, "skipping row without a timestamp cell");
            continue;
        };
        let Some(stored) = parse_timestamp(cell) else {
            warn!(row = index, cell = %cell, "skipping row with malformed timestamp");
            continue;
        };
        if stored < lo || stored > hi {
            continue;
        }
        match Reading::from_cells(row) {
            Some(reading) => return Some(reading),
            None => warn!(row = index, "skipping in-window row with too few cells"),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use ledgerbot_store::{StoreError, StoreResult};

    use super::*;
    use crate::reading::TIMESTAMP_FORMAT;

    // -- Fake store ---------------------------------------------------------

    #[derive(Clone, Default)]
    struct FakeStore {
        rows: Arc<StdMutex<Vec<Cells>>>,
        puts: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    impl FakeStore {
        fn with_rows(rows: Vec<Cells>) -> Self {
            Self {
                rows: Arc::new(StdMutex::new(rows)),
                ..Self::default()
            }
        }

        fn rows(&self) -> Vec<Cells> {
            self.rows.lock().unwrap().clone()
        }

        fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }

        fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RangeStore for FakeStore {
        async fn get_range(
            &self,
            _spreadsheet_id: &str,
            _range: &RangeSpec,
        ) -> StoreResult<Vec<Cells>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Api {
                    status: 503,
                    message: "backend unavailable".into(),
                });
            }
            Ok(self.rows())
        }

        async fn put_range(
            &self,
            _spreadsheet_id: &str,
            _range: &RangeSpec,
            rows: &[Cells],
        ) -> StoreResult<u64> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Api {
                    status: 503,
                    message: "backend unavailable".into(),
                });
            }
            *self.rows.lock().unwrap() = rows.to_vec();
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(rows.iter().map(|r| r.len() as u64).sum())
        }
    }

    // -- Helpers ------------------------------------------------------------

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn sheet(store: FakeStore) -> LedgerSheet<FakeStore> {
        LedgerSheet::new(store, "sheet-1", RangeSpec::new("Profits", "A:C"), zone())
    }

    fn header() -> Cells {
        vec!["Name".into(), "Date Time".into(), "Profit".into()]
    }

    fn row(name: &str, timestamp: &str, profit: &str) -> Cells {
        vec![name.into(), timestamp.into(), profit.into()]
    }

    fn local(s: &str) -> DateTime<FixedOffset> {
        let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap();
        zone().from_local_datetime(&naive).unwrap()
    }

    // -- Append -------------------------------------------------------------

    #[tokio::test]
    async fn append_keeps_prior_rows_in_order_with_header_first() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
            row("bob", "2024-01-02 11:00:00", "3 ETH"),
        ]);
        let ledger = sheet(store.clone());

        let timestamp = ledger.append_reading("carol", "9", "DOGE").await.unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], header());
        assert_eq!(rows[1], row("alice", "2024-01-01 10:00:00", "5 BTC"));
        assert_eq!(rows[2], row("bob", "2024-01-02 11:00:00", "3 ETH"));
        assert_eq!(rows[3], row("carol", &timestamp, "9 DOGE"));
        assert!(parse_timestamp(&timestamp).is_some());
    }

    #[tokio::test]
    async fn append_to_empty_sheet_writes_single_row() {
        let store = FakeStore::default();
        let ledger = sheet(store.clone());

        let timestamp = ledger.append_reading("alice", "5", "BTC").await.unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], row("alice", &timestamp, "5 BTC"));
    }

    #[tokio::test]
    async fn append_surfaces_store_failure() {
        let store = FakeStore::with_rows(vec![header()]);
        store.set_failing(true);
        let ledger = sheet(store.clone());

        let result = ledger.append_reading("alice", "5", "BTC").await;
        assert!(result.is_err());
        assert_eq!(store.put_count(), 0);
    }

    // -- Window scan --------------------------------------------------------

    #[test]
    fn scan_returns_first_row_in_window_not_closest() {
        let at = NaiveDateTime::parse_from_str("2024-01-01 10:00:30", TIMESTAMP_FORMAT).unwrap();
        let rows = vec![
            header(),
            row("alice", "2024-01-01 10:01:00", "5 BTC"),
            row("bob", "2024-01-01 10:00:30", "3 ETH"),
        ];

        // bob's timestamp is closer to the probe, but alice is stored first.
        let hit = scan_window(&rows, at, Duration::seconds(60)).unwrap();
        assert_eq!(hit.name, "alice");
    }

    #[test]
    fn scan_window_is_inclusive_at_both_ends() {
        let at = NaiveDateTime::parse_from_str("2024-01-01 10:01:00", TIMESTAMP_FORMAT).unwrap();
        let rows = vec![header(), row("alice", "2024-01-01 10:00:00", "5 BTC")];

        assert!(scan_window(&rows, at, Duration::seconds(60)).is_some());
        assert!(scan_window(&rows, at, Duration::seconds(59)).is_none());
    }

    #[test]
    fn scan_skips_malformed_timestamps_without_aborting() {
        let at = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", TIMESTAMP_FORMAT).unwrap();
        let rows = vec![
            header(),
            row("broken", "not a date", "1 BTC"),
            row("short", "", "2 BTC"),
            row("alice", "2024-01-01 10:00:10", "5 BTC"),
        ];

        let hit = scan_window(&rows, at, Duration::seconds(60)).unwrap();
        assert_eq!(hit.name, "alice");
    }

    #[test]
    fn scan_never_matches_the_header_row() {
        let at = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", TIMESTAMP_FORMAT).unwrap();
        // A header whose timestamp cell happens to parse.
        let rows = vec![row("Name", "2024-01-01 10:00:00", "Profit")];

        assert!(scan_window(&rows, at, Duration::seconds(60)).is_none());
    }

    #[tokio::test]
    async fn find_on_header_only_sheet_is_none() {
        let store = FakeStore::with_rows(vec![header()]);
        let ledger = sheet(store);

        let found = ledger
            .find_reading_near(local("2024-01-01 10:00:00"), Duration::seconds(60))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_decodes_the_matching_row() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
        ]);
        let ledger = sheet(store);

        let found = ledger
            .find_reading_near(local("2024-01-01 10:00:30"), Duration::seconds(60))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "alice");
        assert_eq!(found.amount, "5");
        assert_eq!(found.symbol, "BTC");
    }

    // -- Edit ---------------------------------------------------------------

    #[tokio::test]
    async fn edit_miss_is_a_read_only_no_op() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.edit_reading("nobody", "7", "ETH").await.unwrap();
        assert_eq!(outcome, EditOutcome::NotFound);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn edit_matches_case_insensitively_and_rewrites_one_row() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
            row("bob", "2024-01-02 11:00:00", "3 ETH"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.edit_reading("ALICE", "7", "ETH").await.unwrap();
        let EditOutcome::Updated { timestamp } = outcome else {
            panic!("expected Updated");
        };

        let rows = store.rows();
        assert_eq!(rows[0], header());
        assert_eq!(rows[1], row("alice", &timestamp, "7 ETH"));
        assert_eq!(rows[2], row("bob", "2024-01-02 11:00:00", "3 ETH"));
        assert!(parse_timestamp(&timestamp).is_some());
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn edit_touches_only_the_first_match() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("bob", "2024-01-01 10:00:00", "1 BTC"),
            row("bob", "2024-01-02 11:00:00", "2 BTC"),
        ]);
        let ledger = sheet(store.clone());

        ledger.edit_reading("bob", "9", "TRX").await.unwrap();

        let rows = store.rows();
        assert_eq!(rows[1][COL_PROFIT], "9 TRX");
        assert_eq!(rows[2], row("bob", "2024-01-02 11:00:00", "2 BTC"));
    }

    #[tokio::test]
    async fn edit_never_matches_the_header_row() {
        let store = FakeStore::with_rows(vec![
            row("alice", "Date Time", "Profit"),
            row("bob", "2024-01-01 10:00:00", "1 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.edit_reading("alice", "7", "ETH").await.unwrap();
        assert_eq!(outcome, EditOutcome::NotFound);
        assert_eq!(store.rows()[0], row("alice", "Date Time", "Profit"));
    }

    // -- Delete -------------------------------------------------------------

    #[tokio::test]
    async fn delete_removes_all_matches_preserving_order() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("bob", "2024-01-01 10:00:00", "1 BTC"),
            row("alice", "2024-01-01 11:00:00", "5 BTC"),
            row(" BOB ", "2024-01-02 10:00:00", "2 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.delete_readings("bob").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { rows: 2 });

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header());
        assert_eq!(rows[1], row("alice", "2024-01-01 11:00:00", "5 BTC"));
    }

    #[tokio::test]
    async fn delete_miss_is_a_read_only_no_op() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.delete_readings("nobody").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn delete_never_removes_the_header_row() {
        let store = FakeStore::with_rows(vec![
            row("bob", "Date Time", "Profit"),
            row("bob", "2024-01-01 10:00:00", "1 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.delete_readings("bob").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { rows: 1 });

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], row("bob", "Date Time", "Profit"));
    }

    #[tokio::test]
    async fn delete_cannot_touch_row_zero_even_on_headerless_sheet() {
        let store = FakeStore::with_rows(vec![row("bob", "2024-01-01 10:00:00", "1 BTC")]);
        let ledger = sheet(store.clone());

        let outcome = ledger.delete_readings("bob").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn delete_of_every_data_row_leaves_only_the_header() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("bob", "2024-01-01 10:00:00", "1 BTC"),
            row("bob", "2024-01-02 10:00:00", "2 BTC"),
        ]);
        let ledger = sheet(store.clone());

        let outcome = ledger.delete_readings("bob").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { rows: 2 });
        assert_eq!(store.rows(), vec![header()]);
    }

    // -- List ---------------------------------------------------------------

    #[tokio::test]
    async fn list_all_joins_rows_verbatim() {
        let store = FakeStore::with_rows(vec![
            header(),
            row("alice", "2024-01-01 10:00:00", "5 BTC"),
        ]);
        let ledger = sheet(store);

        let listing = ledger.list_all().await.unwrap();
        assert_eq!(
            listing,
            "Name, Date Time, Profit\nalice, 2024-01-01 10:00:00, 5 BTC"
        );
    }

    #[tokio::test]
    async fn list_all_on_empty_sheet_is_empty_string() {
        let ledger = sheet(FakeStore::default());
        assert_eq!(ledger.list_all().await.unwrap(), "");
    }
}
