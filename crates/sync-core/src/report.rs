//! Per-table and per-run outcomes.
//!
//! Nothing here is persisted. A report lives as long as the caller holds it
//! and is only ever logged or returned over HTTP.

use crate::mapping::TablePair;
use serde::Serialize;

/// Outcome of syncing one source/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSyncResult {
    pub source: String,
    pub target: String,
    pub rows_transferred: usize,
    pub rows_failed: usize,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableSyncResult {
    /// The table went through every step. Individual rows may still have failed.
    pub fn completed(pair: &TablePair, rows_transferred: usize, rows_failed: usize) -> Self {
        Self {
            source: pair.source.clone(),
            target: pair.target.clone(),
            rows_transferred,
            rows_failed,
            failed: false,
            error: None,
        }
    }

    /// The table was abandoned at some step.
    pub fn abandoned(pair: &TablePair, error: impl ToString) -> Self {
        Self {
            source: pair.source.clone(),
            target: pair.target.clone(),
            rows_transferred: 0,
            rows_failed: 0,
            failed: true,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate counts over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncTotals {
    pub tables_succeeded: usize,
    pub tables_failed: usize,
    pub rows_transferred: usize,
    pub rows_failed: usize,
}

/// Result of a run that reached its terminal `Done` state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub tables: Vec<TableSyncResult>,
    pub totals: SyncTotals,
}

impl SyncReport {
    pub fn new(tables: Vec<TableSyncResult>) -> Self {
        let totals = tables.iter().fold(SyncTotals::default(), |mut acc, t| {
            if t.failed {
                acc.tables_failed += 1;
            } else {
                acc.tables_succeeded += 1;
            }
            acc.rows_transferred += t.rows_transferred;
            acc.rows_failed += t.rows_failed;
            acc
        });
        Self { tables, totals }
    }

    /// Whether any table was abandoned or any row was skipped.
    pub fn has_partial_failures(&self) -> bool {
        self.totals.tables_failed > 0 || self.totals.rows_failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let report = SyncReport::new(vec![
            TableSyncResult::completed(&TablePair::new("a", "a"), 10, 1),
            TableSyncResult::abandoned(&TablePair::new("b", "b"), "no columns"),
            TableSyncResult::completed(&TablePair::new("c", "c2"), 5, 0),
        ]);

        assert_eq!(
            report.totals,
            SyncTotals {
                tables_succeeded: 2,
                tables_failed: 1,
                rows_transferred: 15,
                rows_failed: 1,
            }
        );
        assert!(report.has_partial_failures());
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report = SyncReport::new(Vec::new());
        assert!(!report.has_partial_failures());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totals"]["tables_succeeded"], 0);
    }

    #[test]
    fn test_abandoned_result_serializes_error() {
        let result = TableSyncResult::abandoned(&TablePair::new("a", "b"), "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["failed"], true);
        assert_eq!(json["error"], "boom");
    }
}
