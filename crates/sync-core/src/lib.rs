//! Core types for the pg-table-sync engine.
//!
//! This crate holds the dialect-neutral data model shared by the SQL-speaking
//! crates and the orchestrator:
//!
//! - [`Value`] / [`Row`] - scalar values and ordered column-to-value rows
//! - [`ColumnDescriptor`] - a column name paired with its dialect-native type
//! - [`TableMapping`] / [`TablePair`] - which source tables go to which targets
//! - [`TableSyncResult`] / [`SyncReport`] - per-table and per-run outcomes
//! - [`Diagnostics`] - the sink every component reports through
//! - [`error`] - the error taxonomy used across the workspace
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── pg-table-sync-postgresql  (connection, inspector, provisioner, transfer)
//!    │
//!    └─── pg-table-sync             (orchestrator, config, HTTP trigger, CLI)
//! ```

pub mod diagnostics;
pub mod error;
pub mod mapping;
pub mod report;
pub mod schema;
pub mod values;

pub use diagnostics::{
    DiagnosticEvent, Diagnostics, MemoryDiagnostics, Severity, TracingDiagnostics,
};
pub use error::{
    ConnectionError, InspectError, ProvisionError, QueryError, SyncError, TransferError,
};
pub use mapping::{MappingEntry, MappingError, TableMapping, TablePair, WILDCARD};
pub use report::{SyncReport, SyncTotals, TableSyncResult};
pub use schema::{find_duplicate_name, ColumnDescriptor, FALLBACK_COLUMN_TYPE};
pub use values::{Row, Value};
