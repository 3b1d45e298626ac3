//! PostgreSQL side of pg-table-sync
//!
//! Provides the pieces of a table sync that speak SQL:
//! - `PgConnection` - one session, one statement at a time
//! - `SchemaInspector` - table discovery and column resolution with fallback strategies
//! - `TableProvisioner` - `CREATE TABLE IF NOT EXISTS` on the target
//! - `TransferEngine` - full-table fetch and per-row inserts
//!
//! The `testing` feature exposes a scripted in-memory connection for tests
//! of dependent crates.

mod connection;
mod identifier;
pub mod inspector;
mod provisioner;
mod transfer;
mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export connection types
pub use connection::{
    is_read_query, Connection, ConnectionConfig, Connector, PgConnection, PgConnector,
    QueryResult,
};

pub use identifier::{qualified_table, quote_ident};

// Re-export inspector types
pub use inspector::{ColumnStrategy, SchemaInspector, StrategyOutcome, TableStrategy};

pub use provisioner::{create_table_sql, TableProvisioner};

pub use transfer::{
    derive_columns, insert_sql, ColumnMode, CopyOutcome, TransferEngine, PROGRESS_INTERVAL,
};

pub use value::{decode_row, PgParam, PgValue};
