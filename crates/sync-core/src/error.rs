//! Error taxonomy.
//!
//! Only [`SyncError`] ever escapes a sync run. Everything below table
//! granularity is caught by the component that owns it, reported through
//! the diagnostics sink, and turned into a skipped table or a skipped row.

use thiserror::Error;

/// Failure to establish a database session. Fatal to the run.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {target}: {message}")]
    Open { target: String, message: String },
}

/// Failure of a single statement on a connection handle.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("connection is closed")]
    Closed,

    #[error("query failed: {message} (statement: {statement})")]
    Execution { statement: String, message: String },

    #[error("failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

/// Outcomes of schema introspection that yield an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    #[error("no tables found in schema '{schema}' after trying every discovery strategy")]
    DiscoveryExhausted { schema: String },

    #[error("could not resolve columns for table '{table}' in schema '{schema}'")]
    ColumnResolutionFailed { table: String, schema: String },
}

/// Failure to create a target table. Skips that table's transfer.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    #[error("cannot create table '{table}' without columns")]
    NoColumns { table: String },

    #[error("cannot create table '{table}': column '{column}' is listed more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("failed to create table '{table}': {source}")]
    Execution {
        table: String,
        #[source]
        source: QueryError,
    },
}

/// Failures inside the data transfer engine.
#[derive(Debug, Clone, Error)]
pub enum TransferError {
    #[error("failed to fetch rows from '{table}': {source}")]
    Fetch {
        table: String,
        #[source]
        source: QueryError,
    },

    #[error("cannot derive a stable column list: {reason}")]
    UnstableColumns { reason: String },

    #[error("failed to insert row {row} into '{table}': {source}")]
    RowInsert {
        table: String,
        row: usize,
        #[source]
        source: QueryError,
    },
}

/// Run-level failure surfaced to the caller of a sync run.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_error_keeps_source() {
        let err = ProvisionError::Execution {
            table: "t".to_string(),
            source: QueryError::Execution {
                statement: "CREATE TABLE".to_string(),
                message: "type \"foo\" does not exist".to_string(),
            },
        };
        assert!(err.to_string().contains("failed to create table 't'"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sync_error_is_transparent() {
        let err: SyncError = ConnectionError::Open {
            target: "localhost:5432/src".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "failed to connect to localhost:5432/src: connection refused"
        );
    }
}
