//! Row transfer from a source table to a target table.
//!
//! Rows are fetched with one unconditional `SELECT *` and written back with
//! one parameterized INSERT per row. A failed insert costs only that row.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sync_core::{find_duplicate_name, Diagnostics, Row, TransferError};

use crate::connection::Connection;
use crate::identifier::{qualified_table, quote_ident};

const COMPONENT: &str = "transfer";

/// Number of inserted rows between two progress diagnostics.
pub const PROGRESS_INTERVAL: usize = 100;

/// How the INSERT column list is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMode {
    /// The first row's columns fix the column list for every row.
    #[default]
    FirstRow,
    /// Each row supplies its own column list.
    PerRow,
}

/// Result of one [`TransferEngine::copy`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub inserted: usize,
    pub failed: usize,
    /// Mode the rows were actually written in.
    pub mode: ColumnMode,
}

/// Render `INSERT INTO "s"."t" ("a", "b") VALUES ($1, $2)`.
pub fn insert_sql<S: AsRef<str>>(schema: &str, table: &str, columns: &[S]) -> String {
    let names = columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        qualified_table(schema, table)
    )
}

/// The column list of `row`, in row order.
pub fn derive_columns(row: &Row) -> Result<Vec<String>, TransferError> {
    if row.is_empty() {
        return Err(TransferError::UnstableColumns {
            reason: "row has no columns".to_string(),
        });
    }
    if let Some(name) = find_duplicate_name(row.column_names()) {
        return Err(TransferError::UnstableColumns {
            reason: format!("column '{name}' appears more than once"),
        });
    }
    Ok(row.column_names().map(str::to_string).collect())
}

pub struct TransferEngine {
    diagnostics: Arc<dyn Diagnostics>,
}

impl TransferEngine {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Every row of `schema.table`, in the order the source returns them.
    pub async fn fetch_all(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<Row>, TransferError> {
        let sql = format!("SELECT * FROM {}", qualified_table(schema, table));
        let result = conn
            .execute(&sql, &[])
            .await
            .map_err(|source| TransferError::Fetch {
                table: table.to_string(),
                source,
            })?;
        self.diagnostics.debug(
            COMPONENT,
            format!("Fetched {} rows from table '{table}'", result.rows.len()),
        );
        Ok(result.rows)
    }

    /// Insert `rows` into `schema.table`, one statement per row.
    ///
    /// Never fails as a whole. In [`ColumnMode::FirstRow`] a first row whose
    /// columns cannot be listed switches the call to [`ColumnMode::PerRow`].
    pub async fn copy(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        rows: &[Row],
        mode: ColumnMode,
    ) -> CopyOutcome {
        let Some(first) = rows.first() else {
            self.diagnostics.warning(
                COMPONENT,
                format!("No data to insert into table '{table}'."),
            );
            return CopyOutcome {
                inserted: 0,
                failed: 0,
                mode,
            };
        };

        let uniform = match mode {
            ColumnMode::PerRow => None,
            ColumnMode::FirstRow => match derive_columns(first) {
                Ok(columns) => {
                    self.diagnostics.debug(
                        COMPONENT,
                        format!("Columns for insert into '{table}': {columns:?}"),
                    );
                    let sql = insert_sql(schema, table, &columns);
                    Some((columns, sql))
                }
                Err(e) => {
                    self.diagnostics.warning(
                        COMPONENT,
                        format!("{e} in first row for '{table}'; deriving columns per row"),
                    );
                    None
                }
            },
        };
        let mode = if uniform.is_some() {
            ColumnMode::FirstRow
        } else {
            ColumnMode::PerRow
        };

        let total = rows.len();
        self.diagnostics
            .info(COMPONENT, format!("Inserting {total} rows into table '{table}'"));

        let mut inserted = 0;
        let mut failed = 0;
        for (index, row) in rows.iter().enumerate() {
            let (sql, values) = match &uniform {
                Some((columns, sql)) => (sql.clone(), row.values_for(columns)),
                None => match derive_columns(row) {
                    Ok(columns) => (insert_sql(schema, table, &columns), row.values_for(&columns)),
                    Err(e) => {
                        self.diagnostics.error(
                            COMPONENT,
                            format!("Skipping row {index} of '{table}': {e}"),
                        );
                        failed += 1;
                        continue;
                    }
                },
            };

            match conn.execute(&sql, &values).await {
                Ok(_) => {
                    inserted += 1;
                    if inserted % PROGRESS_INTERVAL == 0 {
                        self.diagnostics.info(
                            COMPONENT,
                            format!(
                                "Inserted {inserted} rows of {total} into table '{table}' so far..."
                            ),
                        );
                    }
                }
                Err(source) => {
                    let err = TransferError::RowInsert {
                        table: table.to_string(),
                        row: index,
                        source,
                    };
                    self.diagnostics.error(COMPONENT, err.to_string());
                    failed += 1;
                }
            }
        }

        self.diagnostics.info(
            COMPONENT,
            format!("Inserted {inserted} rows into table '{table}'."),
        );
        if failed > 0 {
            self.diagnostics.warning(
                COMPONENT,
                format!("{failed} of {total} rows could not be inserted into table '{table}'"),
            );
        }

        CopyOutcome {
            inserted,
            failed,
            mode,
        }
    }
}
