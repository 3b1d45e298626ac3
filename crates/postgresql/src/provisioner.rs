//! Target table creation.

use std::sync::Arc;
use sync_core::{find_duplicate_name, ColumnDescriptor, Diagnostics, ProvisionError};

use crate::connection::Connection;
use crate::identifier::{qualified_table, quote_ident};

const COMPONENT: &str = "provisioner";

/// Render `CREATE TABLE IF NOT EXISTS` for `schema.table` with `columns` in
/// order.
///
/// Column types are written verbatim.
pub fn create_table_sql(schema: &str, table: &str, columns: &[ColumnDescriptor]) -> String {
    let definitions = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.data_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({definitions})",
        qualified_table(schema, table)
    )
}

/// Creates target tables that do not exist yet.
pub struct TableProvisioner {
    diagnostics: Arc<dyn Diagnostics>,
}

impl TableProvisioner {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Create `schema.table` unless it already exists. An existing table is
    /// left untouched, whatever its columns.
    pub async fn ensure_table(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<(), ProvisionError> {
        if columns.is_empty() {
            return Err(ProvisionError::NoColumns {
                table: table.to_string(),
            });
        }
        if let Some(column) = find_duplicate_name(columns.iter().map(|c| c.name.as_str())) {
            return Err(ProvisionError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        let sql = create_table_sql(schema, table, columns);
        self.diagnostics.debug(COMPONENT, format!("Executing: {sql}"));
        conn.execute(&sql, &[])
            .await
            .map_err(|source| ProvisionError::Execution {
                table: table.to_string(),
                source,
            })?;

        self.diagnostics
            .info(COMPONENT, format!("Table '{table}' created successfully."));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnection;
    use sync_core::{MemoryDiagnostics, QueryError};

    fn user_columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "integer"),
            ColumnDescriptor::new("name", "character varying(64)"),
        ]
    }

    #[test]
    fn test_create_table_sql_quotes_identifiers() {
        assert_eq!(
            create_table_sql("public", "users_copy", &user_columns()),
            "CREATE TABLE IF NOT EXISTS \"public\".\"users_copy\" (\"id\" integer, \"name\" character varying(64))"
        );
        assert_eq!(
            create_table_sql("archive", "Order", &[ColumnDescriptor::new("Total", "numeric(10,2)")]),
            "CREATE TABLE IF NOT EXISTS \"archive\".\"Order\" (\"Total\" numeric(10,2))"
        );
    }

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let provisioner = TableProvisioner::new(Arc::new(MemoryDiagnostics::new()));
        let mut conn = ScriptedConnection::new();
        let journal = conn.journal();

        provisioner
            .ensure_table(&mut conn, "public", "users_copy", &user_columns())
            .await
            .unwrap();
        provisioner
            .ensure_table(&mut conn, "public", "users_copy", &user_columns())
            .await
            .unwrap();

        let statements = journal.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements
            .iter()
            .all(|s| s.starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"users_copy\"")));
    }

    #[tokio::test]
    async fn test_ensure_table_rejects_bad_column_sets_without_sql() {
        let provisioner = TableProvisioner::new(Arc::new(MemoryDiagnostics::new()));
        let mut conn = ScriptedConnection::new();
        let journal = conn.journal();

        let err = provisioner
            .ensure_table(&mut conn, "public", "empty", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::NoColumns { .. }));

        let duplicated = vec![
            ColumnDescriptor::new("id", "integer"),
            ColumnDescriptor::new("id", "bigint"),
        ];
        let err = provisioner
            .ensure_table(&mut conn, "public", "dup", &duplicated)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::DuplicateColumn { ref column, .. } if column == "id"));

        assert!(journal.statements().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_table_wraps_execution_failure() {
        let provisioner = TableProvisioner::new(Arc::new(MemoryDiagnostics::new()));
        let mut conn = ScriptedConnection::new()
            .fail_on("CREATE TABLE", "type \"geometry\" does not exist");

        let err = provisioner
            .ensure_table(&mut conn, "public", "shapes", &[ColumnDescriptor::new("g", "geometry")])
            .await
            .unwrap_err();

        match err {
            ProvisionError::Execution { table, source } => {
                assert_eq!(table, "shapes");
                assert!(matches!(source, QueryError::Execution { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
