//! Schema inspection with fallback strategy chains.
//!
//! Table discovery and column resolution each walk an ordered list of
//! strategies. A strategy either finds a non-empty result or asks for the
//! next one to be tried. A strategy that fails with a query error is logged
//! and skipped the same way, unless it names a later strategy to resume at.
//! When every strategy has been tried the inspector returns an empty list.
//! Callers decide what an empty list means.

use async_trait::async_trait;
use std::sync::Arc;
use sync_core::{ColumnDescriptor, Diagnostics, InspectError, QueryError, Row, Value};

use crate::connection::Connection;
use crate::identifier::qualified_table;

const COMPONENT: &str = "inspector";

const SCHEMA_TABLES_SQL: &str =
    "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = $1::text ORDER BY tablename";

const SEARCH_PATH_SQL: &str = "SHOW search_path";

const SESSION_USER_SQL: &str =
    "SELECT current_user::text AS current_user, current_database()::text AS current_database";

const VISIBLE_RELATIONS_SQL: &str = "SELECT c.relname AS table_name \
     FROM pg_catalog.pg_class c \
     LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
     WHERE c.relkind = 'r' \
     AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
     AND c.relname !~ '^pg_' \
     ORDER BY c.relname";

const OWNED_TABLES_SQL: &str =
    "SELECT tablename FROM pg_catalog.pg_tables WHERE tableowner = current_user ORDER BY tablename";

const CATALOG_COLUMNS_SQL: &str = "SELECT a.attname AS column_name, \
     pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type \
     FROM pg_catalog.pg_attribute a \
     JOIN pg_catalog.pg_class c ON a.attrelid = c.oid \
     JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid \
     WHERE n.nspname = $1::text \
     AND c.relname = $2::text \
     AND a.attnum > 0 \
     AND NOT a.attisdropped \
     ORDER BY a.attnum";

// The zero-row path may have resolved the table through search_path, so the
// type lookup does not filter on schema; it only prefers the requested one.
const COLUMN_TYPE_SQL: &str = "SELECT data_type::text AS data_type \
     FROM information_schema.columns \
     WHERE table_name = $1::text AND column_name = $2::text \
     ORDER BY (table_schema = $3::text) DESC \
     LIMIT 1";

const INFORMATION_SCHEMA_COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, \
     data_type::text AS data_type \
     FROM information_schema.columns \
     WHERE table_schema = $1::text AND table_name = $2::text \
     ORDER BY ordinal_position";

const TABLE_COUNT_SQL: &str = "SELECT COUNT(*) AS count FROM pg_catalog.pg_tables \
     WHERE schemaname = $1::text AND tablename = $2::text";

const TABLE_EXISTS_SQL: &str = "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
     WHERE table_schema = $1::text AND table_name = $2::text) AS exists";

const INFORMATION_SCHEMA_COLUMNS: &str = "information_schema columns";

/// Result of one strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome<T> {
    Found(T),
    TryNext,
}

impl<T> StrategyOutcome<Vec<T>> {
    /// `Found` for a non-empty list, `TryNext` otherwise.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            StrategyOutcome::TryNext
        } else {
            StrategyOutcome::Found(items)
        }
    }
}

/// One way of listing the tables of a schema.
#[async_trait]
pub trait TableStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<String>>, QueryError>;
}

/// One way of resolving the columns of a table.
#[async_trait]
pub trait ColumnStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Name of the strategy to resume at when this one fails with an error.
    /// `None` resumes at the next one in line.
    fn on_error_skip_to(&self) -> Option<&'static str> {
        None
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        schema: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<ColumnDescriptor>>, QueryError>;
}

fn text_column(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get(column).and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn column_descriptors(rows: &[Row]) -> Vec<ColumnDescriptor> {
    rows.iter()
        .filter_map(|row| {
            let name = row.get("column_name").and_then(Value::as_str)?;
            let data_type = row.get("data_type").and_then(Value::as_str)?;
            Some(ColumnDescriptor::new(name, data_type))
        })
        .collect()
}

/// Tables listed in `pg_tables` for the requested schema.
pub struct SchemaTables;

#[async_trait]
impl TableStrategy for SchemaTables {
    fn name(&self) -> &'static str {
        "schema tables"
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        _diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<String>>, QueryError> {
        let result = conn
            .execute(SCHEMA_TABLES_SQL, &[Value::from(schema)])
            .await?;
        Ok(StrategyOutcome::from_items(text_column(&result.rows, "tablename")))
    }
}

/// Logs the session's search path, user and database. Never finds anything.
pub struct SessionDiagnostics;

#[async_trait]
impl TableStrategy for SessionDiagnostics {
    fn name(&self) -> &'static str {
        "session diagnostics"
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<String>>, QueryError> {
        let search_path = conn.execute(SEARCH_PATH_SQL, &[]).await?;
        diagnostics.debug(
            COMPONENT,
            format!("Current search_path: {:?}", search_path.rows),
        );

        let session = conn.execute(SESSION_USER_SQL, &[]).await?;
        diagnostics.debug(
            COMPONENT,
            format!("Current user and database: {:?}", session.rows),
        );

        Ok(StrategyOutcome::TryNext)
    }
}

/// Ordinary tables visible to the session in any non-system namespace.
pub struct VisibleRelations;

#[async_trait]
impl TableStrategy for VisibleRelations {
    fn name(&self) -> &'static str {
        "visible relations"
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<String>>, QueryError> {
        let result = conn.execute(VISIBLE_RELATIONS_SQL, &[]).await?;
        let tables = text_column(&result.rows, "table_name");
        if !tables.is_empty() {
            diagnostics.warning(
                COMPONENT,
                format!("Using unfiltered table list: {tables:?}"),
            );
        }
        Ok(StrategyOutcome::from_items(tables))
    }
}

/// Tables owned by the session user, in any schema.
pub struct OwnedTables;

#[async_trait]
impl TableStrategy for OwnedTables {
    fn name(&self) -> &'static str {
        "owned tables"
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        _diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<String>>, QueryError> {
        let result = conn.execute(OWNED_TABLES_SQL, &[]).await?;
        Ok(StrategyOutcome::from_items(text_column(&result.rows, "tablename")))
    }
}

/// Live attributes from the system catalog, in attribute order.
pub struct CatalogColumns;

#[async_trait]
impl ColumnStrategy for CatalogColumns {
    fn name(&self) -> &'static str {
        "catalog columns"
    }

    // The zero-row select only covers an empty catalog answer. A failing
    // catalog goes straight to information_schema.
    fn on_error_skip_to(&self) -> Option<&'static str> {
        Some(INFORMATION_SCHEMA_COLUMNS)
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        schema: &str,
        _diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<ColumnDescriptor>>, QueryError> {
        let result = conn
            .execute(CATALOG_COLUMNS_SQL, &[Value::from(schema), Value::from(table)])
            .await?;
        Ok(StrategyOutcome::from_items(column_descriptors(&result.rows)))
    }
}

/// Column names from the result descriptor of `SELECT * ... LIMIT 0`, typed
/// one by one through `information_schema`.
pub struct ZeroRowSelect;

#[async_trait]
impl ColumnStrategy for ZeroRowSelect {
    fn name(&self) -> &'static str {
        "zero-row select"
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        schema: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<ColumnDescriptor>>, QueryError> {
        let zero_row_sql = format!("SELECT * FROM {} LIMIT 0", qualified_table(schema, table));
        let names = conn.execute(&zero_row_sql, &[]).await?.columns;

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let lookup = conn
                .execute(
                    COLUMN_TYPE_SQL,
                    &[Value::from(table), Value::from(name.as_str()), Value::from(schema)],
                )
                .await?;
            let column = match text_column(&lookup.rows, "data_type").into_iter().next() {
                Some(data_type) => ColumnDescriptor::new(name, data_type),
                None => {
                    diagnostics.debug(
                        COMPONENT,
                        format!("No type found for column '{name}' of '{table}', using fallback"),
                    );
                    ColumnDescriptor::untyped(name)
                }
            };
            columns.push(column);
        }

        Ok(StrategyOutcome::from_items(columns))
    }
}

/// Plain `information_schema.columns` lookup by schema and table.
pub struct InformationSchemaColumns;

#[async_trait]
impl ColumnStrategy for InformationSchemaColumns {
    fn name(&self) -> &'static str {
        INFORMATION_SCHEMA_COLUMNS
    }

    async fn attempt(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        schema: &str,
        _diagnostics: &dyn Diagnostics,
    ) -> Result<StrategyOutcome<Vec<ColumnDescriptor>>, QueryError> {
        let result = conn
            .execute(
                INFORMATION_SCHEMA_COLUMNS_SQL,
                &[Value::from(schema), Value::from(table)],
            )
            .await?;
        Ok(StrategyOutcome::from_items(column_descriptors(&result.rows)))
    }
}

/// Table discovery and column resolution over a connection.
pub struct SchemaInspector {
    table_strategies: Vec<Box<dyn TableStrategy>>,
    column_strategies: Vec<Box<dyn ColumnStrategy>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SchemaInspector {
    /// An inspector with the default strategy chains.
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self::with_strategies(
            diagnostics,
            vec![
                Box::new(SchemaTables),
                Box::new(SessionDiagnostics),
                Box::new(VisibleRelations),
                Box::new(OwnedTables),
            ],
            vec![
                Box::new(CatalogColumns),
                Box::new(ZeroRowSelect),
                Box::new(InformationSchemaColumns),
            ],
        )
    }

    pub fn with_strategies(
        diagnostics: Arc<dyn Diagnostics>,
        table_strategies: Vec<Box<dyn TableStrategy>>,
        column_strategies: Vec<Box<dyn ColumnStrategy>>,
    ) -> Self {
        Self {
            table_strategies,
            column_strategies,
            diagnostics,
        }
    }

    /// List the tables to copy from `schema`. Empty when nothing is found.
    pub async fn list_tables(&self, conn: &mut dyn Connection, schema: &str) -> Vec<String> {
        self.diagnostics
            .info(COMPONENT, format!("Fetching tables in schema '{schema}'"));

        for strategy in &self.table_strategies {
            match strategy
                .attempt(conn, schema, self.diagnostics.as_ref())
                .await
            {
                Ok(StrategyOutcome::Found(tables)) if !tables.is_empty() => {
                    self.diagnostics.info(
                        COMPONENT,
                        format!(
                            "Found {} tables in schema '{schema}' using {}",
                            tables.len(),
                            strategy.name()
                        ),
                    );
                    return tables;
                }
                Ok(_) => {
                    self.diagnostics.debug(
                        COMPONENT,
                        format!("Strategy '{}' found no tables", strategy.name()),
                    );
                }
                Err(e) => {
                    self.diagnostics.error(
                        COMPONENT,
                        format!("Table discovery strategy '{}' failed: {e}", strategy.name()),
                    );
                }
            }
        }

        self.diagnostics.warning(
            COMPONENT,
            InspectError::DiscoveryExhausted {
                schema: schema.to_string(),
            }
            .to_string(),
        );
        Vec::new()
    }

    /// Resolve the ordered columns of `table`. Empty when nothing resolves.
    pub async fn get_columns(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        schema: &str,
    ) -> Vec<ColumnDescriptor> {
        self.diagnostics.debug(
            COMPONENT,
            format!("Fetching columns for table '{table}' in schema '{schema}'"),
        );

        let mut next = 0;
        while let Some(strategy) = self.column_strategies.get(next) {
            next += 1;
            match strategy
                .attempt(conn, table, schema, self.diagnostics.as_ref())
                .await
            {
                Ok(StrategyOutcome::Found(columns)) if !columns.is_empty() => {
                    self.diagnostics.debug(
                        COMPONENT,
                        format!(
                            "Found {} columns for table '{table}' using {}",
                            columns.len(),
                            strategy.name()
                        ),
                    );
                    return columns;
                }
                Ok(_) => {
                    self.diagnostics.debug(
                        COMPONENT,
                        format!("Strategy '{}' found no columns for '{table}'", strategy.name()),
                    );
                }
                Err(e) => {
                    self.diagnostics.error(
                        COMPONENT,
                        format!(
                            "Column strategy '{}' failed for table '{table}': {e}",
                            strategy.name()
                        ),
                    );
                    if let Some(resume) = strategy.on_error_skip_to() {
                        if let Some(position) = self.column_strategies[next..]
                            .iter()
                            .position(|s| s.name() == resume)
                        {
                            next += position;
                            self.diagnostics.debug(
                                COMPONENT,
                                format!("Resuming column resolution at '{resume}'"),
                            );
                        }
                    }
                }
            }
        }

        self.diagnostics.warning(
            COMPONENT,
            InspectError::ColumnResolutionFailed {
                table: table.to_string(),
                schema: schema.to_string(),
            }
            .to_string(),
        );
        Vec::new()
    }

    /// Whether `table` exists in `schema`. False when it cannot be determined.
    pub async fn table_exists(&self, conn: &mut dyn Connection, table: &str, schema: &str) -> bool {
        let params = [Value::from(schema), Value::from(table)];

        match conn.execute(TABLE_COUNT_SQL, &params).await {
            Ok(result) => {
                let exists = result
                    .rows
                    .first()
                    .and_then(|row| row.get("count"))
                    .and_then(Value::as_i64)
                    .is_some_and(|count| count > 0);
                self.diagnostics
                    .debug(COMPONENT, format!("Table '{table}' exists: {exists}"));
                return exists;
            }
            Err(e) => {
                self.diagnostics
                    .error(COMPONENT, format!("Error checking if table exists: {e}"));
            }
        }

        match conn.execute(TABLE_EXISTS_SQL, &params).await {
            Ok(result) => matches!(
                result.rows.first().and_then(|row| row.get("exists")),
                Some(Value::Bool(true))
            ),
            Err(e) => {
                self.diagnostics
                    .error(COMPONENT, format!("Fallback query also failed: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::QueryResult;
    use crate::testing::ScriptedConnection;
    use sync_core::{MemoryDiagnostics, Severity};

    fn inspector() -> (SchemaInspector, Arc<MemoryDiagnostics>) {
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        (SchemaInspector::new(diagnostics.clone()), diagnostics)
    }

    fn names(rows: &[&str], column: &str) -> Vec<Row> {
        rows.iter()
            .map(|name| Row::from_pairs([(column, *name)]))
            .collect()
    }

    #[tokio::test]
    async fn test_list_tables_uses_schema_catalog_first() {
        let (inspector, _) = inspector();
        let mut conn = ScriptedConnection::new().on_rows(
            SCHEMA_TABLES_SQL,
            &["tablename"],
            names(&["orders", "users"], "tablename"),
        );
        let journal = conn.journal();

        let tables = inspector.list_tables(&mut conn, "public").await;

        assert_eq!(tables, vec!["orders", "users"]);
        assert_eq!(journal.statements(), vec![SCHEMA_TABLES_SQL.to_string()]);
        assert_eq!(journal.executed()[0].params, vec![Value::from("public")]);
    }

    #[tokio::test]
    async fn test_list_tables_falls_back_to_visible_relations() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new()
            .on_rows(SEARCH_PATH_SQL, &["search_path"], names(&["\"$user\", public"], "search_path"))
            .on_rows(
                VISIBLE_RELATIONS_SQL,
                &["table_name"],
                names(&["a", "b"], "table_name"),
            );
        let journal = conn.journal();

        let tables = inspector.list_tables(&mut conn, "public").await;

        assert_eq!(tables, vec!["a", "b"]);
        assert_eq!(journal.count(SEARCH_PATH_SQL), 1);
        assert_eq!(journal.count(SESSION_USER_SQL), 1);
        assert_eq!(journal.count(OWNED_TABLES_SQL), 0);
        assert!(diagnostics.contains(Severity::Warning, "unfiltered table list"));
        assert!(diagnostics.contains(Severity::Debug, "search_path"));
    }

    #[tokio::test]
    async fn test_list_tables_continues_after_failing_strategy() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new()
            .fail_on(SCHEMA_TABLES_SQL, "permission denied for view pg_tables")
            .fail_on(SEARCH_PATH_SQL, "unrecognized configuration parameter")
            .on_rows(OWNED_TABLES_SQL, &["tablename"], names(&["mine"], "tablename"));

        let tables = inspector.list_tables(&mut conn, "public").await;

        assert_eq!(tables, vec!["mine"]);
        assert_eq!(diagnostics.count(Severity::Error), 2);
    }

    #[tokio::test]
    async fn test_list_tables_exhausted_returns_empty() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new();

        let tables = inspector.list_tables(&mut conn, "empty").await;

        assert!(tables.is_empty());
        assert!(diagnostics.contains(Severity::Warning, "no tables found in schema 'empty'"));
    }

    #[tokio::test]
    async fn test_get_columns_from_catalog_keeps_attribute_order() {
        let (inspector, _) = inspector();
        let mut conn = ScriptedConnection::new().on_rows(
            CATALOG_COLUMNS_SQL,
            &["column_name", "data_type"],
            vec![
                Row::from_pairs([("column_name", "id"), ("data_type", "integer")]),
                Row::from_pairs([("column_name", "name"), ("data_type", "character varying(64)")]),
            ],
        );

        let columns = inspector.get_columns(&mut conn, "users", "public").await;

        assert_eq!(
            columns,
            vec![
                ColumnDescriptor::new("id", "integer"),
                ColumnDescriptor::new("name", "character varying(64)"),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_columns_zero_row_select_resolves_types() {
        let (inspector, _) = inspector();
        let descriptor = QueryResult::with_rows(
            vec!["id".to_string(), "name".to_string(), "payload".to_string()],
            Vec::new(),
        );
        let mut conn = ScriptedConnection::new()
            .on("SELECT * FROM \"public\".\"users\" LIMIT 0", descriptor)
            .on_when(
                COLUMN_TYPE_SQL,
                |p| p.get(1) == Some(&Value::from("id")),
                QueryResult::with_rows(
                    vec!["data_type".to_string()],
                    names(&["integer"], "data_type"),
                ),
            )
            .on_when(
                COLUMN_TYPE_SQL,
                |p| p.get(1) == Some(&Value::from("name")),
                QueryResult::with_rows(
                    vec!["data_type".to_string()],
                    names(&["character varying"], "data_type"),
                ),
            );
        let journal = conn.journal();

        let columns = inspector.get_columns(&mut conn, "users", "public").await;

        assert_eq!(
            columns,
            vec![
                ColumnDescriptor::new("id", "integer"),
                ColumnDescriptor::new("name", "character varying"),
                ColumnDescriptor::new("payload", "text"),
            ]
        );
        assert_eq!(journal.count(COLUMN_TYPE_SQL), 3);
        assert_eq!(journal.count(INFORMATION_SCHEMA_COLUMNS_SQL), 0);
    }

    #[tokio::test]
    async fn test_get_columns_catalog_error_skips_zero_row_select() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new()
            .fail_on(CATALOG_COLUMNS_SQL, "permission denied for table pg_attribute")
            .on("LIMIT 0", QueryResult::with_rows(vec!["id".to_string()], Vec::new()))
            .on_rows(
                INFORMATION_SCHEMA_COLUMNS_SQL,
                &["column_name", "data_type"],
                vec![Row::from_pairs([("column_name", "id"), ("data_type", "bigint")])],
            );
        let journal = conn.journal();

        let columns = inspector.get_columns(&mut conn, "users", "public").await;

        assert_eq!(columns, vec![ColumnDescriptor::new("id", "bigint")]);
        assert_eq!(journal.count("LIMIT 0"), 0);
        assert_eq!(journal.count(COLUMN_TYPE_SQL), 0);
        assert_eq!(journal.count(INFORMATION_SCHEMA_COLUMNS_SQL), 1);
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_get_columns_zero_row_error_falls_through_to_information_schema() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new()
            .fail_on("LIMIT 0", "relation \"sales\".\"users\" does not exist")
            .on_rows(
                INFORMATION_SCHEMA_COLUMNS_SQL,
                &["column_name", "data_type"],
                vec![Row::from_pairs([("column_name", "id"), ("data_type", "bigint")])],
            );
        let journal = conn.journal();

        let columns = inspector.get_columns(&mut conn, "users", "sales").await;

        assert_eq!(columns, vec![ColumnDescriptor::new("id", "bigint")]);
        assert_eq!(
            journal.matching("LIMIT 0")[0].statement,
            "SELECT * FROM \"sales\".\"users\" LIMIT 0"
        );
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_get_columns_unresolved_returns_empty() {
        let (inspector, diagnostics) = inspector();
        let mut conn = ScriptedConnection::new();

        let columns = inspector.get_columns(&mut conn, "ghost", "public").await;

        assert!(columns.is_empty());
        assert!(diagnostics.contains(Severity::Warning, "could not resolve columns for table 'ghost'"));
    }

    #[tokio::test]
    async fn test_table_exists_primary_and_fallback() {
        let (inspector, _) = inspector();

        let mut present = ScriptedConnection::new().on_rows(
            TABLE_COUNT_SQL,
            &["count"],
            vec![Row::from_pairs([("count", 1i64)])],
        );
        assert!(inspector.table_exists(&mut present, "users", "public").await);

        let mut fallback = ScriptedConnection::new()
            .fail_on(TABLE_COUNT_SQL, "permission denied")
            .on_rows(
                TABLE_EXISTS_SQL,
                &["exists"],
                vec![Row::from_pairs([("exists", true)])],
            );
        assert!(inspector.table_exists(&mut fallback, "users", "public").await);

        let mut broken = ScriptedConnection::new()
            .fail_on(TABLE_COUNT_SQL, "permission denied")
            .fail_on(TABLE_EXISTS_SQL, "permission denied");
        assert!(!inspector.table_exists(&mut broken, "users", "public").await);
    }
}
