//! Sync orchestration.
//!
//! One run moves through
//! `Idle -> Connecting -> [Discovering] -> PerTable -> Disconnecting -> Done`,
//! or `Connecting -> Disconnecting -> Failed` when a connection cannot be
//! established. Every table is its own failure domain: whatever goes wrong
//! for one table is logged, recorded in its [`TableSyncResult`], and the run
//! moves on to the next table.

use pg_table_sync_postgresql::{
    Connection, Connector, SchemaInspector, TableProvisioner, TransferEngine,
};
use std::fmt;
use std::sync::Arc;
use sync_core::{
    ConnectionError, Diagnostics, InspectError, SyncError, SyncReport, TablePair,
    TableSyncResult,
};

use crate::config::SyncConfig;

const COMPONENT: &str = "orchestrator";

/// Phase of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Discovering,
    PerTable,
    Disconnecting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Connecting => "connecting",
            RunState::Discovering => "discovering",
            RunState::PerTable => "per-table",
            RunState::Disconnecting => "disconnecting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Drives inspector, provisioner and transfer engine over a pair of sessions.
pub struct Orchestrator<C: Connector> {
    connector: C,
    diagnostics: Arc<dyn Diagnostics>,
    inspector: SchemaInspector,
    provisioner: TableProvisioner,
    engine: TransferEngine,
}

impl<C: Connector> Orchestrator<C> {
    pub fn new(connector: C, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            connector,
            inspector: SchemaInspector::new(diagnostics.clone()),
            provisioner: TableProvisioner::new(diagnostics.clone()),
            engine: TransferEngine::new(diagnostics.clone()),
            diagnostics,
        }
    }

    fn enter(&self, state: &mut RunState, next: RunState) {
        self.diagnostics
            .debug(COMPONENT, format!("Sync run state: {state} -> {next}"));
        *state = next;
    }

    fn connection_failed(&self, state: &mut RunState, err: ConnectionError) -> SyncError {
        self.diagnostics
            .critical(COMPONENT, format!("Sync run aborted: {err}"));
        self.enter(state, RunState::Failed);
        err.into()
    }

    /// Run one full sync pass.
    ///
    /// Only a connection failure fails the run. Both sessions that were
    /// opened are closed before this returns, on every path.
    pub async fn run(&self, config: &SyncConfig) -> Result<SyncReport, SyncError> {
        let mut state = RunState::Idle;
        self.diagnostics.info(
            COMPONENT,
            format!(
                "Starting sync from {} to {}",
                config.source.describe(),
                config.target.describe()
            ),
        );

        self.enter(&mut state, RunState::Connecting);
        let mut source = match self.connector.open(&config.source).await {
            Ok(conn) => conn,
            Err(e) => {
                self.enter(&mut state, RunState::Disconnecting);
                return Err(self.connection_failed(&mut state, e));
            }
        };
        let mut target = match self.connector.open(&config.target).await {
            Ok(conn) => conn,
            Err(e) => {
                self.enter(&mut state, RunState::Disconnecting);
                source.close().await;
                return Err(self.connection_failed(&mut state, e));
            }
        };

        let pairs = if config.mapping.is_wildcard() {
            self.enter(&mut state, RunState::Discovering);
            let discovered = self.inspector.list_tables(&mut source, &config.schema).await;
            config.mapping.resolve(&discovered)
        } else {
            config.mapping.resolve(&[])
        };

        self.enter(&mut state, RunState::PerTable);
        let mut results = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let result = self
                .sync_table(&mut source, &mut target, pair, config)
                .await;
            results.push(result);
        }

        self.enter(&mut state, RunState::Disconnecting);
        source.close().await;
        target.close().await;

        let report = SyncReport::new(results);
        let totals = report.totals;
        self.diagnostics.info(
            COMPONENT,
            format!(
                "Sync finished: {} tables succeeded, {} failed, {} rows transferred, {} rows failed",
                totals.tables_succeeded,
                totals.tables_failed,
                totals.rows_transferred,
                totals.rows_failed
            ),
        );
        if report.has_partial_failures() {
            self.diagnostics.warning(
                COMPONENT,
                "Sync completed with skipped tables or rows; see earlier errors".to_string(),
            );
        }
        self.enter(&mut state, RunState::Done);
        Ok(report)
    }

    async fn sync_table(
        &self,
        source: &mut C::Connection,
        target: &mut C::Connection,
        pair: &TablePair,
        config: &SyncConfig,
    ) -> TableSyncResult {
        let schema = config.schema.as_str();
        let target_schema = config.target_schema.as_str();
        self.diagnostics.info(
            COMPONENT,
            format!("Syncing table '{}' -> '{}'", pair.source, pair.target),
        );

        let columns = self.inspector.get_columns(source, &pair.source, schema).await;
        if columns.is_empty() {
            let err = InspectError::ColumnResolutionFailed {
                table: pair.source.clone(),
                schema: schema.to_string(),
            };
            self.diagnostics
                .error(COMPONENT, format!("Skipping table '{}': {err}", pair.source));
            return TableSyncResult::abandoned(pair, err);
        }

        if self
            .inspector
            .table_exists(target, &pair.target, target_schema)
            .await
        {
            self.diagnostics.info(
                COMPONENT,
                format!(
                    "Target table '{target_schema}.{}' already exists; keeping its schema",
                    pair.target
                ),
            );
        }

        if let Err(e) = self
            .provisioner
            .ensure_table(target, target_schema, &pair.target, &columns)
            .await
        {
            self.diagnostics
                .error(COMPONENT, format!("Skipping table '{}': {e}", pair.source));
            return TableSyncResult::abandoned(pair, e);
        }

        let rows = match self.engine.fetch_all(source, schema, &pair.source).await {
            Ok(rows) => rows,
            Err(e) => {
                self.diagnostics
                    .error(COMPONENT, format!("Skipping table '{}': {e}", pair.source));
                return TableSyncResult::abandoned(pair, e);
            }
        };

        let outcome = self
            .engine
            .copy(target, target_schema, &pair.target, &rows, config.column_mode)
            .await;
        TableSyncResult::completed(pair, outcome.inserted, outcome.failed)
    }
}
