//! HTTP trigger.
//!
//! - `GET /` - liveness
//! - `GET /sync` - reload the config file and run one sync pass
//!
//! Overlapping `/sync` requests are not serialized; each one opens its own
//! pair of sessions.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pg_table_sync_postgresql::Connector;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use sync_core::SyncReport;

use crate::config::load_sync_config;
use crate::sync::Orchestrator;

pub const SERVICE_NAME: &str = "pg-table-sync";

/// Shared state of the HTTP handlers.
pub struct AppState<C: Connector> {
    orchestrator: Arc<Orchestrator<C>>,
    config_path: Arc<PathBuf>,
}

impl<C: Connector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            config_path: self.config_path.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(orchestrator: Orchestrator<C>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config_path: Arc::new(config_path.into()),
        }
    }

    /// Load the config file and run one sync pass.
    pub async fn trigger(&self) -> anyhow::Result<SyncReport> {
        let config = load_sync_config(self.config_path.as_path()).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })?;
        let report = self.orchestrator.run(&config).await?;
        Ok(report)
    }
}

pub fn router<C: Connector + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/sync", get(trigger_sync::<C>))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn trigger_sync<C: Connector + 'static>(State(state): State<AppState<C>>) -> Response {
    match state.trigger().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "report": report })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Sync triggered over HTTP failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pg_table_sync_postgresql::testing::{ScriptedConnection, ScriptedConnector};
    use std::io::Write;
    use sync_core::MemoryDiagnostics;
    use tower::ServiceExt;

    const WILDCARD_CONFIG: &str = r#"
tables = "*"

[source]
host = "localhost"
user = "postgres"
dbname = "src"

[target]
host = "localhost"
user = "postgres"
dbname = "dst"
"#;

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(WILDCARD_CONFIG.as_bytes()).unwrap();
        file
    }

    fn app(connector: ScriptedConnector, config_path: &std::path::Path) -> Router {
        let orchestrator = Orchestrator::new(connector, Arc::new(MemoryDiagnostics::new()));
        router(AppState::new(orchestrator, config_path))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_is_static() {
        let app = app(ScriptedConnector::new(), std::path::Path::new("unused.toml"));
        let (status, body) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "service": "pg-table-sync" }));
    }

    #[tokio::test]
    async fn test_sync_success_returns_report() {
        let file = config_file();
        let connector = ScriptedConnector::new()
            .with("src", ScriptedConnection::new())
            .with("dst", ScriptedConnection::new());

        let (status, body) = get_json(app(connector, file.path()), "/sync").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["report"]["tables"], json!([]));
        assert_eq!(body["report"]["totals"]["tables_failed"], 0);
    }

    #[tokio::test]
    async fn test_sync_connection_failure_is_server_error() {
        let file = config_file();
        let connector = ScriptedConnector::new().refuse("src", "connection refused");

        let (status, body) = get_json(app(connector, file.path()), "/sync").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body["message"]
            .as_str()
            .is_some_and(|m| m.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_sync_missing_config_is_server_error() {
        let app = app(
            ScriptedConnector::new(),
            std::path::Path::new("/definitely/not/here.toml"),
        );
        let (status, body) = get_json(app, "/sync").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Failed to load configuration")));
    }
}
