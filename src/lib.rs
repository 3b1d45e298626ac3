//! pg-table-sync
//!
//! Copies tables, schema and rows, from one PostgreSQL database to another,
//! on startup or on demand over HTTP.
//!
//! # Overview
//!
//! - `config` - config file loading and validation
//! - `logging` - tracing subscriber with optional log file
//! - `sync` - the orchestrator driving one sync run
//! - `http` - the HTTP trigger
//!
//! The SQL-speaking components live in `pg_table_sync_postgresql`; the
//! shared data model lives in `sync_core`.
//!
//! # CLI Usage
//!
//! ```bash
//! # One pass, then exit
//! pg-table-sync run --config sync.toml
//!
//! # One pass at startup, then serve GET /sync
//! pg-table-sync serve --config sync.toml --listen 0.0.0.0:8000
//! ```

pub mod config;
pub mod http;
pub mod logging;
pub mod sync;

pub use config::{load_sync_config, AppConfig, ConfigError, SyncConfig};
pub use http::{router, AppState};
pub use sync::{Orchestrator, RunState};
