//! In-memory connection for tests.
//!
//! A [`ScriptedConnection`] answers statements from a list of rules matched
//! by substring, and records every statement it receives in a [`Journal`]
//! that stays readable after the connection has been moved into the code
//! under test. Rules are checked in the order they were added; the first
//! match wins. A statement that matches no rule succeeds with an empty
//! result.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sync_core::{ConnectionError, QueryError, Row, Value};

use crate::connection::{is_read_query, Connection, ConnectionConfig, Connector, QueryResult};

type Predicate = Box<dyn Fn(&[Value]) -> bool + Send + Sync>;

enum Response {
    Answer(QueryResult),
    Fail(String),
}

struct Rule {
    pattern: String,
    predicate: Option<Predicate>,
    response: Response,
}

impl Rule {
    fn matches(&self, statement: &str, params: &[Value]) -> bool {
        statement.contains(&self.pattern)
            && self.predicate.as_ref().map_or(true, |p| p(params))
    }
}

/// One statement as received by a scripted connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub statement: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Default)]
struct JournalState {
    executed: Vec<Executed>,
    closed: bool,
}

/// Shared record of what a scripted connection was asked to do.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Arc<Mutex<JournalState>>,
}

impl Journal {
    fn with_state<T>(&self, f: impl FnOnce(&mut JournalState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.with_state(|s| s.executed.clone())
    }

    pub fn statements(&self) -> Vec<String> {
        self.with_state(|s| s.executed.iter().map(|e| e.statement.clone()).collect())
    }

    /// Statements containing `pattern`, in execution order.
    pub fn matching(&self, pattern: &str) -> Vec<Executed> {
        self.with_state(|s| {
            s.executed
                .iter()
                .filter(|e| e.statement.contains(pattern))
                .cloned()
                .collect()
        })
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.matching(pattern).len()
    }

    pub fn is_closed(&self) -> bool {
        self.with_state(|s| s.closed)
    }
}

/// A [`Connection`] that replays scripted answers.
pub struct ScriptedConnection {
    rules: Vec<Rule>,
    journal: Journal,
    open: bool,
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            journal: Journal::default(),
            open: true,
        }
    }

    /// Handle to this connection's journal.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Answer statements containing `pattern` with `result`.
    pub fn on(mut self, pattern: &str, result: QueryResult) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            predicate: None,
            response: Response::Answer(result),
        });
        self
    }

    /// Answer statements containing `pattern` with rows under `columns`.
    pub fn on_rows(self, pattern: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.on(pattern, QueryResult::with_rows(columns, rows))
    }

    /// Answer statements containing `pattern` whose parameters satisfy
    /// `predicate` with `result`.
    pub fn on_when<F>(mut self, pattern: &str, predicate: F, result: QueryResult) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            predicate: Some(Box::new(predicate)),
            response: Response::Answer(result),
        });
        self
    }

    /// Fail every statement containing `pattern`.
    pub fn fail_on(mut self, pattern: &str, message: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            predicate: None,
            response: Response::Fail(message.to_string()),
        });
        self
    }

    /// Fail statements containing `pattern` whose parameters satisfy `predicate`.
    pub fn fail_when<F>(mut self, pattern: &str, predicate: F, message: &str) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            predicate: Some(Box::new(predicate)),
            response: Response::Fail(message.to_string()),
        });
        self
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(
        &mut self,
        statement: &str,
        params: &[Value],
    ) -> Result<QueryResult, QueryError> {
        if !self.open {
            return Err(QueryError::Closed);
        }
        self.journal.with_state(|s| {
            s.executed.push(Executed {
                statement: statement.to_string(),
                params: params.to_vec(),
            })
        });

        match self.rules.iter().find(|r| r.matches(statement, params)) {
            Some(Rule {
                response: Response::Answer(result),
                ..
            }) => Ok(result.clone()),
            Some(Rule {
                response: Response::Fail(message),
                ..
            }) => Err(QueryError::Execution {
                statement: statement.to_string(),
                message: message.clone(),
            }),
            None if is_read_query(statement) => Ok(QueryResult::empty()),
            None => Ok(QueryResult {
                rows_affected: 1,
                ..QueryResult::empty()
            }),
        }
    }

    async fn close(&mut self) {
        self.open = false;
        self.journal.with_state(|s| s.closed = true);
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// A [`Connector`] that hands out scripted connections by database name.
#[derive(Default)]
pub struct ScriptedConnector {
    connections: Mutex<HashMap<String, ScriptedConnection>>,
    refusals: HashMap<String, String>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `connection` for the next open of `dbname`.
    pub fn with(self, dbname: &str, connection: ScriptedConnection) -> Self {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(dbname.to_string(), connection);
        self
    }

    /// Refuse every open of `dbname`.
    pub fn refuse(mut self, dbname: &str, message: &str) -> Self {
        self.refusals
            .insert(dbname.to_string(), message.to_string());
        self
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn open(&self, config: &ConnectionConfig) -> Result<ScriptedConnection, ConnectionError> {
        if let Some(message) = self.refusals.get(&config.dbname) {
            return Err(ConnectionError::Open {
                target: config.describe(),
                message: message.clone(),
            });
        }
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&config.dbname)
            .ok_or_else(|| ConnectionError::Open {
                target: config.describe(),
                message: format!("no scripted connection for database '{}'", config.dbname),
            })
    }
}
