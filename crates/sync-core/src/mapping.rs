//! Source-to-target table mappings.
//!
//! A mapping is either an explicit, ordered list of pairs or the wildcard,
//! which means "every table the inspector discovers in the source schema,
//! copied to a table of the same name". It is built once from configuration
//! and not modified while a run is in progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source name that selects every discovered table.
pub const WILDCARD: &str = "*";

/// One configured mapping entry as it appears in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Source table name, or `*`
    pub source: String,

    /// Target table name. Defaults to the source name.
    #[serde(default)]
    pub target: Option<String>,
}

impl MappingEntry {
    pub fn new(source: impl Into<String>, target: Option<&str>) -> Self {
        Self {
            source: source.into(),
            target: target.map(str::to_string),
        }
    }

    fn is_wildcard(&self) -> bool {
        self.source.trim() == WILDCARD
    }
}

/// A resolved source/target table pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TablePair {
    pub source: String,
    pub target: String,
}

impl TablePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// A pair copying a table to a target of the same name.
    pub fn same_name(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            source: table.clone(),
            target: table,
        }
    }
}

/// Errors raised while validating configured mapping entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("table mapping is empty")]
    Empty,

    #[error("table mapping entry {index} has an empty source table name")]
    EmptySource { index: usize },

    #[error("table mapping entry for '{source_table}' has an empty target table name")]
    EmptyTarget { source_table: String },

    #[error("the wildcard mapping '*' cannot be combined with explicit table pairs")]
    MixedWildcard,
}

/// The set of tables a sync run should copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMapping {
    /// Discover every table in the source schema.
    All,
    /// Copy exactly these pairs, in order.
    Pairs(Vec<TablePair>),
}

impl TableMapping {
    /// Validate configured entries and build the mapping.
    pub fn from_entries(entries: &[MappingEntry]) -> Result<Self, MappingError> {
        if entries.is_empty() {
            return Err(MappingError::Empty);
        }

        if entries.iter().any(MappingEntry::is_wildcard) {
            if entries.len() > 1 {
                return Err(MappingError::MixedWildcard);
            }
            return Ok(TableMapping::All);
        }

        let mut pairs = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let source = entry.source.trim();
            if source.is_empty() {
                return Err(MappingError::EmptySource { index });
            }
            let target = match entry.target.as_deref().map(str::trim) {
                Some("") => {
                    return Err(MappingError::EmptyTarget {
                        source_table: source.to_string(),
                    })
                }
                Some(target) => target,
                None => source,
            };
            pairs.push(TablePair::new(source, target));
        }
        Ok(TableMapping::Pairs(pairs))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TableMapping::All)
    }

    /// Resolve to concrete pairs.
    ///
    /// `discovered` is only consulted for the wildcard; it is the table list
    /// taken from the source at the start of the run.
    pub fn resolve(&self, discovered: &[String]) -> Vec<TablePair> {
        match self {
            TableMapping::All => discovered.iter().cloned().map(TablePair::same_name).collect(),
            TableMapping::Pairs(pairs) => pairs.clone(),
        }
    }
}
