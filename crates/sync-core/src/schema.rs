//! Column descriptors produced by schema introspection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Type used when a column's type cannot be resolved from the catalog.
pub const FALLBACK_COLUMN_TYPE: &str = "text";

/// A column name paired with its dialect-native type name.
///
/// The type is kept as the literal string the source catalog reported
/// (e.g. `integer`, `character varying(255)`, `numeric(10,2)`) and is written
/// verbatim into the target's CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Dialect-native type name
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// A column whose type could not be resolved.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, FALLBACK_COLUMN_TYPE)
    }
}

/// Return the first name that appears more than once, if any.
pub fn find_duplicate_name<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}
