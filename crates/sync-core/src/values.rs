//! Scalar values and rows.
//!
//! A [`Row`] is what a fetch-all query produces: an ordered list of
//! `(column name, value)` pairs. Order is the order the source returned the
//! columns in, and it is what the transfer engine uses to build INSERT
//! statements.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A single scalar (or null) column value.
///
/// Values carry enough type information to be bound back to a parameter of
/// the same or a compatible server type. Server types without a dedicated
/// variant travel as [`Value::Raw`], which keeps the server's binary encoding
/// untouched so it can be written back to a column of the same type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer width, widened to 64 bits
    Int(i64),
    /// Any floating point width, widened to 64 bits
    Float(f64),
    /// Exact numeric
    Decimal(Decimal),
    /// Text of any flavour (text, varchar, char, name, ...)
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
    /// Date without time
    Date(NaiveDate),
    /// Time without date
    Time(NaiveTime),
    /// Timestamp without timezone
    Timestamp(NaiveDateTime),
    /// Timestamp with timezone
    TimestampTz(DateTime<Utc>),
    /// JSON document (json and jsonb)
    Json(serde_json::Value),
    /// Server value in its binary wire encoding
    Raw {
        /// Server type name, e.g. "inet" or "tsvector"
        type_name: String,
        /// Binary encoding as produced by the server
        bytes: Vec<u8>,
    },
}

impl Value {
    /// Short name of the variant, used in encoding error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
            Value::Json(_) => "json",
            Value::Raw { .. } => "raw",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Timestamp(ts) => write!(f, "{ts}"),
            Value::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Json(j) => write!(f, "{j}"),
            Value::Raw { type_name, bytes } => write!(f, "<{type_name}: {} bytes>", bytes.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An ordered mapping from column name to value.
///
/// Rows do not enforce unique column names: a result set can legitimately
/// carry two columns with the same label, and it is up to the consumer to
/// decide whether that is acceptable (see `find_duplicate_name`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Build a row from `(name, value)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a column at the end of the row.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Look up a column by name. The first occurrence wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in row order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Extract values for `columns` in the given order.
    ///
    /// A column the row does not carry yields [`Value::Null`].
    pub fn values_for<S: AsRef<str>>(&self, columns: &[S]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| self.get(c.as_ref()).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_preserves_column_order() {
        let row = Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("A"))]);
        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(row.get("name"), Some(&Value::Text("A".to_string())));
    }

    #[test]
    fn test_values_for_fills_missing_with_null() {
        let row = Row::from_pairs([("id", Value::Int(7))]);
        let values = row.values_for(&["name", "id"]);
        assert_eq!(values, vec![Value::Null, Value::Int(7)]);
    }

    #[test]
    fn test_row_serializes_as_ordered_map() {
        let mut row = Row::new();
        row.push("b", 2);
        row.push("a", Value::Null);
        row.push("c", "x");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":2,"a":null,"c":"x"}"#);
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<i32> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn test_display_raw_value() {
        let v = Value::Raw {
            type_name: "inet".to_string(),
            bytes: vec![2, 32, 0, 4, 127, 0, 0, 1],
        };
        assert_eq!(v.to_string(), "<inet: 8 bytes>");
        assert_eq!(v.kind(), "raw");
    }
}
