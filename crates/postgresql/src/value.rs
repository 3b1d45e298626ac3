//! Conversion between PostgreSQL wire values and [`sync_core::Value`].
//!
//! Reading decodes each column by its server type. Writing binds a value to
//! whatever type the server inferred for the placeholder, so an `Int` read
//! from an `int8` column can still be inserted into an `int4` column as long
//! as it fits. Types without a dedicated variant are carried as
//! [`Value::Raw`] and written back byte-for-byte to a column of the same type.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres_types::to_sql_checked;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use sync_core::{QueryError, Row, Value};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub struct PgValue(pub Value);

/// A value bound as a statement parameter.
#[derive(Debug, Clone, Copy)]
pub struct PgParam<'a>(pub &'a Value);

fn is_text_type(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

fn raw_value(ty: &Type, raw: &[u8]) -> Value {
    Value::Raw {
        type_name: ty.name().to_string(),
        bytes: raw.to_vec(),
    }
}

fn decode_typed(ty: &Type, raw: &[u8]) -> Result<Value, BoxError> {
    let value = match *ty {
        Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
        Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
        Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
        Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
        Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
        Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
        Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
        Type::NUMERIC => Value::Decimal(Decimal::from_sql(ty, raw)?),
        Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
        Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
        Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
        Type::TIME => Value::Time(NaiveTime::from_sql(ty, raw)?),
        Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
        Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
        Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
        _ if is_text_type(ty) => Value::Text(String::from_sql(ty, raw)?),
        _ => raw_value(ty, raw),
    };
    Ok(value)
}

impl<'a> FromSql<'a> for PgValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        // Values the typed decoders reject (NaN numerics, infinite dates)
        // are still copyable as raw bytes.
        Ok(PgValue(
            decode_typed(ty, raw).unwrap_or_else(|_| raw_value(ty, raw)),
        ))
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(PgValue(Value::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// Decode a fetched row into a [`Row`], keeping column order.
pub fn decode_row(row: &tokio_postgres::Row) -> Result<Row, QueryError> {
    let mut decoded = Row::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        let value: PgValue = row.try_get(index).map_err(|e| QueryError::Decode {
            column: column.name().to_string(),
            message: e.to_string(),
        })?;
        decoded.push(column.name(), value.0);
    }
    Ok(decoded)
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    anyhow::anyhow!(
        "cannot bind a {} value to a parameter of type {}",
        value.kind(),
        ty.name()
    )
    .into()
}

/// Text rendering used when the target parameter is text-typed.
fn text_repr(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bytes(_) | Value::Raw { .. } => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Decimal(d) => Some(d.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Uuid(u) => Some(u.to_string()),
        Value::Date(d) => Some(d.to_string()),
        Value::Time(t) => Some(t.to_string()),
        Value::Timestamp(ts) => Some(ts.to_string()),
        Value::TimestampTz(ts) => Some(ts.to_rfc3339()),
        Value::Json(j) => Some(j.to_string()),
    }
}

fn encode_as_text(value: &Value, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match text_repr(value) {
        Some(text) if is_text_type(ty) => text.as_str().to_sql(ty, out),
        _ => Err(mismatch(value, ty)),
    }
}

fn encode_text(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::UUID => Uuid::parse_str(s)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::Value::from_str(s)?.to_sql(ty, out),
        Type::NUMERIC => Decimal::from_str(s)?.to_sql(ty, out),
        Type::INT2 => s.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => s.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => s.trim().parse::<i64>()?.to_sql(ty, out),
        Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        Type::BOOL => s.trim().parse::<bool>()?.to_sql(ty, out),
        _ if is_text_type(ty) => s.to_sql(ty, out),
        _ => Err(mismatch(&Value::Text(s.to_string()), ty)),
    }
}

fn encode_value(value: &Value, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match value {
        Value::Null => Ok(IsNull::Yes),
        Value::Bool(b) => match *ty {
            Type::BOOL => b.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Int(i) => match *ty {
            Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
            Type::INT8 => i.to_sql(ty, out),
            Type::OID => u32::try_from(*i)?.to_sql(ty, out),
            Type::FLOAT4 => (*i as f32).to_sql(ty, out),
            Type::FLOAT8 => (*i as f64).to_sql(ty, out),
            Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Float(f) => match *ty {
            Type::FLOAT4 => (*f as f32).to_sql(ty, out),
            Type::FLOAT8 => f.to_sql(ty, out),
            Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Decimal(d) => match *ty {
            Type::NUMERIC => d.to_sql(ty, out),
            Type::FLOAT8 => d
                .to_f64()
                .ok_or_else(|| mismatch(value, ty))?
                .to_sql(ty, out),
            Type::INT8 => d.to_i64().ok_or_else(|| mismatch(value, ty))?.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Text(s) => encode_text(s, ty, out),
        Value::Bytes(b) => match *ty {
            Type::BYTEA => b.as_slice().to_sql(ty, out),
            _ => Err(mismatch(value, ty)),
        },
        Value::Uuid(u) => match *ty {
            Type::UUID => u.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Date(d) => match *ty {
            Type::DATE => d.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Time(t) => match *ty {
            Type::TIME => t.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Timestamp(ts) => match *ty {
            Type::TIMESTAMP => ts.to_sql(ty, out),
            Type::TIMESTAMPTZ => ts.and_utc().to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::TimestampTz(ts) => match *ty {
            Type::TIMESTAMPTZ => ts.to_sql(ty, out),
            Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Json(j) => match *ty {
            Type::JSON | Type::JSONB => j.to_sql(ty, out),
            _ => encode_as_text(value, ty, out),
        },
        Value::Raw { type_name, bytes } => {
            if ty.name() == type_name {
                out.extend_from_slice(bytes);
                Ok(IsNull::No)
            } else {
                Err(mismatch(value, ty))
            }
        }
    }
}

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        encode_value(self.0, ty, out)
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
