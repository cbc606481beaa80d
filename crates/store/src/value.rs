//! Display values decoded from arbitrary result columns.
//!
//! The runner does not know the shape of an ad-hoc statement in advance, so
//! each cell is decoded by the column's engine type name.

use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgRow, PgTypeKind};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

/// One decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
    Json(serde_json::Value),
    Interval {
        months: i32,
        days: i32,
        microseconds: i64,
    },
    Bytes(Vec<u8>),
    /// A non-null value of a type the runner cannot decode; holds the type name.
    Unsupported(String),
}

impl Value {
    /// Whether the value is a number (right-aligned when rendered).
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Decimal(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::TimestampTz(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Json(v) => write!(f, "{v}"),
            Self::Interval {
                months,
                days,
                microseconds,
            } => f.write_str(&format_interval(*months, *days, *microseconds)),
            Self::Bytes(bytes) => {
                f.write_str("\\x")?;
                bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
            Self::Unsupported(type_name) => write!(f, "<{type_name}>"),
        }
    }
}

/// Interval text in the server's default `postgres` style, e.g.
/// `1 year 2 mons 3 days 04:05:06`.
fn format_interval(months: i32, days: i32, microseconds: i64) -> String {
    fn unit(n: i32, name: &str) -> String {
        let plural = if n == 1 { "" } else { "s" };
        format!("{n} {name}{plural}")
    }

    let mut parts = Vec::new();
    if months / 12 != 0 {
        parts.push(unit(months / 12, "year"));
    }
    if months % 12 != 0 {
        parts.push(unit(months % 12, "mon"));
    }
    if days != 0 {
        parts.push(unit(days, "day"));
    }
    if microseconds != 0 || parts.is_empty() {
        let sign = if microseconds < 0 { "-" } else { "" };
        let micros = microseconds.unsigned_abs();
        let secs = micros / 1_000_000;
        let mut time = format!(
            "{sign}{:02}:{:02}:{:02}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60
        );
        let fraction = micros % 1_000_000;
        if fraction != 0 {
            time.push('.');
            time.push_str(format!("{fraction:06}").trim_end_matches('0'));
        }
        parts.push(time);
    }
    parts.join(" ")
}

/// Decode an optional column value, mapping SQL NULL to [`Value::Null`].
fn get<'r, T>(row: &'r PgRow, index: usize, wrap: impl FnOnce(T) -> Value) -> Result<Value, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    Ok(row.try_get::<Option<T>, _>(index)?.map_or(Value::Null, wrap))
}

/// Decode the cell at `index` of `row`.
///
/// Never fails: cells that cannot be decoded become [`Value::Unsupported`].
pub(crate) fn decode_cell(row: &PgRow, index: usize) -> Value {
    let Some(column) = row.columns().get(index) else {
        return Value::Null;
    };
    let type_name = column.type_info().name();

    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Unsupported(type_name.to_owned()),
    }

    let decoded = match type_name {
        "BOOL" => get(row, index, Value::Bool),
        "INT2" => get(row, index, |v: i16| Value::Int(i64::from(v))),
        "INT4" => get(row, index, |v: i32| Value::Int(i64::from(v))),
        "INT8" => get(row, index, Value::Int),
        "FLOAT4" => get(row, index, |v: f32| Value::Float(f64::from(v))),
        "FLOAT8" => get(row, index, Value::Float),
        "NUMERIC" => get(row, index, Value::Decimal),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => get(row, index, Value::Text),
        "TIMESTAMP" => get(row, index, Value::Timestamp),
        "TIMESTAMPTZ" => get(row, index, Value::TimestampTz),
        "DATE" => get(row, index, Value::Date),
        "TIME" => get(row, index, Value::Time),
        "UUID" => get(row, index, Value::Uuid),
        "JSON" | "JSONB" => get(row, index, Value::Json),
        "OID" => get(row, index, |v: Oid| Value::Int(i64::from(v.0))),
        "INTERVAL" => get(row, index, |v: PgInterval| Value::Interval {
            months: v.months,
            days: v.days,
            microseconds: v.microseconds,
        }),
        "BYTEA" => get(row, index, Value::Bytes),
        // Enum labels are UTF-8 in both wire formats
        _ if matches!(column.type_info().kind(), PgTypeKind::Enum(_)) => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map(|v| v.map_or(Value::Null, Value::Text)),
        _ => return Value::Unsupported(type_name.to_owned()),
    };

    decoded.unwrap_or_else(|_| Value::Unsupported(type_name.to_owned()))
}
