//! Runtime coercion between declared field types and values.
//!
//! Dump and load are shape-validating gates on the storage boundary and
//! never coerce; cast is the permissive boundary for untrusted external
//! input, with strict all-or-nothing semantics per value and collection.


use crate::{
    schema::FieldType,
    value::{DateParts, DateTimeParts, TimeParts, Value},
};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// CoerceError
///
/// Failures surfaced by the dump/load storage boundary. A mismatch on dump
/// is an application bug; a mismatch on load indicates corruption or
/// schema drift and must fail loudly.
///

#[derive(Clone, Debug, ThisError)]
pub enum CoerceError {
    #[error("value {value:?} does not match type {ty}")]
    Mismatch { ty: FieldType, value: Value },

    #[error("storage value {value:?} does not name a valid calendar {ty}")]
    InvalidCalendar { ty: FieldType, value: Value },

    #[error("{0}")]
    Custom(String),
}

///
/// CastError
///
/// Failures surfaced by the permissive cast boundary, typically attached
/// to a specific field by a validation layer.
///

#[derive(Clone, Debug, ThisError)]
pub enum CastError {
    #[error("cannot cast {value:?} to type {ty}")]
    Invalid { ty: FieldType, value: Value },

    #[error("{0}")]
    Custom(String),
}

/// Pure shape predicate; no coercion is attempted.
///
/// String, binary and uuid accept the same underlying byte-sequence shapes;
/// they are representationally identical and differ only in intent.
/// Decimal and the calendar kinds accept only their wrapped representations:
/// textual forms and storage tuples are not-of-type.
#[must_use]
pub fn of_type(ty: &FieldType, value: &Value) -> bool {
    match ty {
        FieldType::Any => true,
        FieldType::Boolean => matches!(value, Value::Bool(_)),
        FieldType::Integer => matches!(value, Value::Int(_)),
        FieldType::Float => matches!(value, Value::Float(_)),
        FieldType::String | FieldType::Binary | FieldType::Uuid => {
            matches!(value, Value::Text(_) | Value::Blob(_))
        }
        FieldType::Decimal => matches!(value, Value::Decimal(_)),
        FieldType::Date => matches!(value, Value::Date(_)),
        FieldType::Time => matches!(value, Value::Time(_)),
        FieldType::DateTime => matches!(value, Value::DateTime(_)),
        FieldType::Array(inner) => match value {
            Value::List(items) => items.iter().all(|item| of_type(inner, item)),
            _ => false,
        },
        FieldType::Custom(custom) => of_type(&custom.underlying(), value),
    }
}

/// Convert an in-memory value to its storage-native form.
///
/// Dump is the last gate before a write: it validates shape only, so a
/// failure here surfaces an application bug instead of hiding it. The
/// calendar kinds convert to their parts tuples; every other primitive
/// passes through unchanged after the shape check.
pub fn dump(ty: &FieldType, value: &Value) -> Result<Value, CoerceError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        FieldType::Custom(custom) => custom.dump(value),
        FieldType::Date => match value {
            Value::Date(date) => Ok(Value::DateParts(DateParts::from(*date))),
            _ => Err(mismatch(ty, value)),
        },
        FieldType::Time => match value {
            Value::Time(time) => Ok(Value::TimeParts(TimeParts::from(*time))),
            _ => Err(mismatch(ty, value)),
        },
        FieldType::DateTime => match value {
            Value::DateTime(datetime) => {
                Ok(Value::DateTimeParts(DateTimeParts::from(*datetime)))
            }
            _ => Err(mismatch(ty, value)),
        },
        _ if of_type(ty, value) => Ok(value.clone()),
        _ => Err(mismatch(ty, value)),
    }
}

/// Convert a storage-native value back to its in-memory form.
///
/// Mirror of [`dump`]: parts tuples reassemble into calendar values, and
/// every other primitive is shape-checked without coercion. Data coming
/// back from the store is assumed well-typed, so a mismatch here means
/// corruption or schema drift. A parts tuple naming an impossible calendar
/// date or time fails with [`CoerceError::InvalidCalendar`].
pub fn load(ty: &FieldType, value: &Value) -> Result<Value, CoerceError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        FieldType::Custom(custom) => custom.load(value),
        FieldType::Date => match value {
            Value::DateParts(parts) => parts
                .to_date()
                .map(Value::Date)
                .ok_or_else(|| invalid_calendar(ty, value)),
            _ => Err(mismatch(ty, value)),
        },
        FieldType::Time => match value {
            Value::TimeParts(parts) => parts
                .to_time()
                .map(Value::Time)
                .ok_or_else(|| invalid_calendar(ty, value)),
            _ => Err(mismatch(ty, value)),
        },
        FieldType::DateTime => match value {
            Value::DateTimeParts(parts) => parts
                .to_datetime()
                .map(Value::DateTime)
                .ok_or_else(|| invalid_calendar(ty, value)),
            _ => Err(mismatch(ty, value)),
        },
        _ if of_type(ty, value) => Ok(value.clone()),
        _ => Err(mismatch(ty, value)),
    }
}

/// Coerce arbitrary external input into the declared type.
///
/// The permissive boundary: common textual representations convert, but
/// only when the entire input participates. Already-shaped values pass
/// through untouched; arrays cast element-wise and fail as a whole on the
/// first failing element.
pub fn cast(ty: &FieldType, value: &Value) -> Result<Value, CastError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let FieldType::Custom(custom) = ty {
        return custom.cast(value);
    }
    if of_type(ty, value) {
        return Ok(value.clone());
    }

    match (ty, value) {
        (FieldType::Integer, Value::Text(text)) => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| invalid(ty, value)),
        (FieldType::Float, Value::Text(text)) => text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid(ty, value)),
        (FieldType::Boolean, Value::Text(text)) => match text.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid(ty, value)),
        },
        (FieldType::Decimal, Value::Text(text)) => Decimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|_| invalid(ty, value)),
        (FieldType::Array(inner), Value::List(items)) => {
            let mut cast_items = Vec::with_capacity(items.len());
            for item in items {
                // All-or-nothing: the first failing element aborts the cast.
                cast_items.push(cast(inner, item)?);
            }
            Ok(Value::List(cast_items))
        }
        _ => Err(invalid(ty, value)),
    }
}

/// Report whether a value is semantically empty for its declared type.
///
/// Used by validation to decide whether a required field was effectively
/// left empty.
#[must_use]
pub fn blank(ty: &FieldType, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    if let FieldType::Custom(custom) = ty {
        return custom.is_blank(value);
    }

    match value {
        // Only the space character itself counts; tabs and newlines do not.
        Value::Text(text) => text.chars().all(|c| c == ' '),
        Value::Blob(bytes) => bytes.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

fn mismatch(ty: &FieldType, value: &Value) -> CoerceError {
    CoerceError::Mismatch {
        ty: ty.clone(),
        value: value.clone(),
    }
}

fn invalid_calendar(ty: &FieldType, value: &Value) -> CoerceError {
    CoerceError::InvalidCalendar {
        ty: ty.clone(),
        value: value.clone(),
    }
}

fn invalid(ty: &FieldType, value: &Value) -> CastError {
    CastError::Invalid {
        ty: ty.clone(),
        value: value.clone(),
    }
}
