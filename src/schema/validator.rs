//! Type validator for row values
//!
//! Normalization rules:
//! - integer: integers and numeric strings; fractional numbers truncate
//!   toward zero; booleans and overflow are rejected
//! - real: numbers and numeric strings; booleans and non-finite results
//!   are rejected
//! - char: strings of exactly one character
//! - string: strings pass through, anything else becomes its JSON text
//! - date: `YYYY-MM-DD` strings
//! - dateInterval: `{start, end}`, `[start, end]` or `"start..end"`,
//!   with `start <= end`
//!
//! Row validation is full-replace: every column must be supplied and no
//! undeclared key may appear.

use std::num::IntErrorKind;

use serde_json::{Map, Value as JsonValue};

use crate::errors::{TableError, TableResult, ValueError};
use crate::table::Row;
use crate::value::{parse_date, single_char, DateInterval, Value};

use super::types::{Column, ColumnType};

/// Stateless normalizer from JSON input to typed [`Value`]s.
pub struct TypeValidator;

impl TypeValidator {
    /// Normalizes a single raw value against a declared column type.
    pub fn normalize(raw: &JsonValue, column_type: ColumnType) -> Result<Value, ValueError> {
        match column_type {
            ColumnType::Integer => normalize_integer(raw).map(Value::Integer),
            ColumnType::Real => normalize_real(raw).map(Value::Real),
            ColumnType::Char => match raw {
                JsonValue::String(s) => single_char(s).map(Value::Char),
                _ => Err(ValueError::CharNotString),
            },
            ColumnType::String => Ok(Value::String(match raw {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })),
            ColumnType::Date => normalize_date(raw).map(Value::Date),
            ColumnType::DateInterval => normalize_interval(raw).map(Value::DateInterval),
        }
    }

    /// Validates a full row against an ordered schema.
    ///
    /// # Errors
    ///
    /// - `UnexpectedColumns` if `values` has keys outside the schema
    /// - `MissingValue` for the first schema column absent from `values`
    /// - `InvalidValue` for the first value that fails normalization
    pub fn validate_row(schema: &[Column], values: &Map<String, JsonValue>) -> TableResult<Row> {
        let mut extra: Vec<String> = values
            .keys()
            .filter(|key| !schema.iter().any(|c| c.name() == key.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            return Err(TableError::UnexpectedColumns(extra));
        }

        let mut normalized = Vec::with_capacity(schema.len());
        for column in schema {
            let raw = values
                .get(column.name())
                .ok_or_else(|| TableError::MissingValue(column.name().to_string()))?;

            let value = Self::normalize(raw, column.column_type()).map_err(|source| {
                TableError::InvalidValue {
                    column: column.name().to_string(),
                    expected: column.column_type(),
                    value: raw.to_string(),
                    source,
                }
            })?;
            normalized.push((column.name().to_string(), value));
        }

        Ok(Row::from_values(normalized))
    }
}

fn normalize_integer(raw: &JsonValue) -> Result<i64, ValueError> {
    match raw {
        JsonValue::Bool(_) => Err(ValueError::Boolean(ColumnType::Integer)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(ValueError::IntegerOverflow);
            }
            let f = n.as_f64().ok_or(ValueError::InvalidInteger)?.trunc();
            // 2^63 is exactly representable; anything at or above it overflows
            if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(ValueError::IntegerOverflow);
            }
            Ok(f as i64)
        }
        JsonValue::String(s) => s.trim().parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::IntegerOverflow,
            _ => ValueError::InvalidInteger,
        }),
        _ => Err(ValueError::InvalidInteger),
    }
}

fn normalize_real(raw: &JsonValue) -> Result<f64, ValueError> {
    let f = match raw {
        JsonValue::Bool(_) => return Err(ValueError::Boolean(ColumnType::Real)),
        JsonValue::Number(n) => n.as_f64().ok_or(ValueError::InvalidReal)?,
        JsonValue::String(s) => s.trim().parse::<f64>().map_err(|_| ValueError::InvalidReal)?,
        _ => return Err(ValueError::InvalidReal),
    };
    if !f.is_finite() {
        return Err(ValueError::InvalidReal);
    }
    Ok(f)
}

fn normalize_date(raw: &JsonValue) -> Result<chrono::NaiveDate, ValueError> {
    match raw {
        JsonValue::String(s) => parse_date(s),
        _ => Err(ValueError::DateNotString),
    }
}

fn normalize_interval(raw: &JsonValue) -> Result<DateInterval, ValueError> {
    let (start, end) = match raw {
        JsonValue::Object(obj) => match (obj.get("start"), obj.get("end")) {
            (Some(start), Some(end)) => (normalize_date(start)?, normalize_date(end)?),
            _ => return Err(ValueError::IntervalShape),
        },
        JsonValue::Array(items) if items.len() == 2 => {
            (normalize_date(&items[0])?, normalize_date(&items[1])?)
        }
        JsonValue::String(s) => {
            let (start, end) = s.split_once("..").ok_or(ValueError::IntervalShape)?;
            (parse_date(start)?, parse_date(end)?)
        }
        _ => return Err(ValueError::IntervalShape),
    };
    DateInterval::new(start, end)
}
