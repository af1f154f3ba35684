//! Typed cell values
//!
//! A [`Value`] is the normalized in-memory form of a single cell. `Absent`
//! is the null marker filled into unioned rows for columns their source
//! table did not have; it is distinct from every zero value.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Number, Value as JsonValue};

use crate::errors::ValueError;
use crate::schema::ColumnType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered pair of dates with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValueError> {
        if start > end {
            return Err(ValueError::IntervalOrder {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn to_json(&self) -> JsonValue {
        json!({ "start": format_date(self.start), "end": format_date(self.end) })
    }
}

impl Serialize for DateInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DateInterval", 2)?;
        s.serialize_field("start", &format_date(self.start))?;
        s.serialize_field("end", &format_date(self.end))?;
        s.end()
    }
}

/// Normalized cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Char(char),
    String(String),
    Date(NaiveDate),
    DateInterval(DateInterval),
    Absent,
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Column type this value belongs to, `None` for `Absent`
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Real(_) => Some(ColumnType::Real),
            Value::Char(_) => Some(ColumnType::Char),
            Value::String(_) => Some(ColumnType::String),
            Value::Date(_) => Some(ColumnType::Date),
            Value::DateInterval(_) => Some(ColumnType::DateInterval),
            Value::Absent => None,
        }
    }

    /// JSON-native form: numbers, strings, `{start, end}`, or `null`
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Integer(i) => JsonValue::from(*i),
            Value::Real(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Char(c) => JsonValue::String(c.to_string()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(d) => JsonValue::String(format_date(*d)),
            Value::DateInterval(interval) => interval.to_json(),
            Value::Absent => JsonValue::Null,
        }
    }

    /// Decodes a stored value in canonical form.
    ///
    /// Used for documents already normalized at write time: no coercion is
    /// applied and interval ordering is not rechecked. `null` is `Absent`.
    pub fn decode(raw: &JsonValue, column_type: ColumnType) -> Result<Value, ValueError> {
        if raw.is_null() {
            return Ok(Value::Absent);
        }

        match column_type {
            ColumnType::Integer => raw.as_i64().map(Value::Integer).ok_or(ValueError::InvalidInteger),
            ColumnType::Real => raw.as_f64().map(Value::Real).ok_or(ValueError::InvalidReal),
            ColumnType::Char => {
                let s = raw.as_str().ok_or(ValueError::CharNotString)?;
                single_char(s).map(Value::Char)
            }
            ColumnType::String => Ok(Value::String(
                raw.as_str().map_or_else(|| raw.to_string(), str::to_string),
            )),
            ColumnType::Date => {
                let s = raw.as_str().ok_or(ValueError::DateNotString)?;
                parse_date(s).map(Value::Date)
            }
            ColumnType::DateInterval => {
                let obj = raw.as_object().ok_or(ValueError::IntervalShape)?;
                let start = obj.get("start").and_then(JsonValue::as_str);
                let end = obj.get("end").and_then(JsonValue::as_str);
                match (start, end) {
                    (Some(start), Some(end)) => Ok(Value::DateInterval(DateInterval {
                        start: parse_date(start)?,
                        end: parse_date(end)?,
                    })),
                    _ => Err(ValueError::IntervalShape),
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Value::DateInterval(interval) => interval.serialize(serializer),
            Value::Absent => serializer.serialize_none(),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateInterval> for Value {
    fn from(interval: DateInterval) -> Self {
        Value::DateInterval(interval)
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a strict `YYYY-MM-DD` date
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, ValueError> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(ValueError::InvalidDate);
    }
    // chrono skips padding inside numeric fields
    let digits = [&bytes[0..4], &bytes[5..7], &bytes[8..10]];
    if !digits.iter().all(|field| field.iter().all(u8::is_ascii_digit)) {
        return Err(ValueError::InvalidDate);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ValueError::InvalidDate)
}

pub(crate) fn single_char(s: &str) -> Result<char, ValueError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ValueError::CharLength(s.chars().count())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_interval_rejects_reversed_bounds() {
        let err = DateInterval::new(date(2025, 2, 1), date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, ValueError::IntervalOrder { .. }));
        assert!(DateInterval::new(date(2025, 1, 1), date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn test_to_json_forms() {
        assert_eq!(Value::Integer(7).to_json(), json!(7));
        assert_eq!(Value::Real(2.5).to_json(), json!(2.5));
        assert_eq!(Value::Char('x').to_json(), json!("x"));
        assert_eq!(Value::Date(date(2024, 2, 29)).to_json(), json!("2024-02-29"));
        assert_eq!(Value::Absent.to_json(), JsonValue::Null);

        let interval = DateInterval::new(date(2025, 1, 1), date(2025, 1, 3)).unwrap();
        assert_eq!(
            Value::DateInterval(interval).to_json(),
            json!({"start": "2025-01-01", "end": "2025-01-03"})
        );
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let interval = DateInterval::new(date(2025, 1, 1), date(2025, 1, 3)).unwrap();
        for value in [
            Value::Integer(-4),
            Value::Char('é'),
            Value::String("hello".into()),
            Value::Date(date(1999, 12, 31)),
            Value::DateInterval(interval),
            Value::Absent,
        ] {
            assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
        }
    }

    #[test]
    fn test_decode_null_is_absent() {
        for ty in ColumnType::ALL {
            assert_eq!(Value::decode(&JsonValue::Null, ty).unwrap(), Value::Absent);
        }
    }

    #[test]
    fn test_decode_is_structural() {
        assert_eq!(
            Value::decode(&json!(5), ColumnType::Integer).unwrap(),
            Value::Integer(5)
        );
        assert!(Value::decode(&json!("5"), ColumnType::Integer).is_err());
        assert_eq!(
            Value::decode(&json!("2025-03-04"), ColumnType::Date).unwrap(),
            Value::Date(date(2025, 3, 4))
        );
    }

    #[test]
    fn test_parse_date_is_strict() {
        assert!(parse_date("2025-01-01").is_ok());
        assert!(parse_date("2025-1-01").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("01/02/2025").is_err());
        assert!(parse_date("2025- 1-01").is_err());
        assert!(parse_date("2025-01- 1").is_err());
        assert!(parse_date(" 2025-1-1").is_err());
        assert!(parse_date("+025-01-01").is_err());
    }

    #[test]
    fn test_single_char_counts_characters() {
        assert_eq!(single_char("ß").unwrap(), 'ß');
        assert_eq!(single_char("").unwrap_err(), ValueError::CharLength(0));
        assert_eq!(single_char("ab").unwrap_err(), ValueError::CharLength(2));
    }
}
