//! Typed runtime values.

use crate::types::DataType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// A single SQL value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    BigInt(i64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Varchar(String),
    Time(NaiveTime),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int(_) => DataType::Int,
            Value::BigInt(_) => DataType::BigInt,
            Value::Decimal(_) => DataType::Decimal,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Varchar(_) => DataType::Varchar,
            Value::Time(_) => DataType::Time,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Bytes(_) => DataType::Bytes,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn varchar(s: impl Into<String>) -> Self {
        Value::Varchar(s.into())
    }

    /// Render this value as a SQL literal
    pub fn sql(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Varchar(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Time(t) => format!("TIME '{}'", t),
            Value::Date(d) => format!("DATE '{}'", d),
            Value::Timestamp(ts) => format!("TIMESTAMP '{}'", ts),
            Value::Bytes(b) => format!("X'{}'", to_hex(b)),
            _ => self.to_string(),
        }
    }

    pub fn precision(&self) -> i64 {
        match self {
            Value::Decimal(d) => d.mantissa().unsigned_abs().to_string().len() as i64,
            Value::Varchar(s) => s.chars().count() as i64,
            Value::Bytes(b) => b.len() as i64,
            _ => self.data_type().default_precision(),
        }
    }

    pub fn scale(&self) -> i32 {
        match self {
            Value::Decimal(d) => d.scale() as i32,
            _ => self.data_type().default_scale(),
        }
    }

    pub fn display_size(&self) -> i32 {
        match self {
            Value::Decimal(_) => saturating_i32(self.precision() + 2),
            Value::Varchar(s) => saturating_i32(s.chars().count() as i64),
            Value::Bytes(b) => saturating_i32(b.len() as i64 * 2),
            _ => self.data_type().default_display_size(),
        }
    }

    /// Compare two values of the same type.
    ///
    /// Returns `None` when the values are of different types or unordered (NaN).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Varchar(s) => write!(f, "{}", s),
            Value::Time(t) => write!(f, "{}", t),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Bytes(b) => write!(f, "{}", to_hex(b)),
        }
    }
}

/// Narrow a size to `i32`, clamping instead of wrapping
pub fn saturating_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Null.data_type(), DataType::Null);
        assert_eq!(Value::Int(1).data_type(), DataType::Int);
        assert_eq!(Value::varchar("x").data_type(), DataType::Varchar);
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).data_type(),
            DataType::Date
        );
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(Value::Null.sql(), "NULL");
        assert_eq!(Value::Int(-3).sql(), "-3");
        assert_eq!(Value::Double(1.0).sql(), "1.0");
        assert_eq!(Value::varchar("it's").sql(), "'it''s'");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).sql(),
            "DATE '2024-02-29'"
        );
        assert_eq!(
            Value::Time(NaiveTime::from_hms_opt(10, 30, 0).unwrap()).sql(),
            "TIME '10:30:00'"
        );
        assert_eq!(Value::Bytes(vec![0x0a, 0xff]).sql(), "X'0aff'");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::varchar("abc").to_string(), "abc");
        assert_eq!(
            Value::Decimal(Decimal::from_str("12.50").unwrap()).to_string(),
            "12.50"
        );
    }

    #[test]
    fn test_precision_and_display_size() {
        assert_eq!(Value::Int(5).precision(), 10);
        assert_eq!(Value::Int(5).display_size(), 11);

        let d = Value::Decimal(Decimal::from_str("-123.45").unwrap());
        assert_eq!(d.precision(), 5);
        assert_eq!(d.scale(), 2);
        assert_eq!(d.display_size(), 7);

        assert_eq!(Value::varchar("héllo").precision(), 5);
        assert_eq!(Value::Bytes(vec![1, 2, 3]).display_size(), 6);
        assert_eq!(Value::Null.display_size(), 4);
    }

    #[test]
    fn test_compare() {
        assert_eq!(Value::Int(1).compare(&Value::Int(2)), Some(Ordering::Less));
        assert_eq!(
            Value::varchar("b").compare(&Value::varchar("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Int(1).compare(&Value::BigInt(1)), None);
        assert_eq!(Value::Double(f64::NAN).compare(&Value::Double(1.0)), None);
    }

    #[test]
    fn test_saturating_i32() {
        assert_eq!(saturating_i32(5), 5);
        assert_eq!(saturating_i32(i64::MAX), i32::MAX);
        assert_eq!(saturating_i32(i64::MIN), i32::MIN);
    }
}
