//! Conversion of values between data types.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::{DataType, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 1970-01-01 00:00:00, the date TIME values are anchored on
pub(crate) fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

impl Value {
    /// Convert this value to the given type.
    ///
    /// NULL converts to NULL of every type; converting to UNKNOWN is a no-op.
    pub fn convert_to(&self, target: DataType) -> ExpressionResult<Value> {
        if self.data_type() == target || target == DataType::Unknown {
            return Ok(self.clone());
        }
        if self.is_null() || target == DataType::Null {
            return Ok(Value::Null);
        }

        let converted = match target {
            DataType::Varchar => Some(Value::Varchar(self.to_string())),
            DataType::Boolean => self.to_boolean(),
            DataType::Int => self
                .to_integral(i32::MIN as i64, i32::MAX as i64)?
                .map(|v| Value::Int(v as i32)),
            DataType::BigInt => self
                .to_integral(i64::MIN, i64::MAX)?
                .map(Value::BigInt),
            DataType::Decimal => self.to_decimal().map(Value::Decimal),
            DataType::Float => self.to_f64().map(|v| Value::Float(v as f32)),
            DataType::Double => self.to_f64().map(Value::Double),
            DataType::Time => match self {
                Value::Timestamp(ts) => Some(Value::Time(ts.time())),
                Value::Varchar(s) => parse_time(s.trim()).map(Value::Time),
                _ => None,
            },
            DataType::Date => match self {
                Value::Timestamp(ts) => Some(Value::Date(ts.date())),
                Value::Varchar(s) => {
                    let s = s.trim();
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .or_else(|| parse_timestamp(s).map(|ts| ts.date()))
                        .map(Value::Date)
                }
                _ => None,
            },
            DataType::Timestamp => match self {
                Value::Date(d) => Some(Value::Timestamp(d.and_time(NaiveTime::default()))),
                Value::Time(t) => Some(Value::Timestamp(epoch().date().and_time(*t))),
                Value::Varchar(s) => parse_timestamp(s.trim()).map(Value::Timestamp),
                _ => None,
            },
            DataType::Bytes => match self {
                Value::Varchar(s) => from_hex(s.trim()).map(Value::Bytes),
                _ => None,
            },
            DataType::Unknown => Some(self.clone()),
            DataType::Null => Some(Value::Null),
        };

        converted.ok_or_else(|| ExpressionError::ConversionError {
            value: self.to_string(),
            target: target.name(),
        })
    }

    /// Numeric view of this value, if it has one
    pub(crate) fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(v) => Some(*v as f64),
            Value::BigInt(v) => Some(*v as f64),
            Value::Decimal(d) => d.to_f64(),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Varchar(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_boolean(&self) -> Option<Value> {
        let b = match self {
            Value::Varchar(s) => match s.trim().to_uppercase().as_str() {
                "TRUE" | "T" | "YES" | "Y" => true,
                "FALSE" | "F" | "NO" | "N" => false,
                other => other.parse::<f64>().ok()? != 0.0,
            },
            Value::Int(v) => *v != 0,
            Value::BigInt(v) => *v != 0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Float(v) => *v != 0.0,
            Value::Double(v) => *v != 0.0,
            _ => return None,
        };
        Some(Value::Boolean(b))
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Boolean(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
            Value::Int(v) => Some(Decimal::from(*v)),
            Value::BigInt(v) => Some(Decimal::from(*v)),
            Value::Float(v) => Decimal::from_f32(*v),
            Value::Double(v) => Decimal::from_f64(*v),
            Value::Varchar(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .ok()
            }
            _ => None,
        }
    }

    /// Integral view of this value rounded half away from zero.
    ///
    /// Values outside `[min, max]` are an overflow, not a conversion failure.
    fn to_integral(&self, min: i64, max: i64) -> ExpressionResult<Option<i64>> {
        let wide: Option<i128> = match self {
            Value::Boolean(b) => Some(*b as i128),
            Value::Int(v) => Some(*v as i128),
            Value::BigInt(v) => Some(*v as i128),
            Value::Decimal(d) => d
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i128(),
            Value::Float(v) => float_to_i128(*v as f64),
            Value::Double(v) => float_to_i128(*v),
            Value::Varchar(s) => {
                let s = s.trim();
                match s.parse::<i128>() {
                    Ok(v) => Some(v),
                    Err(_) => match Decimal::from_str(s) {
                        Ok(d) => d
                            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                            .to_i128(),
                        Err(_) => None,
                    },
                }
            }
            _ => None,
        };

        match wide {
            Some(v) if v < min as i128 || v > max as i128 => {
                Err(ExpressionError::NumericOverflow(self.to_string()))
            }
            Some(v) => Ok(Some(v as i64)),
            None => Ok(None),
        }
    }
}

fn float_to_i128(v: f64) -> Option<i128> {
    if v.is_finite() {
        // f64 -> i128 saturates, which the range check above turns into an overflow
        Some(v.round() as i128)
    } else {
        None
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::default()))
        })
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
