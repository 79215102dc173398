//! Arithmetic on values.
//!
//! Both operands are expected to be converted to a common type first; the only
//! mixed combinations accepted are TIME scaled by a number.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::convert::epoch;
use crate::types::Value;
use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl Arith {
    fn token(self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Subtract => "-",
            Arith::Multiply => "*",
            Arith::Divide => "/",
            Arith::Modulus => "%",
        }
    }

    fn divides(self) -> bool {
        matches!(self, Arith::Divide | Arith::Modulus)
    }
}

impl Value {
    pub fn add(&self, other: &Value) -> ExpressionResult<Value> {
        self.arith(Arith::Add, other)
    }

    pub fn subtract(&self, other: &Value) -> ExpressionResult<Value> {
        self.arith(Arith::Subtract, other)
    }

    pub fn multiply(&self, other: &Value) -> ExpressionResult<Value> {
        self.arith(Arith::Multiply, other)
    }

    pub fn divide(&self, other: &Value) -> ExpressionResult<Value> {
        self.arith(Arith::Divide, other)
    }

    pub fn modulus(&self, other: &Value) -> ExpressionResult<Value> {
        self.arith(Arith::Modulus, other)
    }

    pub fn negate(&self) -> ExpressionResult<Value> {
        match self {
            Value::Null => Ok(Value::Null),
            Value::Int(v) => v
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| ExpressionError::NumericOverflow(format!("- {}", v))),
            Value::BigInt(v) => v
                .checked_neg()
                .map(Value::BigInt)
                .ok_or_else(|| ExpressionError::NumericOverflow(format!("- {}", v))),
            Value::Decimal(d) => Ok(Value::Decimal(-*d)),
            Value::Float(v) => Ok(Value::Float(-v)),
            Value::Double(v) => Ok(Value::Double(-v)),
            Value::Time(t) => time_from_nanos(-time_to_nanos(*t)).map(Value::Time),
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: "-",
                left_type: Some(self.data_type()),
                right_type: None,
            }),
        }
    }

    fn arith(&self, op: Arith, other: &Value) -> ExpressionResult<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                let v = checked_integral(op, *a as i64, *b as i64)?;
                i32::try_from(v)
                    .map(Value::Int)
                    .map_err(|_| overflow(op, self, other))
            }
            (Value::BigInt(a), Value::BigInt(b)) => checked_integral(op, *a, *b).map(Value::BigInt),
            (Value::Decimal(a), Value::Decimal(b)) => {
                if op.divides() && b.is_zero() {
                    return Err(division_by_zero(op, self, other));
                }
                checked_decimal(op, *a, *b)
                    .map(Value::Decimal)
                    .ok_or_else(|| overflow(op, self, other))
            }
            (Value::Float(a), Value::Float(b)) => {
                if op.divides() && *b == 0.0 {
                    return Err(division_by_zero(op, self, other));
                }
                Ok(Value::Float(match op {
                    Arith::Add => a + b,
                    Arith::Subtract => a - b,
                    Arith::Multiply => a * b,
                    Arith::Divide => a / b,
                    Arith::Modulus => a % b,
                }))
            }
            (Value::Double(a), Value::Double(b)) => {
                if op.divides() && *b == 0.0 {
                    return Err(division_by_zero(op, self, other));
                }
                Ok(Value::Double(match op {
                    Arith::Add => a + b,
                    Arith::Subtract => a - b,
                    Arith::Multiply => a * b,
                    Arith::Divide => a / b,
                    Arith::Modulus => a % b,
                }))
            }
            (Value::Time(a), Value::Time(b)) if op == Arith::Add => {
                time_from_nanos(time_to_nanos(*a) + time_to_nanos(*b)).map(Value::Time)
            }
            (Value::Time(a), Value::Time(b)) if op == Arith::Subtract => {
                time_from_nanos(time_to_nanos(*a) - time_to_nanos(*b)).map(Value::Time)
            }
            (Value::Time(t), factor) if matches!(op, Arith::Multiply | Arith::Divide) => {
                let factor = match factor {
                    Value::Int(_)
                    | Value::BigInt(_)
                    | Value::Decimal(_)
                    | Value::Float(_)
                    | Value::Double(_) => factor.to_f64(),
                    _ => None,
                }
                .ok_or_else(|| invalid_operands(op, self, other))?;
                if op == Arith::Divide && factor == 0.0 {
                    return Err(division_by_zero(op, self, other));
                }
                let nanos = time_to_nanos(*t) as f64;
                let scaled = if op == Arith::Multiply {
                    nanos * factor
                } else {
                    nanos / factor
                };
                if !scaled.is_finite() {
                    return Err(overflow(op, self, other));
                }
                time_from_nanos(scaled as i64).map(Value::Time)
            }
            (Value::Timestamp(a), Value::Timestamp(b))
                if matches!(op, Arith::Add | Arith::Subtract) =>
            {
                let offset = b.signed_duration_since(epoch());
                let result = if op == Arith::Add {
                    a.checked_add_signed(offset)
                } else {
                    a.checked_sub_signed(offset)
                };
                result
                    .map(Value::Timestamp)
                    .ok_or_else(|| overflow(op, self, other))
            }
            _ => Err(invalid_operands(op, self, other)),
        }
    }
}

fn checked_integral(op: Arith, a: i64, b: i64) -> ExpressionResult<i64> {
    let describe = || format!("{} {} {}", a, op.token(), b);
    if op.divides() && b == 0 {
        return Err(ExpressionError::DivisionByZero(describe()));
    }
    match op {
        Arith::Add => a.checked_add(b),
        Arith::Subtract => a.checked_sub(b),
        Arith::Multiply => a.checked_mul(b),
        Arith::Divide => a.checked_div(b),
        Arith::Modulus => a.checked_rem(b),
    }
    .ok_or_else(|| ExpressionError::NumericOverflow(describe()))
}

fn checked_decimal(op: Arith, a: Decimal, b: Decimal) -> Option<Decimal> {
    match op {
        Arith::Add => a.checked_add(b),
        Arith::Subtract => a.checked_sub(b),
        Arith::Multiply => a.checked_mul(b),
        Arith::Divide => a.checked_div(b),
        Arith::Modulus => a.checked_rem(b),
    }
}

fn time_to_nanos(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64 * NANOS_PER_SECOND + t.nanosecond() as i64
}

/// Build a time of day, wrapping around midnight in both directions
fn time_from_nanos(nanos: i64) -> ExpressionResult<NaiveTime> {
    let nanos = nanos.rem_euclid(NANOS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(
        (nanos / NANOS_PER_SECOND) as u32,
        (nanos % NANOS_PER_SECOND) as u32,
    )
    .ok_or_else(|| ExpressionError::Internal(format!("invalid time of day: {}ns", nanos)))
}

fn overflow(op: Arith, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::NumericOverflow(format!("{} {} {}", left, op.token(), right))
}

fn division_by_zero(op: Arith, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::DivisionByZero(format!("{} {} {}", left, op.token(), right))
}

fn invalid_operands(op: Arith, left: &Value, right: &Value) -> ExpressionError {
    ExpressionError::InvalidOperandTypes {
        operator: op.token(),
        left_type: Some(left.data_type()),
        right_type: Some(right.data_type()),
    }
}
