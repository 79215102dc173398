//! SQL data types and the promotion ranking between them.

use crate::expression::{ExpressionError, ExpressionResult};

/// Data types known to the expression layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Type of an unbound parameter (`?`)
    Unknown,
    Null,
    Varchar,
    Boolean,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Time,
    Date,
    Timestamp,
    Bytes,
}

impl DataType {
    /// Rank used to pick the higher-order type of two operands.
    fn order(self) -> u32 {
        match self {
            DataType::Unknown => 1_000,
            DataType::Null => 2_000,
            DataType::Varchar => 10_000,
            DataType::Boolean => 20_000,
            DataType::Int => 23_000,
            DataType::BigInt => 24_000,
            DataType::Decimal => 25_000,
            DataType::Float => 26_000,
            DataType::Double => 27_000,
            DataType::Time => 30_000,
            DataType::Date => 31_000,
            DataType::Timestamp => 32_000,
            DataType::Bytes => 40_000,
        }
    }

    /// Get the type both operands of a binary operation are promoted to.
    ///
    /// Two untyped operands (`? + ?`, `? + NULL`) have no common type.
    pub fn higher_order(t1: DataType, t2: DataType) -> ExpressionResult<DataType> {
        if t1 == DataType::Unknown || t2 == DataType::Unknown {
            if t1 == t2 {
                return Err(ExpressionError::UnknownDataType("?, ?".to_string()));
            } else if t1 == DataType::Null {
                return Err(ExpressionError::UnknownDataType("NULL, ?".to_string()));
            } else if t2 == DataType::Null {
                return Err(ExpressionError::UnknownDataType("?, NULL".to_string()));
            }
        }
        if t1 == t2 {
            return Ok(t1);
        }
        Ok(if t1.order() > t2.order() { t1 } else { t2 })
    }

    /// SQL name of the type, as used in error messages
    pub fn name(self) -> &'static str {
        match self {
            DataType::Unknown => "UNKNOWN",
            DataType::Null => "NULL",
            DataType::Varchar => "VARCHAR",
            DataType::Boolean => "BOOLEAN",
            DataType::Int => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Decimal => "DECIMAL",
            DataType::Float => "REAL",
            DataType::Double => "DOUBLE",
            DataType::Time => "TIME",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Bytes => "VARBINARY",
        }
    }

    pub fn is_string(self) -> bool {
        self == DataType::Varchar
    }

    /// DATE, TIME or TIMESTAMP
    pub fn is_temporal(self) -> bool {
        matches!(self, DataType::Time | DataType::Date | DataType::Timestamp)
    }

    /// DECIMAL, REAL or DOUBLE
    pub fn is_fractional(self) -> bool {
        matches!(self, DataType::Decimal | DataType::Float | DataType::Double)
    }

    pub fn default_precision(self) -> i64 {
        match self {
            DataType::Unknown | DataType::Null | DataType::Boolean => 1,
            DataType::Int => 10,
            DataType::BigInt => 19,
            DataType::Decimal => 65_535,
            DataType::Float => 7,
            DataType::Double => 17,
            DataType::Time => 6,
            DataType::Date => 8,
            DataType::Timestamp => 23,
            DataType::Varchar | DataType::Bytes => i32::MAX as i64,
        }
    }

    pub fn default_scale(self) -> i32 {
        match self {
            DataType::Decimal => 32_767,
            DataType::Timestamp => 10,
            _ => 0,
        }
    }

    pub fn default_display_size(self) -> i32 {
        match self {
            DataType::Unknown | DataType::Null => 4,
            DataType::Boolean => 5,
            DataType::Int => 11,
            DataType::BigInt => 20,
            DataType::Decimal => 65_535,
            DataType::Float => 15,
            DataType::Double => 24,
            DataType::Time => 8,
            DataType::Date => 10,
            DataType::Timestamp => 23,
            DataType::Varchar | DataType::Bytes => i32::MAX,
        }
    }
}
