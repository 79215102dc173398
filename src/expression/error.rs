//! Error types for expression resolution and evaluation.

use crate::types::DataType;
use thiserror::Error;

/// Errors that can occur while resolving or evaluating expressions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Operand types do not match any supported combination for the operator
    #[error("Feature not supported: \"{} {} {}\"", .left.name(), .operator, .right.name())]
    UnsupportedOperation {
        left: DataType,
        operator: &'static str,
        right: DataType,
    },

    /// A programming defect, never a user error
    #[error("Internal error: {0}")]
    Internal(String),

    /// The type of an expression could not be determined
    #[error("Unknown data type: \"{0}\"")]
    UnknownDataType(String),

    /// Value could not be converted to the target type
    #[error("Data conversion error converting \"{value}\" to {target}")]
    ConversionError { value: String, target: &'static str },

    /// Arithmetic result does not fit the target type
    #[error("Numeric value out of range: \"{0}\"")]
    NumericOverflow(String),

    /// Division or modulus by zero
    #[error("Division by zero: \"{0}\"")]
    DivisionByZero(String),

    /// Invalid operand types for a value-level operator
    #[error("Invalid operand types for operator {operator}: left={left_type:?}, right={right_type:?}")]
    InvalidOperandTypes {
        operator: &'static str,
        left_type: Option<DataType>,
        right_type: Option<DataType>,
    },

    /// Invalid function name
    #[error("Function \"{0}\" not found")]
    UnknownFunction(String),

    /// Wrong number of function arguments
    #[error("Invalid parameter count for \"{function}\", expected count: \"{expected}\"")]
    FunctionArgumentCount {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A function argument has a value the function cannot accept
    #[error("Invalid value \"{value}\" for parameter \"{parameter}\"")]
    InvalidParameterValue {
        parameter: &'static str,
        value: String,
    },

    /// Column reference could not be bound
    #[error("Column \"{0}\" not found")]
    ColumnNotFound(String),

    /// Column index outside of the current row
    #[error("Column index {index} out of bounds for row with {row_size} columns")]
    ColumnIndexOutOfBounds { index: usize, row_size: usize },

    /// Parameter value was not supplied
    #[error("Parameter \"#{0}\" is not set")]
    ParameterNotSet(usize),
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::UnsupportedOperation {
            left: DataType::Date,
            operator: "+",
            right: DataType::Boolean,
        };
        assert_eq!(err.to_string(), "Feature not supported: \"DATE + BOOLEAN\"");

        let err = ExpressionError::InvalidOperandTypes {
            operator: "+",
            left_type: Some(DataType::Int),
            right_type: Some(DataType::Varchar),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operand types for operator +: left=Some(Int), right=Some(Varchar)"
        );

        let err = ExpressionError::ColumnIndexOutOfBounds {
            index: 5,
            row_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column index 5 out of bounds for row with 3 columns"
        );

        let err = ExpressionError::FunctionArgumentCount {
            function: "DATEADD",
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter count for \"DATEADD\", expected count: \"3\""
        );

        assert_eq!(
            ExpressionError::ParameterNotSet(2).to_string(),
            "Parameter \"#2\" is not set"
        );
    }
}
