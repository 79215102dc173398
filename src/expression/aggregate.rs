//! Aggregate functions over the rows of a group.

use crate::expression::column::{ColumnResolver, TableFilter};
use crate::expression::{Expression, ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::session::{EvalContext, Session};
use crate::types::{DataType, Value};
use std::cmp::Ordering;

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// COUNT(expr) - counts non-NULL values
    Count,
    /// SUM(expr) - sums numeric values, ignoring NULLs
    Sum,
    /// MIN(expr) - minimum value, ignoring NULLs
    Min,
    /// MAX(expr) - maximum value, ignoring NULLs
    Max,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }

    /// Output type for the given argument type
    pub fn output_type(&self, input: DataType) -> ExpressionResult<DataType> {
        match self {
            AggregateKind::Count => Ok(DataType::BigInt),
            AggregateKind::Sum => match input {
                DataType::Int => Ok(DataType::BigInt),
                DataType::BigInt | DataType::Decimal | DataType::Unknown | DataType::Null => {
                    Ok(DataType::Decimal)
                }
                DataType::Float | DataType::Double => Ok(DataType::Double),
                other => Err(ExpressionError::InvalidOperandTypes {
                    operator: "SUM",
                    left_type: Some(other),
                    right_type: None,
                }),
            },
            AggregateKind::Min | AggregateKind::Max => Ok(input),
        }
    }
}

/// An aggregate call together with its running state
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    kind: AggregateKind,
    arg: Expression,
    data_type: Option<DataType>,
    /// Non-NULL inputs seen so far
    count: i64,
    /// SUM, MIN or MAX so far
    acc: Option<Value>,
}

impl Aggregate {
    pub fn new(kind: AggregateKind, arg: Expression) -> Self {
        Self {
            kind,
            arg,
            data_type: None,
            count: 0,
            acc: None,
        }
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    pub fn data_type(&self) -> DataType {
        self.data_type.unwrap_or(DataType::Unknown)
    }

    pub fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        self.arg = self.arg.optimize(session)?;
        self.data_type = Some(self.kind.output_type(self.arg.data_type())?);
        Ok(Expression::Aggregate(Box::new(self)))
    }

    /// Fold the argument's value for the current row into the state
    pub fn update_aggregate(&mut self, ctx: &EvalContext<'_>) -> ExpressionResult<()> {
        let value = self.arg.value(ctx)?;
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;

        self.acc = match (self.kind, self.acc.take()) {
            (AggregateKind::Count, _) => None,
            (AggregateKind::Sum, acc) => {
                let data_type = self.data_type.ok_or_else(|| {
                    ExpressionError::Internal(format!(
                        "aggregate {} updated before it was optimized",
                        self.sql(false)
                    ))
                })?;
                let value = value.convert_to(data_type)?;
                Some(match acc {
                    Some(sum) => sum.add(&value)?,
                    None => value,
                })
            }
            (AggregateKind::Min, Some(min)) => Some(pick(min, value, Ordering::Less)),
            (AggregateKind::Max, Some(max)) => Some(pick(max, value, Ordering::Greater)),
            (AggregateKind::Min | AggregateKind::Max, None) => Some(value),
        };
        Ok(())
    }

    /// Result for the rows seen so far
    pub fn value(&self) -> Value {
        match self.kind {
            AggregateKind::Count => Value::BigInt(self.count),
            _ => self.acc.clone().unwrap_or(Value::Null),
        }
    }

    /// Forget the rows seen so far, as at the start of a new group
    pub fn reset(&mut self) {
        self.count = 0;
        self.acc = None;
    }

    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) {
        self.arg.map_columns(resolver, level);
    }

    pub fn set_evaluatable(&mut self, filter: &TableFilter, evaluatable: bool) {
        self.arg.set_evaluatable(filter, evaluatable);
    }

    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        self.arg.is_everything(visitor)
    }

    pub fn cost(&self) -> i32 {
        1 + self.arg.cost()
    }

    pub fn sql(&self, is_distributed: bool) -> String {
        format!("{}({})", self.kind.name(), self.arg.sql(is_distributed))
    }
}

/// Keep `current` unless `candidate` compares as `wanted` against it
fn pick(current: Value, candidate: Value, wanted: Ordering) -> Value {
    if candidate.compare(&current) == Some(wanted) {
        candidate
    } else {
        current
    }
}
