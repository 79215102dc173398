//! Expression tree definitions.

use crate::expression::aggregate::{Aggregate, AggregateKind};
use crate::expression::column::{ColumnRef, ColumnResolver, Parameter, TableFilter};
use crate::expression::function::FunctionCall;
use crate::expression::operation::Operation;
use crate::expression::operator::OpType;
use crate::expression::{ExpressionResult, ExpressionVisitor};
use crate::session::{EvalContext, Session};
use crate::types::{DataType, Value};
use std::fmt;

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Literal(Value),

    /// Column reference
    Column(ColumnRef),

    /// Positional parameter
    Parameter(Parameter),

    /// Arithmetic, negation or concatenation
    Operation(Box<Operation>),

    /// Call of a built-in function
    Function(Box<FunctionCall>),

    /// Aggregate over the rows of a group
    Aggregate(Box<Aggregate>),
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    pub fn null() -> Self {
        Expression::Literal(Value::Null)
    }

    pub fn int(value: i32) -> Self {
        Expression::Literal(Value::Int(value))
    }

    pub fn varchar(value: impl Into<String>) -> Self {
        Expression::Literal(Value::Varchar(value.into()))
    }

    /// Create a column reference expression
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::new(name))
    }

    /// Create a column reference qualified by a table alias
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::qualified(table, name))
    }

    /// Create a parameter placeholder (0-based index)
    pub fn parameter(index: usize) -> Self {
        Expression::Parameter(Parameter::new(index))
    }

    /// Create a binary operation expression.
    ///
    /// `op` must not be [`OpType::Negate`]; use [`Expression::negate_expr`].
    pub fn binary_op(op: OpType, left: Expression, right: Expression) -> ExpressionResult<Self> {
        Operation::new(op, left, Some(right)).map(Self::from)
    }

    pub fn concat_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Concat, left, right).into()
    }

    /// Create an addition expression
    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Plus, left, right).into()
    }

    /// Create a subtraction expression
    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Minus, left, right).into()
    }

    /// Create a multiplication expression
    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Multiply, left, right).into()
    }

    /// Create a division expression
    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Divide, left, right).into()
    }

    /// Create a modulus expression
    pub fn mod_expr(left: Expression, right: Expression) -> Self {
        Operation::binary(OpType::Modulus, left, right).into()
    }

    /// Create a negation expression
    pub fn negate_expr(operand: Expression) -> Self {
        Operation::negate(operand).into()
    }

    /// Look up a function by name and bind its arguments
    pub fn function(name: &str, args: Vec<Expression>) -> ExpressionResult<Self> {
        let mut function = FunctionCall::get(name)?;
        for (index, arg) in args.into_iter().enumerate() {
            function.set_parameter(index, arg)?;
        }
        function.done_with_parameters()?;
        Ok(Expression::Function(Box::new(function)))
    }

    pub fn aggregate(kind: AggregateKind, arg: Expression) -> Self {
        Expression::Aggregate(Box::new(Aggregate::new(kind, arg)))
    }

    /// Type of the value this expression produces; `Unknown` until resolved
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(value) => value.data_type(),
            Expression::Column(col) => col.data_type(),
            Expression::Parameter(_) => DataType::Unknown,
            Expression::Operation(op) => op.data_type(),
            Expression::Function(f) => f.data_type(),
            Expression::Aggregate(agg) => agg.data_type(),
        }
    }

    /// Check if this expression is a compile-time constant
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    /// Estimated evaluation cost
    pub fn cost(&self) -> i32 {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => 0,
            Expression::Column(_) => 2,
            Expression::Operation(op) => op.cost(),
            Expression::Function(f) => f.cost(),
            Expression::Aggregate(agg) => agg.cost(),
        }
    }

    pub fn precision(&self) -> i64 {
        match self {
            Expression::Literal(value) => value.precision(),
            Expression::Operation(op) => op.precision(),
            _ => self.data_type().default_precision(),
        }
    }

    pub fn scale(&self) -> i32 {
        match self {
            Expression::Literal(value) => value.scale(),
            Expression::Operation(op) => op.scale(),
            _ => self.data_type().default_scale(),
        }
    }

    pub fn display_size(&self) -> i32 {
        match self {
            Expression::Literal(value) => value.display_size(),
            Expression::Operation(op) => op.display_size(),
            _ => self.data_type().default_display_size(),
        }
    }

    /// Render this expression as SQL text
    pub fn sql(&self, is_distributed: bool) -> String {
        match self {
            Expression::Literal(value) => value.sql(),
            Expression::Column(col) => col.sql(),
            Expression::Parameter(param) => param.sql(),
            Expression::Operation(op) => op.sql(is_distributed),
            Expression::Function(f) => f.sql(is_distributed),
            Expression::Aggregate(agg) => agg.sql(is_distributed),
        }
    }

    /// Bind column references against `resolver` at the given query nesting level
    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => {}
            Expression::Column(col) => col.map_columns(resolver, level),
            Expression::Operation(op) => op.map_columns(resolver, level),
            Expression::Function(f) => f.map_columns(resolver, level),
            Expression::Aggregate(agg) => agg.map_columns(resolver, level),
        }
    }

    pub fn set_evaluatable(&mut self, filter: &TableFilter, evaluatable: bool) {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => {}
            Expression::Column(col) => col.set_evaluatable(filter, evaluatable),
            Expression::Operation(op) => op.set_evaluatable(filter, evaluatable),
            Expression::Function(f) => f.set_evaluatable(filter, evaluatable),
            Expression::Aggregate(agg) => agg.set_evaluatable(filter, evaluatable),
        }
    }

    /// Fold the current row of `ctx` into every aggregate of this tree
    pub fn update_aggregate(&mut self, ctx: &EvalContext<'_>) -> ExpressionResult<()> {
        match self {
            Expression::Literal(_) | Expression::Column(_) | Expression::Parameter(_) => Ok(()),
            Expression::Operation(op) => op.update_aggregate(ctx),
            Expression::Function(f) => f.update_aggregate(ctx),
            Expression::Aggregate(agg) => agg.update_aggregate(ctx),
        }
    }

    /// Check whether the visitor's property holds for the whole tree
    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => true,
            Expression::Column(col) => col.is_everything(visitor),
            Expression::Operation(op) => op.is_everything(visitor),
            Expression::Function(f) => f.is_everything(visitor),
            Expression::Aggregate(agg) => agg.is_everything(visitor),
        }
    }

    /// Resolve types, rewrite and fold this expression.
    ///
    /// The expression is consumed; callers must continue with the returned one,
    /// which may be a different kind of node.
    pub fn optimize(self, session: &Session) -> ExpressionResult<Expression> {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => Ok(self),
            Expression::Column(col) => {
                col.check_bound()?;
                Ok(Expression::Column(col))
            }
            Expression::Operation(op) => op.optimize(session),
            Expression::Function(f) => f.optimize(session),
            Expression::Aggregate(agg) => agg.optimize(session),
        }
    }

    /// Evaluate this expression for the current row of `ctx`
    pub fn value(&self, ctx: &EvalContext<'_>) -> ExpressionResult<Value> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Column(col) => col.value(ctx),
            Expression::Parameter(param) => param.value(ctx),
            Expression::Operation(op) => op.value(ctx),
            Expression::Function(f) => f.value(ctx),
            Expression::Aggregate(agg) => Ok(agg.value()),
        }
    }
}

impl From<Operation> for Expression {
    fn from(op: Operation) -> Self {
        Expression::Operation(Box::new(op))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionError;

    #[test]
    fn test_expression_builders() {
        let expr = Expression::add_expr(Expression::column("A"), Expression::int(5));
        assert!(matches!(expr, Expression::Operation(_)));
        assert_eq!(expr.to_string(), "(A + 5)");

        let expr = Expression::binary_op(OpType::Modulus, Expression::int(5), Expression::int(2))
            .unwrap();
        assert_eq!(expr.to_string(), "(5 % 2)");

        assert!(matches!(
            Expression::binary_op(OpType::Negate, Expression::int(5), Expression::int(2)),
            Err(ExpressionError::Internal(_))
        ));
    }

    #[test]
    fn test_is_constant() {
        assert!(Expression::int(42).is_constant());
        assert!(Expression::null().is_constant());
        assert!(!Expression::column("A").is_constant());
        assert!(!Expression::parameter(0).is_constant());

        // Only resolution turns an operation over constants into a literal
        assert!(!Expression::add_expr(Expression::int(1), Expression::int(2)).is_constant());
    }

    #[test]
    fn test_leaf_metadata() {
        assert_eq!(Expression::int(1).cost(), 0);
        assert_eq!(Expression::column("A").cost(), 2);
        assert_eq!(Expression::parameter(0).data_type(), DataType::Unknown);
        assert_eq!(Expression::varchar("abc").precision(), 3);
        assert_eq!(Expression::parameter(0).display_size(), 4);
    }

    #[test]
    fn test_unbound_column_fails_to_optimize() {
        let session = Session::default();
        assert_eq!(
            Expression::column("MISSING").optimize(&session),
            Err(ExpressionError::ColumnNotFound("MISSING".to_string()))
        );
    }
}
