//! Expression trees for SQL scalar expressions.
//!
//! This module provides:
//! - The `Expression` tree and its node kinds
//! - `Operation`: arithmetic, negation and concatenation with type resolution,
//!   date-arithmetic rewriting and constant folding
//! - `DATEADD`/`DATEDIFF` function calls and aggregates
//! - Column binding, parameters and tree-wide visitor checks

pub mod aggregate;
pub mod column;
pub mod error;
pub mod expr;
pub mod function;
pub mod operation;
pub mod operator;
pub mod visitor;

pub use aggregate::{Aggregate, AggregateKind};
pub use column::{ColumnInfo, ColumnRef, ColumnResolver, Parameter, TableFilter};
pub use error::{ExpressionError, ExpressionResult};
pub use expr::Expression;
pub use function::{DateUnit, FunctionCall};
pub use operation::Operation;
pub use operator::OpType;
pub use visitor::ExpressionVisitor;
