//! Arithmetic, negation and string concatenation.
//!
//! An [`Operation`] is built untyped. [`Operation::optimize`] resolves its
//! result type against the session's [`Mode`], rewrites date arithmetic into
//! `DATEADD`/`DATEDIFF` calls and folds constant operands; only the expression
//! it returns may be evaluated.

use crate::expression::column::{ColumnResolver, TableFilter};
use crate::expression::function::FunctionCall;
use crate::expression::operator::OpType;
use crate::expression::{Expression, ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::mode::Mode;
use crate::session::{EvalContext, Session};
use crate::types::{saturating_i32, DataType, Value};
use log::{debug, trace};

const SECONDS_PER_DAY: i32 = 60 * 60 * 24;

/// A mathematical operation or string concatenation over one or two operands
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    op: OpType,
    left: Expression,
    /// Absent exactly when `op` is `Negate`
    right: Option<Expression>,
    /// Set by `optimize`
    data_type: Option<DataType>,
    /// Whether the right operand is converted to `data_type` before evaluation
    convert_right: bool,
}

impl Operation {
    /// Create an operation, checking that the operand count matches the operator
    pub fn new(op: OpType, left: Expression, right: Option<Expression>) -> ExpressionResult<Self> {
        if op.is_unary() != right.is_none() {
            return Err(ExpressionError::Internal(format!(
                "operator {:?} takes {} operand(s)",
                op,
                if op.is_unary() { 1 } else { 2 }
            )));
        }
        Ok(Self {
            op,
            left,
            right,
            data_type: None,
            convert_right: true,
        })
    }

    pub(crate) fn binary(op: OpType, left: Expression, right: Expression) -> Self {
        debug_assert!(!op.is_unary());
        Self {
            op,
            left,
            right: Some(right),
            data_type: None,
            convert_right: true,
        }
    }

    pub(crate) fn negate(operand: Expression) -> Self {
        Self {
            op: OpType::Negate,
            left: operand,
            right: None,
            data_type: None,
            convert_right: true,
        }
    }

    /// Operator, possibly reassigned to `Concat` by `optimize`
    pub fn op(&self) -> OpType {
        self.op
    }

    /// Left operand, or the only operand of a negation
    pub fn left(&self) -> &Expression {
        &self.left
    }

    /// Right operand, `None` for a negation
    pub fn right(&self) -> Option<&Expression> {
        self.right.as_ref()
    }

    /// Whether the right operand is converted to the result type when evaluated
    pub fn converts_right(&self) -> bool {
        self.convert_right
    }

    /// Result type; `Unknown` until resolved
    pub fn data_type(&self) -> DataType {
        self.data_type.unwrap_or(DataType::Unknown)
    }

    /// Resolve the result type, rewriting or folding the operation where possible
    pub fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        self.left = self.left.optimize(session)?;
        match self.op {
            OpType::Negate => {
                let data_type = self.left.data_type();
                self.data_type = Some(if data_type == DataType::Unknown {
                    DataType::Decimal
                } else {
                    data_type
                });
            }
            OpType::Concat => {
                self.optimize_right(session)?;
                self.data_type = Some(DataType::Varchar);
            }
            OpType::Plus
            | OpType::Minus
            | OpType::Multiply
            | OpType::Divide
            | OpType::Modulus => {
                self.optimize_right(session)?;
                return self.optimize_arithmetic(session);
            }
        }
        self.fold_constants(session)
    }

    fn optimize_right(&mut self, session: &Session) -> ExpressionResult<()> {
        let right = self.right.take().ok_or_else(|| self.missing_right())?;
        self.right = Some(right.optimize(session)?);
        Ok(())
    }

    fn optimize_arithmetic(mut self, session: &Session) -> ExpressionResult<Expression> {
        let mode = session.mode();
        let l = self.left.data_type();
        let r = self.right_operand()?.data_type();

        if (l == DataType::Null && r == DataType::Null)
            || (l == DataType::Unknown && r == DataType::Unknown)
        {
            // (? + ?): DECIMAL is the safest guess, unless + means concatenation
            if self.op == OpType::Plus && mode.allow_plus_for_string_concat {
                debug!("{} resolved as string concatenation", self.sql(false));
                self.op = OpType::Concat;
                self.data_type = Some(DataType::Varchar);
            } else {
                self.data_type = Some(DataType::Decimal);
            }
        } else if l.is_temporal() || r.is_temporal() {
            return self.optimize_temporal(session, l, r);
        } else {
            let data_type = DataType::higher_order(l, r)?;
            self.data_type = Some(data_type);
            if data_type.is_string() && mode.allow_plus_for_string_concat {
                debug!("{} resolved as string concatenation", self.sql(false));
                self.op = OpType::Concat;
            }
        }

        // a concatenation always yields VARCHAR
        if mode.force_decimal_arithmetic && self.op != OpType::Concat {
            self.data_type = Some(DataType::Decimal);
        }
        self.fold_constants(session)
    }

    /// Resolve an operation with at least one DATE, TIME or TIMESTAMP operand
    fn optimize_temporal(
        mut self,
        session: &Session,
        mut l: DataType,
        mut r: DataType,
    ) -> ExpressionResult<Expression> {
        match self.op {
            OpType::Plus => {
                // order the operands: INT < TIME < DATE < TIMESTAMP
                if r != DataType::higher_order(l, r)? {
                    self.swap();
                    std::mem::swap(&mut l, &mut r);
                }
                if l == DataType::Int {
                    let (days, date) = self.into_operands()?;
                    return date_function(session, "DATEADD", "DAY", days, date);
                } else if l.is_fractional() {
                    let (days, date) = self.into_operands()?;
                    let seconds = Expression::mul_expr(Expression::int(SECONDS_PER_DAY), days);
                    return date_function(session, "DATEADD", "SECOND", seconds, date);
                } else if l == DataType::Time && r == DataType::Time {
                    return Ok(self.resolved(DataType::Time));
                } else if l == DataType::Time {
                    return Ok(self.resolved(DataType::Timestamp));
                }
            }
            OpType::Minus => {
                if matches!(l, DataType::Date | DataType::Timestamp) {
                    if r == DataType::Int {
                        let (date, days) = self.into_operands()?;
                        let days = Expression::negate_expr(days).optimize(session)?;
                        return date_function(session, "DATEADD", "DAY", days, date);
                    } else if r.is_fractional() {
                        let (date, days) = self.into_operands()?;
                        let seconds = Expression::negate_expr(Expression::mul_expr(
                            Expression::int(SECONDS_PER_DAY),
                            days,
                        ))
                        .optimize(session)?;
                        return date_function(session, "DATEADD", "SECOND", seconds, date);
                    } else if r == DataType::Time {
                        return Ok(self.resolved(DataType::Timestamp));
                    } else if matches!(r, DataType::Date | DataType::Timestamp) {
                        let (end, start) = self.into_operands()?;
                        return date_function(session, "DATEDIFF", "DAY", start, end);
                    }
                } else if l == DataType::Time && r == DataType::Time {
                    return Ok(self.resolved(DataType::Time));
                }
            }
            OpType::Multiply => {
                if l == DataType::Time {
                    self.convert_right = false;
                    return Ok(self.resolved(DataType::Time));
                } else if r == DataType::Time {
                    self.swap();
                    self.convert_right = false;
                    return Ok(self.resolved(DataType::Time));
                }
            }
            OpType::Divide => {
                if l == DataType::Time {
                    self.convert_right = false;
                    return Ok(self.resolved(DataType::Time));
                }
            }
            OpType::Modulus => {}
            OpType::Concat | OpType::Negate => {
                return Err(ExpressionError::Internal(format!(
                    "operator {:?} has no temporal resolution",
                    self.op
                )));
            }
        }
        Err(ExpressionError::UnsupportedOperation {
            left: l,
            operator: self.op.as_str(),
            right: r,
        })
    }

    fn resolved(mut self, data_type: DataType) -> Expression {
        self.data_type = Some(data_type);
        Expression::Operation(Box::new(self))
    }

    fn fold_constants(self, session: &Session) -> ExpressionResult<Expression> {
        let constant_right = self.right.as_ref().map_or(true, Expression::is_constant);
        if self.left.is_constant() && constant_right {
            let value = self.value(&EvalContext::new(session))?;
            trace!("folded {} into {}", self.sql(false), value.sql());
            return Ok(Expression::Literal(value));
        }
        Ok(Expression::Operation(Box::new(self)))
    }

    fn swap(&mut self) {
        if let Some(right) = self.right.as_mut() {
            std::mem::swap(&mut self.left, right);
        }
    }

    fn right_operand(&self) -> ExpressionResult<&Expression> {
        self.right.as_ref().ok_or_else(|| self.missing_right())
    }

    fn into_operands(self) -> ExpressionResult<(Expression, Expression)> {
        match self.right {
            Some(right) => Ok((self.left, right)),
            None => Err(ExpressionError::Internal(format!(
                "operator {:?} is missing its right operand",
                self.op
            ))),
        }
    }

    fn missing_right(&self) -> ExpressionError {
        ExpressionError::Internal(format!(
            "operator {:?} is missing its right operand",
            self.op
        ))
    }

    /// Evaluate the operation; only valid on the result of `optimize`
    pub fn value(&self, ctx: &EvalContext<'_>) -> ExpressionResult<Value> {
        let data_type = self.data_type.ok_or_else(|| {
            ExpressionError::Internal(format!(
                "operation {} evaluated before it was optimized",
                self.sql(false)
            ))
        })?;

        let l = self.left.value(ctx)?.convert_to(data_type)?;
        if self.op == OpType::Negate {
            return if l.is_null() { Ok(Value::Null) } else { l.negate() };
        }

        let r = self.right_operand()?.value(ctx)?;
        let r = if self.convert_right {
            r.convert_to(data_type)?
        } else {
            r
        };

        if self.op == OpType::Concat {
            return Ok(concat(ctx.mode(), l, r));
        }
        if l.is_null() || r.is_null() {
            return Ok(Value::Null);
        }
        match self.op {
            OpType::Plus => l.add(&r),
            OpType::Minus => l.subtract(&r),
            OpType::Multiply => l.multiply(&r),
            OpType::Divide => l.divide(&r),
            OpType::Modulus => l.modulus(&r),
            OpType::Concat | OpType::Negate => Err(ExpressionError::Internal(format!(
                "unexpected operator {:?}",
                self.op
            ))),
        }
    }

    /// Bind column references in both operands
    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) {
        self.left.map_columns(resolver, level);
        if let Some(right) = self.right.as_mut() {
            right.map_columns(resolver, level);
        }
    }

    pub fn set_evaluatable(&mut self, filter: &TableFilter, evaluatable: bool) {
        self.left.set_evaluatable(filter, evaluatable);
        if let Some(right) = self.right.as_mut() {
            right.set_evaluatable(filter, evaluatable);
        }
    }

    pub fn update_aggregate(&mut self, ctx: &EvalContext<'_>) -> ExpressionResult<()> {
        self.left.update_aggregate(ctx)?;
        if let Some(right) = self.right.as_mut() {
            right.update_aggregate(ctx)?;
        }
        Ok(())
    }

    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        self.left.is_everything(visitor)
            && self
                .right
                .as_ref()
                .map_or(true, |right| right.is_everything(visitor))
    }

    /// Estimated evaluation cost: both operands plus one
    pub fn cost(&self) -> i32 {
        self.left.cost() + 1 + self.right.as_ref().map_or(0, Expression::cost)
    }

    /// Sum of operand precisions for concatenation, otherwise the larger one
    pub fn precision(&self) -> i64 {
        match &self.right {
            Some(right) if self.op == OpType::Concat => {
                self.left.precision().saturating_add(right.precision())
            }
            Some(right) => self.left.precision().max(right.precision()),
            None => self.left.precision(),
        }
    }

    /// Like `precision`, clamped to `i32`
    pub fn display_size(&self) -> i32 {
        match &self.right {
            Some(right) if self.op == OpType::Concat => {
                saturating_i32(self.left.display_size() as i64 + right.display_size() as i64)
            }
            Some(right) => self.left.display_size().max(right.display_size()),
            None => self.left.display_size(),
        }
    }

    /// Larger of the operand scales
    pub fn scale(&self) -> i32 {
        match &self.right {
            Some(right) => self.left.scale().max(right.scale()),
            None => self.left.scale(),
        }
    }

    /// Render as parenthesized SQL text
    pub fn sql(&self, is_distributed: bool) -> String {
        // Keep the spaces: "--1" would start a line comment
        match &self.right {
            None => format!("(- {})", self.left.sql(is_distributed)),
            Some(right) => format!(
                "({} {} {})",
                self.left.sql(is_distributed),
                self.op.as_str(),
                right.sql(is_distributed)
            ),
        }
    }
}

fn concat(mode: &Mode, l: Value, r: Value) -> Value {
    if l.is_null() {
        return if mode.null_concat_is_null { Value::Null } else { r };
    }
    if r.is_null() {
        return if mode.null_concat_is_null { Value::Null } else { l };
    }
    Value::Varchar(format!("{}{}", l, r))
}

/// Build and resolve `name(unit, first, second)`
fn date_function(
    session: &Session,
    name: &str,
    unit: &str,
    first: Expression,
    second: Expression,
) -> ExpressionResult<Expression> {
    let mut function = FunctionCall::get(name)?;
    function.set_parameter(0, Expression::varchar(unit))?;
    function.set_parameter(1, first)?;
    function.set_parameter(2, second)?;
    function.done_with_parameters()?;
    let rewritten = function.optimize(session)?;
    debug!("temporal arithmetic rewritten as {}", rewritten.sql(false));
    Ok(rewritten)
}
