//! Built-in date arithmetic functions.
//!
//! `DATEADD(unit, count, t)` shifts a date, time or timestamp by `count`
//! units; `DATEDIFF(unit, t1, t2)` counts the unit boundaries crossed from
//! `t1` to `t2`. Both are also the targets of the temporal rewrites done by
//! [`Operation::optimize`](crate::expression::Operation::optimize).

use crate::expression::column::{ColumnResolver, TableFilter};
use crate::expression::{Expression, ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::session::{EvalContext, Session};
use crate::types::{DataType, Value};
use chrono::{Datelike, Months, NaiveDateTime, TimeDelta};
use log::trace;

const PARAMETER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    DateAdd,
    DateDiff,
}

impl FunctionKind {
    fn name(self) -> &'static str {
        match self {
            FunctionKind::DateAdd => "DATEADD",
            FunctionKind::DateDiff => "DATEDIFF",
        }
    }
}

/// Unit of a date arithmetic function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl DateUnit {
    pub fn parse(unit: &str) -> ExpressionResult<DateUnit> {
        let unit = match unit.trim().to_uppercase().as_str() {
            "YEAR" | "YEARS" | "YY" | "YYYY" => DateUnit::Year,
            "MONTH" | "MONTHS" | "MM" | "M" => DateUnit::Month,
            "WEEK" | "WEEKS" | "WK" | "WW" => DateUnit::Week,
            "DAY" | "DAYS" | "DD" | "D" => DateUnit::Day,
            "HOUR" | "HOURS" | "HH" => DateUnit::Hour,
            "MINUTE" | "MINUTES" | "MI" | "N" => DateUnit::Minute,
            "SECOND" | "SECONDS" | "SS" | "S" => DateUnit::Second,
            "MILLISECOND" | "MILLISECONDS" | "MS" => DateUnit::Millisecond,
            _ => {
                return Err(ExpressionError::InvalidParameterValue {
                    parameter: "unit",
                    value: unit.to_string(),
                })
            }
        };
        Ok(unit)
    }

    /// Whether adding this unit to a DATE keeps it a DATE
    fn is_date_granular(self) -> bool {
        matches!(
            self,
            DateUnit::Year | DateUnit::Month | DateUnit::Week | DateUnit::Day
        )
    }
}

/// A call of `DATEADD` or `DATEDIFF`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    kind: FunctionKind,
    args: Vec<Option<Expression>>,
    data_type: Option<DataType>,
}

impl FunctionCall {
    /// Look up a function by name (case-insensitive)
    pub fn get(name: &str) -> ExpressionResult<FunctionCall> {
        let kind = match name.to_uppercase().as_str() {
            "DATEADD" | "TIMESTAMPADD" => FunctionKind::DateAdd,
            "DATEDIFF" | "TIMESTAMPDIFF" => FunctionKind::DateDiff,
            _ => return Err(ExpressionError::UnknownFunction(name.to_string())),
        };
        Ok(FunctionCall {
            kind,
            args: vec![None; PARAMETER_COUNT],
            data_type: None,
        })
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn set_parameter(&mut self, index: usize, expr: Expression) -> ExpressionResult<()> {
        let slot = self
            .args
            .get_mut(index)
            .ok_or(ExpressionError::FunctionArgumentCount {
                function: self.kind.name(),
                expected: PARAMETER_COUNT,
                actual: index + 1,
            })?;
        *slot = Some(expr);
        Ok(())
    }

    /// Check that every parameter has been bound
    pub fn done_with_parameters(&self) -> ExpressionResult<()> {
        let bound = self.args.iter().filter(|arg| arg.is_some()).count();
        if bound != PARAMETER_COUNT {
            return Err(ExpressionError::FunctionArgumentCount {
                function: self.kind.name(),
                expected: PARAMETER_COUNT,
                actual: bound,
            });
        }
        Ok(())
    }

    /// Bound arguments, in order
    pub fn args(&self) -> impl Iterator<Item = &Expression> {
        self.args.iter().flatten()
    }

    fn arg(&self, index: usize) -> ExpressionResult<&Expression> {
        self.args
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                ExpressionError::Internal(format!(
                    "{} parameter {} is not bound",
                    self.kind.name(),
                    index
                ))
            })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type.unwrap_or(DataType::Unknown)
    }

    pub fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        self.done_with_parameters()?;
        let args = std::mem::take(&mut self.args);
        self.args = args
            .into_iter()
            .map(|arg| arg.map(|arg| arg.optimize(session)).transpose())
            .collect::<ExpressionResult<_>>()?;

        // a constant unit is checked now rather than on every row
        let unit = match self.arg(0)? {
            Expression::Literal(Value::Null) => None,
            Expression::Literal(value) => Some(DateUnit::parse(&value.to_string())?),
            _ => None,
        };

        self.data_type = Some(match self.kind {
            FunctionKind::DateDiff => DataType::BigInt,
            FunctionKind::DateAdd => match (self.arg(2)?.data_type(), unit) {
                (DataType::Time, _) => DataType::Time,
                (DataType::Date, Some(unit)) if unit.is_date_granular() => DataType::Date,
                _ => DataType::Timestamp,
            },
        });

        if self.args().all(Expression::is_constant) {
            let value = self.value(&EvalContext::new(session))?;
            trace!("folded {} into {}", self.sql(false), value.sql());
            return Ok(Expression::Literal(value));
        }
        Ok(Expression::Function(Box::new(self)))
    }

    pub fn value(&self, ctx: &EvalContext<'_>) -> ExpressionResult<Value> {
        let data_type = self.data_type.ok_or_else(|| {
            ExpressionError::Internal(format!(
                "function {} evaluated before it was optimized",
                self.sql(false)
            ))
        })?;

        let unit = self.arg(0)?.value(ctx)?;
        if unit.is_null() {
            return Ok(Value::Null);
        }
        let unit = DateUnit::parse(&unit.to_string())?;

        match self.kind {
            FunctionKind::DateAdd => {
                let count = self.arg(1)?.value(ctx)?.convert_to(DataType::BigInt)?;
                let t = self.arg(2)?.value(ctx)?;
                match (count, timestamp_of(&t)?) {
                    (Value::BigInt(count), Some(ts)) => {
                        Value::Timestamp(date_add(unit, count, ts)?).convert_to(data_type)
                    }
                    _ => Ok(Value::Null),
                }
            }
            FunctionKind::DateDiff => {
                let t1 = timestamp_of(&self.arg(1)?.value(ctx)?)?;
                let t2 = timestamp_of(&self.arg(2)?.value(ctx)?)?;
                match (t1, t2) {
                    (Some(t1), Some(t2)) => Ok(Value::BigInt(date_diff(unit, t1, t2))),
                    _ => Ok(Value::Null),
                }
            }
        }
    }

    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) {
        for arg in self.args.iter_mut().flatten() {
            arg.map_columns(resolver, level);
        }
    }

    pub fn set_evaluatable(&mut self, filter: &TableFilter, evaluatable: bool) {
        for arg in self.args.iter_mut().flatten() {
            arg.set_evaluatable(filter, evaluatable);
        }
    }

    pub fn update_aggregate(&mut self, ctx: &EvalContext<'_>) -> ExpressionResult<()> {
        for arg in self.args.iter_mut().flatten() {
            arg.update_aggregate(ctx)?;
        }
        Ok(())
    }

    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        self.args().all(|arg| arg.is_everything(visitor))
    }

    pub fn cost(&self) -> i32 {
        3 + self.args().map(Expression::cost).sum::<i32>()
    }

    pub fn sql(&self, is_distributed: bool) -> String {
        let args: Vec<String> = self.args().map(|arg| arg.sql(is_distributed)).collect();
        format!("{}({})", self.kind.name(), args.join(", "))
    }
}

/// NULL stays `None`; anything else must be convertible to TIMESTAMP
fn timestamp_of(value: &Value) -> ExpressionResult<Option<NaiveDateTime>> {
    match value.convert_to(DataType::Timestamp)? {
        Value::Timestamp(ts) => Ok(Some(ts)),
        _ => Ok(None),
    }
}

fn date_add(unit: DateUnit, count: i64, ts: NaiveDateTime) -> ExpressionResult<NaiveDateTime> {
    let overflow = || ExpressionError::NumericOverflow(format!("{} {:?}", count, unit));
    let result = match unit {
        DateUnit::Year => add_months(ts, count.checked_mul(12).ok_or_else(overflow)?),
        DateUnit::Month => add_months(ts, count),
        DateUnit::Week => TimeDelta::try_weeks(count).and_then(|d| ts.checked_add_signed(d)),
        DateUnit::Day => TimeDelta::try_days(count).and_then(|d| ts.checked_add_signed(d)),
        DateUnit::Hour => TimeDelta::try_hours(count).and_then(|d| ts.checked_add_signed(d)),
        DateUnit::Minute => TimeDelta::try_minutes(count).and_then(|d| ts.checked_add_signed(d)),
        DateUnit::Second => TimeDelta::try_seconds(count).and_then(|d| ts.checked_add_signed(d)),
        DateUnit::Millisecond => {
            TimeDelta::try_milliseconds(count).and_then(|d| ts.checked_add_signed(d))
        }
    };
    result.ok_or_else(overflow)
}

fn add_months(ts: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        ts.checked_add_months(magnitude)
    } else {
        ts.checked_sub_months(magnitude)
    }
}

fn date_diff(unit: DateUnit, t1: NaiveDateTime, t2: NaiveDateTime) -> i64 {
    match unit {
        DateUnit::Year => (t2.year() - t1.year()) as i64,
        DateUnit::Month => month_index(t2) - month_index(t1),
        DateUnit::Week => week_index(t2) - week_index(t1),
        DateUnit::Day => (t2.date() - t1.date()).num_days(),
        DateUnit::Hour => floor_seconds(t2, 3600) - floor_seconds(t1, 3600),
        DateUnit::Minute => floor_seconds(t2, 60) - floor_seconds(t1, 60),
        DateUnit::Second => floor_seconds(t2, 1) - floor_seconds(t1, 1),
        DateUnit::Millisecond => {
            t2.and_utc().timestamp_millis() - t1.and_utc().timestamp_millis()
        }
    }
}

fn month_index(ts: NaiveDateTime) -> i64 {
    ts.year() as i64 * 12 + ts.month0() as i64
}

/// Weeks start on Monday; 0001-01-01 was one
fn week_index(ts: NaiveDateTime) -> i64 {
    (ts.num_days_from_ce() as i64 - 1).div_euclid(7)
}

fn floor_seconds(ts: NaiveDateTime, unit: i64) -> i64 {
    ts.and_utc().timestamp().div_euclid(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn timestamp(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> Value {
        Value::Timestamp(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    fn call(name: &str, unit: &str, a: Value, b: Value) -> Expression {
        Expression::function(
            name,
            vec![
                Expression::varchar(unit),
                Expression::literal(a),
                Expression::literal(b),
            ],
        )
        .unwrap()
    }

    fn eval(expr: Expression) -> ExpressionResult<Value> {
        let session = Session::default();
        let expr = expr.optimize(&session)?;
        expr.value(&EvalContext::new(&session))
    }

    #[test]
    fn test_lookup() {
        assert_eq!(FunctionCall::get("dateadd").unwrap().name(), "DATEADD");
        assert_eq!(FunctionCall::get("DateDiff").unwrap().name(), "DATEDIFF");
        assert_eq!(
            FunctionCall::get("NOW"),
            Err(ExpressionError::UnknownFunction("NOW".to_string()))
        );
    }

    #[test]
    fn test_parameter_count() {
        let mut f = FunctionCall::get("DATEADD").unwrap();
        f.set_parameter(0, Expression::varchar("DAY")).unwrap();
        assert_eq!(
            f.done_with_parameters(),
            Err(ExpressionError::FunctionArgumentCount {
                function: "DATEADD",
                expected: 3,
                actual: 1
            })
        );
        assert!(matches!(
            f.set_parameter(3, Expression::int(1)),
            Err(ExpressionError::FunctionArgumentCount { actual: 4, .. })
        ));
    }

    #[test]
    fn test_units() {
        assert_eq!(DateUnit::parse("day").unwrap(), DateUnit::Day);
        assert_eq!(DateUnit::parse("MI").unwrap(), DateUnit::Minute);
        assert_eq!(DateUnit::parse("yyyy").unwrap(), DateUnit::Year);
        assert!(matches!(
            DateUnit::parse("FORTNIGHT"),
            Err(ExpressionError::InvalidParameterValue { parameter: "unit", .. })
        ));
        assert!(matches!(
            eval(call("DATEADD", "FORTNIGHT", Value::Int(1), date(2024, 1, 1))),
            Err(ExpressionError::InvalidParameterValue { .. })
        ));
    }

    #[test]
    fn test_date_add() {
        assert_eq!(
            eval(call("DATEADD", "DAY", Value::Int(3), date(2024, 2, 27))).unwrap(),
            date(2024, 3, 1)
        );
        assert_eq!(
            eval(call("DATEADD", "MONTH", Value::Int(1), date(2024, 1, 31))).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            eval(call("DATEADD", "YEAR", Value::Int(-1), date(2024, 2, 29))).unwrap(),
            date(2023, 2, 28)
        );
        // sub-day units turn a DATE into a TIMESTAMP
        assert_eq!(
            eval(call("DATEADD", "HOUR", Value::Int(5), date(2024, 1, 1))).unwrap(),
            timestamp(2024, 1, 1, 5, 0, 0)
        );
        assert_eq!(
            eval(call(
                "DATEADD",
                "SECOND",
                Value::Decimal("129600.0".parse().unwrap()),
                date(2024, 1, 1)
            ))
            .unwrap(),
            timestamp(2024, 1, 2, 12, 0, 0)
        );
        assert_eq!(
            eval(call(
                "DATEADD",
                "MINUTE",
                Value::Int(90),
                Value::Time(NaiveTime::from_hms_opt(23, 0, 0).unwrap())
            ))
            .unwrap(),
            Value::Time(NaiveTime::from_hms_opt(0, 30, 0).unwrap())
        );
        assert_eq!(
            eval(call("DATEADD", "DAY", Value::Null, date(2024, 1, 1))).unwrap(),
            Value::Null
        );
        assert!(matches!(
            eval(call("DATEADD", "YEAR", Value::BigInt(i64::MAX), date(2024, 1, 1))),
            Err(ExpressionError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_date_diff() {
        assert_eq!(
            eval(call("DATEDIFF", "DAY", date(2024, 1, 10), date(2024, 1, 15))).unwrap(),
            Value::BigInt(5)
        );
        assert_eq!(
            eval(call("DATEDIFF", "DAY", date(2024, 1, 15), date(2024, 1, 10))).unwrap(),
            Value::BigInt(-5)
        );
        // boundaries crossed, not elapsed time
        assert_eq!(
            eval(call(
                "DATEDIFF",
                "YEAR",
                timestamp(2023, 12, 31, 23, 59, 59),
                timestamp(2024, 1, 1, 0, 0, 0)
            ))
            .unwrap(),
            Value::BigInt(1)
        );
        assert_eq!(
            eval(call(
                "DATEDIFF",
                "HOUR",
                timestamp(2024, 1, 1, 10, 59, 0),
                timestamp(2024, 1, 1, 11, 1, 0)
            ))
            .unwrap(),
            Value::BigInt(1)
        );
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        assert_eq!(
            eval(call("DATEDIFF", "WEEK", date(2024, 1, 7), date(2024, 1, 8))).unwrap(),
            Value::BigInt(1)
        );
        assert_eq!(
            eval(call("DATEDIFF", "MONTH", date(2023, 11, 30), date(2024, 2, 1))).unwrap(),
            Value::BigInt(3)
        );
        assert_eq!(
            eval(call("DATEDIFF", "DAY", Value::Null, date(2024, 1, 1))).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_resolution_without_constants() {
        let session = Session::default();
        let filter = TableFilter::new("T", vec![("D", DataType::Date)]);
        let mut expr = Expression::function(
            "DATEADD",
            vec![
                Expression::varchar("DAY"),
                Expression::int(1),
                Expression::column("D"),
            ],
        )
        .unwrap();
        expr.map_columns(&filter, 0);
        let expr = expr.optimize(&session).unwrap();

        assert_eq!(expr.data_type(), DataType::Date);
        assert_eq!(expr.cost(), 3 + 2);
        assert_eq!(expr.sql(false), "DATEADD('DAY', 1, D)");

        let row = vec![date(2024, 1, 1)];
        let ctx = EvalContext::new(&session).with_row(&row);
        assert_eq!(expr.value(&ctx).unwrap(), date(2024, 1, 2));
    }
}
