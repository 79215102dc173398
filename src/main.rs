//! VibeExpr - resolves and evaluates sample SQL expressions under a compatibility mode

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::Parser as ClapParser;
use rust_decimal::Decimal;
use vibeexpr::expression::{Expression, TableFilter};
use vibeexpr::mode::Mode;
use vibeexpr::session::{EvalContext, Session};
use vibeexpr::types::{DataType, Value};

/// VibeExpr - SQL expression resolver
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Compatibility mode (REGULAR, DB2, Derby, HSQLDB, MSSQLServer, MySQL, Oracle, PostgreSQL)
    #[arg(short, long, default_value = "REGULAR")]
    mode: String,

    /// Override whether NULL || 'x' is NULL
    #[arg(long)]
    null_concat_is_null: Option<bool>,

    /// Let + concatenate strings
    #[arg(long)]
    plus_concat: bool,

    /// Resolve non-temporal arithmetic as DECIMAL
    #[arg(long)]
    force_decimal: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn mode(&self) -> Result<Mode> {
        let mut mode = Mode::named(&self.mode)
            .ok_or_else(|| anyhow!("Unknown compatibility mode: {}", self.mode))?;
        if let Some(value) = self.null_concat_is_null {
            mode = mode.with_null_concat_is_null(value);
        }
        if self.plus_concat {
            mode = mode.with_plus_for_string_concat(true);
        }
        if self.force_decimal {
            mode = mode.with_force_decimal_arithmetic(true);
        }
        Ok(mode)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let session = Session::new(args.mode()?);
    log::info!("Using compatibility mode {}", session.mode().name());

    let orders = TableFilter::new(
        "O",
        vec![
            ("ID", DataType::Int),
            ("NAME", DataType::Varchar),
            ("PLACED", DataType::Date),
            ("SHIPPED", DataType::Date),
            ("PRICE", DataType::Decimal),
            ("OPENS", DataType::Time),
        ],
    );
    let row = sample_row().context("Failed to build sample row")?;
    let ctx = EvalContext::new(&session).with_row(&row);

    println!("{:<40} {:<50} {:<10} VALUE", "EXPRESSION", "RESOLVED", "TYPE");
    for mut expr in sample_expressions() {
        let original = expr.sql(false);
        expr.map_columns(&orders, 0);
        match run(expr, &session, &ctx) {
            Ok((resolved, value)) => println!(
                "{:<40} {:<50} {:<10} {}",
                original,
                resolved.sql(false),
                resolved.data_type().name(),
                value.sql()
            ),
            Err(e) => println!("{:<40} {:#}", original, e),
        }
    }

    Ok(())
}

fn run(expr: Expression, session: &Session, ctx: &EvalContext<'_>) -> Result<(Expression, Value)> {
    let original = expr.sql(false);
    let resolved = expr
        .optimize(session)
        .with_context(|| format!("Failed to resolve {}", original))?;
    let value = resolved
        .value(ctx)
        .with_context(|| format!("Failed to evaluate {}", resolved.sql(false)))?;
    Ok((resolved, value))
}

fn sample_row() -> Result<Vec<Value>> {
    let placed = NaiveDate::from_ymd_opt(2024, 2, 27).context("Invalid date")?;
    let shipped = NaiveDate::from_ymd_opt(2024, 3, 4).context("Invalid date")?;
    let opens = NaiveTime::from_hms_opt(9, 30, 0).context("Invalid time")?;
    Ok(vec![
        Value::Int(7),
        Value::varchar("widget"),
        Value::Date(placed),
        Value::Date(shipped),
        Value::Decimal("19.99".parse::<Decimal>().context("Invalid decimal")?),
        Value::Time(opens),
    ])
}

fn sample_expressions() -> Vec<Expression> {
    vec![
        Expression::add_expr(Expression::int(1), Expression::int(2)),
        Expression::mul_expr(Expression::column("PRICE"), Expression::column("ID")),
        Expression::mod_expr(Expression::column("ID"), Expression::int(4)),
        Expression::negate_expr(Expression::column("ID")),
        Expression::concat_expr(Expression::column("NAME"), Expression::varchar("-x")),
        Expression::concat_expr(Expression::null(), Expression::column("NAME")),
        Expression::add_expr(Expression::column("NAME"), Expression::column("NAME")),
        Expression::add_expr(Expression::column("PLACED"), Expression::int(3)),
        Expression::sub_expr(Expression::column("PLACED"), Expression::int(30)),
        Expression::sub_expr(Expression::column("SHIPPED"), Expression::column("PLACED")),
        Expression::add_expr(
            Expression::literal(Value::Decimal(Decimal::new(15, 1))),
            Expression::column("PLACED"),
        ),
        Expression::mul_expr(Expression::int(2), Expression::column("OPENS")),
        Expression::add_expr(Expression::column("PLACED"), Expression::column("OPENS")),
        Expression::add_expr(
            Expression::column("PLACED"),
            Expression::literal(Value::Boolean(true)),
        ),
    ]
}
