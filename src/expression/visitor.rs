//! Expression visitors used for plan analysis.

/// A property checked over a whole expression tree with
/// [`Expression::is_everything`](crate::expression::Expression::is_everything).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionVisitor {
    /// Same inputs always give the same result
    Deterministic,
    /// Every column can be evaluated with the currently joined tables
    Evaluatable,
    /// No column belongs to a query at or below this nesting level
    Independent { query_level: u32 },
    /// No column is bound through the table with this alias
    NotFromResolver { table_alias: String },
}

impl ExpressionVisitor {
    pub fn independent(query_level: u32) -> Self {
        ExpressionVisitor::Independent { query_level }
    }

    pub fn not_from_resolver(table_alias: impl Into<String>) -> Self {
        ExpressionVisitor::NotFromResolver {
            table_alias: table_alias.into(),
        }
    }
}
