//! Column references and parameters.

use crate::expression::{ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::session::EvalContext;
use crate::types::{DataType, Value};

/// Position and type of a column within the rows a resolver produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column index in the row (0-based)
    pub index: usize,
    pub data_type: DataType,
}

/// Something column names can be bound against, usually a table in a FROM clause
pub trait ColumnResolver {
    fn table_alias(&self) -> &str;

    fn find_column(&self, name: &str) -> Option<ColumnInfo>;
}

/// A table (or alias) participating in a query, with its column layout
#[derive(Debug, Clone, PartialEq)]
pub struct TableFilter {
    alias: String,
    columns: Vec<(String, DataType)>,
}

impl TableFilter {
    pub fn new(alias: impl Into<String>, columns: Vec<(&str, DataType)>) -> Self {
        Self {
            alias: alias.into(),
            columns: columns
                .into_iter()
                .map(|(name, data_type)| (name.to_string(), data_type))
                .collect(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl ColumnResolver for TableFilter {
    fn table_alias(&self) -> &str {
        &self.alias
    }

    fn find_column(&self, name: &str) -> Option<ColumnInfo> {
        self.columns
            .iter()
            .position(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|index| ColumnInfo {
                index,
                data_type: self.columns[index].1,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Binding {
    table_alias: String,
    column: ColumnInfo,
    query_level: u32,
}

/// Column reference in an expression, bound by [`ColumnRef::map_columns`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Optional table qualifier as written
    pub table: Option<String>,
    pub name: String,
    binding: Option<Binding>,
    evaluatable: bool,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            binding: None,
            evaluatable: false,
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::new(name)
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Bind this column to the first resolver that knows it
    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) {
        if self.binding.is_some() {
            return;
        }
        if let Some(table) = &self.table {
            if !table.eq_ignore_ascii_case(resolver.table_alias()) {
                return;
            }
        }
        if let Some(column) = resolver.find_column(&self.name) {
            self.binding = Some(Binding {
                table_alias: resolver.table_alias().to_string(),
                column,
                query_level: level,
            });
        }
    }

    pub fn set_evaluatable(&mut self, filter: &TableFilter, evaluatable: bool) {
        if let Some(binding) = &self.binding {
            if binding.table_alias == filter.alias() {
                self.evaluatable = evaluatable;
            }
        }
    }

    pub fn data_type(&self) -> DataType {
        self.binding
            .as_ref()
            .map_or(DataType::Unknown, |b| b.column.data_type)
    }

    /// Unbound columns cannot be resolved
    pub fn check_bound(&self) -> ExpressionResult<()> {
        match self.binding {
            Some(_) => Ok(()),
            None => Err(ExpressionError::ColumnNotFound(self.sql())),
        }
    }

    pub fn value(&self, ctx: &EvalContext<'_>) -> ExpressionResult<Value> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| ExpressionError::ColumnNotFound(self.sql()))?;
        let row = ctx.row();
        row.get(binding.column.index)
            .cloned()
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index: binding.column.index,
                row_size: row.len(),
            })
    }

    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        match visitor {
            ExpressionVisitor::Deterministic => true,
            ExpressionVisitor::Evaluatable => self.evaluatable,
            ExpressionVisitor::Independent { query_level } => self
                .binding
                .as_ref()
                .map_or(false, |b| b.query_level < *query_level),
            ExpressionVisitor::NotFromResolver { table_alias } => self
                .binding
                .as_ref()
                .map_or(true, |b| b.table_alias != *table_alias),
        }
    }

    pub fn sql(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }
}

/// Positional parameter (`?1`, `?2`, ...), typed only once a value is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter index (0-based)
    pub index: usize,
}

impl Parameter {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn value(&self, ctx: &EvalContext<'_>) -> ExpressionResult<Value> {
        ctx.parameters()
            .get(self.index)
            .cloned()
            .ok_or(ExpressionError::ParameterNotSet(self.index + 1))
    }

    pub fn sql(&self) -> String {
        format!("?{}", self.index + 1)
    }
}
