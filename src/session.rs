//! Session state threaded through resolution and evaluation.

use crate::mode::Mode;
use crate::types::Value;

/// Immutable per-connection configuration used while resolving expressions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: Mode,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }
}

/// Everything an expression needs to produce a value for the current row.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    session: &'a Session,
    /// Values of the row being evaluated
    row: &'a [Value],
    /// Values bound to `?` parameters
    parameters: &'a [Value],
}

impl<'a> EvalContext<'a> {
    /// Context with no current row, as used for constant folding
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            row: &[],
            parameters: &[],
        }
    }

    pub fn with_row(mut self, row: &'a [Value]) -> Self {
        self.row = row;
        self
    }

    pub fn with_parameters(mut self, parameters: &'a [Value]) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn mode(&self) -> &'a Mode {
        self.session.mode()
    }

    pub fn row(&self) -> &'a [Value] {
        self.row
    }

    pub fn parameters(&self) -> &'a [Value] {
        self.parameters
    }
}
