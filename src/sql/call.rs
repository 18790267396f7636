use std::fmt;

use super::{QueryOutput, Statement};
use crate::middleware::Call;

/// The five operation kinds the relational client dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Insert.
    Create,
    /// Update.
    Update,
    /// Delete.
    Delete,
    /// Select.
    Query,
    /// Raw statement execution.
    Raw,
}

impl OperationKind {
    /// Every kind, in dispatch-table order.
    pub const ALL: [OperationKind; 5] =
        [OperationKind::Create, OperationKind::Update, OperationKind::Delete, OperationKind::Query, OperationKind::Raw];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Query => "query",
            OperationKind::Raw => "raw",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One relational operation flowing through the interceptor chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCall {
    /// Operation kind.
    pub kind: OperationKind,
    /// Statement to execute.
    pub statement: Statement,
}

impl SqlCall {
    /// Creates a call.
    pub fn new(kind: OperationKind, statement: impl Into<Statement>) -> Self {
        Self { kind, statement: statement.into() }
    }
}

impl Call for SqlCall {
    type Output = QueryOutput;
    const SOURCE: &'static str = "sql";

    fn statement(&self) -> String {
        self.statement.sql.clone()
    }

    fn detailed_statement(&self) -> String {
        self.statement.explain()
    }
}
