//! Statements, bound values and results.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value bound to a statement placeholder or read from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
    /// Timestamp.
    Timestamp(DateTime<Utc>),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// Renders the value as a SQL literal for logging.
    ///
    /// Text is single-quoted with embedded quotes doubled; bytes that are not
    /// printable UTF-8 render as `<binary>`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => quote(s),
            Value::Timestamp(ts) => quote(&ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) if s.chars().all(|c| !c.is_control() || c.is_whitespace()) => quote(s),
                _ => "<binary>".to_string(),
            },
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// SQL text with positional `?` placeholders and their bound values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// SQL text.
    pub sql: String,
    /// Values for the `?` placeholders, in order.
    pub vars: Vec<Value>,
}

impl Statement {
    /// Creates a statement without bound values.
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), vars: Vec::new() }
    }

    /// Binds the next placeholder.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.vars.push(value.into());
        self
    }

    /// Returns the SQL with every placeholder replaced by its rendered value.
    ///
    /// Placeholders without a value are left as `?`; surplus values are ignored.
    ///
    /// ```rust
    /// use storebox::sql::Statement;
    ///
    /// let stmt = Statement::new("SELECT * FROM `user` WHERE name = ? AND age > ?").bind("o'hara").bind(30);
    /// assert_eq!(stmt.explain(), "SELECT * FROM `user` WHERE name = 'o''hara' AND age > 30");
    /// ```
    pub fn explain(&self) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.vars.len() * 8);
        let mut vars = self.vars.iter();
        for c in self.sql.chars() {
            if c != '?' {
                out.push(c);
                continue;
            }
            match vars.next() {
                Some(value) => out.push_str(&value.to_sql_literal()),
                None => out.push('?'),
            }
        }
        out
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::new(sql)
    }
}

/// One result row, keyed by column name.
pub type Row = BTreeMap<String, Value>;

/// Result of executing a statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Rows returned by a query.
    pub rows: Vec<Row>,
}

impl QueryOutput {
    /// Output of a write affecting `rows_affected` rows.
    pub fn affected(rows_affected: u64) -> Self {
        Self { rows_affected, rows: Vec::new() }
    }

    /// Output of a query returning `rows`.
    pub fn rows(rows: Vec<Row>) -> Self {
        Self { rows_affected: 0, rows }
    }
}
