//! Instrumented relational client.
//!
//! [`SqlConfig::build`] parses the DSN into a [`Descriptor`](crate::Descriptor),
//! opens a connection through a [`SqlConnector`], and installs the observers
//! on each of the five [`OperationKind`]s. The resulting [`Database`] routes
//! every statement through its kind's chain.
//!
//! The connection itself is behind [`SqlDriver`], so any client library can
//! be plugged in. [`MockSqlDriver`](crate::testing::MockSqlDriver) is provided
//! for tests.

mod call;
mod config;
mod database;
mod driver;
mod statement;

pub use self::{
    call::{OperationKind, SqlCall},
    config::SqlConfig,
    database::Database,
    driver::{SqlConnector, SqlDriver},
    statement::{QueryOutput, Row, Statement, Value},
};
use crate::{Error, ErrorKind};

/// MySQL server error number for a duplicate key.
pub const MYSQL_DUPLICATE_ENTRY: u16 = 1062;

/// Returns `true` if `err` means no row matched.
pub fn is_record_not_found(err: &Error) -> bool {
    err.is_not_found()
}

/// Returns `true` if `err` is a unique-key violation.
///
/// Matches [`ErrorKind::Duplicate`] as well as driver errors that carry the
/// MySQL server message `Error 1062 ...` under another kind.
pub fn is_record_duplicate(err: &Error) -> bool {
    if err.kind() == ErrorKind::Duplicate {
        return true;
    }
    let marker = format!("Error {MYSQL_DUPLICATE_ENTRY}");
    err.message().contains(&marker)
        || std::error::Error::source(err).is_some_and(|source| source.to_string().contains(&marker))
}
