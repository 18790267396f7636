use std::sync::Arc;

use futures::future::BoxFuture;

use super::{QueryOutput, SqlCall};
use crate::{
    Context, Result,
    dsn::Driver,
    middleware::{CallFuture, Handler},
};

/// An open relational connection that executes calls.
///
/// This is the boundary to the real database client. Implementations receive
/// the context as the chain hands it over, so they can read the active span
/// (for example to propagate `traceparent` in a query comment).
pub trait SqlDriver: Send + Sync + 'static {
    /// Executes one call.
    fn execute(&self, ctx: Context, call: SqlCall) -> BoxFuture<'_, Result<QueryOutput>>;
}

impl<D: SqlDriver + ?Sized> SqlDriver for Arc<D> {
    fn execute(&self, ctx: Context, call: SqlCall) -> BoxFuture<'_, Result<QueryOutput>> {
        (**self).execute(ctx, call)
    }
}

/// Opens relational connections.
pub trait SqlConnector: Send + Sync {
    /// Connection type produced by this connector.
    type Conn: SqlDriver;

    /// Opens a connection. Failing here fails the build.
    fn open<'a>(&'a self, driver: Driver, dsn: &'a str) -> BoxFuture<'a, Result<Self::Conn>>;
}

/// Base handler: hands every call to the connection.
pub(crate) struct DriverHandler {
    conn: Arc<dyn SqlDriver>,
}

impl DriverHandler {
    pub(crate) fn new(conn: Arc<dyn SqlDriver>) -> Self {
        Self { conn }
    }
}

impl Handler<SqlCall> for DriverHandler {
    fn handle<'a>(&'a self, ctx: Context, call: SqlCall) -> CallFuture<'a, QueryOutput> {
        self.conn.execute(ctx, call)
    }
}
