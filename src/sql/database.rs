use std::{fmt, sync::Arc};

use super::{OperationKind, QueryOutput, SqlCall, SqlDriver, Statement, driver::DriverHandler};
use crate::{
    Context, Descriptor, Result,
    dsn::Driver,
    middleware::{Chained, Handler},
    observe::Observers,
};

/// One instrumented chain per operation kind.
#[derive(Clone)]
struct Callbacks {
    create: Chained<SqlCall>,
    update: Chained<SqlCall>,
    delete: Chained<SqlCall>,
    query: Chained<SqlCall>,
    raw: Chained<SqlCall>,
}

impl Callbacks {
    fn install(conn: Arc<dyn SqlDriver>, observers: &Observers) -> Self {
        let chain = || observers.chain::<SqlCall>().handler(DriverHandler::new(Arc::clone(&conn)));
        Self { create: chain(), update: chain(), delete: chain(), query: chain(), raw: chain() }
    }

    fn get(&self, kind: OperationKind) -> &Chained<SqlCall> {
        match kind {
            OperationKind::Create => &self.create,
            OperationKind::Update => &self.update,
            OperationKind::Delete => &self.delete,
            OperationKind::Query => &self.query,
            OperationKind::Raw => &self.raw,
        }
    }
}

/// An instrumented relational client.
///
/// Built by [`SqlConfig::build`](super::SqlConfig::build). Every operation
/// kind runs through the tracing, logging and metrics observers; calls whose
/// context carries no operation name go straight to the connection.
///
/// Cloning is cheap and shares the connection and observers.
///
/// ## Example
///
/// ```rust
/// use storebox::{Context, Options};
/// use storebox::sql::{SqlConfig, Statement};
/// use storebox::testing::MockSqlDriver;
///
/// # tokio_test::block_on(async {
/// let db = SqlConfig::new("root@tcp(127.0.0.1:3306)/shop")
///     .build(&MockSqlDriver::new(), &Options::default())
///     .await?;
///
/// let ctx = Context::background().with_operation("list_users");
/// let out = db.query(&ctx, Statement::new("SELECT * FROM `user` WHERE id = ?").bind(1)).await?;
/// assert!(out.rows.is_empty());
/// # Ok::<(), storebox::Error>(())
/// # });
/// ```
#[derive(Clone)]
pub struct Database {
    descriptor: Arc<Descriptor>,
    driver: Driver,
    callbacks: Callbacks,
}

impl Database {
    pub(crate) fn new(descriptor: Arc<Descriptor>, driver: Driver, conn: Arc<dyn SqlDriver>, observers: &Observers) -> Self {
        Self { descriptor, driver, callbacks: Callbacks::install(conn, observers) }
    }

    /// Connection metadata parsed from the DSN.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Driver this client was built for.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Runs an insert.
    pub async fn create(&self, ctx: &Context, statement: impl Into<Statement>) -> Result<QueryOutput> {
        self.exec(ctx, OperationKind::Create, statement).await
    }

    /// Runs an update.
    pub async fn update(&self, ctx: &Context, statement: impl Into<Statement>) -> Result<QueryOutput> {
        self.exec(ctx, OperationKind::Update, statement).await
    }

    /// Runs a delete.
    pub async fn delete(&self, ctx: &Context, statement: impl Into<Statement>) -> Result<QueryOutput> {
        self.exec(ctx, OperationKind::Delete, statement).await
    }

    /// Runs a select.
    pub async fn query(&self, ctx: &Context, statement: impl Into<Statement>) -> Result<QueryOutput> {
        self.exec(ctx, OperationKind::Query, statement).await
    }

    /// Runs a raw statement.
    pub async fn raw(&self, ctx: &Context, statement: impl Into<Statement>) -> Result<QueryOutput> {
        self.exec(ctx, OperationKind::Raw, statement).await
    }

    /// Dispatches `statement` through the chain installed for `kind`.
    pub async fn exec(&self, ctx: &Context, kind: OperationKind, statement: impl Into<Statement>) -> Result<QueryOutput> {
        let call = SqlCall::new(kind, statement);
        self.callbacks.get(kind).handle(ctx.clone(), call).await
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.driver)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
