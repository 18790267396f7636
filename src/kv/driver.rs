use std::sync::Arc;

use futures::future::BoxFuture;

use super::{Command, Pipeline, Reply};
use crate::{
    Context, Result,
    middleware::{CallFuture, Handler},
};

/// An open key-value connection.
pub trait KvDriver: Send + Sync + 'static {
    /// Checks the connection. Not observed.
    fn ping(&self) -> BoxFuture<'_, Result<()>>;

    /// Executes one command. A missing key is the [`nil`](super::nil) error.
    fn process(&self, ctx: Context, command: Command) -> BoxFuture<'_, Result<Reply>>;

    /// Executes a batch in one round trip.
    ///
    /// The outer `Err` is for failures of the round trip itself; per-command
    /// errors go in the returned vector, one entry per command.
    fn pipeline(&self, ctx: Context, pipeline: Pipeline) -> BoxFuture<'_, Result<Vec<Result<Reply>>>>;
}

/// Opens key-value connections.
pub trait KvConnector: Send + Sync {
    /// Connection type produced by this connector.
    type Conn: KvDriver;

    /// Connects to `addr`, authenticating with `password` when non-empty and
    /// selecting database `db`.
    fn connect<'a>(&'a self, addr: &'a str, password: &'a str, db: u32) -> BoxFuture<'a, Result<Self::Conn>>;
}

pub(crate) struct CommandHandler(pub(crate) Arc<dyn KvDriver>);

impl Handler<Command> for CommandHandler {
    fn handle<'a>(&'a self, ctx: Context, call: Command) -> CallFuture<'a, Reply> {
        self.0.process(ctx, call)
    }
}

pub(crate) struct PipelineHandler(pub(crate) Arc<dyn KvDriver>);

impl Handler<Pipeline> for PipelineHandler {
    fn handle<'a>(&'a self, ctx: Context, call: Pipeline) -> CallFuture<'a, Vec<Result<Reply>>> {
        self.0.pipeline(ctx, call)
    }
}
