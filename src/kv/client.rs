use std::{fmt, sync::Arc};

use super::{
    Command, Pipeline, Reply,
    driver::{CommandHandler, KvDriver, PipelineHandler},
    is_nil,
};
use crate::{
    Context, Descriptor, Error, Result,
    middleware::{Chained, Handler},
    observe::Observers,
};

/// An instrumented key-value client.
///
/// Single commands and pipelines each run through their own chain with the
/// tracing, logging and metrics observers. A pipeline is observed once as a
/// whole, never per command.
///
/// ## Example
///
/// ```rust
/// use storebox::{Context, Options};
/// use storebox::kv::{Command, KvConfig};
/// use storebox::testing::MemoryKv;
///
/// # tokio_test::block_on(async {
/// let client = KvConfig::new().with_addr(["127.0.0.1:6379"]).build(&MemoryKv::new(), &Options::default()).await?;
/// let ctx = Context::background().with_operation("warm_cache");
///
/// client.set(&ctx, "greeting", "hello").await?;
/// assert_eq!(client.get(&ctx, "greeting").await?, Some("hello".to_string()));
///
/// let replies = client.pipelined(&ctx, [Command::get("greeting"), Command::del(["greeting"])]).await?;
/// assert_eq!(replies.len(), 2);
/// # Ok::<(), storebox::Error>(())
/// # });
/// ```
#[derive(Clone)]
pub struct KvClient {
    descriptor: Arc<Descriptor>,
    command: Chained<Command>,
    pipeline: Chained<Pipeline>,
}

impl KvClient {
    pub(crate) fn new(descriptor: Arc<Descriptor>, conn: Arc<dyn KvDriver>, observers: &Observers) -> Self {
        Self {
            descriptor,
            command: observers.chain::<Command>().handler(CommandHandler(Arc::clone(&conn))),
            pipeline: observers.chain::<Pipeline>().handler(PipelineHandler(conn)),
        }
    }

    /// Connection metadata.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Runs one command.
    pub async fn process(&self, ctx: &Context, command: Command) -> Result<Reply> {
        self.command.handle(ctx.clone(), command).await
    }

    /// Runs a batch of commands in one round trip, returning one result per command.
    pub async fn pipelined<I>(&self, ctx: &Context, commands: I) -> Result<Vec<Result<Reply>>>
    where
        I: IntoIterator<Item = Command>,
    {
        self.pipeline.handle(ctx.clone(), commands.into_iter().collect()).await
    }

    /// `GET key`. A missing key is `Ok(None)`.
    pub async fn get(&self, ctx: &Context, key: &str) -> Result<Option<String>> {
        match self.process(ctx, Command::get(key)).await {
            Ok(Reply::Bulk(value) | Reply::Status(value)) => Ok(Some(value)),
            Ok(Reply::Int(value)) => Ok(Some(value.to_string())),
            Ok(reply @ Reply::Array(_)) => Err(Error::query(format!("unexpected reply to get: {reply}"))),
            Err(err) if is_nil(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// `SET key value`.
    pub async fn set(&self, ctx: &Context, key: &str, value: impl ToString) -> Result<()> {
        self.process(ctx, Command::set(key, value)).await.map(|_| ())
    }

    /// `DEL key [key ...]`, returning how many keys existed.
    pub async fn del(&self, ctx: &Context, keys: &[&str]) -> Result<u64> {
        let reply = self.process(ctx, Command::del(keys)).await?;
        reply
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| Error::query(format!("unexpected reply to del: {reply}")))
    }
}

impl fmt::Debug for KvClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvClient").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}
