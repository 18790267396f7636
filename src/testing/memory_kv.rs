//! In-memory key-value backend.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::{
    Context, Error, Result,
    kv::{Command, KvConnector, KvDriver, Pipeline, Reply, nil},
};

/// An in-memory key-value store that acts as both connector and connection.
///
/// Understands `PING`, `GET`, `SET`, `DEL`, `EXISTS` and `INCR`. Any other
/// command fails with `ERR unknown command`. Clones share state, so a test
/// can keep one handle for assertions and pass another to
/// [`KvConfig::build`](crate::kv::KvConfig::build).
///
/// ## Example
///
/// ```rust
/// use storebox::testing::MemoryKv;
///
/// let kv = MemoryKv::new();
/// kv.insert("session:1", "alice");
/// assert_eq!(kv.value("session:1").as_deref(), Some("alice"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryKv {
    state: Arc<Mutex<KvState>>,
}

#[derive(Default)]
struct KvState {
    data: BTreeMap<String, String>,
    ping_error: Option<Error>,
    command_error: Option<Error>,
    pipeline_error: Option<Error>,
    delay: Option<Duration>,
    connections: Vec<(String, u32)>,
    contexts: Vec<Context>,
}

impl MemoryKv {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every ping fail with `error`.
    #[must_use]
    pub fn fail_ping(self, error: Error) -> Self {
        self.state.lock().ping_error = Some(error);
        self
    }

    /// Makes every single command fail with `error`.
    #[must_use]
    pub fn fail_commands(self, error: Error) -> Self {
        self.state.lock().command_error = Some(error);
        self
    }

    /// Makes every pipeline round trip fail with `error`.
    #[must_use]
    pub fn fail_pipeline(self, error: Error) -> Self {
        self.state.lock().pipeline_error = Some(error);
        self
    }

    /// Delays every command and pipeline by `delay`.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    /// Stores `value` under `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.lock().data.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.lock().data.get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.state.lock().data.is_empty()
    }

    /// Addresses and database indexes connected to, in order.
    pub fn connections(&self) -> Vec<(String, u32)> {
        self.state.lock().connections.clone()
    }

    /// Contexts the driver received, one per command or pipeline.
    pub fn contexts(&self) -> Vec<Context> {
        self.state.lock().contexts.clone()
    }

    fn delay(&self) -> Option<Duration> {
        self.state.lock().delay
    }
}

fn apply(data: &mut BTreeMap<String, String>, command: &Command) -> Result<Reply> {
    let args = command.args();
    let arity = |n: usize| {
        if args.len() < n {
            Err(Error::query(format!("ERR wrong number of arguments for '{}' command", command.name().to_lowercase())))
        } else {
            Ok(())
        }
    };

    match command.name().to_ascii_lowercase().as_str() {
        "ping" => Ok(Reply::Status("PONG".to_string())),
        "get" => {
            arity(1)?;
            data.get(&args[0]).cloned().map(Reply::Bulk).ok_or_else(nil)
        },
        "set" => {
            arity(2)?;
            data.insert(args[0].clone(), args[1].clone());
            Ok(Reply::Status("OK".to_string()))
        },
        "del" => {
            arity(1)?;
            let removed = args.iter().filter(|key| data.remove(key.as_str()).is_some()).count();
            Ok(Reply::Int(i64::try_from(removed).unwrap_or(i64::MAX)))
        },
        "exists" => {
            arity(1)?;
            let present = args.iter().filter(|key| data.contains_key(key.as_str())).count();
            Ok(Reply::Int(i64::try_from(present).unwrap_or(i64::MAX)))
        },
        "incr" => {
            arity(1)?;
            let current = match data.get(&args[0]) {
                Some(value) => value
                    .parse::<i64>()
                    .map_err(|_| Error::query("ERR value is not an integer or out of range"))?,
                None => 0,
            };
            let next = current.checked_add(1).ok_or_else(|| Error::query("ERR increment or decrement would overflow"))?;
            data.insert(args[0].clone(), next.to_string());
            Ok(Reply::Int(next))
        },
        other => Err(Error::query(format!("ERR unknown command '{other}'"))),
    }
}

impl KvDriver for MemoryKv {
    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        let outcome = self.state.lock().ping_error.clone().map_or(Ok(()), Err);
        Box::pin(async move { outcome })
    }

    fn process(&self, ctx: Context, command: Command) -> BoxFuture<'_, Result<Reply>> {
        Box::pin(async move {
            if let Some(delay) = self.delay() {
                tokio::time::sleep(delay).await;
            }
            let mut state = self.state.lock();
            state.contexts.push(ctx);
            if let Some(err) = state.command_error.clone() {
                return Err(err);
            }
            apply(&mut state.data, &command)
        })
    }

    fn pipeline(&self, ctx: Context, pipeline: Pipeline) -> BoxFuture<'_, Result<Vec<Result<Reply>>>> {
        Box::pin(async move {
            if let Some(delay) = self.delay() {
                tokio::time::sleep(delay).await;
            }
            let mut state = self.state.lock();
            state.contexts.push(ctx);
            if let Some(err) = state.pipeline_error.clone() {
                return Err(err);
            }
            Ok(pipeline.commands().iter().map(|command| apply(&mut state.data, command)).collect())
        })
    }
}

impl KvConnector for MemoryKv {
    type Conn = MemoryKv;

    fn connect<'a>(&'a self, addr: &'a str, _password: &'a str, db: u32) -> BoxFuture<'a, Result<MemoryKv>> {
        self.state.lock().connections.push((addr.to_string(), db));
        let conn = self.clone();
        Box::pin(async move { Ok(conn) })
    }
}

impl std::fmt::Debug for MemoryKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKv").field("keys", &self.len()).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kv::is_nil;

    #[tokio::test]
    async fn test_commands() {
        let kv = MemoryKv::new();
        let ctx = Context::background();

        assert_eq!(kv.process(ctx.clone(), Command::ping()).await, Ok(Reply::Status("PONG".into())));
        assert!(is_nil(&kv.process(ctx.clone(), Command::get("k")).await.unwrap_err()));
        kv.process(ctx.clone(), Command::set("k", "v")).await.unwrap();
        assert_eq!(kv.process(ctx.clone(), Command::new("EXISTS").arg("k").arg("x")).await, Ok(Reply::Int(1)));
        assert!(kv.process(ctx.clone(), Command::new("incr").arg("k")).await.is_err());
        assert_eq!(kv.process(ctx.clone(), Command::new("incr").arg("n")).await, Ok(Reply::Int(1)));
        assert!(kv.process(ctx.clone(), Command::new("set").arg("only-key")).await.is_err());
        assert_eq!(kv.process(ctx, Command::del(["k", "n"])).await, Ok(Reply::Int(2)));
        assert_eq!(kv.contexts().len(), 8);
    }

    #[tokio::test]
    async fn test_pipeline_failure() {
        let kv = MemoryKv::new().fail_pipeline(Error::connection("broken pipe"));
        let err = kv.pipeline(Context::background(), Pipeline::new().with(Command::ping())).await.unwrap_err();
        assert_eq!(err.message(), "broken pipe");
    }
}
