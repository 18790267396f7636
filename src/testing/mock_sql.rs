//! Scripted relational driver.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::{
    Context, Error, Result,
    dsn::Driver,
    sql::{OperationKind, QueryOutput, SqlCall, SqlConnector, SqlDriver, Statement},
    trace::SpanContext,
};

/// A relational driver that replays scripted outcomes and records every call.
///
/// Outcomes queued with [`respond`](Self::respond) are returned in order;
/// once the queue is empty every call succeeds with an empty
/// [`QueryOutput`]. Clones share state.
///
/// ## Example
///
/// ```rust
/// use storebox::Error;
/// use storebox::sql::QueryOutput;
/// use storebox::testing::MockSqlDriver;
///
/// let mock = MockSqlDriver::new()
///     .respond(Ok(QueryOutput::affected(1)))
///     .respond(Err(Error::not_found("record not found")));
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockSqlDriver {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<QueryOutput>>,
    delay: Option<Duration>,
    open_error: Option<Error>,
    opened: Vec<(Driver, String)>,
    calls: Vec<RecordedCall>,
}

/// A call as the driver saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Operation kind.
    pub kind: OperationKind,
    /// Statement received.
    pub statement: Statement,
    /// Operation name in the received context.
    pub operation: Option<String>,
    /// Active span in the received context.
    pub span: Option<SpanContext>,
}

impl MockSqlDriver {
    /// Creates a driver that succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next unscripted call.
    #[must_use]
    pub fn respond(self, outcome: Result<QueryOutput>) -> Self {
        self.state.lock().responses.push_back(outcome);
        self
    }

    /// Delays every call by `delay`.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    /// Makes [`SqlConnector::open`] fail with `error`.
    #[must_use]
    pub fn fail_open(self, error: Error) -> Self {
        self.state.lock().open_error = Some(error);
        self
    }

    /// Driver and DSN of every successful open.
    pub fn opened(&self) -> Vec<(Driver, String)> {
        self.state.lock().opened.clone()
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }
}

impl SqlDriver for MockSqlDriver {
    fn execute(&self, ctx: Context, call: SqlCall) -> BoxFuture<'_, Result<QueryOutput>> {
        Box::pin(async move {
            let delay = self.state.lock().delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut state = self.state.lock();
            state.calls.push(RecordedCall {
                kind: call.kind,
                statement: call.statement,
                operation: ctx.operation().map(str::to_owned),
                span: ctx.span().cloned(),
            });
            state.responses.pop_front().unwrap_or_else(|| Ok(QueryOutput::default()))
        })
    }
}

impl SqlConnector for MockSqlDriver {
    type Conn = MockSqlDriver;

    fn open<'a>(&'a self, driver: Driver, dsn: &'a str) -> BoxFuture<'a, Result<MockSqlDriver>> {
        let outcome = {
            let mut state = self.state.lock();
            match state.open_error.clone() {
                Some(err) => Err(err),
                None => {
                    state.opened.push((driver, dsn.to_string()));
                    Ok(self.clone())
                },
            }
        };
        Box::pin(async move { outcome })
    }
}

impl std::fmt::Debug for MockSqlDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSqlDriver").field("calls", &self.call_count()).finish_non_exhaustive()
    }
}
