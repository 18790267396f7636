//! Interceptor chains for cross-cutting concerns.
//!
//! Every client action is a [`Call`]. The driver that performs it is a
//! [`Handler`]. An [`Interceptor`] wraps a handler with before/after logic and
//! hands control onward through [`Next`]. A [`Chain`] composes interceptors
//! around a base handler once, at client construction time.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Instrumented call                                          │
//! │                                                            │
//! │  ┌─────────────────┐                                       │
//! │  │ Your Code       │  db.query(&ctx, stmt)                 │
//! │  └────────┬────────┘                                       │
//! │           ▼                                                │
//! │  ┌─────────────────┐                                       │
//! │  │ Interceptor 1   │  tracing: span encloses everything    │
//! │  └────────┬────────┘                                       │
//! │           ▼                                                │
//! │  ┌─────────────────┐                                       │
//! │  │ Interceptor 2   │  logging: reads the active span ids   │
//! │  └────────┬────────┘                                       │
//! │           ▼                                                │
//! │  ┌─────────────────┐                                       │
//! │  │ Interceptor 3   │  metrics                              │
//! │  └────────┬────────┘                                       │
//! │           ▼                                                │
//! │  ┌─────────────────┐                                       │
//! │  │ Handler         │  driver                               │
//! │  └─────────────────┘                                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Chain::new().with(i1).with(i2).with(i3).handler(base)` evaluates as
//! `i1(i2(i3(base)))` on every call.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Instant;
//!
//! use storebox::{Context, Result};
//! use storebox::middleware::{Call, CallFuture, Chain, Handler, Interceptor, Next, handler_fn};
//!
//! struct Ping;
//!
//! impl Call for Ping {
//!     type Output = &'static str;
//!     const SOURCE: &'static str = "demo";
//!
//!     fn statement(&self) -> String {
//!         "ping".to_string()
//!     }
//! }
//!
//! struct Timing;
//!
//! impl Interceptor<Ping> for Timing {
//!     fn intercept<'a>(&'a self, ctx: Context, call: Ping, next: Next<'a, Ping>) -> CallFuture<'a, &'static str> {
//!         Box::pin(async move {
//!             let start = Instant::now();
//!             let result = next.run(ctx, call).await;
//!             println!("took {:?}", start.elapsed());
//!             result
//!         })
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let chained = Chain::new().with(Timing).handler(handler_fn(|_ctx, _call: Ping| async { Ok("pong") }));
//! assert_eq!(chained.handle(Context::background(), Ping).await, Ok("pong"));
//! # });
//! ```

use std::{fmt, future::Future, sync::Arc};

use futures::future::BoxFuture;

use crate::{Context, Error, Result};

/// Future returned by handlers and interceptors.
pub type CallFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// One client action flowing through a chain.
pub trait Call: Send + 'static {
    /// What the driver returns on success.
    type Output: Send + 'static;

    /// Error-source tag used in logs (`sql`, `redis`).
    const SOURCE: &'static str;

    /// Statement text as recorded on spans.
    fn statement(&self) -> String;

    /// Statement text as logged. Defaults to [`Call::statement`].
    fn detailed_statement(&self) -> String {
        self.statement()
    }

    /// Returns the error that telemetry should report for `result`, if any.
    ///
    /// This only classifies; the result itself always reaches the caller
    /// unchanged. The default reports any `Err`.
    fn failure(result: &Result<Self::Output>) -> Option<&Error> {
        result.as_ref().err()
    }
}

/// Performs a call.
pub trait Handler<C: Call>: Send + Sync {
    /// Handles one call.
    fn handle<'a>(&'a self, ctx: Context, call: C) -> CallFuture<'a, C::Output>;
}

impl<C: Call, H: Handler<C> + ?Sized> Handler<C> for Arc<H> {
    fn handle<'a>(&'a self, ctx: Context, call: C) -> CallFuture<'a, C::Output> {
        (**self).handle(ctx, call)
    }
}

/// Wraps a handler with before/after logic.
///
/// Implementations call `next.run(ctx, call)` exactly once and return its
/// result. They may derive a new context for the inner layers (for example
/// to publish the active span) but must not alter the outcome.
pub trait Interceptor<C: Call>: Send + Sync + 'static {
    /// Intercepts one call.
    fn intercept<'a>(&'a self, ctx: Context, call: C, next: Next<'a, C>) -> CallFuture<'a, C::Output>;
}

/// The remainder of a chain: inner interceptors plus the base handler.
pub struct Next<'a, C: Call> {
    rest: &'a [Arc<dyn Interceptor<C>>],
    endpoint: &'a dyn Handler<C>,
}

impl<'a, C: Call> Next<'a, C> {
    /// Runs the remainder of the chain.
    pub fn run(self, ctx: Context, call: C) -> CallFuture<'a, C::Output> {
        match self.rest.split_first() {
            Some((first, rest)) => first.intercept(ctx, call, Next { rest, endpoint: self.endpoint }),
            None => self.endpoint.handle(ctx, call),
        }
    }

    /// Number of interceptors still ahead of the base handler.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

impl<C: Call> fmt::Debug for Next<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining", &self.rest.len()).finish_non_exhaustive()
    }
}

/// An ordered list of interceptors, outermost first.
pub struct Chain<C: Call> {
    interceptors: Vec<Arc<dyn Interceptor<C>>>,
}

impl<C: Call> Chain<C> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { interceptors: Vec::new() }
    }

    /// Adds an interceptor inside every interceptor added so far.
    #[must_use]
    pub fn with<I: Interceptor<C>>(mut self, interceptor: I) -> Self {
        self.push(interceptor);
        self
    }

    /// Adds an interceptor inside every interceptor added so far.
    pub fn push<I: Interceptor<C>>(&mut self, interceptor: I) {
        self.interceptors.push(Arc::new(interceptor));
    }

    /// Adds an already shared interceptor as the innermost layer.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor<C>>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Adds an interceptor outside every interceptor added so far.
    ///
    /// Repeated `wrap` calls compose like hook registration: the last one
    /// wrapped runs first.
    #[must_use]
    pub fn wrap<I: Interceptor<C>>(mut self, interceptor: I) -> Self {
        self.interceptors.insert(0, Arc::new(interceptor));
        self
    }

    /// Returns the number of interceptors.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain has no interceptors.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Composes the chain around `base`.
    pub fn handler<H: Handler<C> + 'static>(self, base: H) -> Chained<C> {
        Chained { interceptors: self.interceptors.into(), endpoint: Arc::new(base) }
    }
}

impl<C: Call> Default for Chain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Call> Clone for Chain<C> {
    fn clone(&self) -> Self {
        Self { interceptors: self.interceptors.clone() }
    }
}

impl<C: Call> fmt::Debug for Chain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.interceptors.len()).finish()
    }
}

/// A chain composed around its base handler. Itself a [`Handler`], so
/// composed chains nest.
pub struct Chained<C: Call> {
    interceptors: Arc<[Arc<dyn Interceptor<C>>]>,
    endpoint: Arc<dyn Handler<C>>,
}

impl<C: Call> Handler<C> for Chained<C> {
    fn handle<'a>(&'a self, ctx: Context, call: C) -> CallFuture<'a, C::Output> {
        Next { rest: &self.interceptors, endpoint: self.endpoint.as_ref() }.run(ctx, call)
    }
}

impl<C: Call> Clone for Chained<C> {
    fn clone(&self) -> Self {
        Self { interceptors: Arc::clone(&self.interceptors), endpoint: Arc::clone(&self.endpoint) }
    }
}

impl<C: Call> fmt::Debug for Chained<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chained").field("interceptors", &self.interceptors.len()).finish_non_exhaustive()
    }
}

/// Handler backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

/// Creates a handler from an async closure.
pub fn handler_fn<C, F, Fut>(f: F) -> FnHandler<F>
where
    C: Call,
    F: Fn(Context, C) -> Fut + Send + Sync,
    Fut: Future<Output = Result<C::Output>> + Send + 'static,
{
    FnHandler { f }
}

impl<C, F, Fut> Handler<C> for FnHandler<F>
where
    C: Call,
    F: Fn(Context, C) -> Fut + Send + Sync,
    Fut: Future<Output = Result<C::Output>> + Send + 'static,
{
    fn handle<'a>(&'a self, ctx: Context, call: C) -> CallFuture<'a, C::Output> {
        Box::pin((self.f)(ctx, call))
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// An interceptor that does nothing (useful for testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<C: Call> Interceptor<C> for Passthrough {
    fn intercept<'a>(&'a self, ctx: Context, call: C, next: Next<'a, C>) -> CallFuture<'a, C::Output> {
        next.run(ctx, call)
    }
}
