//! Tracing, logging and metrics observers.
//!
//! Each observer is an [`Interceptor`](crate::middleware::Interceptor) that
//! works for any [`Call`]. They are installed in one fixed order for every
//! operation kind of both clients:
//!
//! ```text
//! tracing ─▶ logging ─▶ metrics ─▶ driver
//! (outer)                (inner)
//! ```
//!
//! The span therefore encloses the logging and metrics timing, and the log
//! line can read the active span's trace and span ids from the context.
//!
//! Every observer checks the context's operation name first. Without one the
//! call is passed straight to `next` and nothing is recorded.

mod logging;
mod metrics;
mod spans;

use std::sync::Arc;

pub use self::{logging::LoggingInterceptor, metrics::MetricsInterceptor, spans::TracingInterceptor};
use crate::{
    Descriptor, Options, Result,
    middleware::{Call, Chain, Interceptor},
};

/// Which client family an observer set instruments.
///
/// Controls metric naming and the fields included in log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    /// Relational client: `db_*` metrics, user name logged.
    Relational,
    /// Key-value client: `redis_*` metrics, no user name.
    KeyValue,
}

impl ClientKind {
    /// Metric namespace.
    pub fn namespace(&self) -> &'static str {
        match self {
            ClientKind::Relational => "db",
            ClientKind::KeyValue => "redis",
        }
    }

    /// Metric label names: instance, database, operation.
    pub fn label_names(&self) -> [&'static str; 3] {
        match self {
            ClientKind::Relational => ["db_instance", "db_name", "operation"],
            ClientKind::KeyValue => ["redis_instance", "db", "operation"],
        }
    }

    /// Whether log messages carry `db.user`.
    pub fn logs_user(&self) -> bool {
        matches!(self, ClientKind::Relational)
    }
}

/// The three observers for one client, shared across its operation kinds.
#[derive(Clone)]
pub struct Observers {
    tracing: Arc<TracingInterceptor>,
    logging: Arc<LoggingInterceptor>,
    metrics: Arc<MetricsInterceptor>,
}

impl Observers {
    /// Returns a chain holding the observers in their fixed order.
    pub fn chain<C: Call>(&self) -> Chain<C> {
        let tracing: Arc<dyn Interceptor<C>> = self.tracing.clone();
        let logging: Arc<dyn Interceptor<C>> = self.logging.clone();
        let metrics: Arc<dyn Interceptor<C>> = self.metrics.clone();
        Chain::new().with_shared(tracing).with_shared(logging).with_shared(metrics)
    }

    /// The metrics observer, for inspecting its families.
    pub fn metrics(&self) -> &MetricsInterceptor {
        &self.metrics
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").finish_non_exhaustive()
    }
}

/// Builds the observers for one client.
///
/// # Errors
///
/// Fails if the metric families cannot be registered in the configured
/// registry (for example a family of the same name with other labels).
pub fn observers(descriptor: Arc<Descriptor>, kind: ClientKind, options: &Options) -> Result<Observers> {
    let metrics = MetricsInterceptor::new(&descriptor, kind, options.registry(), options.metrics_config())?;
    Ok(Observers {
        tracing: Arc::new(TracingInterceptor::new(Arc::clone(&descriptor), options.exporter())),
        logging: Arc::new(LoggingInterceptor::new(descriptor, kind, options.logger())),
        metrics: Arc::new(metrics),
    })
}

/// Renders trace and span ids of the active span, empty when there is none.
fn span_ids(ctx: &crate::Context) -> (String, String) {
    ctx.span().map_or_else(
        || (String::new(), String::new()),
        |span| (span.trace_id().to_string(), span.span_id().to_string()),
    )
}
