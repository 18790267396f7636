use std::{fmt, sync::Arc};

use super::{NoopExporter, Span, SpanContext, SpanExporter};

/// Starts spans for one instrumentation scope and routes them to an exporter.
///
/// The scope name is the database system (`mysql`, `clickhouse`, `redis`),
/// mirroring how one tracer is created per wrapped client.
#[derive(Clone)]
pub struct Tracer {
    scope: Arc<str>,
    exporter: Arc<dyn SpanExporter>,
}

impl Tracer {
    /// Creates a tracer that exports to `exporter`.
    pub fn new(scope: impl Into<Arc<str>>, exporter: Arc<dyn SpanExporter>) -> Self {
        Self { scope: scope.into(), exporter }
    }

    /// Creates a tracer whose spans are discarded.
    pub fn noop(scope: impl Into<Arc<str>>) -> Self {
        Self::new(scope, Arc::new(NoopExporter))
    }

    /// Returns the instrumentation scope name.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Starts a span. With a parent the span joins the parent's trace,
    /// otherwise it begins a new one.
    pub fn start(&self, name: impl Into<String>, parent: Option<&SpanContext>) -> Span {
        let context = match parent {
            Some(parent) => parent.child(),
            None => SpanContext::new_root(),
        };
        Span::start(name.into(), context, Arc::clone(&self.exporter))
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("scope", &self.scope).finish_non_exhaustive()
    }
}
