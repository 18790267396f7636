//! Destinations for finished spans.

use std::sync::Arc;

use parking_lot::Mutex;

use super::FinishedSpan;

/// Receives spans as they finish.
///
/// Implementations must be cheap and non-blocking: `export` runs inline on
/// the caller's task right after the wrapped operation completes. Batching
/// and network delivery belong behind this trait, not in front of it.
pub trait SpanExporter: Send + Sync {
    /// Hands over one finished span.
    fn export(&self, span: FinishedSpan);
}

/// Discards every span. The default exporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExporter;

impl SpanExporter for NoopExporter {
    fn export(&self, _span: FinishedSpan) {}
}

/// Collects finished spans in memory for assertions.
///
/// Clones share the same buffer, so a test can keep one handle and pass the
/// other to [`Options::with_exporter`](crate::Options::with_exporter).
#[derive(Debug, Clone, Default)]
pub struct InMemoryExporter {
    spans: Arc<Mutex<Vec<FinishedSpan>>>,
}

impl InMemoryExporter {
    /// Creates an empty exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every span exported so far.
    pub fn spans(&self) -> Vec<FinishedSpan> {
        self.spans.lock().clone()
    }

    /// Removes and returns every span exported so far.
    pub fn take(&self) -> Vec<FinishedSpan> {
        std::mem::take(&mut *self.spans.lock())
    }

    /// Returns the spans with the given name.
    pub fn spans_named(&self, name: &str) -> Vec<FinishedSpan> {
        self.spans.lock().iter().filter(|span| span.name() == name).cloned().collect()
    }

    /// Returns the number of exported spans.
    pub fn len(&self) -> usize {
        self.spans.lock().len()
    }

    /// Returns `true` if nothing has been exported.
    pub fn is_empty(&self) -> bool {
        self.spans.lock().is_empty()
    }
}

impl SpanExporter for InMemoryExporter {
    fn export(&self, span: FinishedSpan) {
        self.spans.lock().push(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{SpanStatus, Tracer};

    #[test]
    fn test_in_memory_clones_share_buffer() {
        let exporter = InMemoryExporter::new();
        let tracer = Tracer::new("test", Arc::new(exporter.clone()));

        tracer.start("a", None).end(SpanStatus::Ok);
        tracer.start("b", None).end(SpanStatus::Ok);

        assert_eq!(exporter.len(), 2);
        assert_eq!(exporter.spans_named("a").len(), 1);

        let taken = exporter.take();
        assert_eq!(taken.len(), 2);
        assert!(exporter.is_empty());
    }

    #[test]
    fn test_noop_discards() {
        let tracer = Tracer::new("test", Arc::new(NoopExporter));
        tracer.start("ignored", None).end(SpanStatus::Ok);
    }
}
