//! Distributed tracing primitives.
//!
//! A [`Tracer`] starts [`Span`]s whose identity ([`SpanContext`]) follows the
//! W3C Trace Context layout. Spans are scoped resources: each one is exported
//! to the configured [`SpanExporter`] exactly once, when it is ended or
//! dropped.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storebox::trace::{InMemoryExporter, SpanStatus, Tracer};
//!
//! let exporter = InMemoryExporter::new();
//! let tracer = Tracer::new("redis", Arc::new(exporter.clone()));
//!
//! let mut span = tracer.start("setOne", None);
//! span.set_attribute("db.statement", "set k v");
//! span.end(SpanStatus::Ok);
//!
//! assert_eq!(exporter.spans()[0].name(), "setOne");
//! ```

mod context;
mod exporter;
mod span;
mod tracer;

pub use context::{SpanContext, SpanId, TraceContextError, TraceId};
pub use exporter::{InMemoryExporter, NoopExporter, SpanExporter};
pub use span::{FinishedSpan, Span, SpanEvent, SpanStatus, SpanValue, attribute_keys};
pub use tracer::Tracer;
