//! Call-scope context threaded through every instrumented call.
//!
//! A [`Context`] carries the caller-supplied operation name and, once a
//! tracing observer has run, the active span. It is immutable: extending it
//! returns a new value and leaves the parent untouched.
//!
//! The operation name is the single opt-in gate for instrumentation. Calls
//! made with a context that has no operation name (or an empty one) pass
//! straight through every observer and produce no telemetry.
//!
//! ```rust
//! use storebox::{Context, operation_from, with_operation};
//!
//! let ctx = with_operation(&Context::background(), "demo");
//! assert_eq!(operation_from(&ctx), Some("demo"));
//! assert_eq!(operation_from(&Context::background()), None);
//! ```

use std::sync::Arc;

use crate::trace::SpanContext;

/// Call-scope metadata for one instrumented call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    operation: Option<Arc<str>>,
    span: Option<SpanContext>,
}

impl Context {
    /// Returns an empty root context: unobserved, no active span.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a derived context carrying `name` as the operation name.
    ///
    /// The newest name wins. An empty name yields an unobserved context.
    #[must_use]
    pub fn with_operation(&self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        Self { operation: (!name.is_empty()).then(|| Arc::from(name)), span: self.span.clone() }
    }

    /// Returns the operation name, or `None` if the call is unobserved.
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns `true` if observers should instrument calls made with this context.
    pub fn is_observed(&self) -> bool {
        self.operation.is_some()
    }

    /// Returns a derived context whose active span is `span`.
    #[must_use]
    pub fn with_span(&self, span: SpanContext) -> Self {
        Self { operation: self.operation.clone(), span: Some(span) }
    }

    /// Returns the active span, if any.
    pub fn span(&self) -> Option<&SpanContext> {
        self.span.as_ref()
    }
}

/// Attaches an operation name to a derived context.
pub fn with_operation(ctx: &Context, name: impl AsRef<str>) -> Context {
    ctx.with_operation(name)
}

/// Reads the operation name from a context.
pub fn operation_from(ctx: &Context) -> Option<&str> {
    ctx.operation()
}
