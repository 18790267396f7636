//! Span identity for distributed tracing.

use std::fmt;

/// Identity of one span inside a distributed trace.
///
/// Follows the W3C Trace Context layout so a span started here can join a
/// trace that began upstream (e.g. an incoming HTTP request carrying a
/// `traceparent` header).
///
/// ## Example
///
/// ```rust
/// use storebox::trace::SpanContext;
///
/// let upstream = SpanContext::from_traceparent(
///     "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
/// ).unwrap();
///
/// let child = upstream.child();
/// assert_eq!(child.trace_id(), upstream.trace_id());
/// assert_eq!(child.parent_span_id(), Some(upstream.span_id()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    parent_span_id: Option<SpanId>,
    sampled: bool,
}

impl SpanContext {
    /// Creates a new root span context with random IDs.
    pub fn new_root() -> Self {
        Self { trace_id: TraceId::random(), span_id: SpanId::random(), parent_span_id: None, sampled: true }
    }

    /// Creates a child span context from this context.
    ///
    /// The child inherits the trace ID and uses the current span ID as its parent.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: SpanId::random(),
            parent_span_id: Some(self.span_id),
            sampled: self.sampled,
        }
    }

    /// Parses a W3C `traceparent` header value.
    pub fn from_traceparent(traceparent: &str) -> Result<Self, TraceContextError> {
        let parts: Vec<&str> = traceparent.split('-').collect();
        let [version, trace_id, span_id, flags] = parts.as_slice() else {
            return Err(TraceContextError::InvalidFormat);
        };

        if *version != "00" {
            return Err(TraceContextError::UnsupportedVersion);
        }

        let trace_id = TraceId::from_hex(trace_id)?;
        let span_id = SpanId::from_hex(span_id)?;
        if flags.len() != 2 {
            return Err(TraceContextError::InvalidFlags);
        }
        let flags = u8::from_str_radix(flags, 16).map_err(|_| TraceContextError::InvalidFlags)?;

        Ok(Self { trace_id, span_id, parent_span_id: None, sampled: flags & 0x01 != 0 })
    }

    /// Returns the `traceparent` header value for this span.
    pub fn to_traceparent(&self) -> String {
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, u8::from(self.sampled))
    }

    /// Returns the trace ID.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Returns the span ID.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Returns the parent span ID, if any.
    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    /// Returns `true` if the trace is sampled.
    pub fn is_sampled(&self) -> bool {
        self.sampled
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_traceparent())
    }
}

/// A 128-bit trace identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId([u8; 16]);

impl TraceId {
    /// Creates a new random, non-zero trace ID.
    pub fn random() -> Self {
        Self(fastrand::u128(1..).to_be_bytes())
    }

    /// Creates a trace ID from bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a trace ID from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, TraceContextError> {
        if hex.len() != 32 {
            return Err(TraceContextError::InvalidTraceId);
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| TraceContextError::InvalidTraceId)?;

        // All-zero trace IDs are invalid per W3C
        if bytes == [0u8; 16] {
            return Err(TraceContextError::InvalidTraceId);
        }

        Ok(Self(bytes))
    }

    /// Returns the trace ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A 64-bit span identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId([u8; 8]);

impl SpanId {
    /// Creates a new random, non-zero span ID.
    pub fn random() -> Self {
        Self(fastrand::u64(1..).to_be_bytes())
    }

    /// Creates a span ID from bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Creates a span ID from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, TraceContextError> {
        if hex.len() != 16 {
            return Err(TraceContextError::InvalidSpanId);
        }
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| TraceContextError::InvalidSpanId)?;

        if bytes == [0u8; 8] {
            return Err(TraceContextError::InvalidSpanId);
        }

        Ok(Self(bytes))
    }

    /// Returns the span ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({})", self)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Error parsing a `traceparent` header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceContextError {
    /// Invalid traceparent format.
    #[error("invalid traceparent format")]
    InvalidFormat,
    /// Unsupported version.
    #[error("unsupported trace context version")]
    UnsupportedVersion,
    /// Invalid trace ID.
    #[error("invalid trace ID")]
    InvalidTraceId,
    /// Invalid span ID.
    #[error("invalid span ID")]
    InvalidSpanId,
    /// Invalid flags.
    #[error("invalid trace flags")]
    InvalidFlags,
}
