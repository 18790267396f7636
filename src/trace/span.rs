//! Span types for traced operations.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};

use super::{SpanContext, SpanExporter};

/// Status of a finished span.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpanStatus {
    /// Span status was never set (span dropped without being ended).
    #[default]
    Unset,
    /// Span completed successfully.
    Ok,
    /// Span completed with an error.
    Error(String),
}

impl SpanStatus {
    /// Returns `true` if the span status is Ok.
    pub fn is_ok(&self) -> bool {
        matches!(self, SpanStatus::Ok)
    }

    /// Returns `true` if the span status is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, SpanStatus::Error(_))
    }

    /// Returns the error message if this is an error status.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            SpanStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

impl fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanStatus::Unset => write!(f, "unset"),
            SpanStatus::Ok => write!(f, "ok"),
            SpanStatus::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// A value that can be attached to a span as an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A boolean value.
    Bool(bool),
    /// An array of strings.
    StringArray(Vec<String>),
}

impl SpanValue {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpanValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SpanValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for SpanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanValue::String(s) => write!(f, "{}", s),
            SpanValue::Int(i) => write!(f, "{}", i),
            SpanValue::Bool(b) => write!(f, "{}", b),
            SpanValue::StringArray(arr) => write!(f, "{}", arr.join(",")),
        }
    }
}

impl From<&str> for SpanValue {
    fn from(s: &str) -> Self {
        SpanValue::String(s.to_string())
    }
}

impl From<String> for SpanValue {
    fn from(s: String) -> Self {
        SpanValue::String(s)
    }
}

impl From<i64> for SpanValue {
    fn from(i: i64) -> Self {
        SpanValue::Int(i)
    }
}

impl From<bool> for SpanValue {
    fn from(b: bool) -> Self {
        SpanValue::Bool(b)
    }
}

impl From<Vec<String>> for SpanValue {
    fn from(arr: Vec<String>) -> Self {
        SpanValue::StringArray(arr)
    }
}

/// A timestamped event recorded on a span (e.g. an exception).
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    /// Event name.
    pub name: String,
    /// Wall-clock time the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Event attributes.
    pub attributes: Vec<(String, SpanValue)>,
}

/// A live span.
///
/// `Span` is a scoped resource: it is exported exactly once, either through
/// [`Span::end`] or, if the owner is dropped first (a cancelled future, an
/// early return), from `Drop` with [`SpanStatus::Unset`].
pub struct Span {
    data: Option<SpanData>,
    exporter: Arc<dyn SpanExporter>,
}

struct SpanData {
    name: String,
    context: SpanContext,
    attributes: Vec<(String, SpanValue)>,
    events: Vec<SpanEvent>,
    start_time: DateTime<Utc>,
    started: Instant,
}

impl Span {
    pub(crate) fn start(name: String, context: SpanContext, exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            data: Some(SpanData {
                name,
                context,
                attributes: Vec::new(),
                events: Vec::new(),
                start_time: Utc::now(),
                started: Instant::now(),
            }),
            exporter,
        }
    }

    /// Returns the span context, used to parent child spans and correlate logs.
    pub fn context(&self) -> Option<&SpanContext> {
        self.data.as_ref().map(|data| &data.context)
    }

    /// Adds an attribute to the span.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<SpanValue>) {
        if let Some(data) = self.data.as_mut() {
            data.attributes.push((key.into(), value.into()));
        }
    }

    /// Records an exception event carrying the error message.
    pub fn record_error(&mut self, error: &dyn std::error::Error) {
        if let Some(data) = self.data.as_mut() {
            data.events.push(SpanEvent {
                name: "exception".to_string(),
                timestamp: Utc::now(),
                attributes: vec![("exception.message".to_string(), error.to_string().into())],
            });
        }
    }

    /// Ends the span with the given status and exports it.
    pub fn end(mut self, status: SpanStatus) {
        self.finish(status);
    }

    fn finish(&mut self, status: SpanStatus) {
        if let Some(data) = self.data.take() {
            self.exporter.export(FinishedSpan {
                name: data.name,
                context: data.context,
                attributes: data.attributes,
                events: data.events,
                start_time: data.start_time,
                duration: data.started.elapsed(),
                status,
            });
        }
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        self.finish(SpanStatus::Unset);
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("name", &self.data.as_ref().map(|d| d.name.as_str()))
            .field("context", &self.context())
            .finish_non_exhaustive()
    }
}

/// A finished span with timing information.
#[derive(Debug, Clone)]
pub struct FinishedSpan {
    name: String,
    context: SpanContext,
    attributes: Vec<(String, SpanValue)>,
    events: Vec<SpanEvent>,
    start_time: DateTime<Utc>,
    duration: Duration,
    status: SpanStatus,
}

impl FinishedSpan {
    /// Returns the span name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the span context.
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Returns the span attributes in insertion order.
    pub fn attributes(&self) -> &[(String, SpanValue)] {
        &self.attributes
    }

    /// Returns the first attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&SpanValue> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the recorded events.
    pub fn events(&self) -> &[SpanEvent] {
        &self.events
    }

    /// Returns the wall-clock start time.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns the span duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the span status.
    pub fn status(&self) -> &SpanStatus {
        &self.status
    }
}

/// Attribute keys following the OpenTelemetry database conventions.
pub mod attribute_keys {
    /// Database system (e.g. `mysql`, `redis`).
    pub const DB_SYSTEM: &str = "db.system";
    /// Connection address(es).
    pub const DB_CONNECTION_STRING: &str = "db.connection_string";
    /// Connection user.
    pub const DB_USER: &str = "db.user";
    /// Logical database name or index.
    pub const DB_NAME: &str = "db.name";
    /// Statement or command text.
    pub const DB_STATEMENT: &str = "db.statement";
    /// Caller-supplied operation name.
    pub const DB_OPERATION: &str = "db.operation";
    /// Trace identifier of the span.
    pub const TRACE_ID: &str = "trace_id";
}
