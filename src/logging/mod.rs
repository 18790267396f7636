//! Structured logging.
//!
//! Observers emit one [`LogRecord`] per observed call through a [`Logger`].
//! The default logger is a [`JsonLogger`] writing line-delimited JSON to
//! stdout; swap it with [`Options::with_logger`](crate::Options::with_logger).
//!
//! ```text
//! {"level":"info","log_time":"2026-10-16T08:12:45.120Z","message":"db.operation=demo\t...","trace_id":"4bf9...","span_id":"00f0..."}
//! ```

mod json;
mod sink;
#[cfg(feature = "tracing")]
mod tracing_logger;

use std::fmt;

pub use json::JsonLogger;
pub use sink::{LogSink, StdoutSink};
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use tracing_logger::TracingLogger;

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Lowercase level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Message body.
    pub message: String,
    /// Side-channel fields, in emission order.
    pub fields: Vec<(&'static str, String)>,
}

impl LogRecord {
    /// Creates a record without fields.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), fields: Vec::new() }
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    /// Returns the first field with the given key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

/// Destination for structured log records.
pub trait Logger: Send + Sync {
    /// Emits a record.
    fn log(&self, record: LogRecord);

    /// Emits an info-level record.
    fn info(&self, message: String, fields: Vec<(&'static str, String)>) {
        self.log(LogRecord { level: LogLevel::Info, message, fields });
    }

    /// Emits an error-level record.
    fn error(&self, message: String, fields: Vec<(&'static str, String)>) {
        self.log(LogRecord { level: LogLevel::Error, message, fields });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_record_fields() {
        let record = LogRecord::new(LogLevel::Info, "hello").with_field("trace_id", "abc").with_field("span_id", "");
        assert_eq!(record.field("trace_id"), Some("abc"));
        assert_eq!(record.field("span_id"), Some(""));
        assert_eq!(record.field("missing"), None);
    }
}
