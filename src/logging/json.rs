//! Line-delimited JSON logger.

use std::{fmt, sync::Arc};

use chrono::{SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{LogLevel, LogRecord, LogSink, Logger, StdoutSink};

/// JSON logger emitting one line per record.
///
/// Key order is fixed: `level`, `log_time` (ISO-8601, UTC, milliseconds),
/// `logger` (when named), `message`, then the record's fields.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    name: Option<String>,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Creates a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, name: None, min_level: LogLevel::Info }
    }

    /// Creates a JSON logger writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Arc::new(StdoutSink))
    }

    /// Sets the `logger` name emitted with every line.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the minimum level. Records below it are dropped.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn encode(&self, record: &LogRecord) -> String {
        let line = Line {
            level: record.level,
            log_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            logger: self.name.as_deref(),
            record,
        };
        serde_json::to_string(&line).map_or_else(
            |_| "{\"level\":\"error\",\"message\":\"log serialization failed\"}\n".to_string(),
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        )
    }
}

impl Default for JsonLogger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Logger for JsonLogger {
    fn log(&self, record: LogRecord) {
        if record.level < self.min_level {
            return;
        }
        self.sink.write_line(&self.encode(&record));
    }
}

impl fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

struct Line<'a> {
    level: LogLevel,
    log_time: String,
    logger: Option<&'a str>,
    record: &'a LogRecord,
}

impl Serialize for Line<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", self.level.as_str())?;
        map.serialize_entry("log_time", &self.log_time)?;
        if let Some(logger) = self.logger {
            map.serialize_entry("logger", logger)?;
        }
        map.serialize_entry("message", &self.record.message)?;
        for (key, value) in &self.record.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
