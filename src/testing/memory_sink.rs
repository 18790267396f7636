use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::LogSink;

/// A log sink that keeps every line in memory.
///
/// Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, with their trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Lines parsed as JSON. Lines that are not JSON are skipped.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines.lock().iter().filter_map(|line| serde_json::from_str(line.trim_end()).ok()).collect()
    }

    /// Removes and returns the lines written so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
