//! Line sinks for the JSON logger.

use std::io::Write;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Writes one line. The line includes its trailing newline.
    fn write_line(&self, line: &str);
}

/// Log sink that writes to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = stdout.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}
