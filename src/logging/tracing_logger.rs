use super::{LogLevel, LogRecord, Logger};

/// Forwards records to the `tracing` ecosystem.
///
/// Fields are rendered into a single `fields` value as `key=value` pairs
/// separated by spaces, since `tracing` field names must be static.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, record: LogRecord) {
        let fields = record.fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ");
        let message = record.message.as_str();

        match record.level {
            LogLevel::Debug => tracing::debug!(target: "storebox", fields = %fields, "{}", message),
            LogLevel::Info => tracing::info!(target: "storebox", fields = %fields, "{}", message),
            LogLevel::Warn => tracing::warn!(target: "storebox", fields = %fields, "{}", message),
            LogLevel::Error => tracing::error!(target: "storebox", fields = %fields, "{}", message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{io, sync::Arc};

    use parking_lot::Mutex;
    use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_forwards_level_message_and_fields() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("storebox=info"))
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingLogger.error("db.operation=demo\t".to_string(), vec![("exception_type", "sql".into())]);
            TracingLogger.log(LogRecord::new(LogLevel::Debug, "filtered out"));
        });

        let output = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(output.contains("ERROR"));
        assert!(output.contains("db.operation=demo"));
        assert!(output.contains("fields=exception_type=sql"));
        assert!(!output.contains("filtered out"));
    }
}
