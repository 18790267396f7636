//! Test doubles for applications that use storebox.
//!
//! - [`MockSqlDriver`]: scripted relational driver that records every call
//! - [`MemoryKv`]: in-memory key-value backend with real get/set semantics
//! - [`MemorySink`]: log sink that keeps lines for inspection
//!
//! Pair them with [`InMemoryExporter`](crate::trace::InMemoryExporter) and a
//! private [`Registry`](crate::metrics::Registry) to assert on all three
//! telemetry signals.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use storebox::{Context, Options};
//! use storebox::logging::JsonLogger;
//! use storebox::sql::SqlConfig;
//! use storebox::testing::{MemorySink, MockSqlDriver};
//! use storebox::trace::InMemoryExporter;
//!
//! # tokio_test::block_on(async {
//! let sink = MemorySink::new();
//! let exporter = InMemoryExporter::new();
//! let options = Options::new()
//!     .with_logger(Arc::new(JsonLogger::new(Arc::new(sink.clone()))))
//!     .with_exporter(Arc::new(exporter.clone()));
//!
//! let db = SqlConfig::new("root@tcp(127.0.0.1:3306)/shop").build(&MockSqlDriver::new(), &options).await?;
//! db.query(&Context::background().with_operation("ping"), "SELECT 1").await?;
//!
//! assert_eq!(exporter.len(), 1);
//! assert_eq!(sink.records()[0]["level"], "info");
//! # Ok::<(), storebox::Error>(())
//! # });
//! ```
//!
//! ## MockSqlDriver vs MemoryKv
//!
//! | Feature               | MockSqlDriver | MemoryKv |
//! |-----------------------|---------------|----------|
//! | Scripted outcomes     | ✓             | ✗        |
//! | Real data semantics   | ✗             | ✓        |
//! | Records contexts seen | ✓             | ✓        |
//! | Injected delay        | ✓             | ✓        |

mod memory_kv;
mod memory_sink;
mod mock_sql;

pub use memory_kv::MemoryKv;
pub use memory_sink::MemorySink;
pub use mock_sql::{MockSqlDriver, RecordedCall};
