//! Prelude module for convenient imports.
//!
//! ```rust
//! use storebox::prelude::*;
//! ```
//!
//! This provides access to:
//! - Context and build options
//! - Both clients and their configuration
//! - Error types
//! - The telemetry backends most applications configure

pub use crate::{
    context::{Context, operation_from, with_operation},
    descriptor::Descriptor,
    dsn::Driver,
    error::{Error, ErrorKind, Result},
    kv::{Command, KvClient, KvConfig, Pipeline, Reply, is_nil},
    logging::{JsonLogger, LogLevel, Logger},
    metrics::{MetricsConfig, Registry},
    options::Options,
    sql::{Database, OperationKind, QueryOutput, SqlConfig, Statement, Value, is_record_duplicate, is_record_not_found},
    trace::{InMemoryExporter, SpanContext, SpanExporter},
};
