//! # storebox
//!
//! Tracing, structured logging and metrics for relational and key-value
//! clients, installed as interceptors around every call.
//!
//! ## Quick Start
//!
//! ```rust
//! use storebox::prelude::*;
//! use storebox::testing::MockSqlDriver;
//!
//! # tokio_test::block_on(async {
//! let registry = Registry::new();
//! let options = Options::new().with_registry(registry.clone());
//!
//! // In production the connector wraps a real driver.
//! let db = SqlConfig::new("app:secret@tcp(127.0.0.1:3306)/shop")
//!     .build(&MockSqlDriver::new(), &options)
//!     .await?;
//!
//! // Only calls whose context names an operation are observed.
//! let ctx = Context::background().with_operation("load_cart");
//! db.query(&ctx, Statement::new("SELECT * FROM cart WHERE user_id = ?").bind(42)).await?;
//!
//! assert!(registry.encode_text().contains("db_requests_total"));
//! # Ok::<(), storebox::Error>(())
//! # });
//! ```
//!
//! ## Key Concepts
//!
//! - **Opt-in by name**: a call is observed only if its [`Context`] carries a
//!   non-empty operation name. Everything else passes straight through.
//! - **Fixed order**: tracing wraps logging wraps metrics wraps the driver, for
//!   every operation kind of both clients.
//! - **One of each**: an observed call (or pipeline) yields exactly one span,
//!   one log record and one metric update.
//! - **Errors pass through**: observers never alter the driver's result.
//!
//! ## Features
//!
//! - `tracing`: mirror observed calls into the `tracing` ecosystem and enable
//!   [`logging::TracingLogger`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Call-scope state
pub mod context;
pub mod descriptor;
pub mod dsn;
pub mod error;
pub mod options;

// Interception
pub mod middleware;
pub mod observe;

// Telemetry backends
pub mod logging;
pub mod metrics;
pub mod trace;

// Clients
pub mod kv;
pub mod sql;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

pub use context::{Context, operation_from, with_operation};
pub use descriptor::Descriptor;
pub use error::{Error, ErrorKind, Result};
pub use options::Options;
