//! Integration tests for storebox.
//!
//! Every test builds real clients over the in-memory doubles from
//! `storebox::testing` and asserts on all three telemetry signals: spans from
//! an `InMemoryExporter`, log lines from a `MemorySink`, and metric families
//! from a private `Registry`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With the `tracing` mirror enabled
//! cargo test --features tracing --test integration
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;
mod concurrency_tests;
mod context_tests;
mod kv_tests;
mod sql_tests;
