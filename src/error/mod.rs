//! Error types for storebox.
//!
//! - [`Error`]: build-time and per-call errors
//! - [`ErrorKind`]: categorization for `match` statements
//!
//! ## Key Invariant
//!
//! Interceptors never create, swallow or rewrite errors. Whatever the wrapped
//! driver returns is what the caller sees; observers only read it to decide
//! span status and log severity.

mod core;
mod kind;

pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for storebox operations.
pub type Result<T> = std::result::Result<T, Error>;
