//! Error kind enumeration for categorizing storebox errors.

/// Categorization of storebox errors.
///
/// Build-time failures (`InvalidDsn`, `Configuration`, `Connection`) are fatal:
/// no interceptor chain is installed when one occurs. Per-call failures come
/// from the wrapped driver and are handed back to the caller untouched.
///
/// ## Telemetry classification
///
/// | ErrorKind           | Raised by              | Counts as failure in spans/logs |
/// |---------------------|------------------------|---------------------------------|
/// | `InvalidDsn`        | builder (DSN parsing)  | n/a                             |
/// | `Configuration`     | builder                | n/a                             |
/// | `Connection`        | builder / driver       | Yes                             |
/// | `NotFound`          | driver                 | Yes                             |
/// | `Nil`               | key-value driver       | No                              |
/// | `Duplicate`         | driver                 | Yes                             |
/// | `Query`             | driver                 | Yes                             |
/// | `Timeout`           | driver                 | Yes                             |
/// | `AlreadyRegistered` | metrics registry       | n/a                             |
///
/// Only `Nil` is a normal cache miss. A `NotFound` from the key-value driver
/// (for example a missing unix socket) is still a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The connection string could not be parsed.
    #[error("invalid dsn")]
    InvalidDsn,

    /// Configuration error (unknown driver, empty address list).
    #[error("configuration error")]
    Configuration,

    /// Connection error (open failed, ping failed, broken connection).
    #[error("connection error")]
    Connection,

    /// Record or resource was not found.
    #[error("not found")]
    NotFound,

    /// The key-value "nil" reply: the key does not exist.
    #[error("nil")]
    Nil,

    /// Unique constraint violation (e.g. MySQL error 1062).
    #[error("duplicate record")]
    Duplicate,

    /// The statement or command was rejected by the backend.
    #[error("query error")]
    Query,

    /// The operation timed out.
    #[error("timeout")]
    Timeout,

    /// Invalid argument passed to a storebox API.
    #[error("invalid argument")]
    InvalidArgument,

    /// A metric family with the same name but a different shape already exists.
    #[error("already registered")]
    AlreadyRegistered,

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl ErrorKind {
    /// Returns `true` if this kind can only happen while building a client.
    ///
    /// # Example
    ///
    /// ```rust
    /// use storebox::ErrorKind;
    ///
    /// assert!(ErrorKind::InvalidDsn.is_build_error());
    /// assert!(!ErrorKind::Query.is_build_error());
    /// ```
    #[inline]
    pub fn is_build_error(&self) -> bool {
        matches!(self, ErrorKind::InvalidDsn | ErrorKind::Configuration)
    }
}
