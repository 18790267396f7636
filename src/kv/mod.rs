//! Instrumented key-value client.
//!
//! [`KvConfig::build`] connects through a [`KvConnector`], pings, and installs
//! the observers on the two call kinds: a single [`Command`] and a
//! [`Pipeline`]. The connection is behind [`KvDriver`];
//! [`MemoryKv`](crate::testing::MemoryKv) implements it in memory.
//!
//! A missing key comes back as the [`nil`] error. Callers see it unchanged,
//! but telemetry does not count it as a failure.

mod client;
mod command;
mod config;
mod driver;
mod reply;

pub use self::{
    client::KvClient,
    command::{Command, Pipeline},
    config::KvConfig,
    driver::{KvConnector, KvDriver},
    reply::Reply,
};
use crate::{Error, ErrorKind};

/// Message of the [`nil`] error.
pub const NIL_MESSAGE: &str = "redis: nil";

/// The sentinel returned for a missing key.
pub fn nil() -> Error {
    Error::new(ErrorKind::Nil, NIL_MESSAGE)
}

/// Returns `true` if `err` is the missing-key sentinel.
///
/// Any other error, `NotFound` included, is a genuine failure.
pub fn is_nil(err: &Error) -> bool {
    err.kind() == ErrorKind::Nil
}
