use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-nil reply to a key-value command.
///
/// A missing key is not a reply: it comes back as the
/// [`nil`](super::nil) error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// Simple status such as `OK` or `PONG`.
    Status(String),
    /// Integer.
    Int(i64),
    /// Bulk string.
    Bulk(String),
    /// Nested replies.
    Array(Vec<Reply>),
}

impl Reply {
    /// Returns the text of a status or bulk reply.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(s) | Reply::Bulk(s) => Some(s),
            Reply::Int(_) | Reply::Array(_) => None,
        }
    }

    /// Returns the value of an integer reply.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) | Reply::Bulk(s) => f.write_str(s),
            Reply::Int(i) => write!(f, "{i}"),
            Reply::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
        }
    }
}
