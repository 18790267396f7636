//! Connection string parsing.
//!
//! Two forms are supported, selected by [`Driver`]:
//!
//! | Driver       | Form        | Example                                                        |
//! |--------------|-------------|----------------------------------------------------------------|
//! | `mysql`      | MySQL-style | `user:pass@tcp(127.0.0.1:3306)/shop?charset=utf8mb4`           |
//! | `clickhouse` | URL-style   | `tcp://host:9000?username=user&database=clicks&alt_hosts=h2:9000` |
//!
//! Parsing produces a [`Descriptor`]. The password is validated as part of
//! the syntax but discarded.

mod mysql;
mod url_style;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use self::{mysql::MySqlParser, url_style::UrlParser};
use crate::{Descriptor, Error, Result};

/// Turns a driver-specific connection string into a [`Descriptor`].
pub trait DsnParser: Send + Sync {
    /// Parses `dsn`. Failures are [`ErrorKind::InvalidDsn`](crate::ErrorKind::InvalidDsn).
    fn parse(&self, dsn: &str) -> Result<Descriptor>;
}

/// Relational driver selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// MySQL, MySQL-style DSN.
    #[default]
    #[serde(alias = "")]
    MySql,
    /// ClickHouse, URL-style DSN.
    ClickHouse,
}

impl Driver {
    /// Driver name as used in configuration and as `db.system`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::ClickHouse => "clickhouse",
        }
    }

    /// Returns the parser for this driver's connection string form.
    pub fn parser(&self) -> &'static dyn DsnParser {
        match self {
            Driver::MySql => &MySqlParser,
            Driver::ClickHouse => &UrlParser,
        }
    }

    /// Parses `dsn` with this driver's parser.
    pub fn parse_dsn(&self, dsn: &str) -> Result<Descriptor> {
        self.parser().parse(dsn)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "mysql" => Ok(Driver::MySql),
            "clickhouse" => Ok(Driver::ClickHouse),
            other => Err(Error::configuration(format!("unknown driver '{other}'"))),
        }
    }
}
