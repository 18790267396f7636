//! Relational client configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Database, SqlConnector, SqlDriver};
use crate::{
    Options, Result,
    dsn::Driver,
    observe::{ClientKind, observers},
};

/// Configuration for a relational client.
///
/// Deserializes from `{"driver": "mysql", "dsn": "..."}`. Both fields default,
/// and an empty `driver` means MySQL.
///
/// ## Example
///
/// ```rust
/// use storebox::dsn::Driver;
/// use storebox::sql::SqlConfig;
///
/// let config = SqlConfig::new("root:secret@tcp(db.internal:3306)/shop").with_driver(Driver::MySql);
/// assert_eq!(config.driver, Driver::MySql);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Database driver.
    pub driver: Driver,

    /// Driver-specific data source name.
    pub dsn: String,
}

impl SqlConfig {
    /// Creates a MySQL configuration for `dsn`.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self { driver: Driver::default(), dsn: dsn.into() }
    }

    /// Sets the driver.
    #[must_use]
    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    /// Sets the data source name.
    #[must_use]
    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = dsn.into();
        self
    }

    /// Opens a connection and installs the observers on every operation kind.
    ///
    /// # Errors
    ///
    /// - [`InvalidDsn`](crate::ErrorKind::InvalidDsn) if the DSN cannot be parsed
    /// - whatever `connector.open` fails with
    /// - [`AlreadyRegistered`](crate::ErrorKind::AlreadyRegistered) if the
    ///   metric families conflict with ones already in the registry
    pub async fn build<C: SqlConnector>(&self, connector: &C, options: &Options) -> Result<Database> {
        let descriptor = Arc::new(self.driver.parse_dsn(&self.dsn)?);
        let conn: Arc<dyn SqlDriver> = Arc::new(connector.open(self.driver, &self.dsn).await?);
        let observers = observers(Arc::clone(&descriptor), ClientKind::Relational, options)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            system = descriptor.system(),
            address = %descriptor.address(),
            database = descriptor.database(),
            "relational client ready"
        );

        Ok(Database::new(descriptor, self.driver, conn, &observers))
    }
}
