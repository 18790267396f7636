//! Key-value client configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{KvClient, KvConnector, KvDriver};
use crate::{
    Descriptor, Error, Options, Result,
    observe::{ClientKind, observers},
};

/// Configuration for a key-value client.
///
/// ## Example
///
/// ```rust
/// use storebox::kv::KvConfig;
///
/// let config = KvConfig::new().with_addr(["10.0.0.1:6379", "10.0.0.2:6379"]).with_db(2);
/// assert_eq!(config.addr.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Server addresses. The client connects to the first; all of them are
    /// reported in telemetry.
    pub addr: Vec<String>,

    /// Password, empty for none.
    pub password: String,

    /// Database index.
    pub db: u32,
}

impl KvConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the address list.
    #[must_use]
    pub fn with_addr<I, S>(mut self, addr: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addr = addr.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Sets the database index.
    #[must_use]
    pub fn with_db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    /// Connects, pings, and installs the observers on both call kinds.
    ///
    /// # Errors
    ///
    /// - [`Configuration`](crate::ErrorKind::Configuration) if no address is set
    /// - whatever `connector.connect` fails with
    /// - [`Connection`](crate::ErrorKind::Connection) if the ping fails, with
    ///   the ping error as its source
    /// - [`AlreadyRegistered`](crate::ErrorKind::AlreadyRegistered) if the
    ///   metric families conflict with ones already in the registry
    pub async fn build<C: KvConnector>(&self, connector: &C, options: &Options) -> Result<KvClient> {
        let first = self.addr.first().ok_or_else(|| Error::configuration("key-value address list is empty"))?;

        let conn = connector.connect(first, &self.password, self.db).await?;
        conn.ping().await.map_err(|err| Error::connection(format!("ping {first} failed")).with_source(err))?;

        let descriptor =
            Arc::new(Descriptor::new("redis").with_addrs(self.addr.iter().cloned()).with_database(self.db.to_string()));
        let observers = observers(Arc::clone(&descriptor), ClientKind::KeyValue, options)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(address = %descriptor.address(), db = self.db, "key-value client ready");

        let conn: Arc<dyn KvDriver> = Arc::new(conn);
        Ok(KvClient::new(descriptor, conn, &observers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::{ErrorKind, testing::MemoryKv};

    #[test]
    fn test_deserialize() {
        let config: KvConfig = serde_json::from_str(r#"{"addr": ["a:6379"], "db": 3}"#).unwrap();
        assert_eq!(config, KvConfig::new().with_addr(["a:6379"]).with_db(3));
    }

    #[tokio::test]
    async fn test_empty_addr_is_configuration_error() {
        let err = KvConfig::new().build(&MemoryKv::new(), &Options::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_ping_failure_wraps_source() {
        let kv = MemoryKv::new().fail_ping(Error::timeout("i/o timeout"));
        let err = KvConfig::new().with_addr(["a:6379"]).build(&kv, &Options::default()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.source().unwrap().to_string().contains("i/o timeout"));
    }

    #[tokio::test]
    async fn test_connects_to_first_address_only() {
        let kv = MemoryKv::new();
        let client = KvConfig::new()
            .with_addr(["a:6379", "b:6379"])
            .with_password("pw")
            .with_db(4)
            .build(&kv, &Options::default())
            .await
            .unwrap();

        assert_eq!(kv.connections(), vec![("a:6379".to_string(), 4)]);
        assert_eq!(client.descriptor().address(), "a:6379,b:6379");
        assert_eq!(client.descriptor().database(), "4");
    }
}
