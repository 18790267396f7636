//! Connection identity used to label telemetry.

use serde::Serialize;

/// Immutable connection identity shared by the observers of one client.
///
/// Built once by a DSN parser (relational) or by the key-value builder, then
/// shared behind an `Arc`. Credentials other than the user name are never
/// stored here, so nothing secret can reach a span, log line, or metric label.
///
/// ```rust
/// use storebox::Descriptor;
///
/// let descriptor = Descriptor::new("redis")
///     .with_addrs(["10.0.0.1:6379", "10.0.0.2:6379"])
///     .with_database("2");
///
/// assert_eq!(descriptor.address(), "10.0.0.1:6379,10.0.0.2:6379");
/// assert_eq!(descriptor.database(), "2");
/// assert_eq!(descriptor.username(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    system: String,
    network: String,
    addrs: Vec<String>,
    username: Option<String>,
    database: String,
}

impl Descriptor {
    /// Creates a descriptor for the given database system (`mysql`, `redis`, ...).
    pub fn new(system: impl Into<String>) -> Self {
        Self { system: system.into(), ..Self::default() }
    }

    /// Sets the network protocol (`tcp`, `unix`, ...).
    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Replaces the address list.
    #[must_use]
    pub fn with_addrs<I, S>(mut self, addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addrs = addrs.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one address.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addrs.push(addr.into());
        self
    }

    /// Sets the user name. An empty name is treated as unknown.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.username = (!username.is_empty()).then_some(username);
        self
    }

    /// Sets the logical database name or index.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Database system identifier.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Network protocol, empty when not applicable.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Every configured address.
    pub fn addrs(&self) -> &[String] {
        &self.addrs
    }

    /// Addresses joined with `,`, used as connection string and instance label.
    pub fn address(&self) -> String {
        self.addrs.join(",")
    }

    /// Connection user, when known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Logical database name, or the numeric index for key-value stores.
    pub fn database(&self) -> &str {
        &self.database
    }
}
