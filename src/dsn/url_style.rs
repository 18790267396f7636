use url::Url;

use super::DsnParser;
use crate::{Descriptor, Error, Result};

/// Parses URL-style connection strings (ClickHouse).
///
/// `scheme://[user[:password]@]host:port[/database][?username=..&database=..&alt_hosts=h2:p,h3:p]`.
/// Query parameters override the user info and path. `alt_hosts` extends the
/// address list so every replica shows up in the connection label.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlParser;

impl DsnParser for UrlParser {
    fn parse(&self, dsn: &str) -> Result<Descriptor> {
        let url = Url::parse(dsn)?;

        let mut addrs = Vec::new();
        if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
            addrs.push(match url.port_or_known_default() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            });
        }

        let mut username = urlencoding::decode(url.username()).map(|u| u.into_owned()).unwrap_or_default();
        let path = url.path().trim_start_matches('/');
        let mut database = urlencoding::decode(path)
            .map_err(|e| Error::invalid_dsn(format!("invalid database name: {e}")).with_source(e))?
            .into_owned();

        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "username" => username = value.into_owned(),
                "database" => database = value.into_owned(),
                "alt_hosts" => {
                    addrs.extend(value.split(',').map(str::trim).filter(|h| !h.is_empty()).map(String::from));
                },
                _ => {},
            }
        }

        Ok(Descriptor::new("clickhouse")
            .with_network(url.scheme())
            .with_addrs(addrs)
            .with_username(username)
            .with_database(database))
    }
}
