use super::DsnParser;
use crate::{Descriptor, Error, Result};

const DEFAULT_TCP_ADDR: &str = "127.0.0.1:3306";
const DEFAULT_UNIX_ADDR: &str = "/tmp/mysql.sock";

/// Parses MySQL-style connection strings.
///
/// Grammar: `[user[:password]@][net[(addr)]]/dbname[?param=value&...]`.
/// A missing network defaults to `tcp`; a missing address defaults to
/// `127.0.0.1:3306` for `tcp` and `/tmp/mysql.sock` for `unix`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlParser;

impl DsnParser for MySqlParser {
    fn parse(&self, dsn: &str) -> Result<Descriptor> {
        // The database name follows the last slash; passwords may contain '/' and '@'.
        let slash = dsn
            .rfind('/')
            .ok_or_else(|| Error::invalid_dsn("missing the slash separating the database name"))?;
        let (head, tail) = (&dsn[..slash], &dsn[slash + 1..]);

        let (user_info, endpoint) = match head.rfind('@') {
            Some(at) => (Some(&head[..at]), &head[at + 1..]),
            None => (None, head),
        };

        let username = user_info.map(|info| info.split_once(':').map_or(info, |(user, _password)| user));

        let (network, addr) = match endpoint.find('(') {
            Some(open) => {
                if !endpoint.ends_with(')') {
                    return Err(Error::invalid_dsn("network address not terminated (missing closing brace)"));
                }
                (&endpoint[..open], &endpoint[open + 1..endpoint.len() - 1])
            },
            None => (endpoint, ""),
        };

        let network = if network.is_empty() { "tcp" } else { network };
        let addr = match (addr, network) {
            ("", "tcp") => DEFAULT_TCP_ADDR,
            ("", "unix") => DEFAULT_UNIX_ADDR,
            (addr, _) => addr,
        };

        let (database, params) = tail.split_once('?').unwrap_or((tail, ""));
        let database = urlencoding::decode(database)
            .map_err(|e| Error::invalid_dsn(format!("invalid database name: {e}")).with_source(e))?;

        for param in params.split('&').filter(|p| !p.is_empty()) {
            if !param.contains('=') {
                return Err(Error::invalid_dsn(format!("invalid DSN parameter '{param}'")));
            }
        }

        let mut descriptor = Descriptor::new("mysql").with_network(network).with_addr(addr).with_database(database);
        if let Some(username) = username {
            descriptor = descriptor.with_username(username);
        }
        Ok(descriptor)
    }
}
