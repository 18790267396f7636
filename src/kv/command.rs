use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Reply, is_nil};
use crate::{Error, Result, middleware::Call};

/// One key-value command: a name and its arguments.
///
/// Renders as the lowercase name followed by the arguments, space separated:
///
/// ```rust
/// use storebox::kv::Command;
///
/// assert_eq!(Command::new("SET").arg("greeting").arg("hi").to_string(), "set greeting hi");
/// assert_eq!(Command::del(["a", "b"]).to_string(), "del a b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Creates a command without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// `PING`.
    pub fn ping() -> Self {
        Self::new("ping")
    }

    /// `GET key`.
    pub fn get(key: impl ToString) -> Self {
        Self::new("get").arg(key)
    }

    /// `SET key value`.
    pub fn set(key: impl ToString, value: impl ToString) -> Self {
        Self::new("set").arg(key).arg(value)
    }

    /// `DEL key [key ...]`.
    pub fn del<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        keys.into_iter().fold(Self::new("del"), |cmd, key| cmd.arg(key))
    }

    /// Command name as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.to_lowercase())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl Call for Command {
    type Output = Reply;
    const SOURCE: &'static str = "redis";

    fn statement(&self) -> String {
        self.to_string()
    }

    fn failure(result: &Result<Reply>) -> Option<&Error> {
        result.as_ref().err().filter(|err| !is_nil(err))
    }
}

/// Ordered commands submitted together and observed as one unit.
///
/// The driver returns one result per command. The batch as a whole fails
/// with the outer error if the round trip itself failed; otherwise the first
/// command's error stands for the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    #[must_use]
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Commands in submission order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if there are no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self { commands: iter.into_iter().collect() }
    }
}

impl IntoIterator for Pipeline {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl Call for Pipeline {
    type Output = Vec<Result<Reply>>;
    const SOURCE: &'static str = "redis";

    fn statement(&self) -> String {
        self.commands.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }

    fn failure(result: &Result<Vec<Result<Reply>>>) -> Option<&Error> {
        let representative = match result {
            Err(err) => Some(err),
            Ok(replies) => replies.first().and_then(|first| first.as_ref().err()),
        };
        representative.filter(|err| !is_nil(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::nil;

    #[test]
    fn test_statement() {
        let pipeline: Pipeline = [Command::set("a", 1), Command::get("a"), Command::new("INCR").arg("n")].into_iter().collect();
        assert_eq!(pipeline.statement(), "set a 1\nget a\nincr n");
        assert_eq!(pipeline.detailed_statement(), pipeline.statement());
        assert_eq!(Command::ping().statement(), "ping");
    }

    #[test]
    fn test_command_failure_ignores_nil() {
        assert!(Command::failure(&Err(nil())).is_none());
        assert!(Command::failure(&Ok(Reply::Status("OK".into()))).is_none());
        assert!(Command::failure(&Err(Error::query("WRONGTYPE"))).is_some());
    }

    #[test]
    fn test_not_found_is_still_a_failure() {
        let socket: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "/tmp/redis.sock").into();
        assert_eq!(Command::failure(&Err(socket.clone())).map(Error::kind), Some(crate::ErrorKind::NotFound));

        let outer: Result<Vec<Result<Reply>>> = Err(socket.clone());
        assert!(Pipeline::failure(&outer).is_some());

        let first: Result<Vec<Result<Reply>>> = Ok(vec![Err(Error::not_found("ERR no such key"))]);
        assert!(Pipeline::failure(&first).is_some());
    }

    #[test]
    fn test_pipeline_uses_first_command() {
        let first_failed: Result<Vec<Result<Reply>>> = Ok(vec![Err(Error::query("ERR first")), Ok(Reply::Int(1))]);
        assert_eq!(Pipeline::failure(&first_failed).map(Error::message), Some("ERR first"));

        let later_failed: Result<Vec<Result<Reply>>> = Ok(vec![Ok(Reply::Int(1)), Err(Error::query("ERR second"))]);
        assert!(Pipeline::failure(&later_failed).is_none());

        let first_nil: Result<Vec<Result<Reply>>> = Ok(vec![Err(nil())]);
        assert!(Pipeline::failure(&first_nil).is_none());

        let transport: Result<Vec<Result<Reply>>> = Err(Error::connection("broken pipe"));
        assert_eq!(Pipeline::failure(&transport).map(Error::kind), Some(crate::ErrorKind::Connection));

        assert!(Pipeline::failure(&Ok(Vec::new())).is_none());
    }
}
