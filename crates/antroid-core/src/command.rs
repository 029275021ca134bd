//! Ant commands and command batches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AntroidError;

/// What an ant can do during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Forward,
    Rest,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Right => "right",
            Action::Forward => "forward",
            Action::Rest => "rest",
        }
    }
}

impl FromStr for Action {
    type Err = AntroidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            "forward" => Ok(Action::Forward),
            "rest" => Ok(Action::Rest),
            other => Err(AntroidError::InvalidCommand(format!("unknown action {:?}", other))),
        }
    }
}

/// One action for one of our ants, written `index:action`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub ant: u32,
    pub action: Action,
}

impl Command {
    pub fn new(ant: u32, action: Action) -> Self {
        Self { ant, action }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ant, self.action.as_str())
    }
}

impl FromStr for Command {
    type Err = AntroidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ant, action) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| AntroidError::InvalidCommand(format!("missing ':' in {:?}", s)))?;
        let ant = ant
            .parse()
            .map_err(|_| AntroidError::InvalidCommand(format!("bad ant index in {:?}", s)))?;
        Ok(Self::new(ant, action.parse()?))
    }
}

/// A serialized batch of commands, comma-separated
///
/// Brain replies are joined verbatim; the server decides what is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commands(String);

impl Commands {
    /// Batch made of raw brain replies, in order
    pub fn from_replies<S: AsRef<str>>(replies: &[S]) -> Self {
        let joined: Vec<&str> = replies.iter().map(|r| r.as_ref()).collect();
        Self(joined.join(","))
    }

    pub fn from_commands(commands: &[Command]) -> Self {
        let tokens: Vec<String> = commands.iter().map(Command::to_string).collect();
        Self(tokens.join(","))
    }

    /// `0:rest,1:rest,...` for `ants` ants
    pub fn rest_all(ants: u32) -> Self {
        let commands: Vec<Command> = (0..ants).map(|i| Command::new(i, Action::Rest)).collect();
        Self::from_commands(&commands)
    }

    /// Parse every token; fails on the first malformed one
    pub fn parse(&self) -> Result<Vec<Command>, AntroidError> {
        if self.0.is_empty() {
            return Ok(Vec::new());
        }
        self.0.split(',').map(str::parse).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Commands {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_serialization() {
        let batch = Commands::from_commands(&[
            Command::new(0, Action::Forward),
            Command::new(1, Action::Rest),
        ]);
        assert_eq!(batch.as_str(), "0:forward,1:rest");
        assert_eq!(Commands::from_commands(&[]).as_str(), "");
    }

    #[test]
    fn test_rest_all() {
        assert_eq!(Commands::rest_all(3).as_str(), "0:rest,1:rest,2:rest");
        assert!(Commands::rest_all(0).is_empty());
    }

    #[test]
    fn test_replies_are_kept_verbatim() {
        let batch = Commands::from_replies(&["0:forward", "garbage"]);
        assert_eq!(batch.as_str(), "0:forward,garbage");
        assert!(batch.parse().is_err());
    }

    #[test]
    fn test_parse_command() {
        let cmd: Command = "12:left".parse().unwrap();
        assert_eq!(cmd, Command::new(12, Action::Left));
        assert!("x:left".parse::<Command>().is_err());
        assert!("1:jump".parse::<Command>().is_err());
        assert!("1 left".parse::<Command>().is_err());
    }
}
