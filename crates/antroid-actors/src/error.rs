//! Actor error types

use antroid_core::AntroidError;
use thiserror::Error;

/// Failures of a single actor or of a stage
#[derive(Debug, Error)]
pub enum ActorError {
    /// The process could not be launched
    #[error("{actor}: failed to spawn: {source}")]
    Spawn {
        actor: String,
        #[source]
        source: std::io::Error,
    },

    /// `start` called twice
    #[error("{0}: already started")]
    AlreadyStarted(String),

    /// Not started yet, or already stopped
    #[error("{0}: not running")]
    NotRunning(String),

    /// Reading from a write-only actor
    #[error("{0}: actor is write-only")]
    NotReadable(String),

    /// The message loop exited, the process is gone
    #[error("{0}: process closed its pipes")]
    Closed(String),

    /// Missed the turn deadline
    #[error("{0}: missed the turn deadline")]
    Timeout(String),

    /// Adding actors once the stage runs
    #[error("stage {0} already started")]
    StageStarted(String),
}

impl From<ActorError> for AntroidError {
    fn from(err: ActorError) -> Self {
        AntroidError::Actor(err.to_string())
    }
}
