//! Brain and listener processes driven over stdio pipes
//!
//! This crate provides:
//! - [`ProcessActor`], one child process fed one message per turn
//! - [`Stage`], an ordered group of actors broadcast to and read together
//! - [`BrainPool`] and [`ListenerPool`], the two stages a player runs

pub mod actor;
pub mod error;
pub mod pools;
pub mod stage;

pub use actor::{Actor, ActorSpec, Capabilities, ProcessActor, strip_line_terminator};
pub use error::ActorError;
pub use pools::{BrainPool, ListenerPool};
pub use stage::{Stage, StageConfig};
