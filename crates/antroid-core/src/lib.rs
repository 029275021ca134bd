//! # antroid-core
//!
//! Core types shared by every Antroid crate:
//! - Sparse maps with per-turn visibility
//! - Turn observations and ant statuses
//! - Commands and command batches
//! - Games, game specs and game status
//! - Error types

pub mod command;
pub mod error;
pub mod game;
pub mod map;
pub mod turn;

pub use command::{Action, Command, Commands};
pub use error::{AntroidError, ApiError, Result, error_codes};
pub use game::{ApiInfo, ApiMethod, Game, GameId, GameSpec, GameStatus};
pub use map::{Cell, CellContent, Direction, GridMap, Map, PartialMap, Position};
pub use turn::{AntStatus, BasicAntStatus, CONTROLLED_BRAIN, Turn};
