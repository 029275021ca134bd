//! Text protocol spoken with brain and listener processes
//!
//! This crate provides:
//! - The turn-state encoder broadcast to every process each turn
//! - The merged map tracker fed by the visions of our ants

pub mod encoder;
pub mod tracker;

pub use encoder::{TurnEncoder, encode_turn, header_line, other_visible_ants};
pub use tracker::merge_visions;
