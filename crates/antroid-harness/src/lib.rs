//! # antroid-harness
//!
//! Drives a remote Antroid game with local processes.
//!
//! This crate provides:
//! - `GameServer` trait for whatever hosts the game
//! - `Player`, which feeds every turn to the brains and listeners and
//!   plays the brains' commands

pub mod player;
pub mod server;

pub use player::Player;
pub use server::GameServer;
