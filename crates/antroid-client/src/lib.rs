//! Client for the Antroid game server
//!
//! Talks to the HTTP/JSON API of the server hosting the games:
//!
//! - **Accounts**: register, log in and out, check the session
//! - **Games**: create, list, join, destroy, read their status
//! - **Turns**: submit a command batch and decode what our ants see next
//!
//! [`AntroidClient`] implements [`antroid_harness::GameServer`] so a
//! `Player` can drive a remote game through it.

mod client;
pub mod wire;

pub use client::{
    AntroidClient, ClientConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_USER_AGENT,
};
