//! Remote game server seen by a player

use async_trait::async_trait;
use antroid_core::{Commands, GameId, GameStatus, Result, Turn};

/// The calls a player needs from the game server
///
/// Implemented by the HTTP client; tests use an in-memory game.
#[async_trait]
pub trait GameServer: Send {
    /// Take a seat in an existing game
    async fn join_game(&mut self, id: &GameId) -> Result<()>;

    /// Turn, players, scores and whether the game is over
    async fn game_status(&mut self, id: &GameId) -> Result<GameStatus>;

    /// Submit this turn's commands and get what our ants see next
    async fn play(&mut self, id: &GameId, commands: &Commands) -> Result<Turn>;

    /// End the session
    async fn logout(&mut self) -> Result<()>;
}
