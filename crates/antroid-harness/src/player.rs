//! Player loop: one message out to the processes, one command batch back
//! to the server, every turn

use antroid_actors::{Actor, BrainPool, ListenerPool, ProcessActor};
use antroid_core::{AntroidError, Commands, GameId, GameStatus, Result, Turn};
use antroid_protocol::TurnEncoder;
use tracing::{debug, info, warn};

use crate::server::GameServer;

/// A local player connected to a remote game
pub struct Player<S: GameServer, A: Actor = ProcessActor> {
    server: S,
    brains: BrainPool<A>,
    listeners: ListenerPool<A>,
    encoder: TurnEncoder,
    game: Option<GameId>,
    status: GameStatus,
    turn: Turn,
    done: bool,
}

impl<S: GameServer, A: Actor> Player<S, A> {
    /// Pools must be filled before joining a game
    pub fn new(server: S, brains: BrainPool<A>, listeners: ListenerPool<A>) -> Self {
        Self {
            server,
            brains,
            listeners,
            encoder: TurnEncoder::new(),
            game: None,
            status: GameStatus::default(),
            turn: Turn::empty(),
            done: false,
        }
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Join a game and start the brains and listeners
    ///
    /// A first turn of `rest` for every ant tells us where they are before
    /// any brain is asked anything.
    pub async fn join_game(&mut self, id: GameId) -> Result<()> {
        self.server.join_game(&id).await?;
        self.status = self.server.game_status(&id).await?;

        let opening = Commands::rest_all(self.status.ants_per_player());
        debug!("opening turn: {}", opening);
        self.turn = self.server.play(&id, &opening).await?;
        info!(
            "joined game {} with {} ant(s), now at turn {}",
            id,
            self.status.ants_per_player(),
            self.turn.number
        );
        self.game = Some(id);

        self.brains.start().await?;
        if let Err(e) = self.listeners.start().await {
            self.brains.stop().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Play one turn; returns true once the game is over
    pub async fn play_turn(&mut self) -> Result<bool> {
        let id = self
            .game
            .clone()
            .ok_or_else(|| AntroidError::ProtocolError("no game joined".into()))?;

        let message = self.encoder.encode(&self.status, &self.turn);
        self.brains.send_all(&message).await;
        self.listeners.send_all(&message).await;
        let commands = self.brains.command_response().await;

        // Brains may exit as soon as they see the game is over
        if self.status.is_over() {
            info!("game {} is over", id);
            self.done = true;
            return Ok(true);
        }
        if self.brains.live_count() == 0 {
            return Err(AntroidError::NoLiveBrains);
        }

        debug!("turn {}: playing {:?}", self.turn.number, commands.as_str());
        self.turn = match self.server.play(&id, &commands).await {
            Ok(turn) => turn,
            Err(e) if e.is_game_not_playing() => {
                info!("game {} stopped playing", id);
                self.done = true;
                return Ok(true);
            }
            Err(e) => return Err(e),
        };
        self.status = self.server.game_status(&id).await?;
        Ok(false)
    }

    /// Play turns until the game ends
    pub async fn play_to_end(&mut self) -> Result<()> {
        while !self.play_turn().await? {}
        Ok(())
    }

    /// Stop every process and log out
    pub async fn quit(&mut self) -> Result<()> {
        self.brains.stop().await;
        self.listeners.stop().await;
        if let Err(e) = self.server.logout().await {
            warn!("logout failed: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Scores by player name
    pub fn scores(&self) -> Vec<(String, i64)> {
        self.status.sorted_scores()
    }
}
