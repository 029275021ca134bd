//! Brain and listener pools built on a [`Stage`]

use antroid_core::Commands;
use tracing::debug;

use crate::actor::{Actor, ActorSpec, ProcessActor};
use crate::error::ActorError;
use crate::stage::{Stage, StageConfig};

/// Brains answer every turn with the commands for their ants
pub struct BrainPool<A: Actor = ProcessActor> {
    stage: Stage<A>,
}

impl<A: Actor> BrainPool<A> {
    pub fn new(config: StageConfig) -> Self {
        Self {
            stage: Stage::new("brains", config),
        }
    }

    pub fn add_actor(&mut self, actor: A) -> Result<(), ActorError> {
        self.stage.add_actor(actor)
    }

    pub async fn start(&mut self) -> Result<(), ActorError> {
        self.stage.start().await
    }

    pub async fn send_all(&mut self, message: &str) -> usize {
        self.stage.send_all(message).await
    }

    /// Brains registered, dead or alive
    pub fn len(&self) -> usize {
        self.stage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stage.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.stage.live_count()
    }

    /// Collect one reply per live brain and join them in brain order
    ///
    /// Replies are forwarded as written, the server judges them.
    pub async fn command_response(&mut self) -> Commands {
        let replies = self.stage.read_all().await;
        for reply in &replies {
            let candidate = Commands::from(reply.as_str());
            if let Err(e) = candidate.parse() {
                debug!("brain reply {:?} is not a command list: {}", reply, e);
            }
        }
        Commands::from_replies(&replies)
    }

    pub async fn stop(&mut self) {
        self.stage.stop().await
    }
}

impl BrainPool<ProcessActor> {
    /// Register a brain process, in the order brains are collected
    pub fn add_brain(&mut self, spec: ActorSpec) -> Result<(), ActorError> {
        self.stage.add_actor(ProcessActor::brain(spec))
    }
}

/// Listeners get every turn message and never answer
pub struct ListenerPool<A: Actor = ProcessActor> {
    stage: Stage<A>,
}

impl<A: Actor> ListenerPool<A> {
    pub fn new(config: StageConfig) -> Self {
        Self {
            stage: Stage::new("listeners", config),
        }
    }

    pub fn add_actor(&mut self, actor: A) -> Result<(), ActorError> {
        self.stage.add_actor(actor)
    }

    pub async fn start(&mut self) -> Result<(), ActorError> {
        self.stage.start().await
    }

    pub async fn send_all(&mut self, message: &str) -> usize {
        self.stage.send_all(message).await
    }

    pub fn len(&self) -> usize {
        self.stage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stage.is_empty()
    }

    pub async fn stop(&mut self) {
        self.stage.stop().await
    }
}

impl ListenerPool<ProcessActor> {
    pub fn add_listener(&mut self, spec: ActorSpec) -> Result<(), ActorError> {
        self.stage.add_actor(ProcessActor::listener(spec))
    }
}
