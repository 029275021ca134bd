//! Ordered pool of actors started, fed and stopped together

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::actor::{Actor, ProcessActor, strip_line_terminator};
use crate::error::ActorError;

/// Timing policy of a stage
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Deadline for one broadcast or one collection; `None` waits forever
    pub turn_timeout: Option<Duration>,
    /// How long stopped processes get to exit before being killed
    pub stop_grace: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Some(Duration::from_secs(10)),
            stop_grace: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Started,
    Stopped,
}

/// Actors kept in registration order
///
/// Actors that die or miss a deadline are stopped and left out of every
/// later broadcast and collection; the others carry on.
pub struct Stage<A: Actor = ProcessActor> {
    name: String,
    actors: Vec<A>,
    /// Parallel to `actors`; false once an actor has been dropped
    alive: Vec<bool>,
    config: StageConfig,
    phase: Phase,
}

impl<A: Actor> Stage<A> {
    pub fn new(name: impl Into<String>, config: StageConfig) -> Self {
        Self {
            name: name.into(),
            actors: Vec::new(),
            alive: Vec::new(),
            config,
            phase: Phase::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an actor; its position is its collection slot
    pub fn add_actor(&mut self, actor: A) -> Result<(), ActorError> {
        if self.phase != Phase::Created {
            return Err(ActorError::StageStarted(self.name.clone()));
        }
        self.actors.push(actor);
        self.alive.push(true);
        Ok(())
    }

    /// Registered actors, dead or alive
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actors still taking part in the game
    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    /// Start every actor, each on its own task
    ///
    /// If one fails to spawn, the ones already started are stopped and the
    /// stage is unusable.
    pub async fn start(&mut self) -> Result<(), ActorError> {
        if self.phase != Phase::Created {
            return Err(ActorError::StageStarted(self.name.clone()));
        }
        self.phase = Phase::Started;

        for i in 0..self.actors.len() {
            if let Err(e) = self.actors[i].start() {
                warn!("{}: aborting start: {}", self.name, e);
                self.stop().await;
                return Err(e);
            }
        }

        info!("{}: started {} actor(s)", self.name, self.actors.len());
        Ok(())
    }

    /// Send `message` to every live actor in registration order
    ///
    /// Returns how many actors accepted it.
    pub async fn send_all(&mut self, message: &str) -> usize {
        let deadline = self.turn_deadline();
        let mut delivered = 0;

        for i in 0..self.actors.len() {
            if !self.alive[i] {
                continue;
            }
            if !self.actors[i].is_running() {
                let reason = ActorError::NotRunning(self.actors[i].name().to_string());
                self.drop_actor(i, reason).await;
                continue;
            }
            match self.actors[i].send(message, deadline).await {
                Ok(()) => delivered += 1,
                Err(e) => self.drop_actor(i, e).await,
            }
        }

        delivered
    }

    /// One line from every live readable actor, in registration order
    ///
    /// Collection order never depends on which process answered first.
    pub async fn read_all(&mut self) -> Vec<String> {
        let deadline = self.turn_deadline();
        let mut lines = Vec::with_capacity(self.actors.len());

        for i in 0..self.actors.len() {
            if !self.alive[i] || !self.actors[i].is_readable() {
                continue;
            }
            match self.actors[i].read(deadline).await {
                Ok(line) => lines.push(strip_line_terminator(&line).to_string()),
                Err(e) => self.drop_actor(i, e).await,
            }
        }

        lines
    }

    /// Stop every actor and wait until all processes are reaped
    ///
    /// Processes still running after the grace period are killed. Calling
    /// this again is a no-op.
    pub async fn stop(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.phase = Phase::Stopped;

        for actor in &mut self.actors {
            actor.close();
        }
        let deadline = Instant::now() + self.config.stop_grace;
        for actor in &mut self.actors {
            actor.wait(deadline).await;
        }
        self.alive.iter_mut().for_each(|a| *a = false);

        debug!("{}: stopped", self.name);
    }

    fn turn_deadline(&self) -> Option<Instant> {
        self.config.turn_timeout.map(|t| Instant::now() + t)
    }

    /// Take a failed actor out of the game
    ///
    /// It is stopped like any other: killed if still running once the stop
    /// grace period is over.
    async fn drop_actor(&mut self, index: usize, reason: ActorError) {
        warn!(
            "{}: dropping actor #{} ({}): {}",
            self.name,
            index,
            self.actors[index].name(),
            reason
        );
        self.alive[index] = false;
        let actor = &mut self.actors[index];
        actor.close();
        actor.wait(Instant::now() + self.config.stop_grace).await;
    }
}
