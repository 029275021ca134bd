//! A single external process driven over its stdin/stdout
//!
//! Each started actor runs a message loop on its own task. Every message
//! handed to the actor is written to the child's stdin; readable actors then
//! read back exactly one line from the child's stdout. The loop ends when the
//! input channel is closed (the stop signal) or when a pipe fails.

use async_trait::async_trait;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, warn};

use crate::error::ActorError;

/// Shared interface of everything a stage can drive
#[async_trait]
pub trait Actor: Send {
    /// Label used in logs and errors
    fn name(&self) -> &str;

    /// Whether replies are read back after each message
    fn is_readable(&self) -> bool;

    /// Started and its message loop still alive
    fn is_running(&self) -> bool;

    /// Launch the process and its message loop
    fn start(&mut self) -> Result<(), ActorError>;

    /// Hand one message to the loop, waiting until it is accepted
    async fn send(&mut self, message: &str, deadline: Option<Instant>) -> Result<(), ActorError>;

    /// Next reply line, terminator stripped
    async fn read(&mut self, deadline: Option<Instant>) -> Result<String, ActorError>;

    /// Signal the loop to exit; no more messages will be accepted
    fn close(&mut self);

    /// Wait for the loop to exit and the process to be reaped; kill it at `deadline`
    async fn wait(&mut self, deadline: Instant);

    /// `close` then `wait` with a grace period
    async fn stop(&mut self, grace: Duration) {
        self.close();
        self.wait(Instant::now() + grace).await;
    }
}

/// Program and arguments of an actor process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ActorSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    fn label(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Which pipes an actor uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub readable: bool,
    pub writable: bool,
}

struct Running {
    /// Dropped to tell the loop to stop
    input: Option<mpsc::Sender<String>>,
    output: mpsc::Receiver<String>,
    task: JoinHandle<()>,
}

enum State {
    Created,
    Running(Running),
    Stopped,
}

/// Actor backed by an external process
pub struct ProcessActor {
    spec: ActorSpec,
    name: String,
    caps: Capabilities,
    state: State,
}

impl ProcessActor {
    pub fn new(spec: ActorSpec, caps: Capabilities) -> Self {
        Self {
            name: spec.label(),
            spec,
            caps,
            state: State::Created,
        }
    }

    /// Reads and writes: receives turns, answers with commands
    pub fn brain(spec: ActorSpec) -> Self {
        Self::new(
            spec,
            Capabilities {
                readable: true,
                writable: true,
            },
        )
    }

    /// Write-only tap on the turn stream
    pub fn listener(spec: ActorSpec) -> Self {
        Self::new(
            spec,
            Capabilities {
                readable: false,
                writable: true,
            },
        )
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, State::Stopped)
    }

    fn running_mut(&mut self) -> Result<&mut Running, ActorError> {
        match &mut self.state {
            State::Running(running) => Ok(running),
            _ => Err(ActorError::NotRunning(self.name.clone())),
        }
    }
}

#[async_trait]
impl Actor for ProcessActor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_readable(&self) -> bool {
        self.caps.readable
    }

    fn is_running(&self) -> bool {
        match &self.state {
            State::Running(running) => running.input.is_some() && !running.task.is_finished(),
            _ => false,
        }
    }

    fn start(&mut self) -> Result<(), ActorError> {
        if !matches!(self.state, State::Created) {
            return Err(ActorError::AlreadyStarted(self.name.clone()));
        }

        let pipe = |used: bool| if used { Stdio::piped() } else { Stdio::null() };
        let spawned = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(pipe(self.caps.writable))
            .stdout(pipe(self.caps.readable))
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!("{}: failed to spawn: {}", self.name, e);
                self.state = State::Stopped;
                return Err(ActorError::Spawn {
                    actor: self.name.clone(),
                    source: e,
                });
            }
        };

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);

        let (input_tx, input_rx) = mpsc::channel(1);
        let (output_tx, output_rx) = mpsc::channel(1);

        let task = tokio::spawn(message_loop(
            self.name.clone(),
            child,
            stdin,
            stdout,
            input_rx,
            output_tx,
        ));

        debug!("{}: started", self.name);
        self.state = State::Running(Running {
            input: Some(input_tx),
            output: output_rx,
            task,
        });
        Ok(())
    }

    async fn send(&mut self, message: &str, deadline: Option<Instant>) -> Result<(), ActorError> {
        let name = self.name.clone();
        let running = self.running_mut()?;
        let input = running
            .input
            .as_ref()
            .ok_or_else(|| ActorError::NotRunning(name.clone()))?;

        match within(deadline, input.send(message.to_string())).await {
            Some(Ok(())) => Ok(()),
            Some(Err(_)) => Err(ActorError::Closed(name)),
            None => Err(ActorError::Timeout(name)),
        }
    }

    async fn read(&mut self, deadline: Option<Instant>) -> Result<String, ActorError> {
        if !self.caps.readable {
            return Err(ActorError::NotReadable(self.name.clone()));
        }
        let name = self.name.clone();
        let running = self.running_mut()?;

        match within(deadline, running.output.recv()).await {
            Some(Some(line)) => Ok(line),
            Some(None) => Err(ActorError::Closed(name)),
            None => Err(ActorError::Timeout(name)),
        }
    }

    fn close(&mut self) {
        if let State::Running(running) = &mut self.state {
            running.input.take();
        }
    }

    async fn wait(&mut self, deadline: Instant) {
        let State::Running(mut running) = std::mem::replace(&mut self.state, State::Stopped) else {
            self.state = State::Stopped;
            return;
        };
        running.input.take();

        if timeout_at(deadline, &mut running.task).await.is_err() {
            warn!("{}: did not exit in time, killing it", self.name);
            running.task.abort();
            let _ = running.task.await;
        }
        debug!("{}: stopped", self.name);
    }
}

/// Run `fut` until `deadline`; `None` when the deadline wins
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Strip one trailing `\n` or `\r\n`
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

async fn write_message(stdin: &mut ChildStdin, message: &str) -> std::io::Result<()> {
    stdin.write_all(message.as_bytes()).await?;
    if !message.ends_with('\n') {
        stdin.write_all(b"\n").await?;
    }
    stdin.flush().await
}

/// One message in, one write, at most one line out; repeat until stopped
async fn message_loop(
    name: String,
    mut child: Child,
    mut stdin: Option<ChildStdin>,
    mut stdout: Option<BufReader<ChildStdout>>,
    mut input: mpsc::Receiver<String>,
    output: mpsc::Sender<String>,
) {
    while let Some(message) = input.recv().await {
        if let Some(pipe) = stdin.as_mut() {
            if let Err(e) = write_message(pipe, &message).await {
                warn!("{}: write failed: {}", name, e);
                break;
            }
        }

        if let Some(reader) = stdout.as_mut() {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    warn!("{}: closed its stdout", name);
                    break;
                }
                Ok(_) => {
                    if output.send(strip_line_terminator(&line).to_string()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{}: read failed: {}", name, e);
                    break;
                }
            }
        }
    }

    // Pending and future sends/reads fail from here on
    drop(input);
    drop(output);

    // EOF on stdin tells the child the game is over
    drop(stdin);
    drop(stdout);

    match child.wait().await {
        Ok(status) => debug!("{}: exited with {}", name, status),
        Err(e) => warn!("{}: wait failed: {}", name, e),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ActorSpec {
        ActorSpec::new("/bin/sh", ["-c", script])
    }

    fn soon(ms: u64) -> Option<Instant> {
        Some(Instant::now() + Duration::from_millis(ms))
    }

    #[test]
    fn test_spec_parse() {
        let spec = ActorSpec::parse("ruby ai/ant.rb 3").unwrap();
        assert_eq!(spec.program, "ruby");
        assert_eq!(spec.args, vec!["ai/ant.rb", "3"]);
        assert!(ActorSpec::parse("   ").is_none());
    }

    #[test]
    fn test_strip_line_terminator() {
        assert_eq!(strip_line_terminator("0:rest\n"), "0:rest");
        assert_eq!(strip_line_terminator("0:rest\r\n"), "0:rest");
        assert_eq!(strip_line_terminator("0:rest"), "0:rest");
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let mut actor = ProcessActor::brain(sh("while read line; do echo \"got $line\"; done"));
        actor.start().unwrap();
        assert!(actor.is_running());

        actor.send("hello", soon(2000)).await.unwrap();
        assert_eq!(actor.read(soon(2000)).await.unwrap(), "got hello");

        actor.send("again\n", soon(2000)).await.unwrap();
        assert_eq!(actor.read(soon(2000)).await.unwrap(), "got again");

        actor.stop(Duration::from_secs(2)).await;
        assert!(actor.is_stopped());
        assert!(!actor.is_running());
        assert!(matches!(
            actor.send("late", None).await,
            Err(ActorError::NotRunning(_))
        ));
    }

    #[tokio::test]
    async fn test_stop_literal_is_ordinary_output() {
        let mut actor = ProcessActor::brain(sh("read l; echo STOP; read l; echo again"));
        actor.start().unwrap();

        actor.send("turn 1", soon(2000)).await.unwrap();
        assert_eq!(actor.read(soon(2000)).await.unwrap(), "STOP");
        actor.send("STOP", soon(2000)).await.unwrap();
        assert_eq!(actor.read(soon(2000)).await.unwrap(), "again");

        actor.stop(Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let mut actor = ProcessActor::brain(ActorSpec::new("/nonexistent/antroid-brain", Vec::<String>::new()));
        let err = actor.start().unwrap_err();
        assert!(matches!(err, ActorError::Spawn { .. }));
        assert!(actor.is_stopped());
        assert!(matches!(actor.start(), Err(ActorError::AlreadyStarted(_))));
    }

    #[tokio::test]
    async fn test_exited_process_reports_closed() {
        let mut actor = ProcessActor::brain(sh("read l; exit 0"));
        actor.start().unwrap();

        actor.send("turn", soon(2000)).await.unwrap();
        assert!(matches!(
            actor.read(soon(2000)).await,
            Err(ActorError::Closed(_))
        ));
        actor.stop(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_silent_process_times_out_and_gets_killed() {
        let mut actor = ProcessActor::brain(sh("read l; sleep 30"));
        actor.start().unwrap();

        actor.send("turn", soon(2000)).await.unwrap();
        assert!(matches!(
            actor.read(soon(100)).await,
            Err(ActorError::Timeout(_))
        ));

        let started = std::time::Instant::now();
        actor.stop(Duration::from_millis(100)).await;
        assert!(actor.is_stopped());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_listener_is_write_only() {
        let mut actor = ProcessActor::listener(sh("cat > /dev/null"));
        actor.start().unwrap();
        assert!(!actor.is_readable());

        for turn in 0..3 {
            actor.send(&format!("{} 1 1 1\n0\n0 0 0\n", turn), soon(2000)).await.unwrap();
        }
        assert!(matches!(
            actor.read(soon(100)).await,
            Err(ActorError::NotReadable(_))
        ));

        actor.stop(Duration::from_secs(2)).await;
        assert!(actor.is_stopped());
    }
}
