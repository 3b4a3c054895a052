// ABOUTME: In-memory implementations of the transport traits.
// ABOUTME: Record connects, spawns, kills, releases and closes for lifecycle assertions.

use async_trait::async_trait;
use bytes::Bytes;
use logtail::ssh::{
    Connection, ConnectionConfig, Connector, Error, ProcessOutput, RemoteProcess, Result,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A config that passes credential validation.
pub fn valid_config() -> ConnectionConfig {
    ConnectionConfig::new("logs.example.com", "ops", "secret")
}

/// Shared counters observed by tests.
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<RecorderState>,
}

#[derive(Default)]
struct RecorderState {
    connects: AtomicUsize,
    closes: AtomicUsize,
    kills: AtomicUsize,
    releases: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.inner.kills.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.inner.commands.lock().clone()
    }
}

#[derive(Clone, Copy)]
pub enum ConnectBehavior {
    Accept,
    RejectAuth,
    Refuse,
    Unexpected,
    /// Never completes, like a server that stalls mid-handshake.
    Hang,
}

#[derive(Clone, Copy)]
pub enum CloseBehavior {
    Immediate,
    /// Confirms the close after this long.
    After(Duration),
    Hang,
    Fail,
}

/// What the spawned process writes.
#[derive(Clone)]
pub enum Script {
    /// These chunks, then end of output.
    Chunks(Vec<ProcessOutput>),
    /// `line N` forever, one line per chunk, every `interval`.
    Endless { interval: Duration },
    /// These chunks, then a channel failure.
    FailAfter(Vec<ProcessOutput>),
}

impl Script {
    /// One stdout chunk per line, each newline-terminated.
    pub fn lines(lines: &[&str]) -> Self {
        Script::Chunks(lines.iter().map(|l| stdout(&format!("{l}\n"))).collect())
    }
}

pub fn stdout(text: &str) -> ProcessOutput {
    ProcessOutput::Stdout(Bytes::copy_from_slice(text.as_bytes()))
}

pub fn stderr(text: &str) -> ProcessOutput {
    ProcessOutput::Stderr(Bytes::copy_from_slice(text.as_bytes()))
}

#[derive(Clone)]
pub struct StubConnector {
    recorder: Recorder,
    connect: ConnectBehavior,
    close: CloseBehavior,
    script: Script,
    kill_acknowledged: bool,
    exit_status: Option<u32>,
    spawn_hangs: bool,
}

impl StubConnector {
    pub fn new() -> Self {
        Self {
            recorder: Recorder::default(),
            connect: ConnectBehavior::Accept,
            close: CloseBehavior::Immediate,
            script: Script::Chunks(Vec::new()),
            kill_acknowledged: true,
            exit_status: None,
            spawn_hangs: false,
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn connect_behavior(mut self, behavior: ConnectBehavior) -> Self {
        self.connect = behavior;
        self
    }

    pub fn close_behavior(mut self, behavior: CloseBehavior) -> Self {
        self.close = behavior;
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    /// The remote side never confirms a kill.
    pub fn ignore_kill(mut self) -> Self {
        self.kill_acknowledged = false;
        self
    }

    /// Starting a command never completes.
    pub fn hang_spawn(mut self) -> Self {
        self.spawn_hangs = true;
        self
    }

    pub fn exit_status(mut self, status: u32) -> Self {
        self.exit_status = Some(status);
        self
    }
}

#[async_trait]
impl Connector for StubConnector {
    type Connection = StubConnection;

    async fn connect(&self, config: &ConnectionConfig) -> Result<StubConnection> {
        self.recorder.inner.connects.fetch_add(1, Ordering::SeqCst);
        match self.connect {
            ConnectBehavior::Accept => Ok(StubConnection {
                stub: self.clone(),
            }),
            ConnectBehavior::RejectAuth => Err(Error::Auth {
                user: config.username.clone(),
            }),
            ConnectBehavior::Refuse => Err(Error::Transport(format!(
                "cannot reach {}: connection refused",
                config.address()
            ))),
            ConnectBehavior::Unexpected => Err(Error::Unknown("handler panicked".into())),
            ConnectBehavior::Hang => std::future::pending().await,
        }
    }
}

pub struct StubConnection {
    stub: StubConnector,
}

impl StubConnection {
    pub fn recorder(&self) -> Recorder {
        self.stub.recorder.clone()
    }
}

#[async_trait]
impl Connection for StubConnection {
    type Process = StubProcess;

    async fn spawn(&self, command: &str) -> Result<StubProcess> {
        self.stub.recorder.inner.commands.lock().push(command.to_string());
        if self.stub.spawn_hangs {
            return std::future::pending().await;
        }

        let (chunks, endless, fail_at_end) = match &self.stub.script {
            Script::Chunks(chunks) => (chunks.clone(), None, false),
            Script::Endless { interval } => (Vec::new(), Some(*interval), false),
            Script::FailAfter(chunks) => (chunks.clone(), None, true),
        };

        Ok(StubProcess {
            recorder: self.stub.recorder.clone(),
            chunks: chunks.into(),
            endless,
            fail_at_end,
            produced: 0,
            closing: false,
            kill_acknowledged: self.stub.kill_acknowledged,
            exit_status: self.stub.exit_status,
        })
    }

    async fn close(&self) -> Result<()> {
        self.stub.recorder.inner.closes.fetch_add(1, Ordering::SeqCst);
        match self.stub.close {
            CloseBehavior::Immediate => Ok(()),
            CloseBehavior::After(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            CloseBehavior::Hang => std::future::pending().await,
            CloseBehavior::Fail => Err(Error::Transport("connection reset by peer".into())),
        }
    }
}

pub struct StubProcess {
    recorder: Recorder,
    chunks: VecDeque<ProcessOutput>,
    endless: Option<Duration>,
    fail_at_end: bool,
    produced: usize,
    closing: bool,
    kill_acknowledged: bool,
    exit_status: Option<u32>,
}

#[async_trait]
impl RemoteProcess for StubProcess {
    async fn next_output(&mut self) -> Result<Option<ProcessOutput>> {
        if let Some(interval) = self.endless {
            tokio::time::sleep(interval).await;
            self.produced += 1;
            return Ok(Some(stdout(&format!("line {}\n", self.produced))));
        }
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_at_end => {
                Err(Error::RemoteProcess("channel closed unexpectedly".into()))
            }
            None => Ok(None),
        }
    }

    async fn kill(&mut self) -> Result<()> {
        self.recorder.inner.kills.fetch_add(1, Ordering::SeqCst);
        self.closing = true;
        Ok(())
    }

    async fn wait_closed(&mut self) {
        if !self.kill_acknowledged {
            std::future::pending::<()>().await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.recorder.inner.releases.fetch_add(1, Ordering::SeqCst);
        self.closing = true;
        Ok(())
    }

    fn is_closing(&self) -> bool {
        self.closing
    }

    fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }
}
