// ABOUTME: Follows a remote log file and exposes it as a pull-based line stream.
// ABOUTME: Kills the remote tail on cancellation, error, or drop with a bounded wait.

mod command;
mod lines;

pub use command::{LOG_SUFFIX, TailOptions, resolve_log_path, shell_quote, tail_command};

use crate::cancel::CancellationToken;
use crate::ssh::{Connection, Error, RemoteProcess, Result};
use futures::Stream;
use lines::LineSplitter;
use std::time::Duration;

/// How long cleanup waits for the remote side to acknowledge a kill.
pub const KILL_TIMEOUT: Duration = Duration::from_secs(1);

/// A single line of remote output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// The line content, trailing whitespace removed.
    pub content: String,
    /// Which remote stream produced the line.
    pub stream: OutputStream,
}

impl LogLine {
    pub fn new(content: impl Into<String>, stream: OutputStream) -> Self {
        Self {
            content: content.into(),
            stream,
        }
    }

    pub(crate) fn from_bytes(raw: &[u8], stream: OutputStream) -> Self {
        Self {
            content: String::from_utf8_lossy(raw).trim_end().to_string(),
            stream,
        }
    }
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

/// Remote output stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Spawns tail commands and wraps them in [`LogStream`]s.
#[derive(Debug, Clone)]
pub struct LogStreamer {
    kill_timeout: Duration,
}

impl Default for LogStreamer {
    fn default() -> Self {
        Self {
            kill_timeout: KILL_TIMEOUT,
        }
    }
}

impl LogStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill_timeout(mut self, timeout: Duration) -> Self {
        self.kill_timeout = timeout;
        self
    }

    /// Start following `log_path` on `connection`.
    ///
    /// The returned stream yields lines until the remote output ends or
    /// `cancel` fires. It cannot be restarted once closed. Cancelling before
    /// the remote command has started returns [`Error::Cancelled`].
    pub async fn stream<C: Connection>(
        &self,
        connection: &C,
        log_path: &str,
        options: &TailOptions,
        cancel: CancellationToken,
    ) -> Result<LogStream<C::Process>> {
        let command = tail_command(log_path, options);
        tracing::info!(%command, "executing remote command");

        let process = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(%command, "start of remote command abandoned on cancellation");
                return Err(Error::Cancelled);
            }
            process = connection.spawn(&command) => process?,
        };

        Ok(LogStream {
            command,
            process: Some(process),
            splitter: LineSplitter::default(),
            cancel,
            kill_timeout: self.kill_timeout,
            exit_status: None,
            state: State::Open,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Remote process running.
    Open,
    /// Output ended on its own; buffered lines may remain.
    Ended,
    /// Nothing more will be produced.
    Closed,
}

/// Lines from one remote tail process.
pub struct LogStream<P: RemoteProcess> {
    command: String,
    process: Option<P>,
    splitter: LineSplitter,
    cancel: CancellationToken,
    kill_timeout: Duration,
    exit_status: Option<u32>,
    state: State,
}

impl<P: RemoteProcess> std::fmt::Debug for LogStream<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("command", &self.command)
            .field("state", &self.state)
            .field("exit_status", &self.exit_status)
            .finish()
    }
}

impl<P: RemoteProcess> LogStream<P> {
    /// The exact command issued on the remote host.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the stream has reached its terminal state.
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Exit status reported by the remote process once it has been released.
    pub fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }

    /// Wait for the next line.
    ///
    /// Returns `Ok(None)` when the remote output has ended and every buffered
    /// line has been delivered. On cancellation the remote process is killed
    /// first and then [`Error::Cancelled`] is returned; other errors are
    /// handled the same way. After any of these, the stream stays closed.
    pub async fn next_line(&mut self) -> Result<Option<LogLine>> {
        loop {
            match self.state {
                State::Closed => return Ok(None),
                State::Open if self.cancel.is_cancelled() => {
                    self.abort().await;
                    return Err(Error::Cancelled);
                }
                _ => {}
            }

            if let Some(line) = self.splitter.pop() {
                return Ok(Some(line));
            }

            let Some(process) = self.process.as_mut() else {
                self.state = State::Closed;
                return Ok(None);
            };

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                output = process.next_output() => Some(output),
            };

            match next {
                None => {
                    self.abort().await;
                    return Err(Error::Cancelled);
                }
                Some(Ok(Some(output))) => self.splitter.push(output),
                Some(Ok(None)) => {
                    self.splitter.finish();
                    self.release().await;
                    self.state = State::Ended;
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "remote process failed mid-stream");
                    self.abort().await;
                    return Err(e);
                }
            }
        }
    }

    /// Feed every line to `sink` until the stream ends.
    ///
    /// A sink error stops the remote process and is returned as [`Error::Io`].
    pub async fn relay<F>(&mut self, mut sink: F) -> Result<()>
    where
        F: FnMut(&LogLine) -> std::io::Result<()>,
    {
        while let Some(line) = self.next_line().await? {
            if let Err(e) = sink(&line) {
                self.stop().await;
                return Err(Error::Io(e));
            }
        }
        Ok(())
    }

    /// Stop early: kill the remote process and close the stream.
    pub async fn stop(&mut self) {
        self.abort().await;
    }

    /// Adapt into a [`futures::Stream`] of lines.
    pub fn into_stream(self) -> impl Stream<Item = Result<LogLine>> {
        futures::stream::unfold(self, |mut stream| async move {
            match stream.next_line().await {
                Ok(Some(line)) => Some((Ok(line), stream)),
                Ok(None) => None,
                Err(e) => Some((Err(e), stream)),
            }
        })
    }

    /// Kill the process unless it is already going away, then wait briefly.
    async fn abort(&mut self) {
        self.state = State::Closed;
        let Some(mut process) = self.process.take() else {
            return;
        };

        let kill_timeout = self.kill_timeout;
        let command = &self.command;
        let kill_and_wait = async {
            if !process.is_closing() {
                tracing::debug!(%command, "killing remote process");
                if let Err(e) = process.kill().await {
                    tracing::warn!("failed to kill remote process: {}", e);
                }
            }
            process.wait_closed().await;
        };

        if tokio::time::timeout(kill_timeout, kill_and_wait).await.is_err() {
            tracing::debug!(
                timeout = ?kill_timeout,
                "remote process did not acknowledge kill in time"
            );
        }
        self.exit_status = process.exit_status();
    }

    /// Release a process whose output ended on its own.
    async fn release(&mut self) {
        let Some(mut process) = self.process.take() else {
            return;
        };

        match tokio::time::timeout(self.kill_timeout, process.close()).await {
            Ok(Ok(())) => tracing::debug!(command = %self.command, "remote process finished"),
            Ok(Err(e)) => tracing::warn!("failed to release remote process: {}", e),
            Err(_) => tracing::debug!("remote process release timed out"),
        }
        self.exit_status = process.exit_status();
    }
}

impl<P: RemoteProcess> Drop for LogStream<P> {
    fn drop(&mut self) {
        let Some(mut process) = self.process.take() else {
            return;
        };
        if process.is_closing() {
            return;
        }

        tracing::debug!(command = %self.command, "log stream dropped, killing remote process");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = process.kill().await;
            });
        }
    }
}
