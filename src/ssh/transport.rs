// ABOUTME: Transport seams between the session/stream lifecycle and the SSH library.
// ABOUTME: The russh client implements these; tests substitute in-memory stubs.

use super::config::ConnectionConfig;
use super::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Opens authenticated connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Connect to `config.host:config.port` and authenticate with the password.
    ///
    /// Credentials have already been validated when this is called.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Connection>;
}

/// A live, authenticated connection.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    type Process: RemoteProcess;

    /// Start `command` on the remote host.
    async fn spawn(&self, command: &str) -> Result<Self::Process>;

    /// Shut the connection down and wait for the remote side to confirm.
    async fn close(&self) -> Result<()>;
}

/// Output produced by a remote process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutput {
    Stdout(Bytes),
    Stderr(Bytes),
}

/// A command running on the remote host.
#[async_trait]
pub trait RemoteProcess: Send + 'static {
    /// Wait for the next chunk of output. `None` once the output has ended.
    async fn next_output(&mut self) -> Result<Option<ProcessOutput>>;

    /// Send a kill signal to the remote command.
    async fn kill(&mut self) -> Result<()>;

    /// Wait until the remote side acknowledges the process is gone.
    async fn wait_closed(&mut self);

    /// Release the process after its output ended on its own.
    async fn close(&mut self) -> Result<()>;

    /// Whether a kill or close is already underway.
    fn is_closing(&self) -> bool;

    /// Exit status reported by the remote side, if any.
    fn exit_status(&self) -> Option<u32> {
        None
    }
}
