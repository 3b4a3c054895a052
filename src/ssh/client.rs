// ABOUTME: SSH transport implementation using russh.
// ABOUTME: Handles connection, password authentication, and remote process channels.

use super::config::ConnectionConfig;
use super::error::{Error, Result};
use super::transport::{Connection, Connector, ProcessOutput, RemoteProcess};
use async_trait::async_trait;
use bytes::Bytes;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::ssh_key;
use russh::{Channel, ChannelMsg, Disconnect, Sig};
use std::sync::Arc;
use std::time::Duration;

/// How often `close` checks whether the session task has finished.
const CLOSE_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Opens russh client connections.
#[derive(Debug, Clone)]
pub struct SshConnector {
    /// Upper bound for TCP connect, key exchange and password authentication.
    connect_timeout: Duration,
    /// Interval between keepalive requests while the log is quiet.
    keepalive_interval: Duration,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(15),
        }
    }
}

impl SshConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    /// Host keys are not verified: every server key is accepted.
    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        tracing::debug!(
            host = %self.host,
            port = self.port,
            fingerprint = %server_public_key.fingerprint(ssh_key::HashAlg::Sha256),
            "accepting host key without verification"
        );
        Ok(true)
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Connection = SshConnection;

    async fn connect(&self, config: &ConnectionConfig) -> Result<SshConnection> {
        // A quiet log must not look like an idle session.
        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(self.keepalive_interval),
            ..Default::default()
        };

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
        };

        // The handshake and the password exchange share one deadline.
        let handshake = async {
            let mut handle = client::connect(
                Arc::new(russh_config),
                (config.host.as_str(), config.port),
                handler,
            )
            .await
            .map_err(|e| match e {
                russh::Error::IO(io) => {
                    Error::Transport(format!("cannot reach {}: {}", config.address(), io))
                }
                other => Error::Protocol(other),
            })?;
            let auth = handle
                .authenticate_password(&config.username, &config.password)
                .await?;
            Ok::<_, Error>((handle, auth))
        };
        let (handle, auth) = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| Error::ConnectTimeout(self.connect_timeout))??;

        if !auth.success() {
            if let Err(e) = handle.disconnect(Disconnect::ByApplication, "", "en").await {
                tracing::debug!("disconnect after rejected authentication failed: {}", e);
            }
            return Err(Error::Auth {
                user: config.username.clone(),
            });
        }

        Ok(SshConnection {
            address: config.address(),
            handle,
            start_timeout: self.connect_timeout,
        })
    }
}

/// An authenticated russh connection.
pub struct SshConnection {
    address: String,
    handle: Handle<SshHandler>,
    /// Upper bound for opening a channel and starting a command on it.
    start_timeout: Duration,
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("address", &self.address)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Connection for SshConnection {
    type Process = SshProcess;

    async fn spawn(&self, command: &str) -> Result<SshProcess> {
        let start = async {
            let channel = self
                .handle
                .channel_open_session()
                .await
                .map_err(|e| Error::RemoteProcess(format!("failed to open channel: {}", e)))?;

            channel
                .exec(true, command)
                .await
                .map_err(|e| Error::RemoteProcess(format!("failed to exec command: {}", e)))?;

            Ok::<_, Error>(channel)
        };
        let channel = tokio::time::timeout(self.start_timeout, start)
            .await
            .map_err(|_| {
                Error::RemoteProcess(format!(
                    "remote command did not start within {:?}",
                    self.start_timeout
                ))
            })??;

        Ok(SshProcess {
            channel,
            closing: false,
            got_eof: false,
            exit_status: None,
        })
    }

    async fn close(&self) -> Result<()> {
        if self.handle.is_closed() {
            return Ok(());
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;

        // The session task drops its end of the handle once the transport is gone.
        while !self.handle.is_closed() {
            tokio::time::sleep(CLOSE_POLL_INTERVAL).await;
        }
        tracing::debug!(address = %self.address, "remote side closed the connection");
        Ok(())
    }
}

/// A command running on a russh session channel.
pub struct SshProcess {
    channel: Channel<Msg>,
    closing: bool,
    got_eof: bool,
    exit_status: Option<u32>,
}

#[async_trait]
impl RemoteProcess for SshProcess {
    async fn next_output(&mut self) -> Result<Option<ProcessOutput>> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    return Ok(Some(ProcessOutput::Stdout(Bytes::copy_from_slice(&data))));
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        return Ok(Some(ProcessOutput::Stderr(Bytes::copy_from_slice(&data))));
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    tracing::debug!(exit_status, "remote process exited");
                    self.exit_status = Some(exit_status);
                    if self.got_eof {
                        return Ok(None);
                    }
                }
                Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                    tracing::debug!(signal = ?signal_name, "remote process killed by signal");
                }
                Some(ChannelMsg::Eof) => {
                    self.got_eof = true;
                    if self.exit_status.is_some() {
                        return Ok(None);
                    }
                }
                Some(ChannelMsg::Close) | None => {
                    self.closing = true;
                    return Ok(None);
                }
                Some(_) => {}
            }
        }
    }

    async fn kill(&mut self) -> Result<()> {
        self.closing = true;
        let signalled = self.channel.signal(Sig::KILL).await;
        // sshd hangs up the command once the channel closes, even if it ignored the signal.
        let closed = self.channel.close().await;
        signalled.and(closed).map_err(Error::Protocol)
    }

    async fn wait_closed(&mut self) {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    self.exit_status = Some(exit_status);
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closing {
            return Ok(());
        }
        self.closing = true;
        self.channel.close().await.map_err(Error::Protocol)
    }

    fn is_closing(&self) -> bool {
        self.closing
    }

    fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }
}
