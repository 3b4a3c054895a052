// ABOUTME: Session lifecycle: validate credentials, connect, and guarantee release.
// ABOUTME: Release waits a bounded time for the close and downgrades failures to warnings.

use super::config::ConnectionConfig;
use super::error::{Error, ErrorKind, Result};
use super::transport::{Connection, Connector};
use crate::cancel::CancellationToken;
use crate::diagnostics::{Diagnostics, Warning};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long release waits for the remote side to confirm the close.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens sessions through a [`Connector`] and owns their teardown policy.
pub struct SessionManager<K> {
    connector: K,
    close_timeout: Duration,
}

impl<K: Connector> SessionManager<K> {
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            close_timeout: CLOSE_TIMEOUT,
        }
    }

    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Validate `config` and open an authenticated session.
    ///
    /// Missing credentials fail with [`Error::Config`] before the connector is
    /// touched. Connection failures are returned as-is and never retried.
    pub async fn acquire(&self, config: &ConnectionConfig) -> Result<Session<K::Connection>> {
        config.validate()?;

        let address = config.address();
        tracing::debug!(%address, user = %config.username, "connecting");

        match self.connector.connect(config).await {
            Ok(connection) => {
                tracing::info!(%address, "connection established");
                Ok(Session {
                    address,
                    connection: Some(Arc::new(connection)),
                    close_timeout: self.close_timeout,
                })
            }
            Err(e) => {
                if e.kind() == ErrorKind::Unknown {
                    tracing::error!(%address, error = ?e, "unexpected connection failure");
                } else {
                    tracing::debug!(%address, error = %e, "connection failed");
                }
                Err(e)
            }
        }
    }

    /// Acquire a session, run `operation` on its connection, then release it.
    ///
    /// Firing `cancel` while connecting abandons the attempt with
    /// [`Error::Cancelled`]. Once acquired, the session is released whether
    /// `operation` succeeds, fails or reports cancellation; the operation's
    /// result is returned unchanged.
    pub async fn scoped<T, F, Fut>(
        &self,
        config: &ConnectionConfig,
        cancel: &CancellationToken,
        diag: &mut Diagnostics,
        operation: F,
    ) -> Result<T>
    where
        F: FnOnce(Arc<K::Connection>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        config.validate()?;

        let mut session = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(address = %config.address(), "connect abandoned on cancellation");
                return Err(Error::Cancelled);
            }
            session = self.acquire(config) => session?,
        };

        let result = match session.connection() {
            Ok(connection) => operation(connection).await,
            Err(e) => Err(e),
        };

        session.release(diag).await;
        result
    }
}

/// An established session. Closed exactly once, by [`Session::release`] or on drop.
pub struct Session<C: Connection> {
    address: String,
    connection: Option<Arc<C>>,
    close_timeout: Duration,
}

impl<C: Connection> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: Connection> Session<C> {
    /// The live connection. Fails once the session has been released.
    pub fn connection(&self) -> Result<Arc<C>> {
        self.connection
            .clone()
            .ok_or_else(|| Error::Transport(format!("session to {} already closed", self.address)))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    /// Close the connection, waiting at most the close timeout.
    ///
    /// Never fails: a close error or timeout is recorded in `diag`. Calling
    /// this on an already released session does nothing.
    pub async fn release(&mut self, diag: &mut Diagnostics) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        tracing::debug!(address = %self.address, "closing SSH connection");

        match tokio::time::timeout(self.close_timeout, connection.close()).await {
            Ok(Ok(())) => tracing::debug!(address = %self.address, "SSH connection closed"),
            Ok(Err(e)) => diag.warn(Warning::close_failed(&self.address, e)),
            Err(_) => diag.warn(Warning::close_timed_out(&self.address, self.close_timeout)),
        }
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        tracing::warn!(
            address = %self.address,
            "session dropped without release, closing in background"
        );

        let timeout = self.close_timeout;
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = tokio::time::timeout(timeout, connection.close()).await;
            });
        }
    }
}
