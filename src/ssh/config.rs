// ABOUTME: Connection parameters for a password-authenticated SSH session.
// ABOUTME: Validates required credentials before any network I/O happens.

use super::error::{Error, Result};

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Configuration for establishing an SSH session.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
    /// SSH port (default: 22).
    pub port: u16,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Check that host, username and password are all present, in that order.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("SSH_HOST"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::Config("SSH_USER"));
        }
        if self.password.is_empty() {
            return Err(Error::Config("SSH_PASSWORD"));
        }
        Ok(())
    }

    /// `host:port` for log messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}
