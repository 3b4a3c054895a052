// ABOUTME: SSH-specific error types.
// ABOUTME: Covers credential validation, connection, authentication, and remote process failures.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required credential was missing. Holds the variable name.
    #[error("{0} required")]
    Config(&'static str),

    #[error("authentication failed for user {user}: please check your credentials")]
    Auth { user: String },

    #[error("connection failed: {0}")]
    Transport(String),

    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote process error: {0}")]
    RemoteProcess(String),

    #[error("log stream cancelled")]
    Cancelled,

    #[error("unexpected connection error: {0}")]
    Unknown(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential, detected before any I/O.
    Config,
    /// Credentials rejected by the remote host.
    Auth,
    /// Network or protocol failure on the connection.
    Transport,
    /// Spawning or talking to the remote command failed.
    RemoteProcess,
    /// Cooperative stop request. Not a failure.
    Cancelled,
    /// Anything unclassified.
    Unknown,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::Transport(_) | Error::ConnectTimeout(_) | Error::Protocol(_) | Error::Io(_) => {
                ErrorKind::Transport
            }
            Error::RemoteProcess(_) => ErrorKind::RemoteProcess,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

pub type Result<T> = std::result::Result<T, Error>;
