// ABOUTME: Application-wide error types for logtail.
// ABOUTME: Uses thiserror for ergonomic error handling and maps errors to exit codes.

use crate::ssh;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when the user interrupts the stream: 128 + SIGINT, as shells report it.
///
/// An interrupt is neither success (0) nor failure (1); `--help` lists all codes.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
pub enum Error {
    #[error("env file not found: {0}")]
    EnvFileNotFound(PathBuf),

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Ssh(#[from] ssh::Error),

    #[error("remote command exited with status {0}")]
    RemoteExit(u32),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Ssh(e) if e.is_cancelled() => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
