// ABOUTME: SSH module for password-authenticated remote sessions.
// ABOUTME: Host keys are accepted without verification (trust on first use, nothing persisted).

mod client;
mod config;
mod error;
mod session;
mod transport;

pub use client::{SshConnection, SshConnector, SshProcess};
pub use config::{ConnectionConfig, DEFAULT_PORT};
pub use error::{Error, ErrorKind, Result};
pub use session::{CLOSE_TIMEOUT, Session, SessionManager};
pub use transport::{Connection, Connector, ProcessOutput, RemoteProcess};
