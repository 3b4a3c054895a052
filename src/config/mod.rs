// ABOUTME: Runtime settings read from the process environment.
// ABOUTME: Supplies connection credentials and the remote log base path.

mod env_file;

pub use env_file::{ENV_FILE, load_env_file};

use crate::error::{Error, Result};
use crate::ssh::{ConnectionConfig, DEFAULT_PORT};
use crate::stream::resolve_log_path;

pub const SSH_HOST: &str = "SSH_HOST";
pub const SSH_USER: &str = "SSH_USER";
pub const SSH_PASSWORD: &str = "SSH_PASSWORD";
pub const SSH_PORT: &str = "SSH_PORT";
pub const LOG_BASE_PATH: &str = "LOG_BASE_PATH";

#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    /// Directory prepended to log names. Empty means relative to the login directory.
    pub log_base_path: String,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`.
    ///
    /// Missing credentials are left empty: the session manager reports them
    /// in a fixed order before connecting. Only a malformed port fails here.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup(SSH_PORT) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u16>().map_err(|_| {
                Error::InvalidConfig(format!("{} must be a port number, got {:?}", SSH_PORT, raw))
            })?,
            _ => DEFAULT_PORT,
        };

        let connection = ConnectionConfig::new(
            lookup(SSH_HOST).unwrap_or_default(),
            lookup(SSH_USER).unwrap_or_default(),
            lookup(SSH_PASSWORD).unwrap_or_default(),
        )
        .port(port);

        Ok(Self {
            connection,
            log_base_path: lookup(LOG_BASE_PATH).unwrap_or_default(),
        })
    }

    /// Remote path of the log called `log_name` (without the `.log` suffix).
    pub fn log_path(&self, log_name: &str) -> String {
        resolve_log_path(&self.log_base_path, log_name)
    }
}
