// ABOUTME: Loads KEY=VALUE pairs from a dotenv file into the process environment.
// ABOUTME: Variables already set in the environment take precedence.

use crate::error::{Error, Result};
use std::path::Path;

/// Default env file, looked up in the working directory.
pub const ENV_FILE: &str = ".env";

/// Load `path` into the process environment. The file must exist.
pub fn load_env_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::EnvFileNotFound(path.to_path_buf()));
    }

    dotenvy::from_path(path).map_err(|source| Error::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "loaded env file");
    Ok(())
}
