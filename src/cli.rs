// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the log subcommand and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const EXIT_STATUS_HELP: &str = "Exit status:
  0    the log ended or the reader of stdout went away
  1    configuration, connection, authentication or remote command failure
  130  interrupted with Ctrl-C";

#[derive(Parser)]
#[command(name = "logtail")]
#[command(about = "Follow a remote log file over SSH")]
#[command(version)]
#[command(after_help = EXIT_STATUS_HELP)]
pub struct Cli {
    /// Env file holding SSH_HOST, SSH_USER, SSH_PASSWORD, SSH_PORT and LOG_BASE_PATH
    #[arg(long, global = true, default_value = logtail::config::ENV_FILE)]
    pub env_file: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print log lines and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream a remote log file until interrupted
    Log {
        /// Log file name, without the .log suffix
        log_file: String,

        /// Print the last N lines before following
        #[arg(short = 'n', long)]
        lines: Option<u64>,
    },
}
