// ABOUTME: Command module aggregator for the logtail CLI.
// ABOUTME: Re-exports the log command handler.

mod log;

pub use log::log_command;
