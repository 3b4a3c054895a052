// ABOUTME: Library root for logtail - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod follow;
pub mod output;
pub mod ssh;
pub mod stream;
