// ABOUTME: Output formatting for CLI feedback and relayed log lines.
// ABOUTME: Log lines go to stdout unformatted; status messages go to stderr.

use crate::stream::{LogLine, OutputStream};
use std::io::{self, Write};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Status messages alongside the log lines
    Normal,
    /// Only log lines and errors
    Quiet,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print a success message (suppressed in quiet mode).
    pub fn success(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print a warning message.
    pub fn warning(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("Warning: {message}");
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    /// Write one relayed log line, newline-terminated.
    ///
    /// Remote stdout goes to local stdout, remote stderr to local stderr.
    pub fn line(&self, line: &LogLine) -> io::Result<()> {
        match line.stream {
            OutputStream::Stdout => write_line(&mut io::stdout().lock(), line),
            OutputStream::Stderr => write_line(&mut io::stderr().lock(), line),
        }
    }
}

/// Write `line` followed by a newline and flush, so a follower sees it immediately.
pub fn write_line<W: Write>(writer: &mut W, line: &LogLine) -> io::Result<()> {
    writeln!(writer, "{}", line.content)?;
    writer.flush()
}
