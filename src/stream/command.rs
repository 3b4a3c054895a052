// ABOUTME: Builds the remote log path and the tail command issued over SSH.
// ABOUTME: The path is shell-quoted and follows `--`, so a log name is never a command or option.

/// Suffix appended to every log name.
pub const LOG_SUFFIX: &str = ".log";

/// Options for the remote `tail` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailOptions {
    /// Number of existing lines to print before following (`tail -n`).
    pub lines: Option<u64>,
}

impl TailOptions {
    pub fn lines(mut self, lines: u64) -> Self {
        self.lines = Some(lines);
        self
    }
}

/// Resolve `{base_path}/{log_name}.log`, or `{log_name}.log` without a base path.
///
/// Plain string concatenation: no normalisation of slashes or `..` segments.
pub fn resolve_log_path(base_path: &str, log_name: &str) -> String {
    if base_path.is_empty() {
        format!("{}{}", log_name, LOG_SUFFIX)
    } else {
        format!("{}/{}{}", base_path, log_name, LOG_SUFFIX)
    }
}

/// Build the follow-mode tail command for `path`.
pub fn tail_command(path: &str, options: &TailOptions) -> String {
    match options.lines {
        Some(lines) => format!("tail -n {} -f -- {}", lines, shell_quote(path)),
        None => format!("tail -f -- {}", shell_quote(path)),
    }
}

/// Quote `word` for a POSIX shell. Words made only of safe characters pass through.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'/' | b'-'));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
