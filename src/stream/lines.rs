// ABOUTME: Splits raw process output chunks into log lines.
// ABOUTME: Keeps stdout and stderr fragments apart and strips trailing whitespace.

use super::{LogLine, OutputStream};
use crate::ssh::ProcessOutput;
use std::collections::VecDeque;

/// Accumulates output chunks and yields complete lines in arrival order.
#[derive(Debug, Default)]
pub(crate) struct LineSplitter {
    stdout: Fragment,
    stderr: Fragment,
    ready: VecDeque<LogLine>,
}

/// Bytes of one stream not yet terminated by a newline.
#[derive(Debug, Default)]
struct Fragment {
    bytes: Vec<u8>,
    /// Length of the prefix already known to hold no newline.
    scanned: usize,
}

impl Fragment {
    fn push(&mut self, data: &[u8], stream: OutputStream, ready: &mut VecDeque<LogLine>) {
        self.bytes.extend_from_slice(data);

        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.bytes[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            ready.push_back(LogLine::from_bytes(&self.bytes[start..=end], stream));
            start = end + 1;
            from = start;
        }

        self.bytes.drain(..start);
        self.scanned = self.bytes.len();
    }

    fn take(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        let bytes = std::mem::take(&mut self.bytes);
        (!bytes.is_empty()).then_some(bytes)
    }
}

impl LineSplitter {
    pub(crate) fn push(&mut self, output: ProcessOutput) {
        let (fragment, stream, data) = match output {
            ProcessOutput::Stdout(data) => (&mut self.stdout, OutputStream::Stdout, data),
            ProcessOutput::Stderr(data) => (&mut self.stderr, OutputStream::Stderr, data),
        };
        fragment.push(&data, stream, &mut self.ready);
    }

    pub(crate) fn pop(&mut self) -> Option<LogLine> {
        self.ready.pop_front()
    }

    /// Turn unterminated fragments into final lines once output has ended.
    pub(crate) fn finish(&mut self) {
        if let Some(raw) = self.stdout.take() {
            self.ready.push_back(LogLine::from_bytes(&raw, OutputStream::Stdout));
        }
        if let Some(raw) = self.stderr.take() {
            self.ready.push_back(LogLine::from_bytes(&raw, OutputStream::Stderr));
        }
    }
}
