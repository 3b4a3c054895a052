// ABOUTME: Non-fatal problems met while tearing a session down.
// ABOUTME: Teardown never fails the run; what went wrong is kept here and shown at the end.

use std::fmt;
use std::time::Duration;

/// Warnings gathered over one run, in the order they happened.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record `warning` and log it immediately.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, address = %warning.address, "{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// What went wrong while closing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The remote side answered the close with an error.
    CloseFailed,
    /// The remote side never confirmed the close.
    CloseTimedOut,
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    /// `host:port` of the connection concerned.
    pub address: String,
    detail: String,
}

impl Warning {
    pub fn close_failed(address: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            kind: WarningKind::CloseFailed,
            address: address.into(),
            detail: error.to_string(),
        }
    }

    pub fn close_timed_out(address: impl Into<String>, after: Duration) -> Self {
        Self {
            kind: WarningKind::CloseTimedOut,
            address: address.into(),
            detail: format!("{:?}", after),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::CloseFailed => {
                write!(f, "SSH disconnect failed for {}: {}", self.address, self.detail)
            }
            WarningKind::CloseTimedOut => write!(
                f,
                "connection close timeout for {} after {}",
                self.address, self.detail
            ),
        }
    }
}
