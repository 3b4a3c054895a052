// ABOUTME: Ties session and stream together: connect, tail one log, relay lines, tear down.
// ABOUTME: Cleanup runs on every exit path before the outcome is reported.

use crate::cancel::CancellationToken;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::ssh::{self, ConnectionConfig, Connector, SessionManager};
use crate::stream::{LogLine, LogStreamer, TailOptions};
use std::io;

/// What to follow and where.
#[derive(Debug, Clone)]
pub struct FollowRequest {
    pub connection: ConnectionConfig,
    /// Fully resolved remote path.
    pub log_path: String,
    pub options: TailOptions,
}

/// Follow `request.log_path` until the remote output ends or `cancel` fires.
///
/// Every line goes to `sink`. A broken pipe on the sink ends the run quietly,
/// a non-zero remote exit status becomes [`Error::RemoteExit`], and
/// cancellation comes back as [`ssh::Error::Cancelled`] after cleanup.
/// `cancel` is honoured while connecting and starting `tail` too.
pub async fn follow_log<K, F>(
    sessions: &SessionManager<K>,
    streamer: &LogStreamer,
    request: &FollowRequest,
    cancel: CancellationToken,
    output: &Output,
    diag: &mut Diagnostics,
    sink: F,
) -> Result<()>
where
    K: Connector,
    F: FnMut(&LogLine) -> io::Result<()>,
{
    output.progress(&format!("Connecting to {}...", request.connection.address()));

    let stream_cancel = cancel.clone();
    let outcome = sessions
        .scoped(&request.connection, &cancel, diag, |connection| async move {
            output.success("Connection successful.");

            let result: ssh::Result<Option<u32>> = async {
                let mut stream = streamer
                    .stream(&*connection, &request.log_path, &request.options, stream_cancel)
                    .await?;
                output.progress(&format!("Executing command: {}", stream.command()));

                match stream.relay(sink).await {
                    Ok(()) => Ok(stream.exit_status()),
                    Err(ssh::Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                        tracing::debug!("output closed by reader, stopping");
                        Ok(None)
                    }
                    Err(e) => {
                        if e.is_cancelled() {
                            output.progress("\n--- Stopping log stream... ---");
                        }
                        Err(e)
                    }
                }
            }
            .await;

            output.progress("Closing SSH connection.");
            result
        })
        .await?;

    match outcome {
        Some(status) if status != 0 => Err(Error::RemoteExit(status)),
        _ => Ok(()),
    }
}
