// ABOUTME: Log command implementation.
// ABOUTME: Follows one remote log file over SSH until it ends or the user interrupts.

use logtail::cancel::CancellationToken;
use logtail::config::Settings;
use logtail::diagnostics::Diagnostics;
use logtail::error::Result;
use logtail::follow::{FollowRequest, follow_log};
use logtail::output::Output;
use logtail::ssh::{SessionManager, SshConnector};
use logtail::stream::{LogStreamer, TailOptions};

/// Stream `log_file` (without the `.log` suffix) to stdout.
pub async fn log_command(
    settings: Settings,
    log_file: &str,
    options: TailOptions,
    output: Output,
) -> Result<()> {
    let request = FollowRequest {
        log_path: settings.log_path(log_file),
        connection: settings.connection,
        options,
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.cancel_on(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::debug!("interrupt received"),
            Err(e) => {
                tracing::warn!("cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let sessions = SessionManager::new(SshConnector::new());
    let streamer = LogStreamer::new();
    let mut diag = Diagnostics::default();

    let result = follow_log(
        &sessions,
        &streamer,
        &request,
        cancel,
        &output,
        &mut diag,
        |line| output.line(line),
    )
    .await;

    interrupt.abort();

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.to_string());
    }

    result
}
