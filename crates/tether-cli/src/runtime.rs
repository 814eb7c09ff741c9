//! Drive loop for a one-shot session.
//!
//! The loop is the single logical thread of the design: it owns the
//! controller mutably and pumps the event stream into `on_event` one
//! event at a time, so no two dispatches ever interleave. Ctrl+C issues
//! a cancel; the stream then ends via the terminal status or the
//! backend closing the connection.

use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use tether_core::controller::SessionController;
use tether_core::types::SessionStatus;
use tracing::warn;

pub async fn run_session(
    controller: &mut SessionController,
    prompt: &str,
    refresh_delay: Duration,
) -> Result<()> {
    let Some(mut stream) = controller.submit(prompt).await else {
        // No-op or failure; anything user-relevant was already reported
        // through the sinks.
        return Ok(());
    };

    let mut completed = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                controller.cancel().await;
            }
            next = stream.next() => match next {
                Some(Ok(event)) => {
                    completed |= event.status == Some(SessionStatus::Completed);
                    controller.on_event(&event).await;
                }
                Some(Err(e)) => {
                    // Transport-level noise; the state machine only ever
                    // sees well-formed events.
                    warn!(error = %e, "event stream error");
                }
                None => break,
            },
        }
    }

    if completed {
        // Let the scheduled post-completion workspace refresh land
        // before the process exits.
        tokio::time::sleep(refresh_delay + Duration::from_millis(50)).await;
    }
    Ok(())
}
