//! Processing-session orchestration.
//!
//! `SessionController` owns the lifecycle of one request: it mediates
//! between the create-session call, the streaming event channel and the
//! stop call, and fans inbound events out to the collaborator sinks. It is
//! UI-agnostic; everything user-visible happens through injected sinks.
//!
//! The controller is driven from one logical thread: the owner holds it
//! `&mut` and pumps the stream returned by [`SessionController::submit`]
//! into [`SessionController::on_event`] one event at a time. Only the
//! contracts on this type mutate the processing state.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};

use tether_types::{FileContent, InboundEvent, SessionStatus, ThinkingStep, WorkspaceListing};

use crate::api::Backend;
use crate::stream::{EventChannel, SessionStream};
use crate::text::UiText;

/// Chat-history collaborator.
pub trait ChatSink: Send + Sync {
    fn add_user_message(&self, text: &str);
    /// The result payload is opaque; the sink decides how to render it.
    fn add_ai_message(&self, result: &Value);
    fn add_system_message(&self, text: &str);
}

/// Thinking-timeline collaborator.
pub trait ThinkingSink: Send + Sync {
    /// Steps arrive ordered; the sink must not reorder or deduplicate.
    fn add_thinking_steps(&self, steps: &[ThinkingStep]);
    fn clear_thinking(&self);
}

/// Workspace file-tree collaborator.
pub trait WorkspaceSink: Send + Sync {
    fn update_workspaces(&self, workspaces: &WorkspaceListing);
}

/// File-content viewer collaborator.
pub trait FileViewerSink: Send + Sync {
    fn show_file(&self, file: &FileContent);
}

/// Send/stop affordances and the status indicator.
pub trait ControlsSink: Send + Sync {
    fn set_send_enabled(&self, enabled: bool);
    fn set_stop_enabled(&self, enabled: bool);
    /// `None` clears the indicator.
    fn set_status(&self, label: Option<&str>);
}

/// The collaborator sinks a controller fans out to.
#[derive(Clone)]
pub struct Sinks {
    pub chat: Arc<dyn ChatSink>,
    pub thinking: Arc<dyn ThinkingSink>,
    pub workspace: Arc<dyn WorkspaceSink>,
    pub file_viewer: Arc<dyn FileViewerSink>,
    pub controls: Arc<dyn ControlsSink>,
}

/// One-session orchestration state machine.
pub struct SessionController {
    backend: Arc<dyn Backend>,
    channel: Arc<dyn EventChannel>,
    sinks: Sinks,
    text: UiText,
    /// Delay before the post-completion workspace refresh.
    refresh_delay: Duration,

    /// Current session id. Retained after processing ends so a late
    /// cancel can still target it, until superseded by a new session.
    session_id: Option<String>,
    /// Active implies `session_id` is `Some`.
    processing: bool,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn Backend>,
        channel: Arc<dyn EventChannel>,
        sinks: Sinks,
        text: UiText,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            backend,
            channel,
            sinks,
            text,
            refresh_delay,
            session_id: None,
            processing: false,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Submits a request, creating a session and opening its event stream.
    ///
    /// Returns the stream for the caller to pump into [`Self::on_event`],
    /// or `None` when the call was a no-op (already processing) or failed
    /// (already reported through the chat sink). Overlap is prevented
    /// solely by the processing guard; no second submission is issued
    /// while one session is active.
    pub async fn submit(&mut self, message: &str) -> Option<SessionStream> {
        if self.processing {
            return None;
        }

        self.processing = true;
        self.sinks.controls.set_send_enabled(false);
        self.sinks.controls.set_stop_enabled(true);
        self.sinks.controls.set_status(Some(&self.text.processing));

        match self.open_session(message).await {
            Ok(stream) => Some(stream),
            Err(reason) => {
                error!(%reason, "session submission failed");
                self.enter_idle(None);
                self.sinks
                    .chat
                    .add_system_message(&self.text.format_submit_failed(&reason));
                None
            }
        }
    }

    async fn open_session(&mut self, message: &str) -> Result<SessionStream, String> {
        let session_id = self
            .backend
            .create_session(message)
            .await
            .map_err(|e| e.to_string())?;

        self.session_id = Some(session_id.clone());
        self.sinks.chat.add_user_message(message);

        let stream = self
            .channel
            .connect(&session_id)
            .await
            .map_err(|e| e.to_string())?;
        self.sinks.thinking.clear_thinking();
        Ok(stream)
    }

    /// Dispatches one inbound event.
    ///
    /// The field checks are independent and all applicable ones run: a
    /// single event can carry a terminal status, thinking steps and
    /// system logs, and every populated field is handled. Dispatching the
    /// same event twice produces the same sink calls twice.
    pub async fn on_event(&mut self, event: &InboundEvent) {
        if let Some(status) = &event.status {
            debug!(status = %status, "session status");
            if status.is_terminal() {
                self.enter_idle(None);
            }
            if *status == SessionStatus::Completed {
                if let Some(result) = &event.result {
                    self.sinks.chat.add_ai_message(result);
                }
                self.schedule_workspace_refresh();
            }
        }

        if !event.thinking_steps.is_empty() {
            self.sinks.thinking.add_thinking_steps(&event.thinking_steps);
        }

        if !event.terminal_output.is_empty() {
            debug!(lines = event.terminal_output.len(), "terminal output");
        }

        if !event.system_logs.is_empty() {
            let now = epoch_seconds();
            let steps: Vec<ThinkingStep> = event
                .system_logs
                .iter()
                .map(|line| ThinkingStep::from_system_log(line.clone(), now))
                .collect();
            // One sink call for the whole batch, after any thinking_steps
            // carried by the same event.
            self.sinks.thinking.add_thinking_steps(&steps);
        }

        if !event.chat_logs.is_empty() {
            debug!(records = event.chat_logs.len(), "chat log records");
        }
    }

    /// Requests cancellation of the current session.
    ///
    /// No-op without a session id. On a failed stop request the state is
    /// left untouched: the session may still be legitimately running, and
    /// the in-flight request itself is never aborted. The event stream is
    /// not closed here; teardown comes from the resulting terminal status
    /// event or the channel's own close.
    pub async fn cancel(&mut self) {
        let Some(session_id) = self.session_id.clone() else {
            return;
        };

        match self.backend.stop_session(&session_id).await {
            Ok(()) => {
                self.sinks
                    .chat
                    .add_system_message(&self.text.stopped_message);
                let label = self.text.stopped.clone();
                self.enter_idle(Some(&label));
            }
            Err(e) => {
                error!(%session_id, error = %e, "stop request failed");
                self.sinks
                    .chat
                    .add_system_message(&self.text.format_stop_failed(&e.to_string()));
            }
        }
    }

    /// Fetches the workspace listing and forwards it to the workspace
    /// sink. Failure is logged and swallowed; processing state is never
    /// affected and no retry is attempted.
    pub async fn load_workspace_files(&self) {
        refresh_workspaces(&self.backend, &self.sinks.workspace).await;
    }

    /// Fetches one file and forwards it to the file viewer.
    /// Failure is reported through the chat sink.
    pub async fn open_file(&self, path: &str) {
        match self.backend.fetch_file(path).await {
            Ok(file) => self.sinks.file_viewer.show_file(&file),
            Err(e) => {
                error!(%path, error = %e, "file fetch failed");
                self.sinks
                    .chat
                    .add_system_message(&self.text.format_file_failed(path, &e.to_string()));
            }
        }
    }

    /// Schedules a workspace refresh after the configured delay.
    ///
    /// The backend's file writes may lag the completion signal, so this
    /// is a timer-based reconciliation, best-effort only. Runs detached;
    /// it holds no controller state beyond `Arc` clones.
    fn schedule_workspace_refresh(&self) {
        let backend = Arc::clone(&self.backend);
        let workspace = Arc::clone(&self.sinks.workspace);
        let delay = self.refresh_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh_workspaces(&backend, &workspace).await;
        });
    }

    /// Leaves the Active state: send re-enabled, stop disabled, status
    /// set to `label` (or cleared). The session id is retained for
    /// late-arriving requests.
    fn enter_idle(&mut self, label: Option<&str>) {
        self.processing = false;
        self.sinks.controls.set_send_enabled(true);
        self.sinks.controls.set_stop_enabled(false);
        self.sinks.controls.set_status(label);
    }
}

async fn refresh_workspaces(backend: &Arc<dyn Backend>, sink: &Arc<dyn WorkspaceSink>) {
    match backend.fetch_workspaces().await {
        Ok(listing) => sink.update_workspaces(&listing),
        Err(e) => warn!(error = %e, "workspace refresh failed"),
    }
}

/// Seconds since the Unix epoch, with sub-second precision.
fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
