//! Shared data model for the tether session client.
//!
//! These types form the contract between the streaming channel, the
//! session controller, and the collaborator sinks. Deserialization is
//! deliberately tolerant: unknown fields and unknown status strings must
//! never fail, so a newer backend can talk to an older client.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string carried by an inbound event.
///
/// `Completed`, `Error` and `Stopped` are terminal: after one of them no
/// further processing-state-affecting events are expected for the session.
/// Any string the client does not recognize is preserved as `Other` rather
/// than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    Running,
    Completed,
    Error,
    Stopped,
    Other(String),
}

impl SessionStatus {
    /// True for statuses after which the session's processing state ends.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Error | SessionStatus::Stopped
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Other(s) => s,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "running" => SessionStatus::Running,
            "completed" => SessionStatus::Completed,
            "error" => SessionStatus::Error,
            "stopped" => SessionStatus::Stopped,
            _ => SessionStatus::Other(s),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message from the streaming channel.
///
/// Every field is independent: a single event may carry a terminal status,
/// thinking steps and system logs all at once, and each populated field is
/// dispatched. Absent fields deserialize to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundEvent {
    /// Session status update, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,

    /// Final rendering payload, opaque to the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Ordered reasoning steps for the thinking timeline.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub thinking_steps: Vec<ThinkingStep>,

    /// Raw terminal output lines (observability only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terminal_output: Vec<String>,

    /// Backend log lines, lifted into thinking steps before display.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system_logs: Vec<String>,

    /// Structured chat records (observability only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chat_logs: Vec<Value>,
}

impl InboundEvent {
    /// True when no field carries anything to dispatch.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.result.is_none()
            && self.thinking_steps.is_empty()
            && self.terminal_output.is_empty()
            && self.system_logs.is_empty()
            && self.chat_logs.is_empty()
    }
}

/// One entry on the thinking timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub message: String,
    /// Step kind, e.g. "tool_call" or "system_log" ("type" on the wire).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// Step kind used when lifting a system log line into a `ThinkingStep`.
pub const SYSTEM_LOG_KIND: &str = "system_log";

impl ThinkingStep {
    /// Lifts a raw system log line into a timeline step.
    ///
    /// This adaptation is lossy and one-way: the original log line is not
    /// recoverable downstream.
    pub fn from_system_log(line: impl Into<String>, timestamp: f64) -> Self {
        Self {
            message: line.into(),
            kind: SYSTEM_LOG_KIND.to_string(),
            details: None,
            timestamp,
        }
    }
}

/// Workspace name mapped to an opaque file-tree structure.
///
/// The controller forwards this verbatim; only the workspace sink
/// interprets the trees.
pub type WorkspaceListing = BTreeMap<String, Value>;

/// A single file fetched from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub name: String,
    pub content: String,
}
