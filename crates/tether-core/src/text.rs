//! User-visible strings authored by the controller.
//!
//! All controller-originated messages come from this table so a frontend
//! can localize them by constructing the controller with a substituted
//! `UiText`. Templates take their argument via the `format_*` helpers.

/// Localized label table. `Default` is English.
#[derive(Debug, Clone)]
pub struct UiText {
    /// Status indicator while a session is processing.
    pub processing: String,
    /// Status indicator after a successful cancellation.
    pub stopped: String,
    /// System chat message after a successful cancellation.
    pub stopped_message: String,
    /// Template for create-session failures ({reason}).
    pub submit_failed: String,
    /// Template for stop-request failures ({reason}).
    pub stop_failed: String,
    /// Template for file-fetch failures ({path}, {reason}).
    pub file_failed: String,
}

impl UiText {
    pub fn format_submit_failed(&self, reason: &str) -> String {
        self.submit_failed.replace("{reason}", reason)
    }

    pub fn format_stop_failed(&self, reason: &str) -> String {
        self.stop_failed.replace("{reason}", reason)
    }

    pub fn format_file_failed(&self, path: &str, reason: &str) -> String {
        self.file_failed
            .replace("{path}", path)
            .replace("{reason}", reason)
    }
}

impl Default for UiText {
    fn default() -> Self {
        Self {
            processing: "Processing...".to_string(),
            stopped: "Stopped".to_string(),
            stopped_message: "Processing stopped by user.".to_string(),
            submit_failed: "Failed to start processing: {reason}".to_string(),
            stop_failed: "Failed to stop processing: {reason}".to_string(),
            file_failed: "Failed to open {path}: {reason}".to_string(),
        }
    }
}
