//! Terminal implementations of the collaborator sinks.
//!
//! One struct implements all five traits and prints to stdout. Button
//! enablement has no terminal equivalent, so those calls are ignored;
//! status changes print as bracketed lines.

use serde_json::Value;
use tether_core::controller::{ChatSink, ControlsSink, FileViewerSink, ThinkingSink, WorkspaceSink};
use tether_core::types::{FileContent, ThinkingStep, WorkspaceListing};

#[derive(Default)]
pub struct TerminalSinks;

impl ChatSink for TerminalSinks {
    fn add_user_message(&self, text: &str) {
        println!("you> {text}");
    }

    fn add_ai_message(&self, result: &Value) {
        // String results print raw; structured results print as JSON.
        match result.as_str() {
            Some(text) => println!("agent> {text}"),
            None => println!(
                "agent> {}",
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
            ),
        }
    }

    fn add_system_message(&self, text: &str) {
        println!("[system] {text}");
    }
}

impl ThinkingSink for TerminalSinks {
    fn add_thinking_steps(&self, steps: &[ThinkingStep]) {
        for step in steps {
            println!("  · ({}) {}", step.kind, step.message);
        }
    }

    fn clear_thinking(&self) {
        // Nothing to erase on a scrolling terminal.
    }
}

impl WorkspaceSink for TerminalSinks {
    fn update_workspaces(&self, workspaces: &WorkspaceListing) {
        for (name, tree) in workspaces {
            println!("workspace {name}: {tree}");
        }
    }
}

impl FileViewerSink for TerminalSinks {
    fn show_file(&self, file: &FileContent) {
        println!("--- {} ---", file.name);
        println!("{}", file.content);
    }
}

impl ControlsSink for TerminalSinks {
    fn set_send_enabled(&self, _enabled: bool) {}

    fn set_stop_enabled(&self, _enabled: bool) {}

    fn set_status(&self, label: Option<&str>) {
        if let Some(label) = label {
            println!("[{label}]");
        }
    }
}
