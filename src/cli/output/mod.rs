//! CLI output formatting module
//!
//! Human-readable tables and progress bars, or pretty JSON with `--json`.

pub mod progress;
pub mod table;

use serde::Serialize;

pub use progress::{create_progress_bar, create_spinner, ProgressBarExt};
pub use table::TableFormatter;

/// A command result that renders both for people and for scripts.
pub trait CommandOutput: Serialize {
    /// Human-readable rendering.
    fn to_human(&self) -> String;

    /// JSON rendering, the serde form by default.
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Print `result` as JSON or as text.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}
