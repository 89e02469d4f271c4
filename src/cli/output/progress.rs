//! Progress bars for batch runs using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::models::BatchProgress;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";
const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";

const PROGRESS_CHARS: &str = "█▓▒░ ";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a progress bar for `total` attempts.
///
/// Hidden in JSON mode so stdout stays machine-readable.
pub fn create_progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner for the sequential loop, where the attempt count is open-ended.
pub fn create_spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// One-line batch status shown next to the bar.
pub fn batch_message(progress: &BatchProgress) -> String {
    format!(
        "batch {}/{} · {} ok · {} failed",
        progress.batch_index + 1,
        progress.batch_count,
        progress.successes,
        progress.failures
    )
}

/// Extension trait for ProgressBar
pub trait ProgressBarExt {
    /// Apply a batch progress snapshot
    fn apply(&self, progress: &BatchProgress);

    /// Finish with a success message
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with a warning message
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn apply(&self, progress: &BatchProgress) {
        self.set_position(progress.completed as u64);
        self.set_message(batch_message(progress));
    }

    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }
}
