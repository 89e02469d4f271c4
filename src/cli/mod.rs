//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use output::{create_progress_bar, create_spinner, ProgressBarExt, TableFormatter};
pub use types::{Cli, Commands};

use crate::domain::errors::DomainError;
use crate::infrastructure::config::ConfigError;

/// Print an error and exit. Configuration problems exit with 2, everything
/// else with 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = exit_code(&err);
    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "exit_code": code,
        });
        println!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(code);
}

fn exit_code(err: &anyhow::Error) -> i32 {
    let config_error = err.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(
                cause.downcast_ref::<DomainError>(),
                Some(DomainError::InvalidConfiguration(_))
            )
    });
    if config_error {
        2
    } else {
        1
    }
}
