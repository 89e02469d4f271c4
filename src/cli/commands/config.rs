//! `arcadia config`: print the effective configuration.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct ConfigOutput {
    config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config)
            .unwrap_or_else(|err| format!("# failed to render configuration: {err}"))
    }
}

/// Print the effective configuration.
pub fn execute(config: Config, json_mode: bool) -> Result<()> {
    let rendered = ConfigOutput { config };
    // Round-trip check: what we print must load back.
    let yaml = rendered.to_human();
    let _: Config = serde_yaml::from_str(&yaml).context("Effective configuration does not round-trip")?;
    output(&rendered, json_mode);
    Ok(())
}
