//! Studio collaborators
//!
//! - Procedural offline studio implementing every collaborator port
//! - Retry decorator with exponential backoff for the idea generator

pub mod procedural;
pub mod retry;

use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::Studio;

pub use procedural::ProceduralStudio;
pub use retry::{RetryPolicy, RetryingIdeaGenerator};

/// Build the default offline studio from configuration.
pub fn build_studio(config: &Config) -> Studio {
    Arc::new(ProceduralStudio::new(config.studio.clone()))
        .into_studio(RetryPolicy::from_config(&config.retry))
}
