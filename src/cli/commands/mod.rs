//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod run;

use serde::Serialize;

use crate::domain::models::{Config, PortfolioEntry};

/// Compact, serializable view of an accepted entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// Portfolio position.
    pub sequence: usize,
    /// Game title.
    pub title: String,
    /// Genre label.
    pub genre: String,
    /// Mechanic label.
    pub mechanic: String,
    /// Total score at acceptance.
    pub total: f64,
    /// Diversity score at acceptance.
    pub diversity: f64,
    /// Mode the candidate was generated in.
    pub mode: String,
}

impl From<&PortfolioEntry> for EntrySummary {
    fn from(entry: &PortfolioEntry) -> Self {
        Self {
            sequence: entry.sequence,
            title: entry.candidate.title().to_string(),
            genre: entry.genre().to_string(),
            mechanic: entry.mechanic().to_string(),
            total: entry.total_score(),
            diversity: entry.evaluation.diversity.score,
            mode: entry.candidate.mode.label().to_string(),
        }
    }
}

/// Seed both the mode selector and the procedural studio.
fn apply_seed(config: &mut Config, seed: Option<u64>) {
    if let Some(seed) = seed {
        config.controller.selector_seed = Some(seed);
        config.studio.seed = Some(seed);
    }
}

/// Request a cooperative stop on Ctrl-C.
fn stop_on_ctrl_c(stop: crate::application::StopHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight work");
            stop.stop();
        }
    });
}
