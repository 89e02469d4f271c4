//! Arcadia - adaptive arcade game generator
//!
//! Arcadia generates a portfolio of short casual games. Each attempt asks a
//! set of collaborators for an idea, assets and playable content, turns the
//! result into a fixed-width feature vector, and scores it against the
//! portfolio accepted so far. Acceptance standards drift with the observed
//! pass rate, and an epsilon-greedy selector steers attempts toward
//! under-covered genres and mechanics.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, error taxonomy, collaborator ports
//! - **Service Layer** (`services`): vectorizing, diversity, scoring, control
//! - **Application Layer** (`application`): pipeline, batch executor, loop
//! - **Infrastructure Layer** (`infrastructure`): config, logging, studio
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use arcadia::application::{GenerationPipeline, RunPlan};
//! use arcadia::infrastructure::studio::build_studio;
//! use arcadia::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let mut pipeline = GenerationPipeline::new(&config, build_studio(&config));
//!     let run = pipeline
//!         .run_batches(RunPlan::from_config(&config.generation), |_| {})
//!         .await;
//!     println!("{} of {} accepted", pipeline.portfolio().len(), run.requested);
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{
    AutonomousLoop, BatchExecutor, CandidateFactory, GenerationPipeline, LoopSummary, RunPlan,
    StopHandle,
};
pub use domain::models::{
    AdaptiveStandards, Candidate, Config, FeatureVector, GameArtifact, GenerationMode,
    PortfolioEntry, QualityEvaluation,
};
pub use domain::ports::Studio;
pub use domain::{DomainError, DomainResult, GenerationError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DiversityAnalyzer, Portfolio, QualityScorer, ThresholdController};
