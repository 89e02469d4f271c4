//! Domain models.

pub mod artifact;
pub mod batch;
pub mod candidate;
pub mod config;
pub mod evaluation;
pub mod feature_vector;
pub mod generation;
pub mod standards;

pub use artifact::{
    ActionKind, ArtifactView, AssetKind, AssetRef, ConditionKind, ControlKind, GameArtifact,
    GameObject, GameStructure, Genre, Mechanic, Rule,
};
pub use batch::{BatchProgress, BatchReport, BatchResult, BatchTask, RunReport};
pub use candidate::{
    Candidate, CandidateMetrics, GeneratedContent, IdeaSeed, PortfolioEntry, PublishReceipt,
};
pub use config::{
    Config, ControllerConfig, DiversityConfig, GenerationConfig, LoggingConfig, RetryConfig,
    ScoringConfig, StudioConfig,
};
pub use evaluation::{
    AbsoluteScores, CriticalViolation, DiversityAnalysis, GapArea, GapDimension,
    QualityEvaluation, RelativeScores,
};
pub use feature_vector::{clamp_unit, FeatureVector, FEATURE_DIMENSION, GROUP_SIZE};
pub use generation::GenerationMode;
pub use standards::{AdaptiveStandards, Adjustment, StandardField, StandardsBounds};
