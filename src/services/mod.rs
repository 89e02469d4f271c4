//! Pure domain services: embedding, diversity, scoring, adaptation and statistics.

pub mod diversity_analyzer;
pub mod feature_vectorizer;
pub mod generation_stats;
pub mod mode_selector;
pub mod portfolio;
pub mod quality_scorer;
pub mod threshold_controller;

pub use diversity_analyzer::DiversityAnalyzer;
pub use feature_vectorizer::FeatureVectorizer;
pub use generation_stats::{GenerationStats, StatisticsReport, StatisticsSnapshot};
pub use mode_selector::ModeSelector;
pub use portfolio::{Portfolio, PortfolioStatistics};
pub use quality_scorer::QualityScorer;
pub use threshold_controller::ThresholdController;
