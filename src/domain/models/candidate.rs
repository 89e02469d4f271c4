//! Candidates, portfolio entries and the collaborator payloads they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::{ArtifactView, GameArtifact, GameStructure, Genre, Mechanic};
use super::evaluation::QualityEvaluation;
use super::feature_vector::FeatureVector;
use super::generation::GenerationMode;

/// Idea produced by the idea generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaSeed {
    /// Idea id.
    pub id: Uuid,
    /// Working title.
    pub title: String,
    /// Suggested genre.
    pub genre: Option<String>,
    /// Suggested mechanic.
    pub mechanic: Option<String>,
    /// One-line description.
    pub pitch: String,
    /// Generator's own quality estimate in [0,1].
    pub self_reported_quality: f64,
    /// Tokens spent on the idea.
    pub tokens_used: u64,
}

/// Structure and payload produced by the content generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Fields the pipeline reads.
    pub structure: GameStructure,
    /// Opaque generator output.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Tokens spent on content.
    #[serde(default)]
    pub tokens_used: u64,
    /// Cost of the content call.
    #[serde(default)]
    pub cost_cents: f64,
}

/// Timing and resource cost of producing a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetrics {
    /// Wall time from idea to features.
    pub latency_ms: u64,
    /// Tokens over all collaborator calls.
    pub tokens_used: u64,
    /// Cost over all collaborator calls.
    pub cost_cents: f64,
}

/// A generated artifact awaiting scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate id.
    pub id: Uuid,
    /// The generated game.
    pub artifact: GameArtifact,
    /// Embedding of `artifact`.
    pub features: FeatureVector,
    /// Mode the candidate was generated in.
    pub mode: GenerationMode,
    /// Cost of producing it.
    pub metrics: CandidateMetrics,
    /// When it was built.
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// Candidate with a fresh id.
    pub fn new(
        artifact: GameArtifact,
        features: FeatureVector,
        mode: GenerationMode,
        metrics: CandidateMetrics,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            artifact,
            features,
            mode,
            metrics,
            created_at: Utc::now(),
        }
    }

    /// Title, or `untitled`.
    pub fn title(&self) -> &str {
        self.artifact.title().unwrap_or("untitled")
    }

    /// Genre bucket.
    pub fn genre(&self) -> Genre {
        self.artifact.genre()
    }

    /// Mechanic bucket.
    pub fn mechanic(&self) -> Mechanic {
        self.artifact.mechanic()
    }
}

/// An accepted candidate. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// Position in the portfolio, starting at 0.
    pub sequence: usize,
    /// The accepted candidate.
    pub candidate: Candidate,
    /// Scores at acceptance time.
    pub evaluation: QualityEvaluation,
    /// When it was appended.
    pub accepted_at: DateTime<Utc>,
}

impl PortfolioEntry {
    /// Embedding of the accepted candidate.
    pub fn features(&self) -> &FeatureVector {
        &self.candidate.features
    }

    /// Genre bucket.
    pub fn genre(&self) -> Genre {
        self.candidate.genre()
    }

    /// Mechanic bucket.
    pub fn mechanic(&self) -> Mechanic {
        self.candidate.mechanic()
    }

    /// Total score at acceptance.
    pub fn total_score(&self) -> f64 {
        self.evaluation.total
    }
}

/// Outcome of a best-effort publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Whether the publisher took the entry.
    pub success: bool,
    /// Publisher-side id, if any.
    pub external_id: Option<String>,
}
