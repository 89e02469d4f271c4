//! Builds one candidate from the studio collaborators.

use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

use crate::application::batch_executor::AttemptRunner;
use crate::domain::errors::{DomainResult, GenerationError};
use crate::domain::models::{
    AssetKind, BatchTask, Candidate, CandidateMetrics, GameArtifact, GenerationMode,
};
use crate::domain::ports::Studio;
use crate::services::FeatureVectorizer;

/// Drives idea → assets → content → features for a single attempt.
///
/// Holds no mutable state, so one instance is shared by every concurrent
/// attempt.
#[derive(Debug, Clone)]
pub struct CandidateFactory {
    studio: Studio,
    vectorizer: FeatureVectorizer,
}

impl CandidateFactory {
    /// Factory over `studio`.
    pub const fn new(studio: Studio) -> Self {
        Self {
            studio,
            vectorizer: FeatureVectorizer::new(),
        }
    }

    /// Collaborators used by this factory.
    pub const fn studio(&self) -> &Studio {
        &self.studio
    }

    /// Produce a candidate. Images and sounds are requested concurrently.
    pub async fn create(&self, avoid: &[String], mode: &GenerationMode) -> DomainResult<Candidate> {
        let started = Instant::now();

        let seed = self.studio.ideas.generate(avoid, mode).await?;

        let (images, sounds) = tokio::join!(
            self.studio.images.generate(&seed, AssetKind::Image),
            self.studio.sounds.generate(&seed, AssetKind::Sound),
        );
        let mut assets = images?;
        assets.extend(sounds?);

        let content = self
            .studio
            .content
            .generate_from_seed(&seed, &assets)
            .await?;

        let mut structure = content.structure;
        if structure.rules.is_empty() {
            return Err(
                GenerationError::InvalidOutput(format!("'{}' has no rules", seed.title)).into(),
            );
        }
        if structure.title.is_none() {
            structure.title = Some(seed.title.clone());
        }

        let artifact = GameArtifact::new(structure)
            .with_payload(content.payload)
            .with_assets(assets);
        let features = self.vectorizer.vectorize(&artifact);

        let metrics = CandidateMetrics {
            latency_ms: started.elapsed().as_millis() as u64,
            tokens_used: seed.tokens_used + content.tokens_used,
            cost_cents: content.cost_cents,
        };
        let candidate = Candidate::new(artifact, features, mode.clone(), metrics);

        debug!(
            candidate_id = %candidate.id,
            title = candidate.title(),
            mode = mode.label(),
            latency_ms = metrics.latency_ms,
            "candidate built"
        );
        Ok(candidate)
    }
}

#[async_trait]
impl AttemptRunner for CandidateFactory {
    async fn run(&self, task: &BatchTask) -> DomainResult<Candidate> {
        self.create(&task.avoid, &task.mode).await
    }
}
