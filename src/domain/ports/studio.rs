//! Studio ports - interfaces for the external content collaborators.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::GenerationError;
use crate::domain::models::{
    AssetKind, AssetRef, GeneratedContent, GenerationMode, IdeaSeed, PortfolioEntry,
    PublishReceipt,
};

/// Produces the initial idea for a game.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Generate an idea, steering away from `avoid` titles and toward the
    /// mode's target when exploring.
    async fn generate(
        &self,
        avoid: &[String],
        mode: &GenerationMode,
    ) -> Result<IdeaSeed, GenerationError>;
}

/// Expands an idea into a playable structure.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Build a structure for `seed` using the generated `assets`.
    async fn generate_from_seed(
        &self,
        seed: &IdeaSeed,
        assets: &[AssetRef],
    ) -> Result<GeneratedContent, GenerationError>;
}

/// Produces assets of a single kind. Image and sound generators are
/// separate instances.
#[async_trait]
pub trait AssetGenerator: Send + Sync {
    /// Generate assets of `kind` for `seed`.
    async fn generate(
        &self,
        seed: &IdeaSeed,
        kind: AssetKind,
    ) -> Result<Vec<AssetRef>, GenerationError>;
}

/// Optional publishing sink for accepted entries.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish an accepted entry.
    async fn publish(&self, entry: &PortfolioEntry) -> Result<PublishReceipt, GenerationError>;
}

/// Bundle of collaborator handles shared by concurrent attempts.
#[derive(Clone)]
pub struct Studio {
    /// Idea generator.
    pub ideas: Arc<dyn IdeaGenerator>,
    /// Content generator.
    pub content: Arc<dyn ContentGenerator>,
    /// Image generator.
    pub images: Arc<dyn AssetGenerator>,
    /// Sound generator.
    pub sounds: Arc<dyn AssetGenerator>,
    /// Optional publisher for accepted entries.
    pub publisher: Option<Arc<dyn Publisher>>,
}

impl Studio {
    /// Studio without a publisher.
    pub fn new(
        ideas: Arc<dyn IdeaGenerator>,
        content: Arc<dyn ContentGenerator>,
        images: Arc<dyn AssetGenerator>,
        sounds: Arc<dyn AssetGenerator>,
    ) -> Self {
        Self {
            ideas,
            content,
            images,
            sounds,
            publisher: None,
        }
    }

    /// Attach a publisher.
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}
