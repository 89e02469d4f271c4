//! Port trait definitions (Hexagonal Architecture)
//!
//! The collaborators that generate ideas, content and assets, and the
//! optional publisher, are external to the pipeline. Infrastructure adapters
//! implement these traits; the application layer only sees the traits.

pub mod studio;

pub use studio::{AssetGenerator, ContentGenerator, IdeaGenerator, Publisher, Studio};
