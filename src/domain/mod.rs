//! Domain layer for the Arcadia generation pipeline
//!
//! Core models, the error taxonomy and the collaborator ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, GenerationError};
