//! Domain errors for the Arcadia generation pipeline.

use thiserror::Error;

/// Failure reported by an external collaborator (idea, content, asset or
/// publishing port).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    /// Idea repeats an avoided title.
    #[error("Duplicate of previous output: {0}")]
    Duplicate(String),

    /// Idea scored itself below the configured floor.
    #[error("Self-reported quality {reported:.2} below minimum {minimum:.2}")]
    BelowMinimumQuality {
        /// Quality the idea generator reported.
        reported: f64,
        /// Configured floor.
        minimum: f64,
    },

    /// Rate limit or other passing failure.
    #[error("Transient collaborator error: {0}")]
    Transient(String),

    /// Collaborator outage.
    #[error("Collaborator unavailable: {0}")]
    ServiceUnavailable(String),

    /// Output could not be used.
    #[error("Collaborator returned invalid output: {0}")]
    InvalidOutput(String),
}

impl GenerationError {
    /// Whether a fresh attempt may succeed where this one failed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Duplicate(_) | Self::BelowMinimumQuality { .. } | Self::Transient(_)
        )
    }

    /// Outage-class failures that warrant an extended cooldown.
    pub const fn is_systemic(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }

    /// Short machine-friendly label, used for failure statistics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Duplicate(_) => "duplicate",
            Self::BelowMinimumQuality { .. } => "below_minimum_quality",
            Self::Transient(_) => "transient",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::InvalidOutput(_) => "invalid_output",
        }
    }
}

/// Domain-level errors that can occur in the pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A collaborator failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The attempt exceeded `task_timeout_secs`.
    #[error("Attempt timed out after {secs} seconds")]
    Timeout {
        /// Configured limit.
        secs: u64,
    },

    /// The attempt panicked; carries the panic message.
    #[error("Attempt panicked: {0}")]
    TaskPanicked(String),

    /// No permit could be acquired.
    #[error("Executor closed before the attempt could start")]
    ExecutorClosed,

    /// Settings failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A stop request ended the run.
    #[error("Run stopped before completion")]
    Stopped,
}

impl DomainError {
    /// Whether the error warrants an extended cooldown: a collaborator
    /// outage or a panic inside the attempt.
    pub const fn is_systemic(&self) -> bool {
        match self {
            Self::Generation(err) => err.is_systemic(),
            Self::TaskPanicked(_) => true,
            _ => false,
        }
    }

    /// [`Self::is_systemic`] for a failure known only by its kind label.
    pub fn is_systemic_kind(kind: &str) -> bool {
        matches!(kind, "service_unavailable" | "panicked")
    }

    /// Failure label used in statistics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Generation(err) => err.kind(),
            Self::Timeout { .. } => "timeout",
            Self::TaskPanicked(_) => "panicked",
            Self::ExecutorClosed => "executor_closed",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Stopped => "stopped",
        }
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
