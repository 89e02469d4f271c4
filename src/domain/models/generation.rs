//! Exploration / exploitation mode chosen for one generation attempt.

use serde::{Deserialize, Serialize};

/// Mode chosen by the ε-greedy selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationMode {
    /// Aim the generator at an underrepresented region.
    Exploration {
        /// Region to aim for, e.g. `genre:rhythm`.
        target: String,
        /// Epsilon in force.
        epsilon: f64,
        /// Why this target was picked.
        reason: String,
    },
    /// No specific target.
    Exploitation {
        /// Epsilon in force.
        epsilon: f64,
        /// Why the selector exploited.
        reason: String,
    },
}

impl GenerationMode {
    /// Whether the mode targets a gap.
    pub const fn is_exploration(&self) -> bool {
        matches!(self, Self::Exploration { .. })
    }

    /// Target region, if exploring.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Exploration { target, .. } => Some(target),
            Self::Exploitation { .. } => None,
        }
    }

    /// Epsilon in force when this mode was chosen.
    pub const fn epsilon(&self) -> f64 {
        match self {
            Self::Exploration { epsilon, .. } | Self::Exploitation { epsilon, .. } => *epsilon,
        }
    }

    /// Selector's explanation.
    pub fn reason(&self) -> &str {
        match self {
            Self::Exploration { reason, .. } | Self::Exploitation { reason, .. } => reason,
        }
    }

    /// `exploration` or `exploitation`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Exploration { .. } => "exploration",
            Self::Exploitation { .. } => "exploitation",
        }
    }
}

impl Default for GenerationMode {
    fn default() -> Self {
        Self::Exploitation {
            epsilon: 0.0,
            reason: "default".to_string(),
        }
    }
}
