//! Diversity analysis and quality evaluation results.

use serde::{Deserialize, Serialize};

/// Candidate diversity measured against the current portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityAnalysis {
    /// Blended, normalized diversity in [0,1].
    pub score: f64,
    /// Distance to the closest entry, normalized.
    pub nearest_distance: f64,
    /// Mean distance to all entries, normalized.
    pub average_distance: f64,
    /// In [0,1]; applied as a negative contribution by the scorer.
    pub density_penalty: f64,
    /// In [0,1].
    pub gap_filling_score: f64,
    /// In [-0.5, 0.5]; positive when accepting would reduce category skew.
    pub balance_contribution: f64,
    /// Portfolio members inside the density radius.
    pub neighbor_count: usize,
}

/// Category axis a gap lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapDimension {
    /// Generic "explore broadly" target used while the portfolio is small.
    Broad,
    /// Genre bucket.
    Genre,
    /// Mechanic bucket.
    Mechanic,
}

/// Underrepresented region the controller wants candidates to target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapArea {
    /// Axis of the gap.
    pub dimension: GapDimension,
    /// Category label, or the broad target name.
    pub label: String,
    /// In (0,1]; higher is more urgent.
    pub priority: f64,
    /// Coordinate of the category in its feature dimension.
    pub anchor: f64,
    /// Current number of portfolio entries in this category.
    pub count: usize,
}

impl GapArea {
    /// Generator-facing target string, e.g. `genre:rhythm`.
    pub fn target(&self) -> String {
        match self.dimension {
            GapDimension::Broad => self.label.clone(),
            GapDimension::Genre => format!("genre:{}", self.label),
            GapDimension::Mechanic => format!("mechanic:{}", self.label),
        }
    }
}

/// Structural problem that fails a candidate regardless of its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalViolation {
    /// No rule can ever produce a win.
    NoSuccessPath,
    /// A lose rule fires as soon as the game starts.
    ImmediateLoss,
}

impl std::fmt::Display for CriticalViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuccessPath => f.write_str("no reachable success condition"),
            Self::ImmediateLoss => f.write_str("game is lost immediately at start"),
        }
    }
}

/// Points awarded from the portfolio comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeScores {
    /// Points from `DiversityAnalysis::score`.
    pub diversity: f64,
    /// Always `<= 0`.
    pub density_penalty: f64,
    /// Points for filling a gap.
    pub gap_filling: f64,
    /// Points for improving the category balance.
    pub balance: f64,
    /// Clamped sum, in `[0, relative_max]`.
    pub subtotal: f64,
}

/// Points awarded from the artifact alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteScores {
    /// Points for structural completeness.
    pub basic_quality: f64,
    /// Points for having a playable loop.
    pub playability: f64,
    /// Points for expected player satisfaction.
    pub predicted_satisfaction: f64,
    /// Clamped sum, in `[0, absolute_max]`.
    pub subtotal: f64,
}

/// Final verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityEvaluation {
    /// Diversity against the portfolio at scoring time.
    pub diversity: DiversityAnalysis,
    /// Portfolio-relative points.
    pub relative: RelativeScores,
    /// Artifact-only points.
    pub absolute: AbsoluteScores,
    /// `relative.subtotal + absolute.subtotal`, in [0,100].
    pub total: f64,
    /// Threshold in force at scoring time.
    pub threshold: f64,
    /// Human-readable problems, informational only.
    pub issues: Vec<String>,
    /// Violations that fail the candidate outright.
    pub critical_violations: Vec<CriticalViolation>,
    /// Whether the candidate is accepted.
    pub passed: bool,
}

impl QualityEvaluation {
    /// Whether any critical violation was found.
    pub fn has_critical_violation(&self) -> bool {
        !self.critical_violations.is_empty()
    }

    /// Distance between the total and the threshold (negative when failing).
    pub fn margin(&self) -> f64 {
        self.total - self.threshold
    }
}
