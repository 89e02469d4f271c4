//! Adaptive acceptance standards and their audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard bounds the controller may never leave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardsBounds {
    /// Lowest allowed threshold.
    pub min_threshold: f64,
    /// Highest allowed threshold.
    pub max_threshold: f64,
    /// Lowest allowed epsilon.
    pub epsilon_min: f64,
    /// Highest allowed epsilon.
    pub epsilon_max: f64,
}

impl Default for StandardsBounds {
    fn default() -> Self {
        Self {
            min_threshold: 40.0,
            max_threshold: 85.0,
            epsilon_min: 0.05,
            epsilon_max: 0.5,
        }
    }
}

/// Field touched by an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardField {
    /// Quality threshold.
    QualityThreshold,
    /// Exploration rate.
    Epsilon,
}

impl std::fmt::Display for StandardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QualityThreshold => f.write_str("quality_threshold"),
            Self::Epsilon => f.write_str("epsilon"),
        }
    }
}

/// One recorded change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// When the change was made.
    pub at: DateTime<Utc>,
    /// Which value changed.
    pub field: StandardField,
    /// Value before.
    pub old_value: f64,
    /// Value after.
    pub new_value: f64,
    /// Why it changed.
    pub reason: String,
}

/// Quality threshold and exploration rate for one run.
///
/// Read by the scorer and the mode selector. Only the threshold controller
/// writes to it, through the crate-private setters below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveStandards {
    quality_threshold: f64,
    epsilon: f64,
    bounds: StandardsBounds,
    history: Vec<Adjustment>,
}

impl AdaptiveStandards {
    /// Create standards, clamping the initial values into `bounds`.
    pub fn new(quality_threshold: f64, epsilon: f64, bounds: StandardsBounds) -> Self {
        Self {
            quality_threshold: quality_threshold.clamp(bounds.min_threshold, bounds.max_threshold),
            epsilon: epsilon.clamp(bounds.epsilon_min, bounds.epsilon_max),
            bounds,
            history: Vec::new(),
        }
    }

    /// Total score a candidate needs to pass.
    pub const fn quality_threshold(&self) -> f64 {
        self.quality_threshold
    }

    /// Probability of exploring.
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Clamp bounds.
    pub const fn bounds(&self) -> &StandardsBounds {
        &self.bounds
    }

    /// Append-only adjustment log, oldest first.
    pub fn history(&self) -> &[Adjustment] {
        &self.history
    }

    pub(crate) fn set_quality_threshold(&mut self, value: f64, reason: String) -> Option<Adjustment> {
        let clamped = value.clamp(self.bounds.min_threshold, self.bounds.max_threshold);
        let old = self.quality_threshold;
        self.quality_threshold = clamped;
        self.record(StandardField::QualityThreshold, old, clamped, reason)
    }

    pub(crate) fn set_epsilon(&mut self, value: f64, reason: String) -> Option<Adjustment> {
        let clamped = value.clamp(self.bounds.epsilon_min, self.bounds.epsilon_max);
        let old = self.epsilon;
        self.epsilon = clamped;
        self.record(StandardField::Epsilon, old, clamped, reason)
    }

    fn record(
        &mut self,
        field: StandardField,
        old_value: f64,
        new_value: f64,
        reason: String,
    ) -> Option<Adjustment> {
        if (old_value - new_value).abs() < 1e-9 {
            return None;
        }
        let adjustment = Adjustment {
            at: Utc::now(),
            field,
            old_value,
            new_value,
            reason,
        };
        self.history.push(adjustment.clone());
        Some(adjustment)
    }
}

impl Default for AdaptiveStandards {
    fn default() -> Self {
        Self::new(60.0, 0.3, StandardsBounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_initial_values() {
        let standards = AdaptiveStandards::new(120.0, 0.9, StandardsBounds::default());
        assert!((standards.quality_threshold() - 85.0).abs() < f64::EPSILON);
        assert!((standards.epsilon() - 0.5).abs() < f64::EPSILON);
        assert!(standards.history().is_empty());
    }

    #[test]
    fn test_unchanged_value_records_nothing() {
        let mut standards = AdaptiveStandards::default();
        assert!(standards
            .set_quality_threshold(60.0, "noop".into())
            .is_none());
        assert!(standards.history().is_empty());
    }

    #[test]
    fn test_setter_clamps_and_records() {
        let mut standards = AdaptiveStandards::default();
        let adj = standards
            .set_quality_threshold(10.0, "pass rate too low".into())
            .unwrap();
        assert_eq!(adj.field, StandardField::QualityThreshold);
        assert!((adj.old_value - 60.0).abs() < f64::EPSILON);
        assert!((adj.new_value - 40.0).abs() < f64::EPSILON);
        assert_eq!(standards.history().len(), 1);
    }
}
