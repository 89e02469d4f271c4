//! Adaptive threshold controller.
//!
//! The only code path that mutates [`AdaptiveStandards`]. Each call makes at
//! most one bounded step per field and records it in the standards' history.

use tracing::info;

use crate::domain::models::{AdaptiveStandards, Adjustment, ControllerConfig};
use crate::services::generation_stats::StatisticsSnapshot;

/// Tunes the quality threshold and epsilon from rolling statistics.
#[derive(Debug, Clone, Default)]
pub struct ThresholdController {
    config: ControllerConfig,
}

impl ThresholdController {
    /// Controller with the given tuning.
    pub const fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    /// Tuning in use.
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Standards seeded from the configured initial values and bounds.
    pub fn initial_standards(&self) -> AdaptiveStandards {
        AdaptiveStandards::new(
            self.config.initial_threshold,
            self.config.initial_epsilon,
            self.config.bounds(),
        )
    }

    /// Recalibrate from `snapshot`, returning the adjustments applied.
    pub fn adjust(
        &self,
        standards: &mut AdaptiveStandards,
        snapshot: &StatisticsSnapshot,
    ) -> Vec<Adjustment> {
        if snapshot.sample_count < self.config.min_samples {
            return Vec::new();
        }

        let mut adjustments = Vec::new();

        let current = standards.quality_threshold();
        if let Some((target, reason)) = self.threshold_target(current, snapshot) {
            adjustments.extend(standards.set_quality_threshold(target, reason));
        }

        let (epsilon, reason) = self.epsilon_target(standards.epsilon(), snapshot);
        adjustments.extend(standards.set_epsilon(epsilon, reason));

        for adj in &adjustments {
            info!(
                field = %adj.field,
                old = adj.old_value,
                new = adj.new_value,
                reason = %adj.reason,
                "Standards recalibrated"
            );
        }
        adjustments
    }

    fn threshold_target(
        &self,
        current: f64,
        snapshot: &StatisticsSnapshot,
    ) -> Option<(f64, String)> {
        let c = &self.config;
        let mut delta = 0.0;
        let mut reasons = Vec::new();

        let deviation = snapshot.pass_rate - c.target_pass_rate;
        if deviation.abs() > c.pass_rate_tolerance {
            let step = (deviation * c.pass_rate_gain).clamp(-c.max_step, c.max_step);
            delta += step;
            reasons.push(format!(
                "pass rate {:.2} vs target {:.2} ({step:+.2})",
                snapshot.pass_rate, c.target_pass_rate
            ));
        }

        if snapshot.median_total >= current + c.median_high_margin {
            delta += c.median_nudge;
            reasons.push(format!(
                "median {:.1} well above threshold (+{:.2})",
                snapshot.median_total, c.median_nudge
            ));
        } else if snapshot.median_total <= current - c.median_low_margin {
            delta -= c.median_nudge;
            reasons.push(format!(
                "median {:.1} well below threshold (-{:.2})",
                snapshot.median_total, c.median_nudge
            ));
        }

        if reasons.is_empty() {
            return None;
        }
        let delta = delta.clamp(-c.max_step, c.max_step);
        Some((current + delta, reasons.join("; ")))
    }

    fn epsilon_target(&self, current: f64, snapshot: &StatisticsSnapshot) -> (f64, String) {
        let c = &self.config;
        let mut epsilon = current * c.epsilon_decay;
        let mut reasons = vec![format!("decay x{:.2}", c.epsilon_decay)];

        if snapshot.pass_rate < c.target_pass_rate - 2.0 * c.pass_rate_tolerance {
            epsilon += c.epsilon_boost;
            reasons.push(format!(
                "pass rate {:.2} far below target (+{:.2})",
                snapshot.pass_rate, c.epsilon_boost
            ));
        }

        if snapshot.mean_diversity < c.low_diversity {
            epsilon += c.diversity_boost;
            reasons.push(format!(
                "diversity {:.2} low (+{:.2})",
                snapshot.mean_diversity, c.diversity_boost
            ));
        } else if snapshot.mean_diversity > c.high_diversity {
            epsilon *= c.epsilon_decay;
            reasons.push(format!(
                "diversity {:.2} high (extra decay)",
                snapshot.mean_diversity
            ));
        }

        (epsilon, reasons.join("; "))
    }
}
