//! Lifetime counters and a rolling window of recent evaluations.
//!
//! The window feeds the threshold controller. The lifetime counters feed the
//! periodic statistics report. Every attempt lands in exactly one of
//! passed, rejected or failed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::domain::models::{AdaptiveStandards, CandidateMetrics, GenerationMode, QualityEvaluation};

/// One scored attempt in the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttemptSample {
    /// Total score.
    pub total: f64,
    /// Diversity score.
    pub diversity: f64,
    /// Whether it passed.
    pub passed: bool,
    /// Whether it was an exploration attempt.
    pub exploration: bool,
}

/// Rolling statistics consumed by the threshold controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Share of samples that passed.
    pub pass_rate: f64,
    /// Median total score.
    pub median_total: f64,
    /// Mean diversity score.
    pub mean_diversity: f64,
    /// Share of samples generated while exploring.
    pub exploration_ratio: f64,
    /// Samples in the window.
    pub sample_count: usize,
}

impl StatisticsSnapshot {
    /// Summarize a set of samples. An empty set yields all zeros.
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a AttemptSample>) -> Self {
        let samples: Vec<&AttemptSample> = samples.into_iter().collect();
        let n = samples.len();
        if n == 0 {
            return Self::default();
        }
        let count = |pred: fn(&AttemptSample) -> bool| samples.iter().filter(|s| pred(s)).count();

        let mut totals: Vec<f64> = samples.iter().map(|s| s.total).collect();
        totals.sort_by(f64::total_cmp);
        let median_total = if n % 2 == 1 {
            totals[n / 2]
        } else {
            (totals[n / 2 - 1] + totals[n / 2]) / 2.0
        };

        Self {
            pass_rate: count(|s| s.passed) as f64 / n as f64,
            median_total,
            mean_diversity: samples.iter().map(|s| s.diversity).sum::<f64>() / n as f64,
            exploration_ratio: count(|s| s.exploration) as f64 / n as f64,
            sample_count: n,
        }
    }
}

/// Periodic summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Attempts, failures included.
    pub generated: usize,
    /// Accepted attempts.
    pub passed: usize,
    /// Scored but rejected attempts.
    pub rejected: usize,
    /// Attempts that produced no candidate.
    pub failed: usize,
    /// Mean total over every scored attempt.
    pub average_quality: f64,
    /// Current threshold.
    pub quality_threshold: f64,
    /// Current epsilon.
    pub epsilon: f64,
    /// Accepted entries.
    pub portfolio_size: usize,
    /// Tokens over the run.
    pub total_tokens: u64,
    /// Cost over the run.
    pub total_cost_cents: f64,
    /// Failed attempts per error kind.
    pub failures_by_kind: BTreeMap<String, usize>,
    /// Rolling-window view.
    pub recent: StatisticsSnapshot,
}

impl StatisticsReport {
    /// Accepted share of all attempts, failures included.
    pub fn acceptance_rate(&self) -> f64 {
        if self.generated == 0 {
            0.0
        } else {
            self.passed as f64 / self.generated as f64
        }
    }
}

/// Counters for one pipeline.
#[derive(Debug, Clone)]
pub struct GenerationStats {
    window_size: usize,
    window: VecDeque<AttemptSample>,
    passed: usize,
    rejected: usize,
    failed: usize,
    quality_sum: f64,
    total_tokens: u64,
    total_cost_cents: f64,
    failures_by_kind: BTreeMap<String, usize>,
}

impl GenerationStats {
    /// Stats with a rolling window of `window_size` scored attempts.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            window: VecDeque::with_capacity(window_size.max(1)),
            passed: 0,
            rejected: 0,
            failed: 0,
            quality_sum: 0.0,
            total_tokens: 0,
            total_cost_cents: 0.0,
            failures_by_kind: BTreeMap::new(),
        }
    }

    /// Record a scored attempt.
    pub fn record_evaluation(
        &mut self,
        evaluation: &QualityEvaluation,
        mode: &GenerationMode,
        metrics: &CandidateMetrics,
    ) {
        if evaluation.passed {
            self.passed += 1;
        } else {
            self.rejected += 1;
        }
        self.quality_sum += evaluation.total;
        self.record_cost(metrics.tokens_used, metrics.cost_cents);

        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(AttemptSample {
            total: evaluation.total,
            diversity: evaluation.diversity.score,
            passed: evaluation.passed,
            exploration: mode.is_exploration(),
        });
    }

    /// Record an attempt that produced no candidate.
    pub fn record_failure(&mut self, kind: &str) {
        self.failed += 1;
        *self.failures_by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// Add collaborator usage.
    pub fn record_cost(&mut self, tokens: u64, cost_cents: f64) {
        self.total_tokens += tokens;
        self.total_cost_cents += cost_cents;
    }

    /// Attempts seen so far, failures included.
    pub const fn generated(&self) -> usize {
        self.passed + self.rejected + self.failed
    }

    /// Accepted attempts.
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Rejected attempts.
    pub const fn rejected(&self) -> usize {
        self.rejected
    }

    /// Failed attempts.
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Rolling-window summary for the controller.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot::from_samples(&self.window)
    }

    /// Lifetime summary with the current standards.
    pub fn report(&self, standards: &AdaptiveStandards, portfolio_size: usize) -> StatisticsReport {
        let scored = self.passed + self.rejected;
        StatisticsReport {
            generated: self.generated(),
            passed: self.passed,
            rejected: self.rejected,
            failed: self.failed,
            average_quality: if scored == 0 {
                0.0
            } else {
                self.quality_sum / scored as f64
            },
            quality_threshold: standards.quality_threshold(),
            epsilon: standards.epsilon(),
            portfolio_size,
            total_tokens: self.total_tokens,
            total_cost_cents: self.total_cost_cents,
            failures_by_kind: self.failures_by_kind.clone(),
            recent: self.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AbsoluteScores, DiversityAnalysis, RelativeScores};

    fn evaluation(total: f64, passed: bool) -> QualityEvaluation {
        QualityEvaluation {
            diversity: DiversityAnalysis {
                score: 0.5,
                nearest_distance: 1.0,
                average_distance: 1.0,
                density_penalty: 0.0,
                gap_filling_score: 0.0,
                balance_contribution: 0.0,
                neighbor_count: 0,
            },
            relative: RelativeScores::default(),
            absolute: AbsoluteScores::default(),
            total,
            threshold: 60.0,
            issues: Vec::new(),
            critical_violations: Vec::new(),
            passed,
        }
    }

    #[test]
    fn test_every_attempt_accounted_for() {
        let mut stats = GenerationStats::new(10);
        let mode = GenerationMode::default();
        let metrics = CandidateMetrics {
            latency_ms: 10,
            tokens_used: 100,
            cost_cents: 0.5,
        };
        stats.record_evaluation(&evaluation(70.0, true), &mode, &metrics);
        stats.record_evaluation(&evaluation(30.0, false), &mode, &metrics);
        stats.record_failure("transient");
        assert_eq!(stats.generated(), 3);
        assert_eq!(
            stats.generated(),
            stats.passed() + stats.rejected() + stats.failed()
        );

        let report = stats.report(&AdaptiveStandards::default(), 1);
        assert!((report.average_quality - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.total_tokens, 200);
        assert_eq!(report.failures_by_kind.get("transient"), Some(&1));
        assert!((report.acceptance_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut stats = GenerationStats::new(3);
        let mode = GenerationMode::default();
        for total in [10.0, 20.0, 30.0, 40.0] {
            let metrics = CandidateMetrics::default();
            stats.record_evaluation(&evaluation(total, total > 25.0), &mode, &metrics);
        }
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.sample_count, 3);
        assert!((snapshot.median_total - 30.0).abs() < f64::EPSILON);
        assert!((snapshot.pass_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_even_median_and_exploration_ratio() {
        let samples = [
            AttemptSample {
                total: 10.0,
                diversity: 0.2,
                passed: false,
                exploration: true,
            },
            AttemptSample {
                total: 30.0,
                diversity: 0.4,
                passed: true,
                exploration: false,
            },
        ];
        let snapshot = StatisticsSnapshot::from_samples(&samples);
        assert!((snapshot.median_total - 20.0).abs() < f64::EPSILON);
        assert!((snapshot.mean_diversity - 0.3).abs() < 1e-12);
        assert!((snapshot.exploration_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = GenerationStats::new(5).snapshot();
        assert_eq!(snapshot.sample_count, 0);
        assert!(snapshot.pass_rate.abs() < f64::EPSILON);
    }
}
