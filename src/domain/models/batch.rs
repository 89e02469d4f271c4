//! Batch execution units and reports.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::candidate::Candidate;
use crate::domain::errors::DomainError;
use super::generation::GenerationMode;

/// One requested generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTask {
    /// Position in the whole run, in scheduling order.
    pub sequence: usize,
    /// Batch this task belongs to.
    pub batch_index: usize,
    /// Mode chosen when the batch was planned.
    pub mode: GenerationMode,
    /// Titles the idea generator should not repeat. Shared by every task of
    /// a batch.
    pub avoid: Arc<Vec<String>>,
}

impl BatchTask {
    /// Task with an empty avoid list.
    pub fn new(sequence: usize, batch_index: usize, mode: GenerationMode) -> Self {
        Self {
            sequence,
            batch_index,
            mode,
            avoid: Arc::new(Vec::new()),
        }
    }

    /// Attach a shared avoid list.
    pub fn with_avoid(mut self, avoid: Arc<Vec<String>>) -> Self {
        self.avoid = avoid;
        self
    }
}

/// Outcome of a single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Sequence of the task that produced this result.
    pub sequence: usize,
    /// Batch of the task that produced this result.
    pub batch_index: usize,
    /// Whether a candidate was built.
    pub success: bool,
    /// Built candidate, present on success.
    pub candidate: Option<Candidate>,
    /// Error message, present on failure.
    pub error: Option<String>,
    /// Failure label, see [`DomainError::kind`].
    pub error_kind: Option<String>,
    /// Wall time of the attempt, excluding time spent waiting for a permit.
    pub elapsed_ms: u64,
    /// Tokens reported by the collaborators.
    pub tokens_used: u64,
    /// Cost reported by the collaborators.
    pub cost_cents: f64,
}

impl BatchResult {
    /// Successful result carrying `candidate`.
    pub fn succeeded(task: &BatchTask, candidate: Candidate, elapsed_ms: u64) -> Self {
        Self {
            sequence: task.sequence,
            batch_index: task.batch_index,
            success: true,
            tokens_used: candidate.metrics.tokens_used,
            cost_cents: candidate.metrics.cost_cents,
            candidate: Some(candidate),
            error: None,
            error_kind: None,
            elapsed_ms,
        }
    }

    /// Failed result labelled with the error's kind.
    pub fn failed(task: &BatchTask, error: &DomainError, elapsed_ms: u64) -> Self {
        Self {
            sequence: task.sequence,
            batch_index: task.batch_index,
            success: false,
            candidate: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            elapsed_ms,
            tokens_used: 0,
            cost_cents: 0.0,
        }
    }
}

/// Aggregate for one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Zero-based batch number.
    pub batch_index: usize,
    /// Number of tasks in the batch.
    pub size: usize,
    /// Tasks that built a candidate.
    pub success_count: usize,
    /// Tasks that failed, timed out or panicked.
    pub fail_count: usize,
    /// Wall time of the whole batch.
    pub elapsed_ms: u64,
    /// Tokens summed over the batch.
    pub tokens_used: u64,
    /// Cost summed over the batch.
    pub cost_cents: f64,
}

impl BatchReport {
    /// Aggregate the results of one batch.
    pub fn from_results(batch_index: usize, results: &[BatchResult], elapsed_ms: u64) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            batch_index,
            size: results.len(),
            success_count,
            fail_count: results.len() - success_count,
            elapsed_ms,
            tokens_used: results.iter().map(|r| r.tokens_used).sum(),
            cost_cents: results.iter().map(|r| r.cost_cents).sum(),
        }
    }
}

/// Aggregate for a whole `run_all` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Attempts asked for.
    pub requested: usize,
    /// Per-batch aggregates, in execution order.
    pub batches: Vec<BatchReport>,
    /// Every result, in scheduling order.
    pub results: Vec<BatchResult>,
    /// Tokens summed over the run.
    pub total_tokens: u64,
    /// Cost summed over the run.
    pub total_cost_cents: f64,
    /// Wall time of the run, cooldowns included.
    pub elapsed_ms: u64,
    /// Set when a stop request skipped remaining batches.
    pub stopped_early: bool,
}

impl RunReport {
    /// Attempts that produced a result.
    pub fn generated(&self) -> usize {
        self.results.len()
    }

    /// Attempts that built a candidate.
    pub fn success_count(&self) -> usize {
        self.batches.iter().map(|b| b.success_count).sum()
    }

    /// Attempts that produced no candidate.
    pub fn fail_count(&self) -> usize {
        self.batches.iter().map(|b| b.fail_count).sum()
    }

    /// Share of attempts that built a candidate, 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.success_count() as f64 / self.results.len() as f64
    }
}

/// Snapshot handed to the progress callback after each batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Batch that just finished.
    pub batch_index: usize,
    /// Batches in the run.
    pub batch_count: usize,
    /// Attempts resolved so far.
    pub completed: usize,
    /// Attempts in the run.
    pub total: usize,
    /// Resolved attempts that built a candidate.
    pub successes: usize,
    /// Resolved attempts that failed.
    pub failures: usize,
    /// Wall time since the run started.
    pub elapsed_ms: u64,
    /// Estimated time to finish the remaining attempts.
    pub eta_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_report_counts() {
        let task = BatchTask::new(0, 0, GenerationMode::default());
        let err = DomainError::Timeout { secs: 1 };
        let results = vec![
            BatchResult::failed(&task, &err, 5),
            BatchResult::failed(&task, &err, 7),
        ];
        let report = BatchReport::from_results(0, &results, 12);
        assert_eq!(report.size, 2);
        assert_eq!(report.success_count + report.fail_count, report.size);
        assert_eq!(report.fail_count, 2);
        assert_eq!(results[0].error_kind.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_run_report_success_rate_empty() {
        let report = RunReport::default();
        assert!(report.success_rate().abs() < f64::EPSILON);
        assert_eq!(report.generated(), 0);
    }

    #[test]
    fn test_task_serializes_shared_avoid_list() {
        let avoid = Arc::new(vec!["Comet Garden".to_string(), "Neon Drift".to_string()]);
        let task = BatchTask::new(3, 1, GenerationMode::default()).with_avoid(Arc::clone(&avoid));

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["avoid"], serde_json::json!(["Comet Garden", "Neon Drift"]));

        let restored: BatchTask = serde_json::from_value(json).unwrap();
        assert_eq!(restored.avoid, avoid);
        assert_eq!(restored.sequence, 3);
    }
}
