//! Concurrency and failure-isolation tests for the batch executor.

mod common;

use arcadia::application::{AttemptRunner, BatchExecutor, BatchPlanner, FixedModePlanner, RunPlan};
use arcadia::domain::models::{BatchReport, BatchResult, BatchTask, Candidate, GenerationMode};
use arcadia::domain::{DomainResult, GenerationError};
use async_trait::async_trait;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks how many attempts are running at once.
#[derive(Default)]
struct CountingRunner {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl CountingRunner {
    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttemptRunner for CountingRunner {
    async fn run(&self, task: &BatchTask) -> DomainResult<Candidate> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Later tasks finish first so completion order differs from scheduling order.
        let delay = 20_u64.saturating_sub(task.sequence as u64 % 10 * 2);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(common::candidate(common::polished_structure(&format!(
            "Game {}",
            task.sequence
        ))))
    }
}

/// Fails on every third task, panics on sequence 4.
struct FlakyRunner;

#[async_trait]
impl AttemptRunner for FlakyRunner {
    async fn run(&self, task: &BatchTask) -> DomainResult<Candidate> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        if task.sequence == 4 {
            panic!("generator blew up");
        }
        if task.sequence % 3 == 0 {
            return Err(GenerationError::Transient(format!("task {}", task.sequence)).into());
        }
        Ok(common::candidate(common::polished_structure("ok")))
    }
}

struct HangingRunner;

#[async_trait]
impl AttemptRunner for HangingRunner {
    async fn run(&self, _task: &BatchTask) -> DomainResult<Candidate> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(common::candidate(common::polished_structure("late")))
    }
}

fn tasks(range: Range<usize>) -> Vec<BatchTask> {
    range
        .map(|sequence| BatchTask::new(sequence, 0, GenerationMode::default()))
        .collect()
}

#[tokio::test]
async fn test_never_exceeds_max_concurrency() {
    let runner = Arc::new(CountingRunner::default());
    let executor = BatchExecutor::new(runner.clone());

    let (report, results) = executor.run_batch(0, tasks(0..12), 3).await;

    assert_eq!(report.size, 12);
    assert_eq!(report.success_count, 12);
    assert_eq!(runner.calls.load(Ordering::SeqCst), 12);
    assert!(runner.max_in_flight() <= 3);
    assert!(runner.max_in_flight() >= 2, "pool never overlapped");
    let order: Vec<usize> = results.iter().map(|r| r.sequence).collect();
    assert_eq!(order, (0..12).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrency_of_one_is_sequential() {
    let runner = Arc::new(CountingRunner::default());
    let executor = BatchExecutor::new(runner.clone());

    executor.run_batch(0, tasks(0..4), 1).await;
    assert_eq!(runner.max_in_flight(), 1);
}

#[tokio::test]
async fn test_failures_and_panics_are_isolated() {
    let executor = BatchExecutor::new(Arc::new(FlakyRunner));

    let (report, results) = executor.run_batch(0, tasks(0..8), 4).await;

    assert_eq!(report.success_count + report.fail_count, 8);
    // 0, 3, 6 fail; 4 panics
    assert_eq!(report.fail_count, 4);
    assert_eq!(results.len(), 8);

    let panicked = &results[4];
    assert!(!panicked.success);
    assert_eq!(panicked.error_kind.as_deref(), Some("panicked"));
    assert!(panicked
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("generator blew up"));

    let transient = &results[3];
    assert_eq!(transient.error_kind.as_deref(), Some("transient"));
    assert!(results[1].success && results[2].success && results[5].success);
}

#[tokio::test]
async fn test_task_timeout_becomes_failed_result() {
    let executor = BatchExecutor::new(Arc::new(HangingRunner))
        .with_task_timeout(Some(Duration::from_millis(20)));

    let (report, results) = executor.run_batch(0, tasks(0..3), 3).await;

    assert_eq!(report.fail_count, 3);
    assert!(results
        .iter()
        .all(|r| r.error_kind.as_deref() == Some("timeout")));
}

#[tokio::test]
async fn test_stop_between_batches() {
    struct StopAfterFirst(arcadia::application::StopHandle);

    #[async_trait]
    impl BatchPlanner for StopAfterFirst {
        fn plan(&mut self, batch_index: usize, sequences: Range<usize>) -> Vec<BatchTask> {
            FixedModePlanner::default().plan(batch_index, sequences)
        }

        async fn review(&mut self, _report: &BatchReport, _results: &[BatchResult]) {
            self.0.stop();
        }
    }

    let executor = BatchExecutor::new(Arc::new(CountingRunner::default()));
    let mut planner = StopAfterFirst(executor.stop_handle());

    let report = executor
        .run_all(
            RunPlan::new(30, 10, 5, Duration::from_millis(1)),
            &mut planner,
            |_| {},
        )
        .await;

    assert!(report.stopped_early);
    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.generated(), 10);
}

#[tokio::test]
async fn test_results_keep_batch_indices_and_totals() {
    let executor = BatchExecutor::new(Arc::new(FlakyRunner));
    let mut planner = FixedModePlanner::default();

    let report = executor
        .run_all(RunPlan::new(7, 3, 2, Duration::ZERO), &mut planner, |_| {})
        .await;

    let batch_indices: Vec<usize> = report.results.iter().map(|r| r.batch_index).collect();
    assert_eq!(batch_indices, vec![0, 0, 0, 1, 1, 1, 2]);
    assert_eq!(report.success_count() + report.fail_count(), 7);
    assert_eq!(
        report.total_tokens,
        report.batches.iter().map(|b| b.tokens_used).sum::<u64>()
    );
}
