//! Concurrency-bounded batch executor
//!
//! Runs generation attempts in strictly sequential batches. Inside a batch a
//! semaphore bounds how many attempts are in flight; each spawned attempt
//! holds its permit for its whole duration, so a new attempt starts as soon
//! as any running one finishes.

use async_trait::async_trait;
use futures::future::join_all;
use std::any::Any;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BatchProgress, BatchReport, BatchResult, BatchTask, Candidate, GenerationConfig,
    GenerationMode, RunReport,
};

/// Produces one candidate for a task.
#[async_trait]
pub trait AttemptRunner: Send + Sync + 'static {
    /// Build the candidate for `task`.
    async fn run(&self, task: &BatchTask) -> DomainResult<Candidate>;
}

/// Decides the tasks of each batch and consumes its results.
///
/// `review` is called once per batch, after every task in it resolved, with
/// results in scheduling order.
#[async_trait]
pub trait BatchPlanner: Send {
    /// Tasks for the batch covering `sequences`.
    fn plan(&mut self, batch_index: usize, sequences: Range<usize>) -> Vec<BatchTask>;

    /// Consume a resolved batch.
    async fn review(&mut self, _report: &BatchReport, _results: &[BatchResult]) {}
}

/// Planner that gives every task the same mode.
#[derive(Debug, Clone, Default)]
pub struct FixedModePlanner {
    mode: GenerationMode,
}

impl FixedModePlanner {
    /// Planner using `mode` for every task.
    pub const fn new(mode: GenerationMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl BatchPlanner for FixedModePlanner {
    fn plan(&mut self, batch_index: usize, sequences: Range<usize>) -> Vec<BatchTask> {
        sequences
            .map(|sequence| BatchTask::new(sequence, batch_index, self.mode.clone()))
            .collect()
    }
}

/// Cooperative stop flag shared between a run and its controller.
///
/// Checked before each batch (or attempt); in-flight work always finishes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Shape of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    /// Attempts in the run.
    pub total: usize,
    /// Attempts per batch.
    pub batch_size: usize,
    /// Tasks in flight within a batch.
    pub max_concurrency: usize,
    /// Sleep between batches.
    pub inter_batch_delay: Duration,
}

impl RunPlan {
    /// Plan from explicit values.
    pub const fn new(
        total: usize,
        batch_size: usize,
        max_concurrency: usize,
        inter_batch_delay: Duration,
    ) -> Self {
        Self {
            total,
            batch_size,
            max_concurrency,
            inter_batch_delay,
        }
    }

    /// Plan from `generation.*` settings.
    pub const fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.target_count,
            config.batch_size,
            config.max_concurrency,
            Duration::from_millis(config.inter_batch_delay_ms),
        )
    }

    /// `ceil(total / batch_size)`
    pub const fn batch_count(&self) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.batch_size)
    }

    /// Sequence numbers covered by one batch.
    pub fn batch_range(&self, batch_index: usize) -> Range<usize> {
        let start = batch_index * self.batch_size;
        start..(start + self.batch_size).min(self.total)
    }
}

/// Batch executor bounded by a semaphore.
pub struct BatchExecutor {
    runner: Arc<dyn AttemptRunner>,
    task_timeout: Option<Duration>,
    stop: StopHandle,
}

impl BatchExecutor {
    /// Executor without timeout, with its own stop flag.
    pub fn new(runner: Arc<dyn AttemptRunner>) -> Self {
        Self {
            runner,
            task_timeout: None,
            stop: StopHandle::new(),
        }
    }

    /// Per-task timeout; `None` waits indefinitely.
    pub const fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Share a stop flag with the caller.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// The stop flag checked before each batch.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run one batch with at most `max_concurrency` tasks in flight.
    ///
    /// Every task yields exactly one result: errors, timeouts and panics
    /// become failed results. Results keep the order of `tasks`.
    pub async fn run_batch(
        &self,
        batch_index: usize,
        tasks: Vec<BatchTask>,
        max_concurrency: usize,
    ) -> (BatchReport, Vec<BatchResult>) {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

        info!(
            batch_index,
            size = tasks.len(),
            max_concurrency,
            "batch started"
        );

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let runner = Arc::clone(&self.runner);
            let timeout = self.task_timeout;
            let spawned = task.clone();

            let handle = tokio::spawn(async move {
                let Ok(permit) = semaphore.acquire_owned().await else {
                    return BatchResult::failed(&spawned, &DomainError::ExecutorClosed, 0);
                };

                let attempt_started = Instant::now();
                let outcome = match timeout {
                    Some(limit) => tokio::time::timeout(limit, runner.run(&spawned))
                        .await
                        .unwrap_or_else(|_| {
                            Err(DomainError::Timeout {
                                secs: limit.as_secs(),
                            })
                        }),
                    None => runner.run(&spawned).await,
                };
                let elapsed_ms = attempt_started.elapsed().as_millis() as u64;
                drop(permit);

                match outcome {
                    Ok(candidate) => BatchResult::succeeded(&spawned, candidate, elapsed_ms),
                    Err(err) => {
                        debug!(sequence = spawned.sequence, error = %err, "attempt failed");
                        BatchResult::failed(&spawned, &err, elapsed_ms)
                    }
                }
            });
            handles.push((task, handle));
        }

        let (tasks, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results: Vec<BatchResult> = join_all(handles)
            .await
            .into_iter()
            .zip(tasks)
            .map(|(joined, task)| {
                joined.unwrap_or_else(|join_err| {
                    let err = DomainError::TaskPanicked(panic_message(join_err));
                    warn!(sequence = task.sequence, error = %err, "attempt task aborted");
                    BatchResult::failed(&task, &err, 0)
                })
            })
            .collect();

        let report =
            BatchReport::from_results(batch_index, &results, started.elapsed().as_millis() as u64);
        info!(
            batch_index,
            success_count = report.success_count,
            fail_count = report.fail_count,
            elapsed_ms = report.elapsed_ms,
            "batch complete"
        );
        (report, results)
    }

    /// Run `plan.total` attempts in sequential batches.
    ///
    /// Sleeps `inter_batch_delay` between batches, never after the last one.
    /// `on_progress` is called after every batch.
    pub async fn run_all<P, F>(&self, plan: RunPlan, planner: &mut P, mut on_progress: F) -> RunReport
    where
        P: BatchPlanner + ?Sized,
        F: FnMut(&BatchProgress) + Send,
    {
        let started = Instant::now();
        let batch_count = plan.batch_count();
        let mut report = RunReport {
            requested: plan.total,
            ..RunReport::default()
        };

        for batch_index in 0..batch_count {
            if self.stop.is_stopped() {
                info!(batch_index, "stop requested, skipping remaining batches");
                report.stopped_early = true;
                break;
            }

            let tasks = planner.plan(batch_index, plan.batch_range(batch_index));
            let (batch, results) = self
                .run_batch(batch_index, tasks, plan.max_concurrency)
                .await;
            planner.review(&batch, &results).await;

            report.total_tokens += batch.tokens_used;
            report.total_cost_cents += batch.cost_cents;
            report.batches.push(batch);
            report.results.extend(results);

            let elapsed_ms = started.elapsed().as_millis() as u64;
            on_progress(&progress(
                &report,
                batch_index,
                batch_count,
                plan.total,
                elapsed_ms,
            ));

            if batch_index + 1 < batch_count && !plan.inter_batch_delay.is_zero() {
                debug!(
                    delay_ms = plan.inter_batch_delay.as_millis() as u64,
                    "inter-batch cooldown"
                );
                tokio::time::sleep(plan.inter_batch_delay).await;
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        report
    }
}

/// ETA is the average wall time per completed task times the tasks left.
fn progress(
    report: &RunReport,
    batch_index: usize,
    batch_count: usize,
    total: usize,
    elapsed_ms: u64,
) -> BatchProgress {
    let completed = report.results.len();
    let remaining = total.saturating_sub(completed);
    let eta_ms = if completed == 0 {
        0
    } else {
        elapsed_ms.saturating_mul(remaining as u64) / completed as u64
    };

    BatchProgress {
        batch_index,
        batch_count,
        completed,
        total,
        successes: report.success_count(),
        failures: report.fail_count(),
        elapsed_ms,
        eta_ms,
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    panic_payload_message(err.into_panic().as_ref())
}

/// Text of a panic payload raised with a string message.
pub(crate) fn panic_payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_plan_batches() {
        let plan = RunPlan::new(25, 10, 5, Duration::ZERO);
        assert_eq!(plan.batch_count(), 3);
        assert_eq!(plan.batch_range(0), 0..10);
        assert_eq!(plan.batch_range(2), 20..25);

        assert_eq!(RunPlan::new(20, 10, 5, Duration::ZERO).batch_count(), 2);
        assert_eq!(RunPlan::new(0, 10, 5, Duration::ZERO).batch_count(), 0);
        assert_eq!(RunPlan::new(5, 0, 5, Duration::ZERO).batch_count(), 0);
    }

    #[test]
    fn test_stop_handle_is_shared() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_fixed_mode_planner_numbers_tasks() {
        let mut planner = FixedModePlanner::default();
        let tasks = planner.plan(2, 20..25);
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[0].sequence, 20);
        assert!(tasks.iter().all(|t| t.batch_index == 2));
    }

    #[test]
    fn test_eta_uses_average_task_time() {
        let task = BatchTask::new(0, 0, GenerationMode::default());
        let err = DomainError::Stopped;
        let results: Vec<_> = (0..4).map(|_| BatchResult::failed(&task, &err, 0)).collect();
        let report = RunReport {
            requested: 10,
            batches: vec![BatchReport::from_results(0, &results, 400)],
            results,
            ..RunReport::default()
        };
        let p = progress(&report, 0, 3, 10, 400);
        assert_eq!(p.completed, 4);
        assert_eq!(p.failures, 4);
        assert_eq!(p.eta_ms, 600);
    }

    #[test]
    fn test_eta_keeps_fractional_average() {
        let task = BatchTask::new(0, 0, GenerationMode::default());
        let err = DomainError::Stopped;
        let results: Vec<_> = (0..10).map(|_| BatchResult::failed(&task, &err, 0)).collect();
        let report = RunReport {
            requested: 1000,
            batches: vec![BatchReport::from_results(0, &results, 19)],
            results,
            ..RunReport::default()
        };
        // 1.9 ms per task over 990 remaining
        assert_eq!(progress(&report, 0, 100, 1000, 19).eta_ms, 1881);
        // sub-millisecond average with work left is not zero
        assert_eq!(progress(&report, 0, 100, 1000, 5).eta_ms, 495);
    }

    #[test]
    fn test_closed_executor_has_its_own_kind() {
        let task = BatchTask::new(0, 0, GenerationMode::default());
        let result = BatchResult::failed(&task, &DomainError::ExecutorClosed, 0);
        assert_eq!(result.error_kind.as_deref(), Some("executor_closed"));
        assert_ne!(
            DomainError::ExecutorClosed.kind(),
            DomainError::TaskPanicked(String::new()).kind()
        );
    }
}
