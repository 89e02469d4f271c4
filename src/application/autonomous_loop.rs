//! Sequential "run until N accepted" loop.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::application::batch_executor::StopHandle;
use crate::application::generation_pipeline::{AttemptOutcome, GenerationPipeline};
use crate::services::StatisticsReport;

/// Result of one [`AutonomousLoop::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSummary {
    /// Attempts made by this run.
    pub attempts: usize,
    /// Candidates accepted by this run.
    pub accepted: usize,
    /// Attempts that ended in an outage or a panic.
    pub systemic_failures: usize,
    /// Whether `accepted` reached the target.
    pub reached_target: bool,
    /// Whether a stop request ended the run.
    pub stopped_early: bool,
    /// Wall time of the run.
    pub elapsed_ms: u64,
    /// Lifetime statistics at the end of the run.
    pub report: StatisticsReport,
}

/// Runs one attempt at a time until enough candidates are accepted.
///
/// Generation failures are counted and the loop moves on; collaborator
/// outages add an extended cooldown before the next attempt.
pub struct AutonomousLoop {
    pipeline: GenerationPipeline,
    target_accepted: usize,
    max_attempts: usize,
    attempt_delay: Duration,
    error_cooldown: Duration,
    report_every: usize,
}

impl AutonomousLoop {
    /// Loop with target, budget and delays taken from the pipeline's
    /// generation config.
    pub fn new(pipeline: GenerationPipeline) -> Self {
        let config = pipeline.generation_config();
        Self {
            target_accepted: config.target_accepted,
            max_attempts: config.max_attempts,
            attempt_delay: Duration::from_millis(config.attempt_delay_ms),
            error_cooldown: Duration::from_millis(config.error_cooldown_ms),
            report_every: config.report_every,
            pipeline,
        }
    }

    /// Override the number of accepted candidates to reach.
    pub const fn with_target(mut self, target_accepted: usize) -> Self {
        self.target_accepted = target_accepted;
        self
    }

    /// Override the attempt budget.
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the delay between attempts and the outage cooldown.
    pub const fn with_delays(mut self, attempt_delay: Duration, error_cooldown: Duration) -> Self {
        self.attempt_delay = attempt_delay;
        self.error_cooldown = error_cooldown;
        self
    }

    /// Handle that ends the loop before its next attempt.
    pub fn stop_handle(&self) -> StopHandle {
        self.pipeline.stop_handle()
    }

    /// The driven pipeline.
    pub const fn pipeline(&self) -> &GenerationPipeline {
        &self.pipeline
    }

    /// Give the pipeline back, with its portfolio and standards.
    pub fn into_pipeline(self) -> GenerationPipeline {
        self.pipeline
    }

    /// Run the loop. `on_report` receives the periodic statistics report
    /// every `report_every` attempts.
    pub async fn run<F>(&mut self, mut on_report: F) -> LoopSummary
    where
        F: FnMut(&StatisticsReport) + Send,
    {
        let started = Instant::now();
        let stop = self.pipeline.stop_handle();
        let accepted_before = self.pipeline.portfolio().len();
        let mut attempts = 0;
        let mut systemic_failures = 0;
        let mut stopped_early = false;

        info!(
            target_accepted = self.target_accepted,
            max_attempts = self.max_attempts,
            "autonomous loop started"
        );

        loop {
            if stop.is_stopped() {
                info!(attempts, "stop requested, leaving loop");
                stopped_early = true;
                break;
            }
            if self.accepted_since(accepted_before) >= self.target_accepted {
                break;
            }
            if attempts >= self.max_attempts {
                warn!(
                    attempts,
                    accepted = self.accepted_since(accepted_before),
                    "attempt budget exhausted before reaching target"
                );
                break;
            }

            let outcome = self.pipeline.attempt().await;
            attempts += 1;

            if self.report_every > 0 && attempts % self.report_every == 0 {
                let report = self.pipeline.report();
                info!(
                    attempts,
                    accepted = report.passed,
                    rejected = report.rejected,
                    failed = report.failed,
                    acceptance_rate = report.acceptance_rate(),
                    threshold = report.quality_threshold,
                    epsilon = report.epsilon,
                    "progress report"
                );
                on_report(&report);
            }

            if let AttemptOutcome::Failed { systemic: true, .. } = outcome {
                systemic_failures += 1;
                warn!(
                    cooldown_ms = self.error_cooldown.as_millis() as u64,
                    "collaborator unavailable, cooling down"
                );
                sleep(self.error_cooldown).await;
            } else if self.accepted_since(accepted_before) < self.target_accepted
                && !self.attempt_delay.is_zero()
            {
                sleep(self.attempt_delay).await;
            }
        }

        let accepted = self.accepted_since(accepted_before);
        let summary = LoopSummary {
            attempts,
            accepted,
            systemic_failures,
            reached_target: accepted >= self.target_accepted,
            stopped_early,
            elapsed_ms: started.elapsed().as_millis() as u64,
            report: self.pipeline.report(),
        };
        info!(
            attempts = summary.attempts,
            accepted = summary.accepted,
            reached_target = summary.reached_target,
            "autonomous loop finished"
        );
        summary
    }

    fn accepted_since(&self, before: usize) -> usize {
        self.pipeline.portfolio().len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::GenerationError;
    use crate::domain::models::{
        Config, ControllerConfig, GenerationMode, IdeaSeed, RetryConfig, StudioConfig,
    };
    use crate::domain::ports::IdeaGenerator;
    use crate::infrastructure::studio::build_studio;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct PanickingIdeas;

    #[async_trait]
    impl IdeaGenerator for PanickingIdeas {
        async fn generate(
            &self,
            _avoid: &[String],
            _mode: &GenerationMode,
        ) -> Result<IdeaSeed, GenerationError> {
            panic!("idea model crashed")
        }
    }

    fn offline_config(outage_rate: f64) -> Config {
        Config {
            controller: ControllerConfig {
                selector_seed: Some(5),
                min_threshold: 0.0,
                initial_threshold: 0.0,
                ..ControllerConfig::default()
            },
            studio: StudioConfig {
                seed: Some(5),
                failure_rate: 0.0,
                outage_rate,
                min_self_reported_quality: 0.0,
                simulated_latency_ms: 0,
            },
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 1,
                max_backoff_ms: 2,
            },
            ..Config::default()
        }
    }

    fn quick_loop(config: &Config) -> AutonomousLoop {
        AutonomousLoop::new(GenerationPipeline::new(config, build_studio(config)))
            .with_delays(Duration::ZERO, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_stops_at_max_attempts_during_outage() {
        let config = offline_config(1.0);
        let mut run = quick_loop(&config).with_target(3).with_max_attempts(4);

        let summary = run.run(|_| {}).await;
        assert_eq!(summary.attempts, 4);
        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.systemic_failures, 4);
        assert!(!summary.reached_target);
        assert_eq!(summary.report.failed, 4);
    }

    #[tokio::test]
    async fn test_stop_flag_checked_before_first_attempt() {
        let config = offline_config(0.0);
        let mut run = quick_loop(&config).with_target(5);
        run.stop_handle().stop();

        let summary = run.run(|_| {}).await;
        assert!(summary.stopped_early);
        assert_eq!(summary.attempts, 0);
    }

    #[tokio::test]
    async fn test_panicking_collaborator_cools_down_and_continues() {
        let config = offline_config(0.0);
        let mut studio = build_studio(&config);
        studio.ideas = Arc::new(PanickingIdeas);
        let mut run = AutonomousLoop::new(GenerationPipeline::new(&config, studio))
            .with_delays(Duration::ZERO, Duration::from_millis(5))
            .with_target(1)
            .with_max_attempts(3);

        let summary = run.run(|_| {}).await;
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.systemic_failures, 3);
        assert!(summary.elapsed_ms >= 15);
        assert_eq!(summary.report.failed, 3);
        assert_eq!(summary.report.failures_by_kind.get("panicked"), Some(&3));
    }

    #[tokio::test]
    async fn test_periodic_reports() {
        let config = offline_config(1.0);
        let mut run = quick_loop(&config).with_target(1).with_max_attempts(6);
        run.report_every = 2;

        let mut reports = Vec::new();
        run.run(|r| reports.push(r.generated)).await;
        assert_eq!(reports, vec![2, 4, 6]);
    }
}
