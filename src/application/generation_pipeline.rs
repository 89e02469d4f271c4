//! Generation pipeline
//!
//! Single owner of the portfolio, the adaptive standards, the mode selector
//! and the generation statistics. Candidates are built concurrently but are
//! scored and accepted here, one at a time, so none of that state is shared
//! across tasks.

use async_trait::async_trait;
use futures::FutureExt;
use std::ops::Range;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::batch_executor::{
    panic_payload_message, AttemptRunner, BatchExecutor, BatchPlanner, RunPlan, StopHandle,
};
use crate::application::candidate_factory::CandidateFactory;
use crate::domain::errors::DomainError;
use crate::domain::models::{
    AdaptiveStandards, Adjustment, BatchProgress, BatchReport, BatchResult, BatchTask,
    Candidate, Config, GenerationConfig, GenerationMode, QualityEvaluation, RunReport,
};
use crate::domain::ports::{Publisher, Studio};
use crate::services::{
    DiversityAnalyzer, GenerationStats, ModeSelector, Portfolio, QualityScorer,
    StatisticsReport, ThresholdController,
};

/// What happened to one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Candidate passed and joined the portfolio.
    Accepted {
        /// Portfolio position of the new entry.
        sequence: usize,
        /// Id of the accepted candidate.
        candidate_id: Uuid,
        /// Scores that passed.
        evaluation: QualityEvaluation,
    },
    /// Candidate scored below threshold or had a critical violation.
    Rejected {
        /// Id of the rejected candidate.
        candidate_id: Uuid,
        /// Scores that failed.
        evaluation: QualityEvaluation,
    },
    /// No candidate was produced.
    Failed {
        /// Failure label.
        kind: String,
        /// Error message.
        error: String,
        /// Whether the failure calls for a cooldown.
        systemic: bool,
    },
}

impl AttemptOutcome {
    /// Whether the candidate joined the portfolio.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Whether the failure calls for a cooldown.
    pub const fn is_systemic_failure(&self) -> bool {
        matches!(self, Self::Failed { systemic: true, .. })
    }
}

/// Adaptive generation pipeline.
pub struct GenerationPipeline {
    factory: Arc<CandidateFactory>,
    publisher: Option<Arc<dyn Publisher>>,
    scorer: QualityScorer,
    controller: ThresholdController,
    selector: ModeSelector,
    portfolio: Portfolio,
    standards: AdaptiveStandards,
    stats: GenerationStats,
    config: GenerationConfig,
    stop: StopHandle,
    completed_attempts: usize,
}

impl GenerationPipeline {
    /// Pipeline with fresh standards and an empty portfolio.
    pub fn new(config: &Config, studio: Studio) -> Self {
        let analyzer = DiversityAnalyzer::new(config.diversity.clone());
        let controller = ThresholdController::new(config.controller.clone());
        let standards = controller.initial_standards();

        Self {
            publisher: studio.publisher.clone(),
            factory: Arc::new(CandidateFactory::new(studio)),
            scorer: QualityScorer::new(config.scoring.clone(), analyzer),
            selector: ModeSelector::new(
                config.controller.selector_seed,
                config.diversity.fallback_targets.clone(),
            ),
            portfolio: Portfolio::new(config.diversity.distance_ceiling),
            stats: GenerationStats::new(config.controller.window_size),
            config: config.generation.clone(),
            stop: StopHandle::new(),
            completed_attempts: 0,
            controller,
            standards,
        }
    }

    /// Accepted entries.
    pub const fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Current threshold, epsilon and adjustment history.
    pub const fn standards(&self) -> &AdaptiveStandards {
        &self.standards
    }

    /// Counters and rolling window.
    pub const fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Exploration/exploitation selector.
    pub const fn selector(&self) -> &ModeSelector {
        &self.selector
    }

    /// Generation settings the pipeline was built with.
    pub const fn generation_config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Stop flag shared by batch runs and the autonomous loop.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Lifetime statistics with the current standards.
    pub fn report(&self) -> StatisticsReport {
        self.stats.report(&self.standards, self.portfolio.len())
    }

    fn task_timeout(&self) -> Option<Duration> {
        self.config.task_timeout_secs.map(Duration::from_secs)
    }

    /// Choose the mode for the next attempt from the current gaps.
    pub fn next_mode(&mut self) -> GenerationMode {
        let gaps = self.scorer.analyzer().find_gap_areas(&self.portfolio);
        self.selector.select(&self.standards, &gaps)
    }

    /// Recent accepted titles the idea generator should not repeat.
    pub fn avoid_list(&self) -> Vec<String> {
        self.portfolio.recent_titles(self.config.avoid_list_size)
    }

    /// Score a candidate and accept it when it passes.
    pub fn review_candidate(&mut self, candidate: Candidate) -> AttemptOutcome {
        let evaluation = self
            .scorer
            .evaluate(&candidate, &self.portfolio, &self.standards);
        self.stats
            .record_evaluation(&evaluation, &candidate.mode, &candidate.metrics);

        let candidate_id = candidate.id;
        let outcome = if evaluation.passed {
            info!(
                %candidate_id,
                title = candidate.title(),
                total = evaluation.total,
                threshold = evaluation.threshold,
                diversity = evaluation.diversity.score,
                mode = candidate.mode.label(),
                "candidate accepted"
            );
            let entry = self.portfolio.append(candidate, evaluation.clone());
            AttemptOutcome::Accepted {
                sequence: entry.sequence,
                candidate_id,
                evaluation,
            }
        } else {
            info!(
                %candidate_id,
                title = candidate.title(),
                total = evaluation.total,
                threshold = evaluation.threshold,
                critical = evaluation.has_critical_violation(),
                issues = evaluation.issues.len(),
                "candidate rejected"
            );
            AttemptOutcome::Rejected {
                candidate_id,
                evaluation,
            }
        };

        self.complete_attempt();
        outcome
    }

    /// Count an attempt that produced no candidate.
    pub fn record_failure(&mut self, kind: &str, error: &str, systemic: bool) -> AttemptOutcome {
        warn!(kind, systemic, "generation attempt failed: {error}");
        self.stats.record_failure(kind);
        self.complete_attempt();
        AttemptOutcome::Failed {
            kind: kind.to_string(),
            error: error.to_string(),
            systemic,
        }
    }

    fn complete_attempt(&mut self) {
        self.completed_attempts += 1;
        let interval = self.controller.config().recalibration_interval;
        if interval > 0 && self.completed_attempts % interval == 0 {
            self.recalibrate();
        }
    }

    /// One controller step from the current rolling statistics.
    pub fn recalibrate(&mut self) -> Vec<Adjustment> {
        let snapshot = self.stats.snapshot();
        let adjustments = self.controller.adjust(&mut self.standards, &snapshot);
        debug!(
            attempts = self.completed_attempts,
            samples = snapshot.sample_count,
            pass_rate = snapshot.pass_rate,
            changes = adjustments.len(),
            "recalibration checkpoint"
        );
        adjustments
    }

    /// Best-effort publish of an accepted entry. Failures are logged and the
    /// entry stays accepted.
    pub async fn publish(&self, sequence: usize) {
        let Some(publisher) = self.publisher.as_ref() else {
            return;
        };
        let Some(entry) = self.portfolio.entries().get(sequence) else {
            return;
        };

        match publisher.publish(entry).await {
            Ok(receipt) => debug!(
                sequence,
                external_id = receipt.external_id.as_deref().unwrap_or("-"),
                "entry published"
            ),
            Err(err) => warn!(sequence, error = %err, "publish failed, entry stays accepted"),
        }
    }

    /// Run one attempt end to end: mode, build, review, publish.
    pub async fn attempt(&mut self) -> AttemptOutcome {
        let mode = self.next_mode();
        let avoid = self.avoid_list();
        let factory = Arc::clone(&self.factory);
        let timeout = self.task_timeout();

        let build = async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, factory.create(&avoid, &mode))
                    .await
                    .unwrap_or_else(|_| {
                        Err(DomainError::Timeout {
                            secs: limit.as_secs(),
                        })
                    }),
                None => factory.create(&avoid, &mode).await,
            }
        };
        // The build future owns its inputs, so a panic leaves no pipeline
        // state half-updated.
        let built = AssertUnwindSafe(build)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(DomainError::TaskPanicked(panic_payload_message(
                    payload.as_ref(),
                )))
            });

        match built {
            Ok(candidate) => {
                let outcome = self.review_candidate(candidate);
                if let AttemptOutcome::Accepted { sequence, .. } = &outcome {
                    self.publish(*sequence).await;
                }
                outcome
            }
            Err(err) => self.record_failure(err.kind(), &err.to_string(), err.is_systemic()),
        }
    }

    /// Run `plan.total` attempts in concurrent batches. Each batch is
    /// reviewed in scheduling order once all of its tasks resolved.
    pub async fn run_batches<F>(&mut self, plan: RunPlan, on_progress: F) -> RunReport
    where
        F: FnMut(&BatchProgress) + Send,
    {
        let runner: Arc<dyn AttemptRunner> = self.factory.clone();
        let executor = BatchExecutor::new(runner)
            .with_task_timeout(self.task_timeout())
            .with_stop_handle(self.stop.clone());

        let report = executor.run_all(plan, self, on_progress).await;
        info!(
            generated = report.generated(),
            succeeded = report.success_count(),
            accepted = self.stats.passed(),
            portfolio = self.portfolio.len(),
            threshold = self.standards.quality_threshold(),
            stopped_early = report.stopped_early,
            "batch run complete"
        );
        report
    }
}

#[async_trait]
impl BatchPlanner for GenerationPipeline {
    fn plan(&mut self, batch_index: usize, sequences: Range<usize>) -> Vec<BatchTask> {
        let avoid = Arc::new(self.avoid_list());
        sequences
            .map(|sequence| {
                let mode = self.next_mode();
                BatchTask::new(sequence, batch_index, mode).with_avoid(Arc::clone(&avoid))
            })
            .collect()
    }

    async fn review(&mut self, _report: &BatchReport, results: &[BatchResult]) {
        let mut accepted = Vec::new();
        for result in results {
            let outcome = match &result.candidate {
                Some(candidate) => self.review_candidate(candidate.clone()),
                None => {
                    let kind = result.error_kind.as_deref().unwrap_or("unknown");
                    let systemic = DomainError::is_systemic_kind(kind);
                    self.record_failure(kind, result.error.as_deref().unwrap_or(""), systemic)
                }
            };
            if let AttemptOutcome::Accepted { sequence, .. } = outcome {
                accepted.push(sequence);
            }
        }

        for sequence in accepted {
            self.publish(sequence).await;
        }
    }
}
