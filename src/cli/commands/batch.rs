//! `arcadia batch`: concurrent batch generation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::{apply_seed, stop_on_ctrl_c, EntrySummary};
use crate::application::{GenerationPipeline, RunPlan};
use crate::cli::output::{
    create_progress_bar, output, CommandOutput, ProgressBarExt, TableFormatter,
};
use crate::domain::models::{Adjustment, BatchReport, Config, PortfolioEntry, RunReport};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::studio::build_studio;
use crate::services::StatisticsReport;

/// Arguments for `arcadia batch`.
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Number of attempts (defaults to generation.target_count)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Attempts per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Maximum attempts in flight within a batch
    #[arg(short = 'k', long)]
    pub concurrency: Option<usize>,

    /// Cooldown between batches in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// List accepted entries after the summary
    #[arg(long)]
    pub show_portfolio: bool,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    requested: usize,
    batches: Vec<BatchReport>,
    stopped_early: bool,
    elapsed_ms: u64,
    statistics: StatisticsReport,
    adjustments: Vec<Adjustment>,
    portfolio: Vec<EntrySummary>,
    #[serde(skip)]
    run: RunReport,
    #[serde(skip)]
    entries: Vec<PortfolioEntry>,
    #[serde(skip)]
    show_portfolio: bool,
}

impl CommandOutput for BatchOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut text = formatter.format_run_summary(&self.run, &self.statistics);
        if !self.adjustments.is_empty() {
            text.push_str("\n\nStandards adjustments\n");
            text.push_str(&formatter.format_adjustments(&self.adjustments));
        }
        if self.show_portfolio {
            text.push_str("\n\nPortfolio\n");
            text.push_str(&formatter.format_portfolio(&self.entries));
        }
        text
    }
}

fn apply_overrides(config: &mut Config, args: &BatchArgs) {
    let generation = &mut config.generation;
    if let Some(count) = args.count {
        generation.target_count = count;
    }
    if let Some(batch_size) = args.batch_size {
        generation.batch_size = batch_size;
    }
    if let Some(concurrency) = args.concurrency {
        generation.max_concurrency = concurrency;
    }
    if let Some(delay_ms) = args.delay_ms {
        generation.inter_batch_delay_ms = delay_ms;
    }
    apply_seed(config, args.seed);
}

/// Run `count` attempts in concurrent batches and print the outcome.
pub async fn execute(args: BatchArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_overrides(&mut config, &args);
    ConfigLoader::validate(&config).context("Invalid batch options")?;

    let plan = RunPlan::from_config(&config.generation);
    let mut pipeline = GenerationPipeline::new(&config, build_studio(&config));
    stop_on_ctrl_c(pipeline.stop_handle());

    let pb = create_progress_bar(plan.total as u64, json_mode);
    let run = pipeline
        .run_batches(plan, |progress| pb.apply(progress))
        .await;
    if run.stopped_early {
        pb.finish_warning("stopped early");
    } else {
        pb.finish_success("done");
    }

    let result = BatchOutput {
        requested: run.requested,
        batches: run.batches.clone(),
        stopped_early: run.stopped_early,
        elapsed_ms: run.elapsed_ms,
        statistics: pipeline.report(),
        adjustments: pipeline.standards().history().to_vec(),
        portfolio: pipeline
            .portfolio()
            .entries()
            .iter()
            .map(EntrySummary::from)
            .collect(),
        entries: pipeline.portfolio().entries().to_vec(),
        run,
        show_portfolio: args.show_portfolio,
    };
    output(&result, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_to_generation_and_seeds() {
        let mut config = Config::default();
        let args = BatchArgs {
            count: Some(7),
            batch_size: Some(3),
            concurrency: Some(2),
            delay_ms: Some(0),
            seed: Some(99),
            show_portfolio: false,
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.generation.target_count, 7);
        assert_eq!(config.generation.batch_size, 3);
        assert_eq!(config.generation.max_concurrency, 2);
        assert_eq!(config.generation.inter_batch_delay_ms, 0);
        assert_eq!(config.controller.selector_seed, Some(99));
        assert_eq!(config.studio.seed, Some(99));
    }

    #[test]
    fn test_zero_concurrency_override_is_rejected() {
        let mut config = Config::default();
        let args = BatchArgs {
            concurrency: Some(0),
            ..BatchArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert!(ConfigLoader::validate(&config).is_err());
    }
}
