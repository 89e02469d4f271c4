//! `arcadia run`: sequential run until enough candidates are accepted.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::{apply_seed, stop_on_ctrl_c, EntrySummary};
use crate::application::{AutonomousLoop, GenerationPipeline, LoopSummary};
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{Adjustment, Config, PortfolioEntry};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::studio::build_studio;

/// Arguments for `arcadia run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Accepted candidates to collect (defaults to generation.target_accepted)
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Give up after this many attempts (defaults to generation.max_attempts)
    #[arg(short, long)]
    pub max_attempts: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// List accepted entries after the summary
    #[arg(long)]
    pub show_portfolio: bool,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    summary: LoopSummary,
    adjustments: Vec<Adjustment>,
    portfolio: Vec<EntrySummary>,
    #[serde(skip)]
    entries: Vec<PortfolioEntry>,
    #[serde(skip)]
    show_portfolio: bool,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut text = formatter.format_loop_summary(&self.summary);
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

/// Generate one candidate at a time until the target is accepted.
pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    if let Some(target) = args.target {
        config.generation.target_accepted = target;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.generation.max_attempts = max_attempts;
    }
    apply_seed(&mut config, args.seed);
    ConfigLoader::validate(&config).context("Invalid run options")?;

    let pipeline = GenerationPipeline::new(&config, build_studio(&config));
    let mut run = AutonomousLoop::new(pipeline);
    stop_on_ctrl_c(run.stop_handle());

    let spinner = create_spinner(json_mode);
    spinner.set_message(format!(
        "collecting {} candidates",
        config.generation.target_accepted
    ));
    let summary = run
        .run(|report| {
            spinner.set_message(format!(
                "{} accepted · {} attempts · threshold {:.1}",
                report.passed, report.generated, report.quality_threshold
            ));
        })
        .await;
    if summary.reached_target {
        spinner.finish_success(format!("{} accepted", summary.accepted));
    } else {
        spinner.finish_warning(format!("{} accepted, target missed", summary.accepted));
    }

    let pipeline = run.into_pipeline();
    let result = RunOutput {
        summary,
        adjustments: pipeline.standards().history().to_vec(),
        portfolio: pipeline
            .portfolio()
            .entries()
            .iter()
            .map(EntrySummary::from)
            .collect(),
        entries: pipeline.portfolio().entries().to_vec(),
        show_portfolio: args.show_portfolio,
    };
    output(&result, json_mode);
    Ok(())
}
