//! Table output formatting for CLI commands
//!
//! Summary tables for batch runs, loop runs, the portfolio and the
//! standards history, using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::application::LoopSummary;
use crate::domain::models::{Adjustment, PortfolioEntry, RunReport};
use crate::services::StatisticsReport;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    /// Formatter with colours detected from the environment.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    /// Formatter with colours forced on or off.
    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Key/value summary of a batch run and the pipeline statistics.
    pub fn format_run_summary(&self, run: &RunReport, stats: &StatisticsReport) -> String {
        let mut table = self.key_value_table();
        table.add_row(vec![
            Cell::new("Requested"),
            Cell::new(run.requested),
        ]);
        table.add_row(vec![Cell::new("Batches"), Cell::new(run.batches.len())]);
        table.add_row(vec![
            Cell::new("Built / failed"),
            Cell::new(format!("{} / {}", run.success_count(), run.fail_count())),
        ]);
        self.add_statistics_rows(&mut table, stats);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", run.elapsed_ms as f64 / 1000.0)),
        ]);
        if run.stopped_early {
            table.add_row(vec![Cell::new("Stopped early"), self.flag_cell(true)]);
        }
        table.to_string()
    }

    /// Key/value summary of an autonomous loop run.
    pub fn format_loop_summary(&self, summary: &LoopSummary) -> String {
        let mut table = self.key_value_table();
        table.add_row(vec![Cell::new("Attempts"), Cell::new(summary.attempts)]);
        table.add_row(vec![
            Cell::new("Reached target"),
            self.flag_cell(summary.reached_target),
        ]);
        table.add_row(vec![
            Cell::new("Outages"),
            Cell::new(summary.systemic_failures),
        ]);
        self.add_statistics_rows(&mut table, &summary.report);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", summary.elapsed_ms as f64 / 1000.0)),
        ]);
        table.to_string()
    }

    /// One row per accepted entry.
    pub fn format_portfolio(&self, entries: &[PortfolioEntry]) -> String {
        let mut table = self.base_table();
        table.set_header(vec![
            header("#"),
            header("Title"),
            header("Genre"),
            header("Mechanic"),
            header("Total"),
            header("Diversity"),
            header("Mode"),
        ]);
        for entry in entries {
            table.add_row(vec![
                Cell::new(entry.sequence),
                Cell::new(truncate_text(entry.candidate.title(), 32)),
                Cell::new(entry.genre()),
                Cell::new(entry.mechanic()),
                Cell::new(format!("{:.1}", entry.total_score())),
                Cell::new(format!("{:.2}", entry.evaluation.diversity.score)),
                Cell::new(entry.candidate.mode.label()),
            ]);
        }
        table.to_string()
    }

    /// The standards audit trail.
    pub fn format_adjustments(&self, history: &[Adjustment]) -> String {
        let mut table = self.base_table();
        table.set_header(vec![
            header("At"),
            header("Field"),
            header("Old"),
            header("New"),
            header("Reason"),
        ]);
        for adj in history {
            let new_cell = Cell::new(format!("{:.3}", adj.new_value));
            let new_cell = if self.use_colors {
                new_cell.fg(if adj.new_value > adj.old_value {
                    Color::Green
                } else {
                    Color::Yellow
                })
            } else {
                new_cell
            };
            table.add_row(vec![
                Cell::new(adj.at.format("%H:%M:%S")),
                Cell::new(&adj.field),
                Cell::new(format!("{:.3}", adj.old_value)),
                new_cell,
                Cell::new(truncate_text(&adj.reason, 60)),
            ]);
        }
        table.to_string()
    }

    fn add_statistics_rows(&self, table: &mut Table, stats: &StatisticsReport) {
        table.add_row(vec![
            Cell::new("Accepted / rejected / failed"),
            Cell::new(format!(
                "{} / {} / {}",
                stats.passed, stats.rejected, stats.failed
            )),
        ]);
        table.add_row(vec![
            Cell::new("Acceptance rate"),
            Cell::new(format!("{:.1}%", stats.acceptance_rate() * 100.0)),
        ]);
        table.add_row(vec![
            Cell::new("Average quality"),
            Cell::new(format!("{:.1}", stats.average_quality)),
        ]);
        table.add_row(vec![
            Cell::new("Threshold / epsilon"),
            Cell::new(format!(
                "{:.1} / {:.3}",
                stats.quality_threshold, stats.epsilon
            )),
        ]);
        table.add_row(vec![
            Cell::new("Portfolio size"),
            Cell::new(stats.portfolio_size),
        ]);
        table.add_row(vec![
            Cell::new("Tokens / cost"),
            Cell::new(format!(
                "{} / {:.2}¢",
                stats.total_tokens, stats.total_cost_cents
            )),
        ]);
    }

    fn flag_cell(&self, value: bool) -> Cell {
        let cell = Cell::new(if value { "yes" } else { "no" });
        if self.use_colors {
            cell.fg(if value { Color::Green } else { Color::Red })
        } else {
            cell
        }
    }

    fn key_value_table(&self) -> Table {
        let mut table = self.base_table();
        table.set_header(vec![header("Metric"), header("Value")]);
        table
    }

    fn base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Check if the terminal supports colors
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

/// Truncate on a character boundary, appending "..." when cut.
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}
