//! Configuration model, loaded by `infrastructure::config`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::standards::StandardsBounds;

/// Main configuration structure for Arcadia
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Run sizing, concurrency and pacing
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Distance metrics and gap detection
    #[serde(default)]
    pub diversity: DiversityConfig,

    /// Point budgets for the quality scorer
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Adaptive threshold and exploration tuning
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Retry policy for the idea generator
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Offline procedural studio
    #[serde(default)]
    pub studio: StudioConfig,
}

/// Run sizing, concurrency and pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Attempts requested by a batch run
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Attempts per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum attempts in flight inside a batch
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Pause between batches in milliseconds
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Pause between sequential attempts in milliseconds
    #[serde(default = "default_attempt_delay_ms")]
    pub attempt_delay_ms: u64,

    /// Cooldown after a collaborator outage in milliseconds
    #[serde(default = "default_error_cooldown_ms")]
    pub error_cooldown_ms: u64,

    /// Optional timeout for a single attempt
    #[serde(default)]
    pub task_timeout_secs: Option<u64>,

    /// Accepted entries the sequential loop aims for
    #[serde(default = "default_target_accepted")]
    pub target_accepted: usize,

    /// Safety limit for the sequential loop
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Emit a statistics report every N attempts in the sequential loop
    #[serde(default = "default_report_every")]
    pub report_every: usize,

    /// Recent titles passed to the idea generator as an avoid list
    #[serde(default = "default_avoid_list_size")]
    pub avoid_list_size: usize,
}

const fn default_target_count() -> usize {
    25
}

const fn default_batch_size() -> usize {
    10
}

const fn default_max_concurrency() -> usize {
    5
}

const fn default_inter_batch_delay_ms() -> u64 {
    2_000
}

const fn default_attempt_delay_ms() -> u64 {
    500
}

const fn default_error_cooldown_ms() -> u64 {
    30_000
}

const fn default_target_accepted() -> usize {
    20
}

const fn default_max_attempts() -> usize {
    200
}

const fn default_report_every() -> usize {
    10
}

const fn default_avoid_list_size() -> usize {
    20
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            batch_size: default_batch_size(),
            max_concurrency: default_max_concurrency(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            attempt_delay_ms: default_attempt_delay_ms(),
            error_cooldown_ms: default_error_cooldown_ms(),
            task_timeout_secs: None,
            target_accepted: default_target_accepted(),
            max_attempts: default_max_attempts(),
            report_every: default_report_every(),
            avoid_list_size: default_avoid_list_size(),
        }
    }
}

/// Distance metrics and gap detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiversityConfig {
    /// Distance that counts as fully diverse
    #[serde(default = "default_distance_ceiling")]
    pub distance_ceiling: f64,

    /// Weight of the nearest-neighbor distance in the blended score
    #[serde(default = "default_nearest_weight")]
    pub nearest_weight: f64,

    /// Weight of the average distance in the blended score
    #[serde(default = "default_average_weight")]
    pub average_weight: f64,

    /// Radius inside which portfolio members count as neighbors
    #[serde(default = "default_density_radius")]
    pub density_radius: f64,

    /// Neighbor count at which the density penalty saturates
    #[serde(default = "default_density_saturation")]
    pub density_saturation: usize,

    /// Below this size only broad exploration targets are reported
    #[serde(default = "default_min_portfolio_for_gaps")]
    pub min_portfolio_for_gaps: usize,

    /// Category share under which a category is a gap
    #[serde(default = "default_gap_coverage_floor")]
    pub gap_coverage_floor: f64,

    /// Priority of the broad targets used for small portfolios
    #[serde(default = "default_broad_gap_priority")]
    pub broad_gap_priority: f64,

    /// Exploration targets used when no portfolio gap exists
    #[serde(default = "default_fallback_targets")]
    pub fallback_targets: Vec<String>,
}

const fn default_distance_ceiling() -> f64 {
    2.5
}

const fn default_nearest_weight() -> f64 {
    0.6
}

const fn default_average_weight() -> f64 {
    0.4
}

const fn default_density_radius() -> f64 {
    0.5
}

const fn default_density_saturation() -> usize {
    5
}

const fn default_min_portfolio_for_gaps() -> usize {
    10
}

const fn default_gap_coverage_floor() -> f64 {
    0.08
}

const fn default_broad_gap_priority() -> f64 {
    0.7
}

fn default_fallback_targets() -> Vec<String> {
    vec![
        "genre:rhythm".to_string(),
        "genre:strategy".to_string(),
        "mechanic:balance".to_string(),
        "mechanic:aim".to_string(),
    ]
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            distance_ceiling: default_distance_ceiling(),
            nearest_weight: default_nearest_weight(),
            average_weight: default_average_weight(),
            density_radius: default_density_radius(),
            density_saturation: default_density_saturation(),
            min_portfolio_for_gaps: default_min_portfolio_for_gaps(),
            gap_coverage_floor: default_gap_coverage_floor(),
            broad_gap_priority: default_broad_gap_priority(),
            fallback_targets: default_fallback_targets(),
        }
    }
}

/// Point budgets for the quality scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Points for distance from the nearest entry
    #[serde(default = "default_diversity_points")]
    pub diversity_points: f64,

    /// Points lost at full local density
    #[serde(default = "default_density_penalty_points")]
    pub density_penalty_points: f64,

    /// Points for filling an under-represented bucket
    #[serde(default = "default_gap_filling_points")]
    pub gap_filling_points: f64,

    /// Points for keeping the genre mix balanced
    #[serde(default = "default_balance_points")]
    pub balance_points: f64,

    /// Upper bound of the relative subtotal
    #[serde(default = "default_relative_max")]
    pub relative_max: f64,

    /// Points for basic structural quality
    #[serde(default = "default_basic_quality_max")]
    pub basic_quality_max: f64,

    /// Points for playability
    #[serde(default = "default_playability_max")]
    pub playability_max: f64,

    /// Points for predicted player satisfaction
    #[serde(default = "default_satisfaction_max")]
    pub satisfaction_max: f64,

    /// Upper bound of the absolute subtotal
    #[serde(default = "default_absolute_max")]
    pub absolute_max: f64,
}

const fn default_diversity_points() -> f64 {
    25.0
}

const fn default_density_penalty_points() -> f64 {
    15.0
}

const fn default_gap_filling_points() -> f64 {
    15.0
}

const fn default_balance_points() -> f64 {
    10.0
}

const fn default_relative_max() -> f64 {
    50.0
}

const fn default_basic_quality_max() -> f64 {
    20.0
}

const fn default_playability_max() -> f64 {
    20.0
}

const fn default_satisfaction_max() -> f64 {
    10.0
}

const fn default_absolute_max() -> f64 {
    50.0
}

impl ScoringConfig {
    /// Highest total a candidate can reach.
    pub fn total_max(&self) -> f64 {
        self.relative_max + self.absolute_max
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            diversity_points: default_diversity_points(),
            density_penalty_points: default_density_penalty_points(),
            gap_filling_points: default_gap_filling_points(),
            balance_points: default_balance_points(),
            relative_max: default_relative_max(),
            basic_quality_max: default_basic_quality_max(),
            playability_max: default_playability_max(),
            satisfaction_max: default_satisfaction_max(),
            absolute_max: default_absolute_max(),
        }
    }
}

/// Adaptive threshold and exploration tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControllerConfig {
    /// Starting quality threshold
    #[serde(default = "default_initial_threshold")]
    pub initial_threshold: f64,

    /// Lowest threshold the controller may set
    #[serde(default = "default_min_threshold")]
    pub min_threshold: f64,

    /// Highest threshold the controller may set
    #[serde(default = "default_max_threshold")]
    pub max_threshold: f64,

    /// Starting exploration rate
    #[serde(default = "default_initial_epsilon")]
    pub initial_epsilon: f64,

    /// Lowest exploration rate
    #[serde(default = "default_epsilon_min")]
    pub epsilon_min: f64,

    /// Highest exploration rate
    #[serde(default = "default_epsilon_max")]
    pub epsilon_max: f64,

    /// Completed attempts between recalibrations
    #[serde(default = "default_recalibration_interval")]
    pub recalibration_interval: usize,

    /// Samples required before the controller acts
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Size of the rolling statistics window
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Pass rate the controller steers toward
    #[serde(default = "default_target_pass_rate")]
    pub target_pass_rate: f64,

    /// Deviation from the target pass rate that is left alone
    #[serde(default = "default_pass_rate_tolerance")]
    pub pass_rate_tolerance: f64,

    /// Threshold points per unit of pass-rate deviation
    #[serde(default = "default_pass_rate_gain")]
    pub pass_rate_gain: f64,

    /// Largest threshold change in a single recalibration
    #[serde(default = "default_max_step")]
    pub max_step: f64,

    /// Median this far above the threshold counts as very high
    #[serde(default = "default_median_high_margin")]
    pub median_high_margin: f64,

    /// Median this far below the threshold counts as very low
    #[serde(default = "default_median_low_margin")]
    pub median_low_margin: f64,

    /// Threshold change when the median is very high or very low
    #[serde(default = "default_median_nudge")]
    pub median_nudge: f64,

    /// Geometric epsilon decay per recalibration
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f64,

    /// Epsilon boost when the pass rate is far below target
    #[serde(default = "default_epsilon_boost")]
    pub epsilon_boost: f64,

    /// Rolling diversity below this raises epsilon
    #[serde(default = "default_low_diversity")]
    pub low_diversity: f64,

    /// Rolling diversity above this is left alone
    #[serde(default = "default_high_diversity")]
    pub high_diversity: f64,

    /// Epsilon boost when rolling diversity is low
    #[serde(default = "default_diversity_boost")]
    pub diversity_boost: f64,

    /// Seed for the mode selector (random when unset)
    #[serde(default)]
    pub selector_seed: Option<u64>,
}

const fn default_initial_threshold() -> f64 {
    60.0
}

const fn default_min_threshold() -> f64 {
    40.0
}

const fn default_max_threshold() -> f64 {
    85.0
}

const fn default_initial_epsilon() -> f64 {
    0.3
}

const fn default_epsilon_min() -> f64 {
    0.05
}

const fn default_epsilon_max() -> f64 {
    0.5
}

const fn default_recalibration_interval() -> usize {
    10
}

const fn default_min_samples() -> usize {
    10
}

const fn default_window_size() -> usize {
    50
}

const fn default_target_pass_rate() -> f64 {
    0.35
}

const fn default_pass_rate_tolerance() -> f64 {
    0.05
}

const fn default_pass_rate_gain() -> f64 {
    20.0
}

const fn default_max_step() -> f64 {
    3.0
}

const fn default_median_high_margin() -> f64 {
    20.0
}

const fn default_median_low_margin() -> f64 {
    30.0
}

const fn default_median_nudge() -> f64 {
    1.0
}

const fn default_epsilon_decay() -> f64 {
    0.95
}

const fn default_epsilon_boost() -> f64 {
    0.1
}

const fn default_low_diversity() -> f64 {
    0.3
}

const fn default_high_diversity() -> f64 {
    0.7
}

const fn default_diversity_boost() -> f64 {
    0.05
}

impl ControllerConfig {
    /// Bounds the standards are clamped to.
    pub const fn bounds(&self) -> StandardsBounds {
        StandardsBounds {
            min_threshold: self.min_threshold,
            max_threshold: self.max_threshold,
            epsilon_min: self.epsilon_min,
            epsilon_max: self.epsilon_max,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_threshold: default_initial_threshold(),
            min_threshold: default_min_threshold(),
            max_threshold: default_max_threshold(),
            initial_epsilon: default_initial_epsilon(),
            epsilon_min: default_epsilon_min(),
            epsilon_max: default_epsilon_max(),
            recalibration_interval: default_recalibration_interval(),
            min_samples: default_min_samples(),
            window_size: default_window_size(),
            target_pass_rate: default_target_pass_rate(),
            pass_rate_tolerance: default_pass_rate_tolerance(),
            pass_rate_gain: default_pass_rate_gain(),
            max_step: default_max_step(),
            median_high_margin: default_median_high_margin(),
            median_low_margin: default_median_low_margin(),
            median_nudge: default_median_nudge(),
            epsilon_decay: default_epsilon_decay(),
            epsilon_boost: default_epsilon_boost(),
            low_diversity: default_low_diversity(),
            high_diversity: default_high_diversity(),
            diversity_boost: default_diversity_boost(),
            selector_seed: None,
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Offline procedural studio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StudioConfig {
    /// RNG seed (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Probability that an idea or content call fails transiently
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// Probability that a call reports a collaborator outage
    #[serde(default)]
    pub outage_rate: f64,

    /// Ideas whose self-reported quality falls below this are rejected
    #[serde(default = "default_min_self_reported_quality")]
    pub min_self_reported_quality: f64,

    /// Simulated latency per collaborator call in milliseconds
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
}

const fn default_failure_rate() -> f64 {
    0.05
}

const fn default_min_self_reported_quality() -> f64 {
    0.3
}

const fn default_simulated_latency_ms() -> u64 {
    25
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            seed: None,
            failure_rate: default_failure_rate(),
            outage_rate: 0.0,
            min_self_reported_quality: default_min_self_reported_quality(),
            simulated_latency_ms: default_simulated_latency_ms(),
        }
    }
}
