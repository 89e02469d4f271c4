//! Relative + absolute scoring and the accept/reject verdict.
//!
//! The relative half rewards novelty against the portfolio; the absolute half
//! is a set of small structural checks on the artifact alone. Each check adds
//! a fixed share of its budget, so every budget is configurable without
//! touching the checks.

use crate::domain::models::{
    AbsoluteScores, ActionKind, AdaptiveStandards, ArtifactView, Candidate, ConditionKind,
    CriticalViolation, DiversityAnalysis, QualityEvaluation, RelativeScores, ScoringConfig,
};
use crate::services::diversity_analyzer::DiversityAnalyzer;
use crate::services::portfolio::Portfolio;

/// Rule count range considered the complexity sweet spot.
const SWEET_SPOT_RULES: std::ops::RangeInclusive<usize> = 3..=10;
/// Time limits outside this range are considered unplayable.
const SANE_TIME_LIMIT_SECS: std::ops::RangeInclusive<f64> = 5.0..=120.0;
/// Difficulty band that predicts a satisfied player.
const COMFORTABLE_DIFFICULTY: std::ops::RangeInclusive<f64> = 0.3..=0.7;

/// Outcome of one weighted check.
struct Check {
    weight: f64,
    /// Credit in [0,1].
    credit: f64,
    issue: Option<String>,
}

impl Check {
    fn pass(weight: f64) -> Self {
        Self {
            weight,
            credit: 1.0,
            issue: None,
        }
    }

    fn fail(weight: f64, issue: impl Into<String>) -> Self {
        Self {
            weight,
            credit: 0.0,
            issue: Some(issue.into()),
        }
    }

    fn partial(weight: f64, credit: f64, issue: impl Into<String>) -> Self {
        Self {
            weight,
            credit: credit.clamp(0.0, 1.0),
            issue: Some(issue.into()),
        }
    }

    fn when(condition: bool, weight: f64, issue: &str) -> Self {
        if condition {
            Self::pass(weight)
        } else {
            Self::fail(weight, issue)
        }
    }
}

/// Sum weighted credits into `budget` and collect issues.
fn tally(checks: Vec<Check>, budget: f64, issues: &mut Vec<String>) -> f64 {
    let mut points = 0.0;
    for check in checks {
        points += check.weight * check.credit * budget;
        if let Some(issue) = check.issue {
            issues.push(issue);
        }
    }
    points.clamp(0.0, budget.max(0.0))
}

/// Combines portfolio diversity with structural quality checks.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: ScoringConfig,
    analyzer: DiversityAnalyzer,
}

impl QualityScorer {
    /// Scorer with point budgets and a diversity analyzer.
    pub const fn new(config: ScoringConfig, analyzer: DiversityAnalyzer) -> Self {
        Self { config, analyzer }
    }

    /// Point budgets in use.
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Analyzer used for the relative half.
    pub const fn analyzer(&self) -> &DiversityAnalyzer {
        &self.analyzer
    }

    /// Analyze the candidate against the portfolio, then score it.
    pub fn evaluate(
        &self,
        candidate: &Candidate,
        portfolio: &Portfolio,
        standards: &AdaptiveStandards,
    ) -> QualityEvaluation {
        let analysis = self.analyzer.analyze(&candidate.features, portfolio);
        self.evaluate_with_analysis(&candidate.artifact, analysis, standards)
    }

    /// Score an artifact whose diversity analysis is already known.
    pub fn evaluate_with_analysis(
        &self,
        artifact: &impl ArtifactView,
        analysis: DiversityAnalysis,
        standards: &AdaptiveStandards,
    ) -> QualityEvaluation {
        let mut issues = Vec::new();

        let relative = self.relative_scores(&analysis);
        let absolute = self.absolute_scores(artifact, &mut issues);
        let critical_violations = critical_violations(artifact);

        let total =
            (relative.subtotal + absolute.subtotal).clamp(0.0, self.config.total_max().max(0.0));
        let threshold = standards.quality_threshold();
        let passed = total >= threshold && critical_violations.is_empty();

        QualityEvaluation {
            diversity: analysis,
            relative,
            absolute,
            total,
            threshold,
            issues,
            critical_violations,
            passed,
        }
    }

    /// Portfolio-relative points for an analysis.
    pub fn relative_scores(&self, analysis: &DiversityAnalysis) -> RelativeScores {
        let c = &self.config;
        let diversity = analysis.score.clamp(0.0, 1.0) * c.diversity_points;
        let density_penalty = -(analysis.density_penalty.clamp(0.0, 1.0) * c.density_penalty_points);
        let gap_filling = analysis.gap_filling_score.clamp(0.0, 1.0) * c.gap_filling_points;
        let balance = (analysis.balance_contribution.clamp(-0.5, 0.5) + 0.5) * c.balance_points;
        let subtotal =
            (diversity + density_penalty + gap_filling + balance).clamp(0.0, c.relative_max.max(0.0));

        RelativeScores {
            diversity,
            density_penalty,
            gap_filling,
            balance,
            subtotal,
        }
    }

    /// Artifact-only points and critical violations.
    pub fn absolute_scores(
        &self,
        artifact: &impl ArtifactView,
        issues: &mut Vec<String>,
    ) -> AbsoluteScores {
        let c = &self.config;
        let basic_quality = tally(basic_quality_checks(artifact), c.basic_quality_max, issues);
        let playability = tally(playability_checks(artifact), c.playability_max, issues);
        let predicted_satisfaction =
            tally(satisfaction_checks(artifact), c.satisfaction_max, issues);
        let subtotal = (basic_quality + playability + predicted_satisfaction)
            .clamp(0.0, c.absolute_max.max(0.0));

        AbsoluteScores {
            basic_quality,
            playability,
            predicted_satisfaction,
            subtotal,
        }
    }
}

/// Structural problems that fail a candidate regardless of score.
pub fn critical_violations(artifact: &impl ArtifactView) -> Vec<CriticalViolation> {
    let mut violations = Vec::new();
    if !artifact.has_win_path() {
        violations.push(CriticalViolation::NoSuccessPath);
    }
    if artifact
        .rules()
        .iter()
        .any(|r| r.condition == ConditionKind::Start && r.action == ActionKind::Lose)
    {
        violations.push(CriticalViolation::ImmediateLoss);
    }
    violations
}

fn basic_quality_checks(artifact: &impl ArtifactView) -> Vec<Check> {
    vec![
        Check::when(artifact.title().is_some(), 0.15, "missing title"),
        Check::when(!artifact.rules().is_empty(), 0.20, "no rules defined"),
        Check::when(!artifact.objects().is_empty(), 0.15, "no game objects"),
        Check::when(artifact.has_win_path(), 0.20, "no win condition"),
        Check::when(!artifact.controls().is_empty(), 0.15, "no controls defined"),
        Check::when(
            !artifact.palette().is_empty() || artifact.has_background(),
            0.15,
            "no visual identity (palette or background)",
        ),
    ]
}

fn playability_checks(artifact: &impl ArtifactView) -> Vec<Check> {
    let rules = artifact.rules();
    let fires_at_start = |action: ActionKind| {
        rules
            .iter()
            .any(|r| r.condition == ConditionKind::Start && r.action == action)
    };
    let reachable_win = rules
        .iter()
        .any(|r| r.action == ActionKind::Win && r.condition != ConditionKind::Start);

    let complexity = match rules.len() {
        n if SWEET_SPOT_RULES.contains(&n) => Check::pass(0.15),
        0 => Check::fail(0.15, "no rules to play with"),
        n if n < *SWEET_SPOT_RULES.start() => Check::partial(
            0.15,
            n as f64 / *SWEET_SPOT_RULES.start() as f64,
            format!("only {n} rules, game may be too simple"),
        ),
        n => Check::partial(
            0.15,
            1.0 - (n - *SWEET_SPOT_RULES.end()) as f64 / *SWEET_SPOT_RULES.end() as f64,
            format!("{n} rules, game may be too complex"),
        ),
    };

    let time_limit = match artifact.time_limit_secs() {
        None => Check::pass(0.15),
        Some(t) if SANE_TIME_LIMIT_SECS.contains(&t) => Check::pass(0.15),
        Some(t) if t <= 0.0 => Check::fail(0.15, format!("time limit {t}s is not positive")),
        Some(t) => Check::fail(0.15, format!("time limit {t}s outside 5..=120s")),
    };

    vec![
        Check::when(reachable_win, 0.25, "win is only reachable at start or not at all"),
        Check::when(
            artifact.has_lose_path() || artifact.time_limit_secs().is_some(),
            0.15,
            "no failure condition (lose rule or time limit)",
        ),
        Check::when(!fires_at_start(ActionKind::Lose), 0.20, "game is lost at start"),
        Check::when(!fires_at_start(ActionKind::Win), 0.10, "game is won at start"),
        complexity,
        time_limit,
    ]
}

fn satisfaction_checks(artifact: &impl ArtifactView) -> Vec<Check> {
    let rules = artifact.rules();
    let has_feedback = rules.iter().any(|r| {
        matches!(
            r.action,
            ActionKind::AddScore | ActionKind::PlaySound | ActionKind::ChangeSpeed
        )
    });
    let has_sound =
        artifact.sound_count() > 0 || rules.iter().any(|r| r.action == ActionKind::PlaySound);
    let has_animation = artifact.objects().iter().any(|o| o.animated);

    let difficulty = match artifact.difficulty() {
        None => Check::partial(0.25, 0.5, "difficulty not reported"),
        Some(d) if !(0.0..=1.0).contains(&d) => {
            Check::fail(0.25, format!("difficulty {d} outside 0..=1"))
        }
        Some(d) if COMFORTABLE_DIFFICULTY.contains(&d) => Check::pass(0.25),
        Some(d) => Check::fail(0.25, format!("difficulty {d:.2} outside comfortable band")),
    };

    vec![
        Check::when(has_feedback, 0.30, "no feedback actions"),
        Check::when(has_sound, 0.25, "no sound"),
        Check::when(has_animation, 0.20, "no animation"),
        difficulty,
    ]
}
