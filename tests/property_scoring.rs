//! Property tests for distances, scoring bounds and controller invariants.

mod common;

use arcadia::domain::models::{
    ActionKind, AdaptiveStandards, ConditionKind, ControlKind, FeatureVector, GameObject,
    GameStructure, Rule, StandardField, FEATURE_DIMENSION,
};
use arcadia::services::{
    DiversityAnalyzer, ModeSelector, Portfolio, QualityScorer, StatisticsSnapshot,
    ThresholdController,
};
use proptest::prelude::*;

fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    prop::collection::vec(0.0..=1.0_f64, FEATURE_DIMENSION)
        .prop_map(|values| FeatureVector::from_slice(&values))
}

fn rule() -> impl Strategy<Value = Rule> {
    (
        prop::sample::select(ConditionKind::ALL.to_vec()),
        prop::sample::select(ActionKind::ALL.to_vec()),
    )
        .prop_map(|(condition, action)| Rule::new(condition, action))
}

fn structure() -> impl Strategy<Value = GameStructure> {
    (
        prop::option::of("[A-Z][a-z]{2,10}"),
        prop::collection::vec(rule(), 0..14),
        0usize..6,
        prop::collection::vec(prop::sample::select(ControlKind::ALL.to_vec()), 0..3),
        prop::option::of(-10.0..200.0_f64),
        prop::option::of(-0.5..1.5_f64),
        any::<bool>(),
    )
        .prop_map(
            |(title, rules, object_count, controls, time_limit, difficulty, animated)| {
                GameStructure {
                    title,
                    genre: Some("puzzle".into()),
                    mechanic: Some("match".into()),
                    rules,
                    objects: (0..object_count)
                        .map(|i| GameObject {
                            kind: format!("obj{i}"),
                            has_sprite: i % 2 == 0,
                            animated,
                            moving: i % 3 == 0,
                            physics: false,
                        })
                        .collect(),
                    palette: vec!["#336699".into()],
                    background: None,
                    time_limit_secs: time_limit,
                    controls,
                    difficulty,
                    session_length_secs: None,
                }
            },
        )
}

fn snapshot() -> impl Strategy<Value = StatisticsSnapshot> {
    (0.0..=1.0_f64, 0.0..=100.0_f64, 0.0..=1.0_f64, 0usize..60).prop_map(
        |(pass_rate, median_total, mean_diversity, sample_count)| StatisticsSnapshot {
            pass_rate,
            median_total,
            mean_diversity,
            exploration_ratio: 0.3,
            sample_count,
        },
    )
}

proptest! {
    #[test]
    fn prop_distance_is_a_metric(a in feature_vector(), b in feature_vector()) {
        prop_assert!(a.distance(&a).abs() < 1e-12);
        prop_assert!((a.distance(&b) - b.distance(&a)).abs() < 1e-12);
        prop_assert!(a.distance(&b) >= 0.0);
        prop_assert!(a.distance(&b) <= FeatureVector::max_distance() + 1e-9);
    }

    #[test]
    fn prop_empty_portfolio_is_maximally_diverse(v in feature_vector()) {
        let analysis = DiversityAnalyzer::default().analyze(&v, &Portfolio::new(2.5));
        prop_assert!((analysis.score - 1.0).abs() < f64::EPSILON);
        prop_assert!(analysis.density_penalty.abs() < f64::EPSILON);
        prop_assert!((analysis.gap_filling_score - 1.0).abs() < f64::EPSILON);
        prop_assert!((analysis.balance_contribution - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn prop_analysis_stays_in_range(
        members in prop::collection::vec(feature_vector(), 1..12),
        v in feature_vector(),
    ) {
        let scorer = QualityScorer::default();
        let standards = AdaptiveStandards::default();
        let mut portfolio = Portfolio::new(2.5);
        for (i, features) in members.into_iter().enumerate() {
            let mut candidate = common::candidate(common::polished_structure(&format!("m{i}")));
            candidate.features = features;
            let eval = scorer.evaluate(&candidate, &portfolio, &standards);
            portfolio.append(candidate, eval);
        }

        let analysis = scorer.analyzer().analyze(&v, &portfolio);
        prop_assert!((0.0..=1.0).contains(&analysis.score));
        prop_assert!((0.0..=1.0).contains(&analysis.density_penalty));
        prop_assert!((0.0..=1.0).contains(&analysis.gap_filling_score));
        prop_assert!((-0.5..=0.5).contains(&analysis.balance_contribution));
        prop_assert!(analysis.nearest_distance <= analysis.average_distance + 1e-9);
        prop_assert!(portfolio.statistics_consistent());
    }

    #[test]
    fn prop_scores_are_bounded_and_critical_fails(s in structure(), threshold in 0.0..=100.0_f64) {
        let scorer = QualityScorer::default();
        let standards = AdaptiveStandards::new(
            threshold.clamp(40.0, 85.0),
            0.3,
            arcadia::domain::models::ControllerConfig::default().bounds(),
        );
        let candidate = common::candidate(s);
        let eval = scorer.evaluate(&candidate, &Portfolio::new(2.5), &standards);

        prop_assert!((0.0..=50.0).contains(&eval.relative.subtotal));
        prop_assert!((0.0..=50.0).contains(&eval.absolute.subtotal));
        prop_assert!(eval.absolute.basic_quality <= 20.0);
        prop_assert!(eval.absolute.playability <= 20.0);
        prop_assert!(eval.absolute.predicted_satisfaction <= 10.0);
        prop_assert!((eval.total - (eval.relative.subtotal + eval.absolute.subtotal)).abs() < 1e-9);
        if eval.has_critical_violation() {
            prop_assert!(!eval.passed);
        } else {
            prop_assert_eq!(eval.passed, eval.total >= eval.threshold);
        }
    }

    #[test]
    fn prop_controller_respects_bounds(snapshots in prop::collection::vec(snapshot(), 1..40)) {
        let controller = ThresholdController::default();
        let mut standards = controller.initial_standards();
        let bounds = *standards.bounds();

        for snap in &snapshots {
            let before = standards.history().len();
            let adjustments = controller.adjust(&mut standards, snap);

            prop_assert_eq!(standards.history().len(), before + adjustments.len());
            let threshold_entries = adjustments
                .iter()
                .filter(|a| a.field == StandardField::QualityThreshold)
                .count();
            let epsilon_entries = adjustments
                .iter()
                .filter(|a| a.field == StandardField::Epsilon)
                .count();
            prop_assert!(threshold_entries <= 1 && epsilon_entries <= 1);
            for adj in &adjustments {
                prop_assert!((adj.new_value - adj.old_value).abs() > 0.0);
            }

            prop_assert!(standards.quality_threshold() >= bounds.min_threshold);
            prop_assert!(standards.quality_threshold() <= bounds.max_threshold);
            prop_assert!(standards.epsilon() >= bounds.epsilon_min);
            prop_assert!(standards.epsilon() <= bounds.epsilon_max);
        }
    }

    #[test]
    fn prop_epsilon_extremes_pick_a_branch(seed in any::<u64>()) {
        let mut selector = ModeSelector::new(Some(seed), vec!["genre:rhythm".into()]);
        prop_assert!(!selector.select_mode(0.0, &[]).is_exploration());
        prop_assert!(selector.select_mode(1.0, &[]).is_exploration());
        prop_assert_eq!(selector.exploration_count(), 1);
        prop_assert_eq!(selector.exploitation_count(), 1);
    }
}
