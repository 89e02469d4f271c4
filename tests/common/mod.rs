//! Common test utilities for integration tests
//!
//! Shared fixtures for building artifacts, candidates and offline
//! configurations.

#![allow(dead_code)]

use arcadia::domain::models::{
    ActionKind, Candidate, CandidateMetrics, ConditionKind, Config, ControlKind,
    ControllerConfig, GameArtifact, GameObject, GameStructure, GenerationMode, RetryConfig, Rule,
    StudioConfig,
};
use arcadia::services::FeatureVectorizer;

/// A structure that earns the full absolute score.
pub fn polished_structure(title: &str) -> GameStructure {
    GameStructure {
        title: Some(title.to_string()),
        genre: Some("arcade".into()),
        mechanic: Some("collect".into()),
        rules: vec![
            Rule::new(ConditionKind::Tap, ActionKind::Move),
            Rule::new(ConditionKind::Collision, ActionKind::AddScore),
            Rule::new(ConditionKind::ScoreReached, ActionKind::Win),
            Rule::new(ConditionKind::OutOfBounds, ActionKind::Lose),
            Rule::new(ConditionKind::Collision, ActionKind::PlaySound),
        ],
        objects: vec![GameObject {
            kind: "star".into(),
            has_sprite: true,
            animated: true,
            moving: true,
            physics: false,
        }],
        palette: vec!["#ffcc00".into(), "#202040".into()],
        background: Some("night".into()),
        time_limit_secs: Some(30.0),
        controls: vec![ControlKind::Tap],
        difficulty: Some(0.5),
        session_length_secs: Some(30.0),
    }
}

/// Vectorize `structure` and wrap it as an exploitation candidate.
pub fn candidate(structure: GameStructure) -> Candidate {
    let artifact = GameArtifact::new(structure);
    let features = FeatureVectorizer::new().vectorize(&artifact);
    Candidate::new(
        artifact,
        features,
        GenerationMode::default(),
        CandidateMetrics::default(),
    )
}

/// Config for the procedural studio with no injected failures or latency and
/// millisecond retry backoff.
pub fn offline_config(seed: u64) -> Config {
    Config {
        controller: ControllerConfig {
            selector_seed: Some(seed),
            ..ControllerConfig::default()
        },
        studio: StudioConfig {
            seed: Some(seed),
            failure_rate: 0.0,
            outage_rate: 0.0,
            min_self_reported_quality: 0.0,
            simulated_latency_ms: 0,
        },
        retry: RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        },
        ..Config::default()
    }
}

/// Setup test logging
///
/// Initializes a tracing subscriber that writes through the test harness.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
