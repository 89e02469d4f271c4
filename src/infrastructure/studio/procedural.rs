//! Offline studio that assembles games from procedural building blocks.
//!
//! Stands in for the AI-backed collaborators so the whole pipeline can run
//! without network access. Exploration targets are honoured, titles in the
//! avoid list are reported as duplicates, and failures are injected at the
//! configured rates.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::GenerationError;
use crate::domain::models::{
    ActionKind, AssetKind, AssetRef, ConditionKind, ControlKind, GameObject, GameStructure,
    GeneratedContent, GenerationMode, Genre, IdeaSeed, Mechanic, PortfolioEntry, PublishReceipt,
    Rule, StudioConfig,
};
use crate::domain::ports::{AssetGenerator, ContentGenerator, IdeaGenerator, Publisher, Studio};

use super::retry::{RetryPolicy, RetryingIdeaGenerator};

const ADJECTIVES: &[&str] = &[
    "Neon", "Tiny", "Cosmic", "Pixel", "Turbo", "Lucky", "Silent", "Crimson", "Frozen", "Hyper",
    "Mellow", "Rapid",
];

const NOUNS: &[&str] = &[
    "Orbit", "Dash", "Garden", "Circuit", "Comet", "Lantern", "Reef", "Tower", "Pulse", "Maze",
    "Drift", "Harbor",
];

const OBJECT_KINDS: &[&str] = &[
    "player",
    "enemy",
    "coin",
    "platform",
    "projectile",
    "obstacle",
    "target",
];

/// Share of structures generated without a win rule.
const MISSING_WIN_RATE: f64 = 0.08;
/// Share of structures that lose on the start condition.
const LOSE_AT_START_RATE: f64 = 0.04;

/// Seedable procedural implementation of every studio port.
pub struct ProceduralStudio {
    config: StudioConfig,
    rng: Mutex<StdRng>,
    published: AtomicUsize,
}

impl ProceduralStudio {
    /// Studio drawing from `config`'s rates and seed.
    pub fn new(config: StudioConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            rng: Mutex::new(rng),
            published: AtomicUsize::new(0),
        }
    }

    /// Number of successful publishes so far.
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    /// Wire one shared instance into every port, with retries on the idea
    /// generator.
    pub fn into_studio(self: Arc<Self>, retry: RetryPolicy) -> Studio {
        let ideas = Arc::new(RetryingIdeaGenerator::new(self.clone(), retry));
        Studio::new(ideas, self.clone(), self.clone(), self.clone()).with_publisher(self)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T, GenerationError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GenerationError::Transient("studio rng lock poisoned".to_string()))?;
        Ok(f(&mut rng))
    }

    async fn simulate_latency(&self) {
        if self.config.simulated_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.simulated_latency_ms)).await;
        }
    }

    /// Roll the configured outage and failure rates for one call.
    fn inject_failure(&self, operation: &str) -> Result<(), GenerationError> {
        let outage_rate = self.config.outage_rate.clamp(0.0, 1.0);
        let failure_rate = self.config.failure_rate.clamp(0.0, 1.0);
        let (outage, failure) =
            self.with_rng(|rng| (rng.gen_bool(outage_rate), rng.gen_bool(failure_rate)))?;

        if outage {
            return Err(GenerationError::ServiceUnavailable(format!(
                "{operation} backend unavailable"
            )));
        }
        if failure {
            return Err(GenerationError::Transient(format!(
                "{operation} request timed out"
            )));
        }
        Ok(())
    }
}

/// Resolve an exploration target such as `genre:rhythm` into concrete
/// categories. Broad targets leave both open.
fn parse_target(target: Option<&str>) -> (Option<Genre>, Option<Mechanic>) {
    match target.and_then(|t| t.split_once(':')) {
        Some(("genre", label)) => (Some(Genre::from_label(label)), None),
        Some(("mechanic", label)) => (None, Some(Mechanic::from_label(label))),
        _ => (None, None),
    }
}

/// Categories the studio can produce; `Other` is never chosen on purpose.
fn concrete<T: Copy + PartialEq>(all: &[T], other: T) -> Vec<T> {
    all.iter().copied().filter(|v| *v != other).collect()
}

fn input_for(mechanic: Mechanic) -> (ConditionKind, ControlKind) {
    match mechanic {
        Mechanic::Dodge | Mechanic::Match => (ConditionKind::Swipe, ControlKind::Swipe),
        Mechanic::Collect => (ConditionKind::Tap, ControlKind::Drag),
        Mechanic::Aim => (ConditionKind::Hold, ControlKind::Drag),
        Mechanic::Balance => (ConditionKind::Hold, ControlKind::Tilt),
        Mechanic::Tap | Mechanic::Timing | Mechanic::Other => {
            (ConditionKind::Tap, ControlKind::Tap)
        }
    }
}

fn build_structure(seed: &IdeaSeed, rng: &mut StdRng) -> GameStructure {
    let mechanic = seed
        .mechanic
        .as_deref()
        .map_or(Mechanic::Other, Mechanic::from_label);
    let (input, control) = input_for(mechanic);

    let mut rules = vec![
        Rule::new(ConditionKind::Start, ActionKind::Spawn),
        Rule::new(input, ActionKind::Move),
        Rule::new(ConditionKind::Collision, ActionKind::AddScore),
    ];
    if rng.gen_bool(0.5) {
        rules.push(Rule::new(ConditionKind::Timer, ActionKind::Spawn));
    }
    if rng.gen_bool(0.4) {
        rules.push(Rule::new(ConditionKind::Counter, ActionKind::ChangeSpeed));
    }
    if !rng.gen_bool(MISSING_WIN_RATE) {
        rules.push(Rule::new(ConditionKind::ScoreReached, ActionKind::Win));
    }
    if rng.gen_bool(0.85) {
        let fail = if rng.gen_bool(0.5) {
            ConditionKind::Collision
        } else {
            ConditionKind::OutOfBounds
        };
        rules.push(Rule::new(fail, ActionKind::Lose));
    }
    if rng.gen_bool(LOSE_AT_START_RATE) {
        rules.push(Rule::new(ConditionKind::Start, ActionKind::Lose));
    }
    if rng.gen_bool(0.6) {
        rules.push(Rule::new(input, ActionKind::PlaySound));
    }

    let object_count = rng.gen_range(2..=6);
    let objects = (0..object_count)
        .map(|i| GameObject {
            kind: if i == 0 {
                "player".to_string()
            } else {
                OBJECT_KINDS.choose(rng).copied().unwrap_or("obstacle").to_string()
            },
            has_sprite: rng.gen_bool(0.8),
            animated: rng.gen_bool(0.5),
            moving: rng.gen_bool(0.6),
            physics: rng.gen_bool(0.3),
        })
        .collect();

    let palette = (0..rng.gen_range(3..=5))
        .map(|_| format!("#{:06x}", rng.gen_range(0..0x0100_0000_u32)))
        .collect();

    let mut controls = vec![control];
    if rng.gen_bool(0.25) {
        controls.push(ControlKind::Tap);
        controls.dedup();
    }

    GameStructure {
        title: Some(seed.title.clone()),
        genre: seed.genre.clone(),
        mechanic: seed.mechanic.clone(),
        rules,
        objects,
        palette,
        background: rng
            .gen_bool(0.8)
            .then(|| format!("#{:06x}", rng.gen_range(0..0x0100_0000_u32))),
        time_limit_secs: rng.gen_bool(0.8).then(|| rng.gen_range(10.0..90.0)),
        controls,
        difficulty: Some(rng.gen_range(0.15..0.85)),
        session_length_secs: Some(rng.gen_range(20.0..180.0)),
    }
}

#[async_trait]
impl IdeaGenerator for ProceduralStudio {
    async fn generate(
        &self,
        avoid: &[String],
        mode: &GenerationMode,
    ) -> Result<IdeaSeed, GenerationError> {
        self.simulate_latency().await;
        self.inject_failure("idea")?;

        let (target_genre, target_mechanic) = parse_target(mode.target());
        let genres = concrete(Genre::ALL, Genre::Other);
        let mechanics = concrete(Mechanic::ALL, Mechanic::Other);

        let (title, genre, mechanic, quality, tokens) = self.with_rng(|rng| {
            let title = format!(
                "{} {}",
                ADJECTIVES.choose(rng).copied().unwrap_or("Tiny"),
                NOUNS.choose(rng).copied().unwrap_or("Dash"),
            );
            let genre = target_genre
                .or_else(|| genres.choose(rng).copied())
                .unwrap_or(Genre::Other);
            let mechanic = target_mechanic
                .or_else(|| mechanics.choose(rng).copied())
                .unwrap_or(Mechanic::Other);
            (
                title,
                genre,
                mechanic,
                rng.gen_range(0.2..1.0),
                rng.gen_range(80_u64..200),
            )
        })?;

        if avoid.iter().any(|a| a.eq_ignore_ascii_case(&title)) {
            return Err(GenerationError::Duplicate(title));
        }
        if quality < self.config.min_self_reported_quality {
            return Err(GenerationError::BelowMinimumQuality {
                reported: quality,
                minimum: self.config.min_self_reported_quality,
            });
        }

        debug!(%title, %genre, %mechanic, mode = mode.label(), "idea generated");
        Ok(IdeaSeed {
            id: Uuid::new_v4(),
            pitch: format!("A {genre} game about {mechanic}: {title}"),
            title,
            genre: Some(genre.label().to_string()),
            mechanic: Some(mechanic.label().to_string()),
            self_reported_quality: quality,
            tokens_used: tokens,
        })
    }
}

#[async_trait]
impl ContentGenerator for ProceduralStudio {
    async fn generate_from_seed(
        &self,
        seed: &IdeaSeed,
        assets: &[AssetRef],
    ) -> Result<GeneratedContent, GenerationError> {
        self.simulate_latency().await;
        self.inject_failure("content")?;

        let (structure, tokens) =
            self.with_rng(|rng| (build_structure(seed, rng), rng.gen_range(400_u64..1200)))?;

        Ok(GeneratedContent {
            structure,
            payload: json!({
                "engine": "procedural",
                "seed_id": seed.id,
                "pitch": seed.pitch,
                "asset_count": assets.len(),
            }),
            tokens_used: tokens,
            cost_cents: tokens as f64 * 0.002,
        })
    }
}

#[async_trait]
impl AssetGenerator for ProceduralStudio {
    async fn generate(
        &self,
        seed: &IdeaSeed,
        kind: AssetKind,
    ) -> Result<Vec<AssetRef>, GenerationError> {
        self.simulate_latency().await;
        self.inject_failure("asset")?;

        let count = self.with_rng(|rng| match kind {
            AssetKind::Image => rng.gen_range(1..=4),
            AssetKind::Sound => rng.gen_range(0..=3),
        })?;
        let extension = match kind {
            AssetKind::Image => "png",
            AssetKind::Sound => "wav",
        };

        Ok((0..count)
            .map(|i| {
                AssetRef::new(
                    kind,
                    format!("procedural://{}/asset-{i}.{extension}", seed.id),
                )
            })
            .collect())
    }
}

#[async_trait]
impl Publisher for ProceduralStudio {
    async fn publish(&self, entry: &PortfolioEntry) -> Result<PublishReceipt, GenerationError> {
        self.inject_failure("publish")?;
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(PublishReceipt {
            success: true,
            external_id: Some(format!("arcadia-{:04}", entry.sequence)),
        })
    }
}
