//! Artifact → feature vector embedding.
//!
//! Every feature is computed independently and clamped into [0,1]. Ratios
//! whose denominator is empty fall back to the neutral 0.5; boolean features
//! are exactly 0 or 1.

use std::collections::HashSet;

use crate::domain::models::{
    clamp_unit, ActionKind, ArtifactView, ConditionKind, ControlKind, FeatureVector, Genre,
    Mechanic, GROUP_SIZE,
};

/// Neutral value for absent continuous data.
const NEUTRAL: f64 = 0.5;

/// Object count treated as a full screen.
const OBJECT_SATURATION: f64 = 10.0;
/// Rule count treated as maximal complexity.
const RULE_SATURATION: f64 = 12.0;
const PALETTE_SATURATION: f64 = 8.0;
const IMAGE_SATURATION: f64 = 5.0;
const SOUND_SATURATION: f64 = 5.0;
const CONTROL_SATURATION: f64 = 5.0;
/// Time limit at which time pressure reaches zero.
const RELAXED_TIME_LIMIT_SECS: f64 = 120.0;
const LONG_SESSION_SECS: f64 = 300.0;

/// Coordinate of a genre in its feature dimension.
pub fn genre_coordinate(genre: Genre) -> f64 {
    category_coordinate(genre.index(), Genre::ALL.len())
}

/// Coordinate of a mechanic in its feature dimension.
pub fn mechanic_coordinate(mechanic: Mechanic) -> f64 {
    category_coordinate(mechanic.index(), Mechanic::ALL.len())
}

/// `index / (bucket_count - 1)`; a single bucket sits at 0.
pub fn category_coordinate(index: usize, bucket_count: usize) -> f64 {
    if bucket_count < 2 {
        return 0.0;
    }
    clamp_unit(index as f64 / (bucket_count - 1) as f64)
}

/// Pure, deterministic embedding of artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureVectorizer;

impl FeatureVectorizer {
    /// Stateless vectorizer.
    pub const fn new() -> Self {
        Self
    }

    /// Embed one artifact into the 40-dimension feature space.
    pub fn vectorize(&self, artifact: &impl ArtifactView) -> FeatureVector {
        let mut vector = FeatureVector {
            gameplay: gameplay_features(artifact),
            visual: visual_features(artifact),
            rules: rule_features(artifact),
            interaction: interaction_features(artifact),
        };
        for group in [
            &mut vector.gameplay,
            &mut vector.visual,
            &mut vector.rules,
            &mut vector.interaction,
        ] {
            for value in group.iter_mut() {
                *value = clamp_unit(*value);
            }
        }
        vector
    }
}

fn gameplay_features(artifact: &impl ArtifactView) -> [f64; GROUP_SIZE] {
    let objects = artifact.objects();
    let rules = artifact.rules();
    let time_limit = artifact.time_limit_secs().filter(|t| *t > 0.0);

    [
        objects.len() as f64 / OBJECT_SATURATION,
        ratio(objects.iter().filter(|o| o.moving).count(), objects.len()),
        ratio(objects.iter().filter(|o| o.physics).count(), objects.len()),
        flag(time_limit.is_some()),
        time_limit.map_or(NEUTRAL, |t| 1.0 - t / RELAXED_TIME_LIMIT_SECS),
        flag(rules
            .iter()
            .any(|r| r.condition == ConditionKind::ScoreReached)),
        artifact.difficulty().unwrap_or(NEUTRAL),
        ratio(
            rules
                .iter()
                .filter(|r| matches!(r.action, ActionKind::Spawn | ActionKind::Destroy))
                .count(),
            rules.len(),
        ),
        artifact
            .session_length_secs()
            .filter(|s| *s >= 0.0)
            .map_or(NEUTRAL, |s| s / LONG_SESSION_SECS),
        genre_coordinate(artifact.genre()),
    ]
}

fn visual_features(artifact: &impl ArtifactView) -> [f64; GROUP_SIZE] {
    let objects = artifact.objects();
    let colors: Vec<Rgb> = artifact
        .palette()
        .iter()
        .filter_map(|hex| Rgb::parse(hex))
        .collect();
    let luminances: Vec<f64> = colors.iter().map(Rgb::luminance).collect();

    let warmth = mean(colors.iter().map(Rgb::warmth)).unwrap_or(NEUTRAL);
    let brightness = mean(luminances.iter().copied()).unwrap_or(NEUTRAL);
    let contrast = if luminances.is_empty() {
        NEUTRAL
    } else {
        let max = luminances.iter().copied().fold(f64::MIN, f64::max);
        let min = luminances.iter().copied().fold(f64::MAX, f64::min);
        max - min
    };
    let kinds: HashSet<&str> = objects.iter().map(|o| o.kind.trim()).collect();

    [
        ratio(objects.iter().filter(|o| o.has_sprite).count(), objects.len()),
        ratio(objects.iter().filter(|o| o.animated).count(), objects.len()),
        artifact.palette().len() as f64 / PALETTE_SATURATION,
        flag(artifact.has_background()),
        artifact.image_count() as f64 / IMAGE_SATURATION,
        warmth,
        brightness,
        contrast,
        ratio(kinds.len(), objects.len()),
        artifact.sound_count() as f64 / SOUND_SATURATION,
    ]
}

fn rule_features(artifact: &impl ArtifactView) -> [f64; GROUP_SIZE] {
    let rules = artifact.rules();
    let count_action = |kind: ActionKind| rules.iter().filter(|r| r.action == kind).count();
    let count_condition =
        |kind: ConditionKind| rules.iter().filter(|r| r.condition == kind).count();

    let conditions: HashSet<ConditionKind> = rules.iter().map(|r| r.condition).collect();
    let actions: HashSet<ActionKind> = rules.iter().map(|r| r.action).collect();
    let pairs: HashSet<(ConditionKind, ActionKind)> =
        rules.iter().map(|r| (r.condition, r.action)).collect();

    let variety = |distinct: usize, buckets: usize| {
        if rules.is_empty() {
            NEUTRAL
        } else {
            distinct as f64 / buckets as f64
        }
    };
    let redundancy = if rules.is_empty() {
        NEUTRAL
    } else {
        1.0 - pairs.len() as f64 / rules.len() as f64
    };

    [
        rules.len() as f64 / RULE_SATURATION,
        variety(conditions.len(), ConditionKind::ALL.len()),
        variety(actions.len(), ActionKind::ALL.len()),
        flag(artifact.has_win_path()),
        flag(artifact.has_lose_path()),
        ratio(count_action(ActionKind::Win), rules.len()),
        ratio(count_action(ActionKind::Lose), rules.len()),
        ratio(count_condition(ConditionKind::Timer), rules.len()),
        ratio(count_condition(ConditionKind::Collision), rules.len()),
        redundancy,
    ]
}

fn interaction_features(artifact: &impl ArtifactView) -> [f64; GROUP_SIZE] {
    let controls = artifact.controls();
    let rules = artifact.rules();
    let has = |kind: ControlKind| flag(controls.contains(&kind));
    let known: HashSet<ControlKind> = controls
        .iter()
        .copied()
        .filter(|c| *c != ControlKind::Unknown)
        .collect();

    let input_rules: Vec<_> = rules.iter().filter(|r| r.condition.is_input()).collect();
    let decisive = input_rules
        .iter()
        .filter(|r| {
            matches!(
                r.action,
                ActionKind::Win | ActionKind::Lose | ActionKind::AddScore
            )
        })
        .count();
    let feedback = rules
        .iter()
        .filter(|r| {
            matches!(
                r.action,
                ActionKind::AddScore | ActionKind::PlaySound | ActionKind::ChangeSpeed
            )
        })
        .count();

    [
        has(ControlKind::Tap),
        has(ControlKind::Swipe),
        has(ControlKind::Hold),
        has(ControlKind::Drag),
        has(ControlKind::Tilt),
        known.len() as f64 / CONTROL_SATURATION,
        ratio(input_rules.len(), rules.len()),
        ratio(decisive, input_rules.len()),
        ratio(feedback, rules.len()),
        mechanic_coordinate(artifact.mechanic()),
    ]
}

const fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        NEUTRAL
    } else {
        part as f64 / whole as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: f64,
    g: f64,
    b: f64,
}

impl Rgb {
    /// Parse `#rrggbb` or `#rgb`; anything else is ignored.
    fn parse(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
        match digits.len() {
            6 => Some(Self {
                r: channel(digits.get(0..2)?)?,
                g: channel(digits.get(2..4)?)?,
                b: channel(digits.get(4..6)?)?,
            }),
            3 => {
                let short = |i: usize| -> Option<f64> {
                    let c = digits.get(i..=i)?;
                    channel(&format!("{c}{c}"))
                };
                Some(Self {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => None,
        }
    }

    fn luminance(&self) -> f64 {
        (0.299 * self.r + 0.587 * self.g + 0.114 * self.b) / 255.0
    }

    /// 1 for pure red, 0 for pure blue, 0.5 for neutrals.
    fn warmth(&self) -> f64 {
        (self.r - self.b) / 255.0 * 0.5 + 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        GameArtifact, GameObject, GameStructure, Rule, FEATURE_DIMENSION,
    };

    fn sample_structure() -> GameStructure {
        GameStructure {
            title: Some("Meteor Dash".into()),
            genre: Some("action".into()),
            mechanic: Some("dodge".into()),
            rules: vec![
                Rule::new(ConditionKind::Tap, ActionKind::Move),
                Rule::new(ConditionKind::Collision, ActionKind::Lose),
                Rule::new(ConditionKind::Timer, ActionKind::Win),
                Rule::new(ConditionKind::Timer, ActionKind::Spawn),
            ],
            objects: vec![
                GameObject {
                    kind: "ship".into(),
                    has_sprite: true,
                    animated: true,
                    moving: true,
                    physics: false,
                },
                GameObject {
                    kind: "meteor".into(),
                    has_sprite: true,
                    animated: false,
                    moving: true,
                    physics: true,
                },
            ],
            palette: vec!["#ff0000".into(), "#000".into()],
            background: Some("space".into()),
            time_limit_secs: Some(30.0),
            controls: vec![ControlKind::Tap],
            difficulty: Some(0.4),
            session_length_secs: Some(30.0),
        }
    }

    #[test]
    fn test_every_component_in_unit_range() {
        let vector = FeatureVectorizer::new().vectorize(&GameArtifact::new(sample_structure()));
        assert_eq!(vector.to_vec().len(), FEATURE_DIMENSION);
        assert!(vector.iter().all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let artifact = GameArtifact::new(sample_structure());
        let vectorizer = FeatureVectorizer::new();
        assert_eq!(vectorizer.vectorize(&artifact), vectorizer.vectorize(&artifact));
    }

    #[test]
    fn test_empty_artifact_uses_neutral_defaults() {
        let vector = FeatureVectorizer::new().vectorize(&GameArtifact::new(GameStructure::default()));
        // moving ratio with no objects
        assert!((vector.gameplay[1] - 0.5).abs() < f64::EPSILON);
        // has time limit
        assert!(vector.gameplay[3].abs() < f64::EPSILON);
        // difficulty
        assert!((vector.gameplay[6] - 0.5).abs() < f64::EPSILON);
        // has win / has lose
        assert!(vector.rules[3].abs() < f64::EPSILON);
        assert!(vector.rules[4].abs() < f64::EPSILON);
        // warmth with no palette
        assert!((vector.visual[5] - 0.5).abs() < f64::EPSILON);
        // genre and mechanic coordinates of Other
        assert!((vector.gameplay[9] - 1.0).abs() < f64::EPSILON);
        assert!((vector.interaction[9] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_structural_signals() {
        let vector = FeatureVectorizer::new().vectorize(&GameArtifact::new(sample_structure()));
        assert!((vector.gameplay[1] - 1.0).abs() < f64::EPSILON);
        assert!((vector.gameplay[2] - 0.5).abs() < f64::EPSILON);
        assert!((vector.gameplay[3] - 1.0).abs() < f64::EPSILON);
        assert!((vector.gameplay[4] - 0.75).abs() < 1e-9);
        assert!(vector.gameplay[9].abs() < f64::EPSILON);
        assert!((vector.rules[3] - 1.0).abs() < f64::EPSILON);
        assert!((vector.rules[7] - 0.5).abs() < f64::EPSILON);
        assert!((vector.interaction[0] - 1.0).abs() < f64::EPSILON);
        assert!(vector.interaction[1].abs() < f64::EPSILON);
        assert!((vector.interaction[6] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_palette_signals() {
        let vector = FeatureVectorizer::new().vectorize(&GameArtifact::new(sample_structure()));
        // red is warm, black is neutral
        assert!((vector.visual[5] - 0.75).abs() < 1e-9);
        assert!((vector.visual[7] - 0.299).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_colors_are_ignored() {
        let mut structure = sample_structure();
        structure.palette = vec!["teal".into(), "#zzzzzz".into()];
        let vector = FeatureVectorizer::new().vectorize(&GameArtifact::new(structure));
        assert!((vector.visual[6] - 0.5).abs() < f64::EPSILON);
        assert!((vector.visual[2] - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_coordinates() {
        assert!(genre_coordinate(Genre::Action).abs() < f64::EPSILON);
        assert!((genre_coordinate(Genre::Other) - 1.0).abs() < f64::EPSILON);
        assert!((mechanic_coordinate(Mechanic::Collect) - 2.0 / 7.0).abs() < 1e-12);
        assert!(category_coordinate(0, 1).abs() < f64::EPSILON);
    }
}
