//! Narrow view of a generated game.
//!
//! The pipeline only reads the structural signals declared here. Everything
//! else a generator produces travels in the opaque JSON payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $(
                #[doc = concat!("Label `", $label, "`.")]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in canonical order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Stable lowercase label.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Parse a label, mapping anything unrecognised to the default bucket.
            pub fn from_label(label: &str) -> Self {
                let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
                match normalized.as_str() {
                    $($label => Self::$variant,)+
                    _ => Self::$default,
                }
            }

            /// Position in [`Self::ALL`].
            pub fn index(self) -> usize {
                Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from_label(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    /// Portfolio genre bucket.
    Genre {
        Action => "action",
        Puzzle => "puzzle",
        Arcade => "arcade",
        Reflex => "reflex",
        Rhythm => "rhythm",
        Strategy => "strategy",
        Sports => "sports",
        Other => "other",
    } default Other
}

labelled_enum! {
    /// Core mechanic bucket.
    Mechanic {
        Tap => "tap",
        Dodge => "dodge",
        Collect => "collect",
        Match => "match",
        Timing => "timing",
        Aim => "aim",
        Balance => "balance",
        Other => "other",
    } default Other
}

labelled_enum! {
    /// What triggers a rule.
    ConditionKind {
        Start => "start",
        Tap => "tap",
        Swipe => "swipe",
        Hold => "hold",
        Collision => "collision",
        Timer => "timer",
        ScoreReached => "score_reached",
        OutOfBounds => "out_of_bounds",
        Counter => "counter",
        Unknown => "unknown",
    } default Unknown
}

labelled_enum! {
    /// What a rule does when it fires.
    ActionKind {
        Win => "win",
        Lose => "lose",
        AddScore => "add_score",
        Spawn => "spawn",
        Destroy => "destroy",
        Move => "move",
        PlaySound => "play_sound",
        ChangeSpeed => "change_speed",
        Unknown => "unknown",
    } default Unknown
}

labelled_enum! {
    /// Player input scheme.
    ControlKind {
        Tap => "tap",
        Swipe => "swipe",
        Hold => "hold",
        Drag => "drag",
        Tilt => "tilt",
        Unknown => "unknown",
    } default Unknown
}

impl ConditionKind {
    /// Conditions raised directly by player input.
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Tap | Self::Swipe | Self::Hold)
    }
}

/// A single condition → action rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Trigger.
    pub condition: ConditionKind,
    /// Effect.
    pub action: ActionKind,
}

impl Rule {
    /// Rule firing `action` on `condition`.
    pub const fn new(condition: ConditionKind, action: ActionKind) -> Self {
        Self { condition, action }
    }
}

/// An on-screen object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    /// Free-form role such as `player` or `enemy`.
    pub kind: String,
    /// Drawn from an image asset rather than a primitive.
    #[serde(default)]
    pub has_sprite: bool,
    /// Sprite animates.
    #[serde(default)]
    pub animated: bool,
    /// Object moves on its own.
    #[serde(default)]
    pub moving: bool,
    /// Object takes part in physics.
    #[serde(default)]
    pub physics: bool,
}

/// Structural description returned by the content generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStructure {
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text genre, bucketed by [`Genre::from_label`].
    #[serde(default)]
    pub genre: Option<String>,
    /// Free-text mechanic, bucketed by [`Mechanic::from_label`].
    #[serde(default)]
    pub mechanic: Option<String>,
    /// Game logic.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// On-screen objects.
    #[serde(default)]
    pub objects: Vec<GameObject>,
    /// Hex colors such as `#ff8800`.
    #[serde(default)]
    pub palette: Vec<String>,
    /// Background color or image reference.
    #[serde(default)]
    pub background: Option<String>,
    /// Round limit, if the game is timed.
    #[serde(default)]
    pub time_limit_secs: Option<f64>,
    /// Input schemes the game accepts.
    #[serde(default)]
    pub controls: Vec<ControlKind>,
    /// Self-reported difficulty in [0,1].
    #[serde(default)]
    pub difficulty: Option<f64>,
    /// Expected length of one play session.
    #[serde(default)]
    pub session_length_secs: Option<f64>,
}

/// Kind of generated asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Sprite or background image.
    Image,
    /// Sound effect or music.
    Sound,
}

/// Opaque reference to an asset produced by an asset generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset id.
    pub id: Uuid,
    /// Image or sound.
    pub kind: AssetKind,
    /// Where the generator stored it.
    pub uri: String,
}

impl AssetRef {
    /// Reference with a fresh id.
    pub fn new(kind: AssetKind, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            uri: uri.into(),
        }
    }
}

/// A complete generated artifact: typed structure, opaque payload and assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameArtifact {
    /// Fields the pipeline reads.
    pub structure: GameStructure,
    /// Everything else the generator produced, passed through untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Generated images and sounds.
    #[serde(default)]
    pub assets: Vec<AssetRef>,
}

impl GameArtifact {
    /// Artifact with no payload and no assets.
    pub fn new(structure: GameStructure) -> Self {
        Self {
            structure,
            payload: serde_json::Value::Null,
            assets: Vec::new(),
        }
    }

    /// Attach generated assets.
    pub fn with_assets(mut self, assets: Vec<AssetRef>) -> Self {
        self.assets = assets;
        self
    }

    /// Attach the opaque payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Accessors the vectorizer and scorer need from an artifact.
pub trait ArtifactView {
    /// Trimmed title, `None` when blank.
    fn title(&self) -> Option<&str>;
    /// Genre bucket.
    fn genre(&self) -> Genre;
    /// Mechanic bucket.
    fn mechanic(&self) -> Mechanic;
    /// Game rules.
    fn rules(&self) -> &[Rule];
    /// On-screen objects.
    fn objects(&self) -> &[GameObject];
    /// Palette colors.
    fn palette(&self) -> &[String];
    /// Whether a background is set.
    fn has_background(&self) -> bool;
    /// Round limit in seconds.
    fn time_limit_secs(&self) -> Option<f64>;
    /// Input schemes.
    fn controls(&self) -> &[ControlKind];
    /// Generated images.
    fn image_count(&self) -> usize;
    /// Generated sounds.
    fn sound_count(&self) -> usize;
    /// Self-reported difficulty.
    fn difficulty(&self) -> Option<f64>;
    /// Expected session length.
    fn session_length_secs(&self) -> Option<f64>;

    /// Some rule wins the game.
    fn has_win_path(&self) -> bool {
        self.rules().iter().any(|r| r.action == ActionKind::Win)
    }

    /// Some rule loses the game.
    fn has_lose_path(&self) -> bool {
        self.rules().iter().any(|r| r.action == ActionKind::Lose)
    }
}

impl ArtifactView for GameArtifact {
    fn title(&self) -> Option<&str> {
        self.structure
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn genre(&self) -> Genre {
        self.structure
            .genre
            .as_deref()
            .map_or(Genre::Other, Genre::from_label)
    }

    fn mechanic(&self) -> Mechanic {
        self.structure
            .mechanic
            .as_deref()
            .map_or(Mechanic::Other, Mechanic::from_label)
    }

    fn rules(&self) -> &[Rule] {
        &self.structure.rules
    }

    fn objects(&self) -> &[GameObject] {
        &self.structure.objects
    }

    fn palette(&self) -> &[String] {
        &self.structure.palette
    }

    fn has_background(&self) -> bool {
        self.structure
            .background
            .as_deref()
            .is_some_and(|b| !b.trim().is_empty())
    }

    fn time_limit_secs(&self) -> Option<f64> {
        self.structure.time_limit_secs.filter(|t| t.is_finite())
    }

    fn controls(&self) -> &[ControlKind] {
        &self.structure.controls
    }

    fn image_count(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| a.kind == AssetKind::Image)
            .count()
    }

    fn sound_count(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| a.kind == AssetKind::Sound)
            .count()
    }

    fn difficulty(&self) -> Option<f64> {
        self.structure.difficulty.filter(|d| d.is_finite())
    }

    fn session_length_secs(&self) -> Option<f64> {
        self.structure.session_length_secs.filter(|s| s.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_labels_fall_into_default_bucket() {
        assert_eq!(Genre::from_label("Action"), Genre::Action);
        assert_eq!(Genre::from_label("space opera"), Genre::Other);
        assert_eq!(Mechanic::from_label(""), Mechanic::Other);
        assert_eq!(ConditionKind::from_label("score-reached"), ConditionKind::ScoreReached);
        assert_eq!(ActionKind::from_label("explode"), ActionKind::Unknown);
    }

    #[test]
    fn test_rule_deserializes_unknown_kinds() {
        let rule: Rule =
            serde_json::from_str(r#"{"condition":"shake","action":"win"}"#).unwrap();
        assert_eq!(rule.condition, ConditionKind::Unknown);
        assert_eq!(rule.action, ActionKind::Win);

        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r#"{"condition":"unknown","action":"win"}"#);
    }

    #[test]
    fn test_missing_genre_maps_to_other() {
        let artifact = GameArtifact::new(GameStructure::default());
        assert_eq!(artifact.genre(), Genre::Other);
        assert_eq!(artifact.mechanic(), Mechanic::Other);
        assert!(artifact.title().is_none());
        assert!(!artifact.has_win_path());
    }

    #[test]
    fn test_asset_counts_by_kind() {
        let artifact = GameArtifact::new(GameStructure::default()).with_assets(vec![
            AssetRef::new(AssetKind::Image, "mem://a.png"),
            AssetRef::new(AssetKind::Image, "mem://b.png"),
            AssetRef::new(AssetKind::Sound, "mem://c.wav"),
        ]);
        assert_eq!(artifact.image_count(), 2);
        assert_eq!(artifact.sound_count(), 1);
    }

    #[test]
    fn test_category_index_is_stable() {
        assert_eq!(Genre::Action.index(), 0);
        assert_eq!(Genre::Other.index(), Genre::ALL.len() - 1);
        assert_eq!(Mechanic::Balance.index(), 6);
    }
}
