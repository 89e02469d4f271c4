//! Fixed-dimension feature embedding of an artifact.

use serde::{Deserialize, Serialize};

/// Number of features in each group.
pub const GROUP_SIZE: usize = 10;

/// Total dimensionality of a [`FeatureVector`].
pub const FEATURE_DIMENSION: usize = GROUP_SIZE * 4;

/// Four groups of ten features, each in [0,1].
///
/// Groups are always concatenated in the order gameplay, visual, rules,
/// interaction, so any two vectors are comparable component by component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Genre, mechanic, pacing and difficulty signals.
    pub gameplay: [f64; GROUP_SIZE],
    /// Palette, objects and asset signals.
    pub visual: [f64; GROUP_SIZE],
    /// Rule structure signals.
    pub rules: [f64; GROUP_SIZE],
    /// Controls and feedback signals.
    pub interaction: [f64; GROUP_SIZE],
}

impl FeatureVector {
    /// Vector with every component set to `value` (clamped to [0,1]).
    pub fn uniform(value: f64) -> Self {
        let v = clamp_unit(value);
        Self {
            gameplay: [v; GROUP_SIZE],
            visual: [v; GROUP_SIZE],
            rules: [v; GROUP_SIZE],
            interaction: [v; GROUP_SIZE],
        }
    }

    /// Build from a flat slice in canonical order. Missing trailing components
    /// default to 0.5, extra components are ignored.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut flat = [0.5; FEATURE_DIMENSION];
        for (slot, value) in flat.iter_mut().zip(values) {
            *slot = clamp_unit(*value);
        }
        let mut vector = Self::uniform(0.5);
        vector.gameplay.copy_from_slice(&flat[0..GROUP_SIZE]);
        vector.visual.copy_from_slice(&flat[GROUP_SIZE..2 * GROUP_SIZE]);
        vector.rules.copy_from_slice(&flat[2 * GROUP_SIZE..3 * GROUP_SIZE]);
        vector
            .interaction
            .copy_from_slice(&flat[3 * GROUP_SIZE..FEATURE_DIMENSION]);
        vector
    }

    /// Iterate over all components in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.gameplay
            .iter()
            .chain(&self.visual)
            .chain(&self.rules)
            .chain(&self.interaction)
            .copied()
    }

    /// Flattened copy in canonical order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Euclidean distance over the full concatenated vector.
    pub fn distance(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Genre coordinate (last gameplay feature).
    pub const fn genre_coordinate(&self) -> f64 {
        self.gameplay[GROUP_SIZE - 1]
    }

    /// Mechanic coordinate (last interaction feature).
    pub const fn mechanic_coordinate(&self) -> f64 {
        self.interaction[GROUP_SIZE - 1]
    }

    /// Largest possible distance between two vectors in the unit hypercube.
    pub fn max_distance() -> f64 {
        (FEATURE_DIMENSION as f64).sqrt()
    }
}

/// Clamp into [0,1], mapping NaN to the neutral midpoint.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}
