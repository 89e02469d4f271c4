//! ε-greedy choice between exploring a gap and exploiting what works.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

use crate::domain::models::{AdaptiveStandards, GapArea, GenerationMode};

/// Target used when no gap exists and no fallback targets are configured.
const DEFAULT_TARGET: &str = "novel-genre";

/// Draws the generation mode for each attempt and counts the branches taken.
#[derive(Debug, Clone)]
pub struct ModeSelector {
    rng: StdRng,
    fallback_targets: Vec<String>,
    exploration_count: usize,
    exploitation_count: usize,
}

impl ModeSelector {
    /// Seeded selectors are fully reproducible; `None` seeds from entropy.
    pub fn new(seed: Option<u64>, fallback_targets: Vec<String>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            rng,
            fallback_targets,
            exploration_count: 0,
            exploitation_count: 0,
        }
    }

    /// Select using the standards' current epsilon.
    pub fn select(&mut self, standards: &AdaptiveStandards, gaps: &[GapArea]) -> GenerationMode {
        self.select_mode(standards.epsilon(), gaps)
    }

    /// One uniform draw in [0,1); below `epsilon` explores.
    pub fn select_mode(&mut self, epsilon: f64, gaps: &[GapArea]) -> GenerationMode {
        let draw: f64 = self.rng.gen();
        if draw < epsilon {
            self.exploration_count += 1;
            let (target, why) = match highest_priority(gaps) {
                Some(gap) => (gap.target(), format!("gap priority {:.2}", gap.priority)),
                None => (self.fallback_target(), "no gap, fallback target".to_string()),
            };
            GenerationMode::Exploration {
                target,
                epsilon,
                reason: format!("draw {draw:.3} < epsilon {epsilon:.3}; {why}"),
            }
        } else {
            self.exploitation_count += 1;
            GenerationMode::Exploitation {
                epsilon,
                reason: format!("draw {draw:.3} >= epsilon {epsilon:.3}"),
            }
        }
    }

    fn fallback_target(&mut self) -> String {
        self.fallback_targets
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TARGET.to_string())
    }

    /// Exploration draws so far.
    pub const fn exploration_count(&self) -> usize {
        self.exploration_count
    }

    /// Exploitation draws so far.
    pub const fn exploitation_count(&self) -> usize {
        self.exploitation_count
    }

    /// Share of selections that explored; 0 before the first selection.
    pub fn exploration_ratio(&self) -> f64 {
        let total = self.exploration_count + self.exploitation_count;
        if total == 0 {
            0.0
        } else {
            self.exploration_count as f64 / total as f64
        }
    }
}

fn highest_priority(gaps: &[GapArea]) -> Option<&GapArea> {
    gaps.iter().reduce(|best, gap| {
        match gap.priority.partial_cmp(&best.priority) {
            Some(Ordering::Greater) => gap,
            _ => best,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::GapDimension;

    fn gap(label: &str, priority: f64) -> GapArea {
        GapArea {
            dimension: GapDimension::Genre,
            label: label.to_string(),
            priority,
            anchor: 0.5,
            count: 0,
        }
    }

    #[test]
    fn test_zero_epsilon_always_exploits() {
        let mut selector = ModeSelector::new(Some(7), Vec::new());
        for _ in 0..200 {
            assert!(!selector.select_mode(0.0, &[gap("rhythm", 1.0)]).is_exploration());
        }
        assert_eq!(selector.exploitation_count(), 200);
        assert!(selector.exploration_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_epsilon_always_explores_top_gap() {
        let mut selector = ModeSelector::new(Some(7), Vec::new());
        let gaps = [gap("sports", 0.5), gap("rhythm", 1.0), gap("puzzle", 0.25)];
        for _ in 0..50 {
            let mode = selector.select_mode(1.0, &gaps);
            assert_eq!(mode.target(), Some("genre:rhythm"));
        }
        assert!((selector.exploration_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallback_targets_when_no_gaps() {
        let targets = vec!["mechanic:aim".to_string(), "genre:sports".to_string()];
        let mut selector = ModeSelector::new(Some(11), targets.clone());
        for _ in 0..20 {
            let mode = selector.select_mode(1.0, &[]);
            let target = mode.target().map(str::to_string).unwrap_or_default();
            assert!(targets.contains(&target));
        }
        let mut empty = ModeSelector::new(Some(11), Vec::new());
        assert_eq!(empty.select_mode(1.0, &[]).target(), Some(DEFAULT_TARGET));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = ModeSelector::new(Some(42), Vec::new());
        let mut b = ModeSelector::new(Some(42), Vec::new());
        for _ in 0..100 {
            assert_eq!(
                a.select_mode(0.3, &[]).is_exploration(),
                b.select_mode(0.3, &[]).is_exploration()
            );
        }
        assert_eq!(a.exploration_count(), b.exploration_count());
    }

    #[test]
    fn test_exploration_ratio_tracks_epsilon() {
        let mut selector = ModeSelector::new(Some(3), Vec::new());
        for _ in 0..2_000 {
            selector.select_mode(0.3, &[]);
        }
        assert!((selector.exploration_ratio() - 0.3).abs() < 0.05);
    }
}
