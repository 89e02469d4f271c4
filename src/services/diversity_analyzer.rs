//! Diversity of a candidate relative to the accumulated portfolio.

use std::cmp::Ordering;

use crate::domain::models::{
    DiversityAnalysis, DiversityConfig, FeatureVector, GapArea, GapDimension, Genre, Mechanic,
};
use crate::services::feature_vectorizer::{genre_coordinate, mechanic_coordinate};
use crate::services::portfolio::{Portfolio, PortfolioStatistics};

/// Broad targets reported while the portfolio is too small for category gaps.
pub const BROAD_TARGETS: [&str; 3] = ["novel-genre", "novel-mechanic", "novel-controls"];

/// Distance-based diversity scoring and gap detection.
#[derive(Debug, Clone, Default)]
pub struct DiversityAnalyzer {
    config: DiversityConfig,
}

impl DiversityAnalyzer {
    /// Analyzer with the given weights and radii.
    pub const fn new(config: DiversityConfig) -> Self {
        Self { config }
    }

    /// Weights and radii in use.
    pub const fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Score `features` against every portfolio entry.
    pub fn analyze(&self, features: &FeatureVector, portfolio: &Portfolio) -> DiversityAnalysis {
        let ceiling = self.config.distance_ceiling;
        if portfolio.is_empty() {
            return DiversityAnalysis {
                score: 1.0,
                nearest_distance: ceiling,
                average_distance: ceiling,
                density_penalty: 0.0,
                gap_filling_score: 1.0,
                balance_contribution: 0.5,
                neighbor_count: 0,
            };
        }

        let distances: Vec<f64> = portfolio
            .entries()
            .iter()
            .map(|entry| features.distance(entry.features()))
            .collect();
        let nearest = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let average = distances.iter().sum::<f64>() / distances.len() as f64;

        let normalized = |d: f64| {
            if ceiling > 0.0 {
                (d / ceiling).min(1.0)
            } else {
                1.0
            }
        };
        let score = (self.config.nearest_weight * normalized(nearest)
            + self.config.average_weight * normalized(average))
        .clamp(0.0, 1.0);

        let neighbor_count = distances
            .iter()
            .filter(|d| **d <= self.config.density_radius)
            .count();

        let gaps = self.find_gap_areas(portfolio);

        DiversityAnalysis {
            score,
            nearest_distance: nearest,
            average_distance: average,
            density_penalty: self.density_penalty(neighbor_count),
            gap_filling_score: gap_filling_score(features, &gaps),
            balance_contribution: balance_contribution(features, portfolio.statistics()),
            neighbor_count,
        }
    }

    fn density_penalty(&self, neighbor_count: usize) -> f64 {
        let saturation = self.config.density_saturation;
        if saturation == 0 {
            return if neighbor_count > 0 { 1.0 } else { 0.0 };
        }
        (neighbor_count as f64 / saturation as f64).min(1.0)
    }

    /// Underrepresented regions, most urgent first.
    ///
    /// Small portfolios get the fixed broad targets. Larger ones report every
    /// genre and mechanic whose share is under the coverage floor. The
    /// catch-all `Other` buckets are never reported as gaps.
    pub fn find_gap_areas(&self, portfolio: &Portfolio) -> Vec<GapArea> {
        if portfolio.len() < self.config.min_portfolio_for_gaps {
            return BROAD_TARGETS
                .iter()
                .map(|label| GapArea {
                    dimension: GapDimension::Broad,
                    label: (*label).to_string(),
                    priority: self.config.broad_gap_priority.clamp(f64::MIN_POSITIVE, 1.0),
                    anchor: 0.0,
                    count: 0,
                })
                .collect();
        }

        let stats = portfolio.statistics();
        let floor = self.config.gap_coverage_floor;
        let mut gaps = Vec::new();

        for genre in Genre::ALL.iter().copied().filter(|g| *g != Genre::Other) {
            if stats.genre_share(genre) < floor {
                let count = stats.genre_count(genre);
                gaps.push(GapArea {
                    dimension: GapDimension::Genre,
                    label: genre.label().to_string(),
                    priority: 1.0 / (1.0 + count as f64),
                    anchor: genre_coordinate(genre),
                    count,
                });
            }
        }
        for mechanic in Mechanic::ALL.iter().copied().filter(|m| *m != Mechanic::Other) {
            if stats.mechanic_share(mechanic) < floor {
                let count = stats.mechanic_count(mechanic);
                gaps.push(GapArea {
                    dimension: GapDimension::Mechanic,
                    label: mechanic.label().to_string(),
                    priority: 1.0 / (1.0 + count as f64),
                    anchor: mechanic_coordinate(mechanic),
                    count,
                });
            }
        }

        gaps.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.target().cmp(&b.target()))
        });
        gaps
    }
}

/// Best match between the candidate and any gap, weighted by gap priority.
fn gap_filling_score(features: &FeatureVector, gaps: &[GapArea]) -> f64 {
    gaps.iter()
        .map(|gap| {
            let fit = match gap.dimension {
                GapDimension::Broad => 1.0,
                GapDimension::Genre => closeness(
                    features.genre_coordinate(),
                    gap.anchor,
                    Genre::ALL.len(),
                ),
                GapDimension::Mechanic => closeness(
                    features.mechanic_coordinate(),
                    gap.anchor,
                    Mechanic::ALL.len(),
                ),
            };
            fit * gap.priority
        })
        .fold(0.0, f64::max)
        .clamp(0.0, 1.0)
}

/// `1 - min(d / step, 1)` where `step` is one bucket in the category dimension.
fn closeness(coordinate: f64, anchor: f64, buckets: usize) -> f64 {
    if buckets < 2 {
        return 1.0;
    }
    let step = 1.0 / (buckets - 1) as f64;
    1.0 - ((coordinate - anchor).abs() / step).min(1.0)
}

/// Positive when accepting the candidate would move its categories toward an
/// even distribution.
fn balance_contribution(features: &FeatureVector, stats: &PortfolioStatistics) -> f64 {
    let genre = category_from_coordinate(features.genre_coordinate(), Genre::ALL);
    let mechanic = category_from_coordinate(features.mechanic_coordinate(), Mechanic::ALL);

    let term = |share: f64, buckets: usize| {
        let k = buckets as f64;
        (1.0 / k - share) * k * 0.5
    };
    let genre_term = term(stats.genre_share(genre), Genre::ALL.len());
    let mechanic_term = term(stats.mechanic_share(mechanic), Mechanic::ALL.len());
    ((genre_term + mechanic_term) / 2.0).clamp(-0.5, 0.5)
}

/// Nearest bucket for a coordinate. Non-finite values land in the last
/// bucket, which is always the catch-all.
fn category_from_coordinate<T: Copy>(coordinate: f64, all: &[T]) -> T {
    let last = all.len() - 1;
    let index = if coordinate.is_finite() {
        ((coordinate * last as f64).round().max(0.0) as usize).min(last)
    } else {
        last
    };
    all[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        AbsoluteScores, Candidate, CandidateMetrics, GameArtifact, GameStructure,
        GenerationMode, QualityEvaluation, RelativeScores,
    };

    fn with_categories(value: f64, genre: Genre, mechanic: Mechanic) -> FeatureVector {
        let mut v = FeatureVector::uniform(value);
        v.gameplay[9] = genre_coordinate(genre);
        v.interaction[9] = mechanic_coordinate(mechanic);
        v
    }

    fn accept(portfolio: &mut Portfolio, features: FeatureVector, genre: Genre, mechanic: Mechanic) {
        let structure = GameStructure {
            title: Some("entry".into()),
            genre: Some(genre.label().into()),
            mechanic: Some(mechanic.label().into()),
            ..GameStructure::default()
        };
        let candidate = Candidate::new(
            GameArtifact::new(structure),
            features,
            GenerationMode::default(),
            CandidateMetrics::default(),
        );
        let analysis = DiversityAnalyzer::default().analyze(&features, &Portfolio::new(2.5));
        portfolio.append(
            candidate,
            QualityEvaluation {
                diversity: analysis,
                relative: RelativeScores::default(),
                absolute: AbsoluteScores::default(),
                total: 70.0,
                threshold: 60.0,
                issues: Vec::new(),
                critical_violations: Vec::new(),
                passed: true,
            },
        );
    }

    #[test]
    fn test_empty_portfolio_is_maximally_diverse() {
        let analyzer = DiversityAnalyzer::default();
        let analysis = analyzer.analyze(&FeatureVector::uniform(0.3), &Portfolio::new(2.5));
        assert!((analysis.score - 1.0).abs() < f64::EPSILON);
        assert!((analysis.nearest_distance - 2.5).abs() < f64::EPSILON);
        assert!(analysis.density_penalty.abs() < f64::EPSILON);
        assert!((analysis.gap_filling_score - 1.0).abs() < f64::EPSILON);
        assert!((analysis.balance_contribution - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_identical_portfolio_saturates_density() {
        let analyzer = DiversityAnalyzer::default();
        let features = with_categories(0.4, Genre::Action, Mechanic::Tap);
        let mut portfolio = Portfolio::new(2.5);
        for _ in 0..10 {
            accept(&mut portfolio, features, Genre::Action, Mechanic::Tap);
        }
        let analysis = analyzer.analyze(&features, &portfolio);
        assert!(analysis.score.abs() < f64::EPSILON);
        assert!((analysis.density_penalty - 1.0).abs() < f64::EPSILON);
        assert_eq!(analysis.neighbor_count, 10);
        assert!((analysis.balance_contribution + 0.5).abs() < f64::EPSILON);
        assert!(analysis.gap_filling_score < 1e-9);
    }

    #[test]
    fn test_score_blends_nearest_and_average() {
        let analyzer = DiversityAnalyzer::default();
        let mut portfolio = Portfolio::new(2.5);
        accept(&mut portfolio, FeatureVector::uniform(0.0), Genre::Other, Mechanic::Other);
        accept(&mut portfolio, FeatureVector::uniform(1.0), Genre::Other, Mechanic::Other);
        let analysis = analyzer.analyze(&FeatureVector::uniform(0.0), &portfolio);
        // nearest 0, average sqrt(40)/2 > ceiling
        assert!(analysis.nearest_distance.abs() < f64::EPSILON);
        assert!((analysis.score - 0.4).abs() < 1e-9);
        assert_eq!(analysis.neighbor_count, 1);
        assert!((analysis.density_penalty - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_small_portfolio_reports_broad_gaps() {
        let analyzer = DiversityAnalyzer::default();
        let mut portfolio = Portfolio::new(2.5);
        accept(&mut portfolio, FeatureVector::uniform(0.5), Genre::Action, Mechanic::Tap);
        let gaps = analyzer.find_gap_areas(&portfolio);
        assert_eq!(gaps.len(), 3);
        assert!(gaps.iter().all(|g| g.dimension == GapDimension::Broad));
        assert!((gaps[0].priority - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_gaps_sorted_by_priority() {
        let analyzer = DiversityAnalyzer::default();
        let mut portfolio = Portfolio::new(2.5);
        for _ in 0..11 {
            accept(&mut portfolio, FeatureVector::uniform(0.5), Genre::Action, Mechanic::Tap);
        }
        accept(&mut portfolio, FeatureVector::uniform(0.5), Genre::Puzzle, Mechanic::Tap);

        let gaps = analyzer.find_gap_areas(&portfolio);
        // puzzle has 1/12 > 0.08 coverage and is not a gap
        assert!(gaps.iter().all(|g| g.label != "puzzle"));
        assert!(gaps.iter().all(|g| g.label != "other"));
        assert!(gaps.iter().any(|g| g.target() == "genre:rhythm"));
        assert!(gaps.iter().any(|g| g.target() == "mechanic:balance"));
        for pair in gaps.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert!((gaps[0].priority - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gap_filling_prefers_candidates_in_the_gap() {
        let analyzer = DiversityAnalyzer::default();
        let mut portfolio = Portfolio::new(2.5);
        for _ in 0..12 {
            accept(
                &mut portfolio,
                with_categories(0.5, Genre::Action, Mechanic::Tap),
                Genre::Action,
                Mechanic::Tap,
            );
        }
        let in_gap = analyzer.analyze(
            &with_categories(0.5, Genre::Rhythm, Mechanic::Balance),
            &portfolio,
        );
        let crowded = analyzer.analyze(
            &with_categories(0.5, Genre::Action, Mechanic::Tap),
            &portfolio,
        );
        assert!((in_gap.gap_filling_score - 1.0).abs() < 1e-9);
        assert!(crowded.gap_filling_score < 1e-9);
        assert!((in_gap.balance_contribution - 0.5).abs() < 1e-9);
        assert!((crowded.balance_contribution + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_category_from_coordinate_out_of_range() {
        assert_eq!(category_from_coordinate(f64::NAN, Genre::ALL), Genre::Other);
        assert_eq!(category_from_coordinate(-3.0, Genre::ALL), Genre::Action);
        assert_eq!(category_from_coordinate(0.0, Mechanic::ALL), Mechanic::Tap);
    }
}
