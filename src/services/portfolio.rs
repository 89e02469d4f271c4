//! Append-only portfolio of accepted candidates.
//!
//! Statistics are cached and updated on every append. They are a pure fold
//! over the entry sequence, so [`PortfolioStatistics::compute`] on the same
//! entries reproduces the cached value exactly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::models::{Candidate, Genre, Mechanic, PortfolioEntry, QualityEvaluation};

/// Number of quality histogram buckets (ten points each).
pub const HISTOGRAM_BUCKETS: usize = 10;

/// Cached aggregate view of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    /// Entries summarized.
    pub entry_count: usize,
    /// Entries per genre.
    pub genre_counts: BTreeMap<Genre, usize>,
    /// Entries per mechanic.
    pub mechanic_counts: BTreeMap<Mechanic, usize>,
    /// Running mean of total scores.
    pub quality_mean: f64,
    /// Sum of squared deviations (Welford).
    quality_m2: f64,
    /// Entries per 10-point score bucket.
    pub quality_histogram: [usize; HISTOGRAM_BUCKETS],
    pairwise_distance_sum: f64,
    distance_ceiling: f64,
}

impl PortfolioStatistics {
    /// Statistics of an empty portfolio.
    pub fn empty(distance_ceiling: f64) -> Self {
        Self {
            entry_count: 0,
            genre_counts: BTreeMap::new(),
            mechanic_counts: BTreeMap::new(),
            quality_mean: 0.0,
            quality_m2: 0.0,
            quality_histogram: [0; HISTOGRAM_BUCKETS],
            pairwise_distance_sum: 0.0,
            distance_ceiling,
        }
    }

    /// Recompute from scratch.
    pub fn compute(entries: &[PortfolioEntry], distance_ceiling: f64) -> Self {
        let mut stats = Self::empty(distance_ceiling);
        for (i, entry) in entries.iter().enumerate() {
            stats.record(entry, &entries[..i]);
        }
        stats
    }

    /// Fold one entry in. `previous` holds every entry accepted before it.
    fn record(&mut self, entry: &PortfolioEntry, previous: &[PortfolioEntry]) {
        self.entry_count += 1;
        *self.genre_counts.entry(entry.genre()).or_insert(0) += 1;
        *self.mechanic_counts.entry(entry.mechanic()).or_insert(0) += 1;

        let quality = entry.total_score();
        let delta = quality - self.quality_mean;
        self.quality_mean += delta / self.entry_count as f64;
        self.quality_m2 += delta * (quality - self.quality_mean);

        let bucket = ((quality.max(0.0) / 10.0).floor() as usize).min(HISTOGRAM_BUCKETS - 1);
        self.quality_histogram[bucket] += 1;

        self.pairwise_distance_sum += previous
            .iter()
            .map(|other| entry.features().distance(other.features()))
            .sum::<f64>();
    }

    /// Population variance of accepted totals.
    pub fn quality_variance(&self) -> f64 {
        if self.entry_count == 0 {
            0.0
        } else {
            self.quality_m2 / self.entry_count as f64
        }
    }

    /// Standard deviation of total scores.
    pub fn quality_std_dev(&self) -> f64 {
        self.quality_variance().sqrt()
    }

    /// Mean pairwise distance normalized by the distance ceiling, capped at 1.
    /// Fewer than two entries count as fully diverse.
    pub fn aggregate_diversity(&self) -> f64 {
        let n = self.entry_count;
        if n < 2 || self.distance_ceiling <= 0.0 {
            return 1.0;
        }
        let pairs = (n * (n - 1) / 2) as f64;
        (self.pairwise_distance_sum / pairs / self.distance_ceiling).min(1.0)
    }

    /// Entries in `genre`.
    pub fn genre_count(&self, genre: Genre) -> usize {
        self.genre_counts.get(&genre).copied().unwrap_or(0)
    }

    /// Entries in `mechanic`.
    pub fn mechanic_count(&self, mechanic: Mechanic) -> usize {
        self.mechanic_counts.get(&mechanic).copied().unwrap_or(0)
    }

    /// Share of entries in `genre`; 0 for an empty portfolio.
    pub fn genre_share(&self, genre: Genre) -> f64 {
        share(self.genre_count(genre), self.entry_count)
    }

    /// Share of entries in `mechanic`.
    pub fn mechanic_share(&self, mechanic: Mechanic) -> f64 {
        share(self.mechanic_count(mechanic), self.entry_count)
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Accepted entries in acceptance order. Entries are never removed.
#[derive(Debug, Clone)]
pub struct Portfolio {
    entries: Vec<PortfolioEntry>,
    stats: PortfolioStatistics,
}

impl Portfolio {
    /// Empty portfolio normalizing distances by `distance_ceiling`.
    pub fn new(distance_ceiling: f64) -> Self {
        Self {
            entries: Vec::new(),
            stats: PortfolioStatistics::empty(distance_ceiling),
        }
    }

    /// Accept a candidate, returning the stored entry.
    pub fn append(&mut self, candidate: Candidate, evaluation: QualityEvaluation) -> &PortfolioEntry {
        let entry = PortfolioEntry {
            sequence: self.entries.len(),
            candidate,
            evaluation,
            accepted_at: Utc::now(),
        };
        self.stats.record(&entry, &self.entries);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Entries in acceptance order.
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was accepted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached aggregates.
    pub const fn statistics(&self) -> &PortfolioStatistics {
        &self.stats
    }

    /// Titles of the most recent `limit` entries, newest first.
    pub fn recent_titles(&self, limit: usize) -> Vec<String> {
        self.entries
            .iter()
            .rev()
            .take(limit)
            .map(|e| e.candidate.title().to_string())
            .collect()
    }

    /// Whether the cached statistics still match a full recomputation.
    pub fn statistics_consistent(&self) -> bool {
        PortfolioStatistics::compute(&self.entries, self.stats.distance_ceiling) == self.stats
    }
}
