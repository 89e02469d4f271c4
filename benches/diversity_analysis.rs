use arcadia::domain::models::{
    ActionKind, AdaptiveStandards, Candidate, CandidateMetrics, ConditionKind, FeatureVector,
    GameArtifact, GameStructure, Genre, GenerationMode, Mechanic, Rule, FEATURE_DIMENSION,
};
use arcadia::services::{DiversityAnalyzer, FeatureVectorizer, Portfolio, QualityScorer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn features(seed: usize) -> FeatureVector {
    let values: Vec<f64> = (0..FEATURE_DIMENSION)
        .map(|i| ((seed * 31 + i * 17) % 101) as f64 / 100.0)
        .collect();
    FeatureVector::from_slice(&values)
}

fn structure(seed: usize) -> GameStructure {
    GameStructure {
        title: Some(format!("Bench {seed}")),
        genre: Some(Genre::ALL[seed % Genre::ALL.len()].label().to_string()),
        mechanic: Some(Mechanic::ALL[seed % Mechanic::ALL.len()].label().to_string()),
        rules: vec![
            Rule::new(ConditionKind::Tap, ActionKind::AddScore),
            Rule::new(ConditionKind::ScoreReached, ActionKind::Win),
            Rule::new(ConditionKind::Timer, ActionKind::Lose),
        ],
        ..GameStructure::default()
    }
}

fn portfolio(size: usize) -> Portfolio {
    let scorer = QualityScorer::default();
    let standards = AdaptiveStandards::default();
    let mut portfolio = Portfolio::new(2.5);
    for seed in 0..size {
        let candidate = Candidate::new(
            GameArtifact::new(structure(seed)),
            features(seed),
            GenerationMode::default(),
            CandidateMetrics::default(),
        );
        let evaluation = scorer.evaluate(&candidate, &portfolio, &standards);
        portfolio.append(candidate, evaluation);
    }
    portfolio
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = DiversityAnalyzer::default();
    let probe = features(7_919);

    let mut group = c.benchmark_group("diversity_analysis");
    for size in [10, 100, 500] {
        let portfolio = portfolio(size);
        group.bench_with_input(BenchmarkId::new("analyze", size), &portfolio, |b, p| {
            b.iter(|| black_box(analyzer.analyze(black_box(&probe), p)));
        });
        group.bench_with_input(BenchmarkId::new("find_gap_areas", size), &portfolio, |b, p| {
            b.iter(|| black_box(analyzer.find_gap_areas(p)));
        });
    }
    group.finish();
}

fn bench_vectorize(c: &mut Criterion) {
    let vectorizer = FeatureVectorizer::new();
    let artifact = GameArtifact::new(structure(3));
    c.bench_function("vectorize", |b| {
        b.iter(|| black_box(vectorizer.vectorize(black_box(&artifact))));
    });
}

criterion_group!(benches, bench_analyze, bench_vectorize);
criterion_main!(benches);
