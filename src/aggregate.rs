use std::collections::BTreeMap;

use chrono::Utc;
use itertools::Itertools;

use crate::config::{AggregateConfig, WeightConfig};
use crate::models::{AggregateResult, ScoredComment, SentimentLabel, SummaryStats};
use crate::weights::WeightModel;

pub struct Aggregator {
    cfg: AggregateConfig,
    weights: WeightModel,
}

fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

fn mean(xs: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = xs.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Population statistics over `scores`. Empty input yields all zeros.
pub fn summary_stats(scores: &[f64]) -> SummaryStats {
    if scores.is_empty() {
        return SummaryStats::default();
    }
    let m = mean(scores.iter().copied());
    let variance = mean(scores.iter().map(|s| (s - m) * (s - m)));
    let sorted: Vec<f64> = scores.iter().copied().sorted_by(|a, b| a.total_cmp(b)).collect();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    SummaryStats {
        mean: m,
        median,
        variance,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

impl Aggregator {
    pub fn new(cfg: &AggregateConfig, weights: &WeightConfig) -> Self {
        Self { cfg: cfg.clone(), weights: WeightModel::new(weights) }
    }

    /// Heuristic confidence in [0, 100], not a statistical interval.
    pub fn confidence(&self, sample_size: usize, variance: f64) -> f64 {
        let counted = sample_size.min(self.cfg.saturation_comments) as f64;
        let size_term = (counted * self.cfg.points_per_comment).min(100.0);
        let agreement_term = (100.0 - variance).max(0.0);
        ((size_term + agreement_term) / 2.0).clamp(0.0, 100.0)
    }

    pub fn aggregate(&self, subject: &str, category: Option<&str>, scored: &[ScoredComment]) -> AggregateResult {
        if scored.is_empty() {
            return self.no_data(subject, category);
        }

        let scores: Vec<f64> = scored.iter().map(|s| s.ensemble_score).collect();
        let weights: Vec<f64> = scored.iter().map(|s| self.weights.weight_of(s)).collect();
        let total: f64 = weights.iter().sum();
        let index = scores.iter().zip(&weights).map(|(s, w)| s * (w / total)).sum::<f64>().clamp(0.0, 100.0);

        let stats = summary_stats(&scores);
        let confidence = self.confidence(scored.len(), stats.variance);

        let mut source_breakdown = BTreeMap::new();
        for s in scored {
            *source_breakdown.entry(s.source).or_insert(0) += 1;
        }

        let index_score = round_to(index, 2);
        AggregateResult {
            subject: subject.to_string(),
            category: category.map(str::to_string),
            index_score,
            confidence: round_to(confidence, 2),
            sample_size: scored.len(),
            label: SentimentLabel::from_score(index_score),
            no_data: false,
            stats: SummaryStats {
                mean: round_to(stats.mean, 2),
                median: round_to(stats.median, 2),
                variance: round_to(stats.variance, 2),
                std_dev: round_to(stats.std_dev, 2),
                min: round_to(stats.min, 2),
                max: round_to(stats.max, 2),
            },
            source_breakdown,
            mean_bias: round_to(mean(scored.iter().map(|s| s.bias_score)), 2),
            mean_credibility: round_to(mean(scored.iter().map(|s| s.source_credibility)), 2),
            mean_length_weight: round_to(mean(scored.iter().map(|s| s.length_weight)), 3),
            mean_word_count: round_to(mean(scored.iter().map(|s| s.word_count as f64)), 1),
            fallback_count: scored.iter().filter(|s| s.contextual_fallback).count(),
            computed_at: Utc::now(),
        }
    }

    fn no_data(&self, subject: &str, category: Option<&str>) -> AggregateResult {
        AggregateResult {
            subject: subject.to_string(),
            category: category.map(str::to_string),
            index_score: 50.0,
            confidence: 0.0,
            sample_size: 0,
            label: SentimentLabel::Neutral,
            no_data: true,
            stats: SummaryStats::default(),
            source_breakdown: BTreeMap::new(),
            mean_bias: 0.0,
            mean_credibility: 0.0,
            mean_length_weight: 0.0,
            mean_word_count: 0.0,
            fallback_count: 0,
            computed_at: Utc::now(),
        }
    }
}
