use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::Source;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub ensemble: EnsembleConfig,
    pub collector: CollectorConfig,
    pub weights: WeightConfig,
    pub aggregate: AggregateConfig,
    pub scoring: ScoringConfig,
}

/// Relative estimator weights; must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub contextual: f64,
    pub social: f64,
    pub baseline: f64,
    pub neutral_bias: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self { contextual: 0.60, social: 0.25, baseline: 0.15, neutral_bias: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub total_cap: usize,
    pub caps: BTreeMap<Source, usize>,
    pub min_words: BTreeMap<Source, usize>,
    pub default_min_words: usize,
    pub adapter_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            total_cap: 200,
            caps: BTreeMap::from([(Source::Reddit, 100), (Source::YouTube, 50), (Source::Twitter, 50)]),
            min_words: BTreeMap::from([(Source::Reddit, 3), (Source::YouTube, 4), (Source::Twitter, 5)]),
            default_min_words: 3,
            adapter_timeout_secs: 30,
        }
    }
}

impl CollectorConfig {
    /// Per-source cap. Sources without an explicit cap share the global cap
    /// evenly with the other configured sources.
    pub fn cap_for(&self, source: Source, configured_sources: usize) -> usize {
        match self.caps.get(&source) {
            Some(cap) => *cap,
            None => self.total_cap / configured_sources.max(1),
        }
    }

    pub fn min_words_for(&self, source: Source) -> usize {
        self.min_words.get(&source).copied().unwrap_or(self.default_min_words)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub full_length_words: usize,
    pub credibility_base: BTreeMap<Source, f64>,
    pub engagement_bonus_scale: f64,
    pub engagement_bonus_cap: f64,
    pub engagement_penalty_threshold: i64,
    pub engagement_penalty_scale: f64,
    pub engagement_penalty_cap: f64,
    pub min_weight: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            full_length_words: 75,
            credibility_base: BTreeMap::from([
                (Source::Reddit, 65.0),
                (Source::YouTube, 55.0),
                (Source::Twitter, 58.0),
                (Source::NewsComments, 70.0),
                (Source::Unknown, 50.0),
            ]),
            engagement_bonus_scale: 1.5,
            engagement_bonus_cap: 10.0,
            engagement_penalty_threshold: -2,
            engagement_penalty_scale: 2.0,
            engagement_penalty_cap: 20.0,
            min_weight: 0.01,
        }
    }
}

impl WeightConfig {
    pub fn base_credibility(&self, source: Source) -> f64 {
        self.credibility_base
            .get(&source)
            .or_else(|| self.credibility_base.get(&Source::Unknown))
            .copied()
            .unwrap_or(50.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub points_per_comment: f64,
    pub saturation_comments: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { points_per_comment: 2.0, saturation_comments: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_concurrency: usize,
    pub estimate_timeout_secs: u64,
    pub max_prompt_tokens: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { max_concurrency: 12, estimate_timeout_secs: 45, max_prompt_tokens: 400 }
    }
}

impl ScoringConfig {
    pub fn estimate_timeout(&self) -> Duration {
        Duration::from_secs(self.estimate_timeout_secs)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

impl EngineConfig {
    /// Load from a YAML file; missing sections and keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: EngineConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        cfg.validate()?;
        debug!("Engine config loaded - path={}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.ensemble;
        for (field, w) in [
            ("ensemble.contextual", e.contextual),
            ("ensemble.social", e.social),
            ("ensemble.baseline", e.baseline),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(invalid(field, format!("{} not in [0, 1]", w)));
            }
        }
        let sum = e.contextual + e.social + e.baseline;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(invalid("ensemble", format!("weights sum to {}, expected 1", sum)));
        }
        if !(0.0..=100.0).contains(&e.neutral_bias) {
            return Err(invalid("ensemble.neutral_bias", "must be in [0, 100]"));
        }

        if self.collector.total_cap == 0 {
            return Err(invalid("collector.total_cap", "must be positive"));
        }
        if self.collector.adapter_timeout_secs == 0 {
            return Err(invalid("collector.adapter_timeout_secs", "must be positive"));
        }

        let w = &self.weights;
        if w.full_length_words < 1 {
            return Err(invalid("weights.full_length_words", "must be at least 1"));
        }
        if w.credibility_base.values().any(|b| !(5.0..=100.0).contains(b)) {
            return Err(invalid("weights.credibility_base", "entries must be in [5, 100]"));
        }
        if w.engagement_bonus_scale < 0.0 || w.engagement_bonus_cap < 0.0 {
            return Err(invalid("weights.engagement_bonus", "scale and cap must be non-negative"));
        }
        if w.engagement_penalty_scale < 0.0 || w.engagement_penalty_cap < 0.0 {
            return Err(invalid("weights.engagement_penalty", "scale and cap must be non-negative"));
        }
        if w.engagement_penalty_threshold > 0 {
            return Err(invalid("weights.engagement_penalty_threshold", "must be <= 0"));
        }
        if !(w.min_weight > 0.0 && w.min_weight < 1.0) {
            return Err(invalid("weights.min_weight", "must be in (0, 1)"));
        }

        let a = &self.aggregate;
        if a.points_per_comment <= 0.0 || a.saturation_comments == 0 {
            return Err(invalid("aggregate", "points_per_comment and saturation_comments must be positive"));
        }

        let s = &self.scoring;
        if s.max_concurrency == 0 {
            return Err(invalid("scoring.max_concurrency", "must be positive"));
        }
        if s.estimate_timeout_secs == 0 {
            return Err(invalid("scoring.estimate_timeout_secs", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "ensemble:\n  contextual: 0.5\n  social: 0.3\n  baseline: 0.2\ncollector:\n  caps:\n    reddit: 40\n";
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.ensemble.contextual, 0.5);
        assert_eq!(cfg.ensemble.neutral_bias, 50.0);
        assert_eq!(cfg.collector.cap_for(Source::Reddit, 3), 40);
        // an explicit caps map replaces the default map, so youtube falls back to an even split
        assert_eq!(cfg.collector.cap_for(Source::YouTube, 3), 66);
        assert_eq!(cfg.weights.full_length_words, 75);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut cfg = EngineConfig::default();
        cfg.ensemble.baseline = 0.3;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "ensemble", .. }));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut cfg = EngineConfig::default();
        cfg.scoring.max_concurrency = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_source_credibility_falls_back() {
        let mut w = WeightConfig::default();
        w.credibility_base.remove(&Source::NewsComments);
        assert_eq!(w.base_credibility(Source::NewsComments), 50.0);
        assert_eq!(w.base_credibility(Source::Reddit), 65.0);
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "scoring:\n  max_concurrency: 4\n").unwrap();
        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.scoring.max_concurrency, 4);
        assert_eq!(cfg.scoring.estimate_timeout_secs, 45);
    }
}
