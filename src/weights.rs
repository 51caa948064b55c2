use crate::config::WeightConfig;
use crate::models::{ScoredComment, Source};

pub struct WeightModel {
    cfg: WeightConfig,
}

impl WeightModel {
    pub fn new(cfg: &WeightConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Log-scale length weight. Zero words weigh 0; anything else lands in
    /// [0.1, 1.0], reaching 1.0 at `full_length_words`.
    pub fn length_weight(&self, word_count: usize) -> f64 {
        if word_count == 0 {
            return 0.0;
        }
        let raw = (word_count as f64).ln_1p() / (self.cfg.full_length_words.max(1) as f64).ln_1p();
        raw.clamp(0.1, 1.0)
    }

    /// Platform base credibility adjusted by engagement, clamped to [5, 100].
    /// Non-decreasing in engagement.
    pub fn credibility(&self, source: Source, engagement: i64) -> f64 {
        let mut cred = self.cfg.base_credibility(source);
        if engagement > 0 {
            cred += (engagement as f64).ln_1p() * self.cfg.engagement_bonus_scale;
            cred = cred.min(self.cfg.base_credibility(source) + self.cfg.engagement_bonus_cap);
        } else if engagement < self.cfg.engagement_penalty_threshold {
            let penalty = (engagement.unsigned_abs() as f64).ln_1p() * self.cfg.engagement_penalty_scale;
            cred -= penalty.min(self.cfg.engagement_penalty_cap);
        }
        cred.clamp(5.0, 100.0)
    }

    pub fn combined_weight(&self, credibility: f64, length_weight: f64, bias: f64) -> f64 {
        let w = (credibility / 100.0) * length_weight * bias_discount(bias);
        w.max(self.cfg.min_weight)
    }

    pub fn weight_of(&self, s: &ScoredComment) -> f64 {
        self.combined_weight(s.source_credibility, s.length_weight, s.bias_score)
    }
}

/// `1 - bias/100`, in [0, 1].
pub fn bias_discount(bias: f64) -> f64 {
    (1.0 - bias / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> WeightModel {
        WeightModel::new(&WeightConfig::default())
    }

    #[test]
    fn length_weight_floors_and_saturates() {
        let m = model();
        assert_eq!(m.length_weight(0), 0.0);
        assert!((m.length_weight(1) - 2f64.ln() / 76f64.ln()).abs() < 1e-12);
        assert_eq!(m.length_weight(75), 1.0);
        assert_eq!(m.length_weight(500), 1.0);
        assert!(m.length_weight(10) < m.length_weight(40));
    }

    #[test]
    fn credibility_bonus_is_capped() {
        let m = model();
        assert_eq!(m.credibility(Source::Reddit, 0), 65.0);
        assert!((m.credibility(Source::Reddit, 10) - (65.0 + 11f64.ln() * 1.5)).abs() < 1e-9);
        assert_eq!(m.credibility(Source::Reddit, 1_000_000), 75.0);
    }

    #[test]
    fn mild_downvotes_are_ignored_heavy_ones_penalized() {
        let m = model();
        assert_eq!(m.credibility(Source::YouTube, -1), 55.0);
        assert_eq!(m.credibility(Source::YouTube, -2), 55.0);
        assert!(m.credibility(Source::YouTube, -3) < 55.0);
        assert_eq!(m.credibility(Source::YouTube, -10_000_000), 35.0);
    }

    #[test]
    fn credibility_is_clamped() {
        let mut cfg = WeightConfig::default();
        cfg.credibility_base.insert(Source::Unknown, 8.0);
        let m = WeightModel::new(&cfg);
        assert_eq!(m.credibility(Source::Unknown, -500), 5.0);
    }

    #[test]
    fn combined_weight_has_a_floor() {
        let m = model();
        assert_eq!(m.combined_weight(65.0, 0.0, 20.0), 0.01);
        assert_eq!(m.combined_weight(100.0, 1.0, 100.0), 0.01);
        assert!((m.combined_weight(50.0, 0.5, 50.0) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn bias_discount_range() {
        assert_eq!(bias_discount(0.0), 1.0);
        assert_eq!(bias_discount(100.0), 0.0);
        assert_eq!(bias_discount(50.0), 0.5);
    }
}
