use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{EnsembleConfig, WeightConfig};
use crate::estimators::{clamp_score, LexicalBaseline, PolarityEstimator, SocialLexicon};
use crate::models::{Comment, ScoredComment};
use crate::text::word_count;
use crate::weights::WeightModel;

/// Blends estimator outputs with fixed weights. When the contextual
/// estimate fails the comment keeps the baseline value exactly.
pub struct Ensemble {
    contextual: Option<Arc<dyn PolarityEstimator>>,
    social: Arc<dyn PolarityEstimator>,
    baseline: Arc<dyn PolarityEstimator>,
    cfg: EnsembleConfig,
    weights: WeightModel,
}

impl Ensemble {
    pub fn new(cfg: &EnsembleConfig, weights: &WeightConfig, contextual: Option<Arc<dyn PolarityEstimator>>) -> Self {
        Self::with_estimators(
            cfg,
            weights,
            contextual,
            Arc::new(SocialLexicon::new()),
            Arc::new(LexicalBaseline::new()),
        )
    }

    pub fn with_estimators(
        cfg: &EnsembleConfig,
        weights: &WeightConfig,
        contextual: Option<Arc<dyn PolarityEstimator>>,
        social: Arc<dyn PolarityEstimator>,
        baseline: Arc<dyn PolarityEstimator>,
    ) -> Self {
        Self {
            contextual,
            social,
            baseline,
            cfg: cfg.clone(),
            weights: WeightModel::new(weights),
        }
    }

    pub fn has_contextual(&self) -> bool {
        self.contextual.is_some()
    }

    // lexical estimators do not fail; an injected one that does reads as neutral
    async fn lexical(&self, est: &Arc<dyn PolarityEstimator>, text: &str, subject: &str, context: Option<&str>) -> f64 {
        match est.estimate(text, subject, context).await {
            Ok(e) => e.polarity,
            Err(err) => {
                warn!("Lexical estimate failed - estimator={}, error={}", est.name(), err);
                50.0
            }
        }
    }

    pub async fn score(&self, comment: &Comment, subject: &str, context: Option<&str>) -> ScoredComment {
        let id = comment.id();
        let text = comment.text.as_str();

        let baseline = self.lexical(&self.baseline, text, subject, context).await;
        let social = self.lexical(&self.social, text, subject, context).await;

        let mut estimates = BTreeMap::new();
        estimates.insert(self.baseline.name().to_string(), baseline);
        estimates.insert(self.social.name().to_string(), social);

        let (ensemble_score, bias_score, contextual_fallback) = match &self.contextual {
            Some(est) => match est.estimate(text, subject, context).await {
                Ok(e) => {
                    estimates.insert(est.name().to_string(), e.polarity);
                    let blended = self.cfg.contextual * e.polarity + self.cfg.social * social + self.cfg.baseline * baseline;
                    (clamp_score(blended), e.bias.unwrap_or(self.cfg.neutral_bias), false)
                }
                Err(err) => {
                    warn!(
                        "Contextual estimate failed, falling back to baseline - comment_id={}, baseline={:.1}, error={}",
                        id, baseline, err
                    );
                    estimates.insert(est.name().to_string(), baseline);
                    (baseline, self.cfg.neutral_bias, true)
                }
            },
            None => (self.lexical_only(social, baseline), self.cfg.neutral_bias, false),
        };

        let words = word_count(text);
        let source_credibility = self.weights.credibility(comment.source, comment.engagement);
        let length_weight = self.weights.length_weight(words);

        debug!(
            "Comment scored - comment_id={}, ensemble={:.1}, bias={:.1}, fallback={}",
            id, ensemble_score, bias_score, contextual_fallback
        );

        ScoredComment {
            comment_id: id,
            source: comment.source,
            platform_id: comment.platform_id.clone(),
            venue: comment.venue.clone(),
            text: comment.text.clone(),
            author: comment.author.clone(),
            timestamp: comment.timestamp,
            engagement: comment.engagement,
            polarity_estimates: estimates,
            ensemble_score,
            bias_score,
            contextual_fallback,
            source_credibility,
            credibility_weight: source_credibility / 100.0,
            length_weight,
            word_count: words,
        }
    }

    fn lexical_only(&self, social: f64, baseline: f64) -> f64 {
        let total = self.cfg.social + self.cfg.baseline;
        if total <= 0.0 {
            return baseline;
        }
        clamp_score((self.cfg.social * social + self.cfg.baseline * baseline) / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimateError;
    use crate::estimators::Estimate;
    use crate::models::Source;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    struct Fixed {
        name: &'static str,
        result: Option<Estimate>,
    }

    #[async_trait(?Send)]
    impl PolarityEstimator for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn estimate(&self, _t: &str, _s: &str, _c: Option<&str>) -> Result<Estimate, EstimateError> {
            self.result.ok_or(EstimateError::Timeout(Duration::from_secs(45)))
        }
    }

    fn fixed(name: &'static str, polarity: f64, bias: Option<f64>) -> Arc<dyn PolarityEstimator> {
        Arc::new(Fixed { name, result: Some(Estimate { polarity, bias }) })
    }

    fn failing() -> Arc<dyn PolarityEstimator> {
        Arc::new(Fixed { name: "contextual", result: None })
    }

    fn ensemble(contextual: Option<Arc<dyn PolarityEstimator>>) -> Ensemble {
        Ensemble::with_estimators(
            &EnsembleConfig::default(),
            &WeightConfig::default(),
            contextual,
            fixed("social", 60.0, None),
            fixed("baseline", 72.0, None),
        )
    }

    fn comment() -> Comment {
        Comment::new(Source::Reddit, "t1_x", "the rollout went better than anyone expected", Utc::now()).with_engagement(12)
    }

    #[tokio::test]
    async fn blends_with_fixed_weights() {
        let s = ensemble(Some(fixed("contextual", 90.0, Some(20.0)))).score(&comment(), "rollout", None).await;
        let expected = 0.60 * 90.0 + 0.25 * 60.0 + 0.15 * 72.0;
        assert!((s.ensemble_score - expected).abs() < 1e-9);
        assert_eq!(s.bias_score, 20.0);
        assert!(!s.contextual_fallback);
        assert_eq!(s.polarity_estimates.len(), 3);
        assert_eq!(s.polarity_estimates["contextual"], 90.0);
    }

    #[tokio::test]
    async fn failed_contextual_estimate_is_exactly_the_baseline() {
        let s = ensemble(Some(failing())).score(&comment(), "rollout", None).await;
        assert_eq!(s.ensemble_score, 72.0);
        assert_eq!(s.bias_score, 50.0);
        assert!(s.contextual_fallback);
        assert_eq!(s.polarity_estimates["contextual"], 72.0);
        assert_eq!(s.polarity_estimates["social"], 60.0);
    }

    #[tokio::test]
    async fn missing_bias_uses_neutral_value() {
        let s = ensemble(Some(fixed("contextual", 40.0, None))).score(&comment(), "rollout", None).await;
        assert_eq!(s.bias_score, 50.0);
        assert!(!s.contextual_fallback);
    }

    #[tokio::test]
    async fn lexical_only_renormalizes() {
        let e = ensemble(None);
        assert!(!e.has_contextual());
        let s = e.score(&comment(), "rollout", None).await;
        let expected = (0.25 * 60.0 + 0.15 * 72.0) / 0.40;
        assert!((s.ensemble_score - expected).abs() < 1e-9);
        assert!(!s.polarity_estimates.contains_key("contextual"));
    }

    #[tokio::test]
    async fn extreme_estimates_are_not_pulled_toward_the_midpoint() {
        let e = Ensemble::with_estimators(
            &EnsembleConfig::default(),
            &WeightConfig::default(),
            Some(fixed("contextual", 0.0, Some(0.0))),
            fixed("social", 0.0, None),
            fixed("baseline", 0.0, None),
        );
        let s = e.score(&comment(), "rollout", None).await;
        assert_eq!(s.ensemble_score, 0.0);
    }

    #[tokio::test]
    async fn carries_weights_and_identity() {
        let c = comment();
        let s = ensemble(None).score(&c, "rollout", None).await;
        assert_eq!(s.comment_id, c.id());
        assert_eq!(s.word_count, 7);
        assert!(s.length_weight > 0.1 && s.length_weight < 1.0);
        assert!(s.source_credibility > 65.0);
        assert!((s.credibility_weight - s.source_credibility / 100.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn real_lexical_estimators_fall_back_exactly() {
        let e = Ensemble::new(&EnsembleConfig::default(), &WeightConfig::default(), Some(failing()));
        let c = comment();
        let s = e.score(&c, "rollout", None).await;
        assert_eq!(s.ensemble_score, LexicalBaseline::new().score(&c.text));
    }
}
