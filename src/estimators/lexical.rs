use async_trait::async_trait;

use super::{rescale, Estimate, PolarityEstimator};
use crate::error::EstimateError;
use crate::lexicon::LEXICON;
use crate::text::{strip_markup, trim_token};

const NEGATION_WINDOW: usize = 3;
const NEGATION_SCALAR: f64 = -0.5;

// social-lexicon constants, on a [-4, 4] valence scale
const VALENCE_SCALE: f64 = 4.0;
const BOOSTER_INCR: f64 = 0.293;
const CAPS_INCR: f64 = 0.733;
const SOCIAL_NEGATION: f64 = -0.74;
const EXCLAIM_INCR: f64 = 0.292;
const QUESTION_INCR: f64 = 0.18;
const NORMALIZE_ALPHA: f64 = 15.0;

/// Averaging lexicon baseline: mean valence of the opinion words found,
/// flipped and halved under negation, scaled by the nearest preceding
/// booster. Text with no opinion words scores exactly 50.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalBaseline;

impl LexicalBaseline {
    pub fn new() -> Self {
        Self
    }

    /// Polarity in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let clean = strip_markup(text);
        let mut scores: Vec<f64> = Vec::new();
        let mut negation_left = 0usize;
        let mut multiplier = 1.0;

        for raw in clean.split_whitespace() {
            if let Some(v) = LEXICON.emoticon(raw) {
                scores.push(v);
                continue;
            }
            let word = trim_token(raw);
            if word.is_empty() {
                continue;
            }
            if LEXICON.is_negator(&word) {
                negation_left = NEGATION_WINDOW;
                continue;
            }
            if let Some(m) = LEXICON.booster(&word) {
                multiplier = m;
                continue;
            }
            match LEXICON.valence(&word) {
                Some(v) => {
                    let mut s = v * multiplier;
                    if negation_left > 0 {
                        s *= NEGATION_SCALAR;
                    }
                    scores.push(s.clamp(-1.0, 1.0));
                    negation_left = 0;
                    multiplier = 1.0;
                }
                None => {
                    negation_left = negation_left.saturating_sub(1);
                    multiplier = 1.0;
                }
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }

    /// Polarity on the 0–100 scale.
    pub fn score(&self, text: &str) -> f64 {
        rescale(self.polarity(text))
    }
}

#[async_trait(?Send)]
impl PolarityEstimator for LexicalBaseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    async fn estimate(&self, text: &str, _subject: &str, _context: Option<&str>) -> Result<Estimate, EstimateError> {
        Ok(Estimate::clamped(self.score(text), None))
    }
}

/// Lexicon tuned for social-media text: valences add up instead of
/// averaging, shouting and exclamation marks intensify, and a contrastive
/// ("but") shifts weight toward the clause that follows it. The sum is
/// squashed into [-1, 1] with `x / sqrt(x² + α)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialLexicon;

impl SocialLexicon {
    pub fn new() -> Self {
        Self
    }

    /// Compound polarity in [-1, 1].
    pub fn compound(&self, text: &str) -> f64 {
        let clean = strip_markup(text);
        let raw: Vec<&str> = clean.split_whitespace().collect();
        let words: Vec<String> = raw.iter().map(|r| trim_token(r)).collect();
        let caps_differential = has_caps_differential(&raw);

        let mut sentiments: Vec<f64> = Vec::with_capacity(raw.len());
        for i in 0..raw.len() {
            let w = &words[i];
            if LEXICON.is_negator(w) || LEXICON.booster(w).is_some() || LEXICON.is_contrastive(w) {
                sentiments.push(0.0);
                continue;
            }
            let Some(base) = LEXICON.emoticon(raw[i]).or_else(|| LEXICON.valence(w)) else {
                sentiments.push(0.0);
                continue;
            };

            let mut v = base * VALENCE_SCALE;
            if caps_differential && is_shouted(raw[i]) {
                v += CAPS_INCR * v.signum();
            }
            for (k, decay) in [1.0, 0.95, 0.9].iter().enumerate() {
                let Some(prev) = i.checked_sub(k + 1).map(|j| &words[j]) else {
                    break;
                };
                if let Some(m) = LEXICON.booster(prev) {
                    let incr = if m >= 1.0 { BOOSTER_INCR } else { -BOOSTER_INCR };
                    v += incr * decay * v.signum();
                }
                if LEXICON.is_negator(prev) {
                    v *= SOCIAL_NEGATION;
                }
            }
            sentiments.push(v);
        }

        if let Some(pivot) = words.iter().position(|w| LEXICON.is_contrastive(w)) {
            for (j, s) in sentiments.iter_mut().enumerate() {
                if j < pivot {
                    *s *= 0.5;
                } else if j > pivot {
                    *s *= 1.5;
                }
            }
        }

        let mut sum: f64 = sentiments.iter().sum();
        if sum != 0.0 {
            let exclaims = clean.matches('!').count().min(4) as f64;
            let questions = clean.matches('?').count();
            let q = if questions > 1 { questions.min(3) as f64 * QUESTION_INCR } else { 0.0 };
            sum += (exclaims * EXCLAIM_INCR + q) * sum.signum();
        }

        (sum / (sum * sum + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }

    pub fn score(&self, text: &str) -> f64 {
        rescale(self.compound(text))
    }
}

fn is_shouted(raw: &str) -> bool {
    let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

/// Shouting only means something when the rest of the text is not shouted.
fn has_caps_differential(raw: &[&str]) -> bool {
    let shouted = raw.iter().filter(|r| is_shouted(r)).count();
    let worded = raw.iter().filter(|r| r.chars().any(|c| c.is_alphabetic())).count();
    shouted > 0 && shouted < worded
}

#[async_trait(?Send)]
impl PolarityEstimator for SocialLexicon {
    fn name(&self) -> &'static str {
        "social"
    }

    async fn estimate(&self, text: &str, _subject: &str, _context: Option<&str>) -> Result<Estimate, EstimateError> {
        Ok(Estimate::clamped(self.score(text), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_direction() {
        let b = LexicalBaseline::new();
        assert!(b.score("This policy is great") > 50.0);
        assert!(b.score("This policy is a disaster") < 50.0);
        assert_eq!(b.score("The meeting is on Tuesday"), 50.0);
    }

    #[test]
    fn baseline_negation_reaches_past_filler() {
        let b = LexicalBaseline::new();
        assert!(b.polarity("not a good idea") < 0.0);
        assert!(b.polarity("good idea") > 0.0);
    }

    #[test]
    fn baseline_boosters_scale() {
        let b = LexicalBaseline::new();
        assert!(b.polarity("very good") > b.polarity("good"));
        assert!(b.polarity("slightly good") < b.polarity("good"));
    }

    #[test]
    fn baseline_stays_in_range() {
        let b = LexicalBaseline::new();
        let s = b.score("extremely perfect absolutely excellent incredibly outstanding");
        assert!((0.0..=100.0).contains(&s));
    }

    #[test]
    fn social_emphasis_intensifies() {
        let s = SocialLexicon::new();
        assert!(s.compound("this is great") > 0.0);
        assert!(s.compound("this is GREAT") > s.compound("this is great"));
        assert!(s.compound("this is great!!!") > s.compound("this is great"));
    }

    #[test]
    fn social_contrast_favors_second_clause() {
        let s = SocialLexicon::new();
        assert!(s.compound("the idea is good but the rollout is terrible") < 0.0);
    }

    #[test]
    fn social_negation_flips() {
        let s = SocialLexicon::new();
        assert!(s.compound("this is not good") < 0.0);
    }

    #[test]
    fn social_reads_emoji() {
        let s = SocialLexicon::new();
        assert!(s.score("new update 👍👍") > 50.0);
        assert!(s.score("new update 👎") < 50.0);
        assert_eq!(s.score("new update today"), 50.0);
    }

    #[tokio::test]
    async fn lexical_estimators_never_judge_bias() {
        let e = LexicalBaseline::new().estimate("great stuff", "x", None).await.unwrap();
        assert!(e.bias.is_none());
        let e = SocialLexicon::new().estimate("great stuff", "x", Some("ctx")).await.unwrap();
        assert!(e.bias.is_none());
        assert!(e.polarity > 50.0);
    }
}
