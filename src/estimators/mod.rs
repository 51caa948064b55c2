use async_trait::async_trait;

use crate::error::EstimateError;

pub mod contextual;
pub mod lexical;

pub use contextual::ContextualEstimator;
pub use lexical::{LexicalBaseline, SocialLexicon};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub polarity: f64,     // [0, 100]
    pub bias: Option<f64>, // [0, 100], None when the estimator does not judge framing
}

impl Estimate {
    /// Build an estimate with both values forced into [0, 100].
    pub fn clamped(polarity: f64, bias: Option<f64>) -> Self {
        Self {
            polarity: clamp_score(polarity),
            bias: bias.map(clamp_score),
        }
    }
}

/// Clamp into [0, 100]; NaN maps to the midpoint since it carries no direction.
pub fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        50.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

/// `[-1, 1]` polarity to the 0–100 scale.
pub fn rescale(p: f64) -> f64 {
    clamp_score((p.clamp(-1.0, 1.0) + 1.0) * 50.0)
}

#[async_trait(?Send)]
pub trait PolarityEstimator {
    fn name(&self) -> &'static str;

    async fn estimate(&self, text: &str, subject: &str, context: Option<&str>) -> Result<Estimate, EstimateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_maps_unit_interval() {
        assert_eq!(rescale(-1.0), 0.0);
        assert_eq!(rescale(0.0), 50.0);
        assert_eq!(rescale(1.0), 100.0);
        assert!((rescale(0.44) - 72.0).abs() < 1e-9);
        assert_eq!(rescale(3.0), 100.0);
    }

    #[test]
    fn clamped_forces_range() {
        let e = Estimate::clamped(140.0, Some(-5.0));
        assert_eq!(e.polarity, 100.0);
        assert_eq!(e.bias, Some(0.0));
    }
}
