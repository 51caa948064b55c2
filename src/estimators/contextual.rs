use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{Estimate, PolarityEstimator};
use crate::api_types::PolarityReply;
use crate::budget::cap_prompt_text;
use crate::error::EstimateError;
use crate::llm::Completion;
use crate::prompts::user_polarity_estimate;

/// Reasoning-service estimator. The only strategy that judges bias, and the
/// only one allowed to fail.
pub struct ContextualEstimator {
    completion: Arc<dyn Completion>,
    timeout: Duration,
    max_prompt_tokens: usize,
}

impl ContextualEstimator {
    pub fn new(completion: Arc<dyn Completion>, timeout: Duration, max_prompt_tokens: usize) -> Self {
        Self { completion, timeout, max_prompt_tokens }
    }
}

/// Read the first JSON object in a reply that has a sentiment, ignoring any
/// prose or further objects around it. Out-of-range values are clamped, not
/// rejected.
pub fn parse_reply(reply: &str) -> Result<Estimate, EstimateError> {
    let mut first_err = None;
    for (start, _) in reply.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&reply[start..]).into_iter::<PolarityReply>();
        match stream.next() {
            Some(Ok(parsed)) => return Ok(Estimate::clamped(parsed.sentiment, parsed.bias_score)),
            Some(Err(e)) => {
                first_err.get_or_insert(e);
            }
            None => {}
        }
    }
    match first_err {
        Some(e) => Err(EstimateError::Parse(e)),
        None => Err(EstimateError::Malformed(reply.len())),
    }
}

#[async_trait(?Send)]
impl PolarityEstimator for ContextualEstimator {
    fn name(&self) -> &'static str {
        "contextual"
    }

    async fn estimate(&self, text: &str, subject: &str, context: Option<&str>) -> Result<Estimate, EstimateError> {
        let capped = cap_prompt_text(text, self.max_prompt_tokens);
        let prompt = user_polarity_estimate(&capped, subject, context);

        let reply = tokio::time::timeout(self.timeout, self.completion.complete(&prompt))
            .await
            .map_err(|_| EstimateError::Timeout(self.timeout))?
            .map_err(|e| EstimateError::Service(e.to_string()))?;

        debug!("Contextual estimate reply - length={} chars", reply.len());
        parse_reply(&reply)
    }
}
