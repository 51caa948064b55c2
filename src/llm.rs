use anyhow::{anyhow, Result};
use async_trait::async_trait;
use awful_aj::{api::ask, config::AwfulJadeConfig, template::ChatTemplate};
use tracing::{debug, info};

/// A single-turn completion backend. The contextual estimator and the
/// LLM context supplier both talk to the model through this seam, which is
/// what lets tests swap in a canned responder.
#[async_trait(?Send)]
pub trait Completion {
    async fn complete(&self, user: &str) -> Result<String>;
}

/// Completion over an awful_aj endpoint with a fixed system template.
pub struct AwfulJadeCompletion {
    cfg: AwfulJadeConfig,
    tpl: ChatTemplate,
}

impl AwfulJadeCompletion {
    pub fn new(cfg: AwfulJadeConfig, tpl: ChatTemplate) -> Self {
        Self { cfg, tpl }
    }
}

#[async_trait(?Send)]
impl Completion for AwfulJadeCompletion {
    async fn complete(&self, user: &str) -> Result<String> {
        llm_call(&self.cfg, &self.tpl, user).await
    }
}

pub async fn llm_call(cfg: &AwfulJadeConfig, tpl: &ChatTemplate, user: &str) -> Result<String> {
    let start = std::time::Instant::now();

    debug!("LLM call starting - prompt_length={} chars", user.len());

    // Map Box<dyn StdError> -> anyhow::Error *before* `?`
    let answer = ask(cfg, user.to_string(), tpl, None, None, false)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;

    info!(
        "LLM API call completed - duration={:.2}s, response_length={} chars",
        start.elapsed().as_secs_f32(),
        answer.len()
    );

    Ok(answer)
}
