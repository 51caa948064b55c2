use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::budget::cap_prompt_text;
use crate::llm::Completion;
use crate::prompts::user_context_summary;

const CONTEXT_MAX_TOKENS: usize = 200;

pub fn fallback_context(subject: &str) -> String {
    format!("\"{}\" is the subject of ongoing online discussion.", subject)
}

#[async_trait(?Send)]
pub trait ContextSupplier {
    async fn get_context(&self, subject: &str) -> String;
}

/// Operator-provided context, used verbatim.
pub struct StaticContext(pub String);

#[async_trait(?Send)]
impl ContextSupplier for StaticContext {
    async fn get_context(&self, subject: &str) -> String {
        if self.0.trim().is_empty() {
            fallback_context(subject)
        } else {
            self.0.clone()
        }
    }
}

/// Asks the reasoning service for a short neutral briefing on the subject.
pub struct LlmContext {
    completion: Arc<dyn Completion>,
    timeout: Duration,
}

impl LlmContext {
    pub fn new(completion: Arc<dyn Completion>, timeout: Duration) -> Self {
        Self { completion, timeout }
    }
}

#[async_trait(?Send)]
impl ContextSupplier for LlmContext {
    async fn get_context(&self, subject: &str) -> String {
        let start = std::time::Instant::now();
        let prompt = user_context_summary(subject);
        match tokio::time::timeout(self.timeout, self.completion.complete(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                info!(
                    "Subject context ready - duration={:.2}s, length={} chars",
                    start.elapsed().as_secs_f32(),
                    text.len()
                );
                cap_prompt_text(text.trim(), CONTEXT_MAX_TOKENS)
            }
            Ok(Ok(_)) => {
                warn!("Subject context empty, using fallback - subject={}", subject);
                fallback_context(subject)
            }
            Ok(Err(e)) => {
                warn!("Subject context failed, using fallback - subject={}, error={}", subject, e);
                fallback_context(subject)
            }
            Err(_) => {
                warn!("Subject context timed out, using fallback - subject={}, timeout={:?}", subject, self.timeout);
                fallback_context(subject)
            }
        }
    }
}
