use std::time::Duration;
use thiserror::Error;

use crate::models::Source;

/// Why a source adapter could not produce comments. Recovered by the
/// collector; never aborts a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_tag}: authentication failed: {message}")]
    Auth { source_tag: Source, message: String },

    #[error("{source_tag}: transport error: {message}")]
    Transport { source_tag: Source, message: String },

    #[error("{source_tag}: HTTP {status} from {url}")]
    Status { source_tag: Source, status: u16, url: String },

    #[error("{source_tag}: could not decode response: {message}")]
    Decode { source_tag: Source, message: String },

    #[error("{source_tag}: timed out after {elapsed:?}")]
    Timeout { source_tag: Source, elapsed: Duration },
}

impl SourceError {
    pub fn transport(source_tag: Source, err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode { source_tag, message: err.to_string() }
        } else if let Some(status) = err.status() {
            SourceError::Status {
                source_tag,
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            SourceError::Transport { source_tag, message: err.to_string() }
        }
    }
}

/// Why one polarity estimate failed. Recovered per comment by the ensemble.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("estimator timed out after {0:?}")]
    Timeout(Duration),

    #[error("reasoning service error: {0}")]
    Service(String),

    #[error("no JSON object in reply ({0} chars)")]
    Malformed(usize),

    #[error("could not parse reply: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("reading config {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("parsing config {path}: {source}")]
    Yaml { path: String, source: serde_yaml::Error },
}
