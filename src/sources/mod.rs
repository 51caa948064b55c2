use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::error::SourceError;
use crate::models::{Comment, Source};

pub mod reddit;
pub mod twitter;
pub mod youtube;

pub use reddit::RedditAdapter;
pub use twitter::TwitterAdapter;
pub use youtube::YouTubeAdapter;

/// Retrieval ordering a platform supports for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Relevance,
    Recent,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Relevance => f.write_str("relevance"),
            SortOrder::Recent => f.write_str("recent"),
        }
    }
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Orderings this platform can search by, most relevant first.
    fn orderings(&self) -> Vec<SortOrder> {
        vec![SortOrder::Relevance]
    }

    /// Search for up to `limit` comments about `subject`. No results is
    /// `Ok(vec![])`; only auth and transport failures are errors.
    async fn search(&self, subject: &str, order: SortOrder, limit: usize) -> Result<Vec<Comment>, SourceError>;
}

/// Send a request and decode its JSON body, mapping failures onto
/// [`SourceError`].
pub(crate) async fn get_json<T: DeserializeOwned>(source: Source, req: RequestBuilder) -> Result<T, SourceError> {
    let start = std::time::Instant::now();
    let resp = req.send().await.map_err(|e| SourceError::transport(source, e))?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SourceError::Auth {
            source_tag: source,
            message: format!("HTTP {} from {}", status.as_u16(), resp.url()),
        });
    }
    if !status.is_success() {
        return Err(SourceError::Status {
            source_tag: source,
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }

    let body = resp.json::<T>().await.map_err(|e| SourceError::Decode {
        source_tag: source,
        message: e.to_string(),
    })?;
    debug!("{} request completed - duration={:.2}s", source, start.elapsed().as_secs_f32());
    Ok(body)
}
