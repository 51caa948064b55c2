use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::info;

use super::{get_json, SortOrder, SourceAdapter};
use crate::api_types::{TwRecentSearch, TwTweet};
use crate::error::SourceError;
use crate::models::{Comment, Source};
use crate::text::normalize;

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// Microblog adapter over the X/Twitter v2 recent-search endpoint.
/// Retweets and replies are excluded at the query level.
pub struct TwitterAdapter {
    client: Client,
    bearer_token: String,
}

impl TwitterAdapter {
    pub fn new(client: Client, bearer_token: impl Into<String>) -> Self {
        Self { client, bearer_token: bearer_token.into() }
    }
}

pub(crate) fn build_query(subject: &str) -> String {
    format!("{} -is:retweet -is:reply lang:en", subject)
}

fn to_comment(t: TwTweet) -> Comment {
    let ts = t
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default();
    let likes = t.public_metrics.map(|m| m.like_count).unwrap_or(0);
    Comment::new(Source::Twitter, t.id, normalize(&t.text), ts)
        .with_author(t.author_id.unwrap_or_else(|| "[anonymous]".to_string()))
        .with_engagement(likes)
}

#[async_trait]
impl SourceAdapter for TwitterAdapter {
    fn source(&self) -> Source {
        Source::Twitter
    }

    async fn search(&self, subject: &str, _order: SortOrder, limit: usize) -> Result<Vec<Comment>, SourceError> {
        let start = std::time::Instant::now();
        // endpoint accepts 10..=100
        let max = limit.clamp(10, 100).to_string();
        let query = build_query(subject);
        let req = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max.as_str()),
                ("tweet.fields", "created_at,public_metrics,author_id"),
            ]);
        let resp: TwRecentSearch = get_json(Source::Twitter, req).await?;
        let out: Vec<Comment> = resp.data.into_iter().take(limit).map(to_comment).collect();

        info!(
            "Twitter fetch completed - duration={:.2}s, posts={}",
            start.elapsed().as_secs_f32(),
            out.len()
        );
        Ok(out)
    }
}
