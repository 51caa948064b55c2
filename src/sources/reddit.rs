use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{get_json, SortOrder, SourceAdapter};
use crate::api_types::{RedditComment, RedditLink, RedditListing, RedditToken};
use crate::error::SourceError;
use crate::models::{Comment, Source};
use crate::text::normalize;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const REPLIES_PER_PARENT: usize = 3;

/// Forum-style adapter: searches all of Reddit, then walks the comment
/// trees of the matching threads.
pub struct RedditAdapter {
    client: Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    time_filter: String,
}

impl RedditAdapter {
    pub fn new(client: Client, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            user_agent: format!("vibe_index/{}", env!("CARGO_PKG_VERSION")),
            time_filter: "month".to_string(),
        }
    }

    pub fn with_time_filter(mut self, time_filter: impl Into<String>) -> Self {
        self.time_filter = time_filter.into();
        self
    }

    async fn token(&self) -> Result<String, SourceError> {
        let req = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")]);
        let tok: RedditToken = get_json(Source::Reddit, req).await?;
        debug!("Reddit token acquired - expires_in={}s", tok.expires_in);
        Ok(tok.access_token)
    }

    async fn search_links(&self, token: &str, subject: &str, order: SortOrder, per_page: usize) -> Result<Vec<RedditLink>, SourceError> {
        let sort = match order {
            SortOrder::Relevance => "relevance",
            SortOrder::Recent => "new",
        };
        let limit = per_page.to_string();
        let req = self
            .client
            .get(format!("{}/r/all/search", API_BASE))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", subject),
                ("sort", sort),
                ("t", self.time_filter.as_str()),
                ("limit", limit.as_str()),
                ("type", "link"),
            ]);
        let listing: RedditListing<RedditLink> = get_json(Source::Reddit, req).await?;
        Ok(listing.data.children.into_iter().filter(|c| c.kind == "t3").map(|c| c.data).collect())
    }

    async fn thread_comments(&self, token: &str, link: &RedditLink) -> Result<Vec<RedditComment>, SourceError> {
        let req = self
            .client
            .get(format!("{}/comments/{}", API_BASE, link.id))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("depth", "2"), ("limit", "100"), ("sort", "top")]);
        // [link listing, comment listing]
        let parts: Vec<RedditListing<serde_json::Value>> = get_json(Source::Reddit, req).await?;
        let Some(tree) = parts.into_iter().nth(1) else {
            return Ok(Vec::new());
        };
        Ok(flatten_thread(tree))
    }
}

/// Top-level comments plus the first few replies under each, so a thread
/// contributes more than its most upvoted voices.
fn flatten_thread(tree: RedditListing<serde_json::Value>) -> Vec<RedditComment> {
    let top: Vec<RedditComment> = tree
        .data
        .children
        .into_iter()
        .filter(|t| t.kind == "t1")
        .filter_map(|t| serde_json::from_value(t.data).ok())
        .collect();

    let mut pool = Vec::with_capacity(top.len() * 2);
    let mut replies = Vec::new();
    for c in top {
        if let Ok(listing) = serde_json::from_value::<RedditListing<serde_json::Value>>(c.replies.clone()) {
            replies.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .filter(|t| t.kind == "t1")
                    .filter_map(|t| serde_json::from_value::<RedditComment>(t.data).ok())
                    .take(REPLIES_PER_PARENT),
            );
        }
        pool.push(c);
    }
    pool.extend(replies);
    pool
}

fn to_comment(c: RedditComment, subreddit: &str) -> Comment {
    let ts = DateTime::<Utc>::from_timestamp(c.created_utc as i64, 0).unwrap_or_default();
    let venue = c.subreddit.unwrap_or_else(|| subreddit.to_string());
    Comment::new(Source::Reddit, c.id, normalize(&c.body), ts)
        .with_author(c.author.unwrap_or_else(|| "[deleted]".to_string()))
        .with_engagement(c.score)
        .with_venue(venue)
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn source(&self) -> Source {
        Source::Reddit
    }

    fn orderings(&self) -> Vec<SortOrder> {
        // relevance skews toward popular threads; "new" adds unfiltered recent opinion
        vec![SortOrder::Relevance, SortOrder::Recent]
    }

    async fn search(&self, subject: &str, order: SortOrder, limit: usize) -> Result<Vec<Comment>, SourceError> {
        let start = std::time::Instant::now();
        let token = self.token().await?;
        let per_page = (limit / 10).max(5);
        let links = self.search_links(&token, subject, order, per_page).await?;
        debug!("Reddit search - order={}, threads={}", order, links.len());

        let mut out = Vec::new();
        for link in &links {
            if out.len() >= limit {
                break;
            }
            match self.thread_comments(&token, link).await {
                Ok(comments) => {
                    for c in comments {
                        if out.len() >= limit {
                            break;
                        }
                        out.push(to_comment(c, &link.subreddit));
                    }
                }
                // one broken thread should not cost the whole search
                Err(e) => warn!("Reddit thread skipped - thread={}, error={}", link.id, e),
            }
        }

        info!(
            "Reddit fetch completed - order={}, duration={:.2}s, comments={}",
            order,
            start.elapsed().as_secs_f32(),
            out.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_top_level_and_limited_replies() {
        let reply = |id: &str| json!({"kind": "t1", "data": {"id": id, "body": "a reply body", "score": 1, "created_utc": 1.0}});
        let tree: RedditListing<serde_json::Value> = serde_json::from_value(json!({
            "data": {"children": [
                {"kind": "t1", "data": {
                    "id": "p1", "body": "parent body text", "score": 10, "created_utc": 1700000000.0,
                    "replies": {"data": {"children": [reply("r1"), reply("r2"), reply("r3"), reply("r4")]}}
                }},
                {"kind": "t1", "data": {"id": "p2", "body": "second parent", "score": -4, "created_utc": 1700000000.0, "replies": ""}},
                {"kind": "more", "data": {"count": 12, "children": ["x"]}}
            ]}
        }))
        .unwrap();

        let ids: Vec<String> = flatten_thread(tree).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["p1", "p2", "r1", "r2", "r3"]);
    }

    #[test]
    fn maps_missing_author_to_placeholder() {
        let c: RedditComment = serde_json::from_value(json!({
            "id": "abc", "body": "  some text here  ", "score": 7, "created_utc": 1700000000.0
        }))
        .unwrap();
        let comment = to_comment(c, "news");
        assert_eq!(comment.author, "[deleted]");
        assert_eq!(comment.text, "some text here");
        assert_eq!(comment.venue.as_deref(), Some("news"));
        assert_eq!(comment.engagement, 7);
    }
}
