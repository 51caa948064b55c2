use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{get_json, SortOrder, SourceAdapter};
use crate::api_types::{YtSearchResponse, YtThread, YtThreadsResponse};
use crate::error::SourceError;
use crate::models::{Comment, Source};
use crate::text::normalize;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MAX_VIDEOS: usize = 15;

/// Video-comment adapter over the YouTube Data API.
pub struct YouTubeAdapter {
    client: Client,
    api_key: String,
}

impl YouTubeAdapter {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self { client, api_key: api_key.into() }
    }

    async fn video_ids(&self, subject: &str) -> Result<Vec<String>, SourceError> {
        let max = MAX_VIDEOS.to_string();
        let req = self.client.get(format!("{}/search", API_BASE)).query(&[
            ("q", subject),
            ("part", "id"),
            ("type", "video"),
            ("order", "relevance"),
            ("maxResults", max.as_str()),
            ("key", self.api_key.as_str()),
        ]);
        let resp: YtSearchResponse = get_json(Source::YouTube, req).await?;
        Ok(resp.items.into_iter().filter_map(|i| i.id.video_id).collect())
    }

    async fn threads(&self, video_id: &str, order: SortOrder, max_results: usize) -> Result<Vec<YtThread>, SourceError> {
        let order = match order {
            SortOrder::Relevance => "relevance",
            SortOrder::Recent => "time",
        };
        let max = max_results.clamp(1, 100).to_string();
        let req = self.client.get(format!("{}/commentThreads", API_BASE)).query(&[
            ("part", "snippet"),
            ("videoId", video_id),
            ("order", order),
            ("textFormat", "plainText"),
            ("maxResults", max.as_str()),
            ("key", self.api_key.as_str()),
        ]);
        let resp: YtThreadsResponse = get_json(Source::YouTube, req).await?;
        Ok(resp.items)
    }
}

fn to_comment(t: YtThread, video_id: &str) -> Comment {
    let s = t.snippet.top_level_comment.snippet;
    let ts = DateTime::parse_from_rfc3339(&s.published_at)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default();
    let text = s.text_original.unwrap_or(s.text_display);
    Comment::new(Source::YouTube, t.id, normalize(&text), ts)
        .with_author(s.author_display_name)
        .with_engagement(s.like_count)
        .with_venue(video_id)
}

#[async_trait]
impl SourceAdapter for YouTubeAdapter {
    fn source(&self) -> Source {
        Source::YouTube
    }

    fn orderings(&self) -> Vec<SortOrder> {
        vec![SortOrder::Relevance, SortOrder::Recent]
    }

    async fn search(&self, subject: &str, order: SortOrder, limit: usize) -> Result<Vec<Comment>, SourceError> {
        let start = std::time::Instant::now();
        let videos = self.video_ids(subject).await?;
        if videos.is_empty() {
            debug!("YouTube search returned no videos - subject={}", subject);
            return Ok(Vec::new());
        }
        // spread the budget over the videos instead of draining the first one
        let per_video = (limit / videos.len()).max(5);

        let mut out = Vec::new();
        for video_id in &videos {
            if out.len() >= limit {
                break;
            }
            match self.threads(video_id, order, per_video.min(50)).await {
                Ok(threads) => {
                    for t in threads {
                        if out.len() >= limit {
                            break;
                        }
                        out.push(to_comment(t, video_id));
                    }
                }
                // comments disabled on a video is a 403 here; skip that video only
                Err(e) => warn!("YouTube video skipped - video={}, error={}", video_id, e),
            }
        }

        info!(
            "YouTube fetch completed - order={}, duration={:.2}s, videos={}, comments={}",
            order,
            start.elapsed().as_secs_f32(),
            videos.len(),
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
    fn prefers_original_text_and_parses_timestamp() {
        let t: YtThread = serde_json::from_value(json!({
            "id": "Ugx1",
            "snippet": {"topLevelComment": {"snippet": {
                "textDisplay": "escaped &amp; text",
                "textOriginal": "escaped & text",
                "authorDisplayName": "@viewer",
                "likeCount": 42,
                "publishedAt": "2025-03-01T12:30:00Z"
            }}}
        }))
        .unwrap();
        let c = to_comment(t, "vid9");
        assert_eq!(c.text, "escaped & text");
        assert_eq!(c.engagement, 42);
        assert_eq!(c.venue.as_deref(), Some("vid9"));
        assert_eq!(c.timestamp.to_rfc3339(), "2025-03-01T12:30:00+00:00");
    }
}
