use serde::{Deserialize, Deserializer, Serialize};

/* Reddit */

#[derive(Debug, Clone, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<RedditThing<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditThing<T> {
    pub kind: String, // "t1" comment, "t3" link, "more"
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditLink {
    pub id: String,
    pub subreddit: String,
    #[serde(default)]
    pub num_comments: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditComment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub subreddit: Option<String>,
    /// Either an empty string or a nested listing.
    #[serde(default)]
    pub replies: serde_json::Value,
}

/* YouTube Data API v3 */

#[derive(Debug, Clone, Deserialize)]
pub struct YtSearchResponse {
    #[serde(default)]
    pub items: Vec<YtSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtSearchItem {
    pub id: YtSearchId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtSearchId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtThreadsResponse {
    #[serde(default)]
    pub items: Vec<YtThread>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtThread {
    pub id: String,
    pub snippet: YtThreadSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtThreadSnippet {
    pub top_level_comment: YtTopLevelComment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtTopLevelComment {
    pub snippet: YtCommentSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtCommentSnippet {
    pub text_display: String,
    #[serde(default)]
    pub text_original: Option<String>,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub like_count: i64,
    pub published_at: String, // RFC 3339
}

/* Twitter / X API v2 */

#[derive(Debug, Clone, Deserialize)]
pub struct TwRecentSearch {
    #[serde(default)]
    pub data: Vec<TwTweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwTweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<TwPublicMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwPublicMetrics {
    #[serde(default)]
    pub like_count: i64,
}

/* Reasoning service reply for one comment */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolarityReply {
    #[serde(default)]
    pub word_sentiment_check: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub sentiment: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub bias_score: Option<f64>,
}

// models sometimes quote their numbers ("72", "72%")
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    fn value<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            LenientNumber::Number(n) => Ok(n),
            LenientNumber::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("not a number: {s:?}"))),
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    LenientNumber::deserialize(d)?.value()
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Option::<LenientNumber>::deserialize(d)?.map(LenientNumber::value).transpose()
}
