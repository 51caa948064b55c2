use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// Platform a comment was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "news_comments")]
    NewsComments,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Reddit => "reddit",
            Source::YouTube => "youtube",
            Source::Twitter => "twitter",
            Source::NewsComments => "news_comments",
            Source::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed reaction, exactly as a source adapter produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub source: Source,
    pub platform_id: String,   // unique within `source`
    pub timestamp: DateTime<Utc>,
    pub author: String,        // may be "[deleted]" or an opaque id
    pub engagement: i64,       // upvotes / likes, may be negative
    pub venue: Option<String>, // subreddit, video id
}

impl Comment {
    pub fn new(
        source: Source,
        platform_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            text: text.into(),
            source,
            platform_id: platform_id.into(),
            timestamp,
            author: "[anonymous]".to_string(),
            engagement: 0,
            venue: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_engagement(mut self, engagement: i64) -> Self {
        self.engagement = engagement;
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn id(&self) -> String {
        comment_id(self.source, &self.platform_id)
    }
}

/// Stable id for a `(source, platform_id)` pair.
pub fn comment_id(source: Source, platform_id: &str) -> String {
    format!("{:016x}", xxh3_64(format!("{}:{}", source.as_str(), platform_id).as_bytes()))
}

/// A comment plus every signal derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComment {
    pub comment_id: String,
    pub source: Source,
    pub platform_id: String,
    pub venue: Option<String>,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub engagement: i64,

    pub polarity_estimates: BTreeMap<String, f64>, // estimator name -> [0, 100]
    pub ensemble_score: f64,                       // [0, 100]
    pub bias_score: f64,                           // [0, 100]
    pub contextual_fallback: bool,

    pub source_credibility: f64, // [5, 100]
    pub credibility_weight: f64, // source_credibility / 100
    pub length_weight: f64,      // 0 or [0.1, 1.0]
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            SentimentLabel::VeryPositive
        } else if score >= 55.0 {
            SentimentLabel::Positive
        } else if score >= 45.0 {
            SentimentLabel::Neutral
        } else if score >= 30.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::VeryNegative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Very Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::VeryPositive => "Very Positive",
        }
    }
}

/// Descriptive statistics over the (unweighted) ensemble scores of one run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub variance: f64, // population variance
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// One computation run for one subject. Never mutated after the aggregator
/// returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub subject: String,
    pub category: Option<String>,
    pub index_score: f64, // [0, 100]
    pub confidence: f64,  // [0, 100], heuristic
    pub sample_size: usize,
    pub label: SentimentLabel,
    pub no_data: bool,
    pub stats: SummaryStats,
    pub source_breakdown: BTreeMap<Source, usize>,
    pub mean_bias: f64,
    pub mean_credibility: f64,
    pub mean_length_weight: f64,
    pub mean_word_count: f64,
    pub fallback_count: usize,
    pub computed_at: DateTime<Utc>,
}
