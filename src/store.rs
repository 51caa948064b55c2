use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{AggregateResult, ScoredComment};

const RESULTS_FILE: &str = "results.jsonl";
const COMMENTS_FILE: &str = "comments.jsonl";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub comments_written: usize,
    pub comments_skipped: usize,
}

/// A subject whose index moved by at least the requested amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub subject: String,
    pub first: f64,
    pub latest: f64,
    pub change: f64,
    pub runs: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CommentRecord {
    run_at: DateTime<Utc>,
    #[serde(flatten)]
    comment: ScoredComment,
}

pub trait ResultStore {
    /// Append one run. A comment that cannot be written is logged and
    /// skipped; the aggregate result is written regardless.
    fn persist(&self, result: &AggregateResult, scored: &[ScoredComment]) -> Result<PersistReport>;

    fn latest(&self, subject: &str) -> Result<Option<AggregateResult>>;

    /// Results computed at or after `since`, oldest first.
    fn history(&self, subject: &str, since: DateTime<Utc>) -> Result<Vec<AggregateResult>>;

    fn subjects(&self) -> Result<Vec<String>>;

    /// Subjects whose index changed by at least `min_change` (either
    /// direction) between their first and latest run since `since`.
    /// Largest movement first.
    fn trending(&self, since: DateTime<Utc>, min_change: f64) -> Result<Vec<Trend>>;

    /// Current view of every comment stored for a subject.
    fn comments(&self, subject: &str) -> Result<Vec<ScoredComment>>;
}

/// One directory per subject holding `results.jsonl` and `comments.jsonl`.
/// Readers keep the last line written per `comment_id`.
pub struct JsonlStore {
    root: PathBuf,
}

/// Directory name for a subject: a readable slug plus a hash so distinct
/// subjects never collide after slugging.
pub fn subject_dir_name(subject: &str) -> String {
    let slug: String = subject
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(48)
        .collect();
    format!("{}-{:08x}", slug, xxh3_64(subject.trim().as_bytes()) as u32)
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(v) => out.push(v),
            Err(e) => warn!("Skipping unreadable record - file={}, line={}, error={}", path.display(), n + 1, e),
        }
    }
    Ok(out)
}

impl JsonlStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn subject_dir(&self, subject: &str) -> PathBuf {
        self.root.join(subject_dir_name(subject))
    }

    fn open_append(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {} for append", path.display()))
    }

    fn results(&self, subject: &str) -> Result<Vec<AggregateResult>> {
        read_lines(&self.subject_dir(subject).join(RESULTS_FILE))
    }
}

impl ResultStore for JsonlStore {
    fn persist(&self, result: &AggregateResult, scored: &[ScoredComment]) -> Result<PersistReport> {
        let start = std::time::Instant::now();
        let dir = self.subject_dir(&result.subject);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        let mut report = PersistReport::default();
        match Self::open_append(&dir.join(COMMENTS_FILE)) {
            Ok(mut comments) => {
                for c in scored {
                    let record = CommentRecord { run_at: result.computed_at, comment: c.clone() };
                    let written = serde_json::to_string(&record)
                        .map_err(anyhow::Error::from)
                        .and_then(|line| writeln!(comments, "{}", line).map_err(anyhow::Error::from));
                    match written {
                        Ok(()) => report.comments_written += 1,
                        Err(e) => {
                            warn!("Comment not persisted - comment_id={}, error={}", c.comment_id, e);
                            report.comments_skipped += 1;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Comment log unavailable - subject={}, skipped={}, error={:#}", result.subject, scored.len(), e);
                report.comments_skipped = scored.len();
            }
        }

        let mut results = Self::open_append(&dir.join(RESULTS_FILE))?;
        let line = serde_json::to_string(result).context("serializing aggregate result")?;
        writeln!(results, "{}", line).context("appending aggregate result")?;

        info!(
            "Run persisted - subject={}, comments={}, skipped={}, duration={:.2}s",
            result.subject,
            report.comments_written,
            report.comments_skipped,
            start.elapsed().as_secs_f32()
        );
        Ok(report)
    }

    fn latest(&self, subject: &str) -> Result<Option<AggregateResult>> {
        Ok(self.results(subject)?.into_iter().max_by_key(|r| r.computed_at))
    }

    fn history(&self, subject: &str, since: DateTime<Utc>) -> Result<Vec<AggregateResult>> {
        let mut rows: Vec<AggregateResult> = self
            .results(subject)?
            .into_iter()
            .filter(|r| r.computed_at >= since)
            .collect();
        rows.sort_by_key(|r| r.computed_at);
        Ok(rows)
    }

    fn subjects(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root).with_context(|| format!("listing {}", self.root.display()))? {
            let path = entry?.path();
            let rows: Vec<AggregateResult> = read_lines(&path.join(RESULTS_FILE))?;
            if let Some(r) = rows.last() {
                out.push(r.subject.clone());
            }
        }
        out.sort();
        Ok(out)
    }

    fn trending(&self, since: DateTime<Utc>, min_change: f64) -> Result<Vec<Trend>> {
        let mut out = Vec::new();
        for subject in self.subjects()? {
            let rows: Vec<AggregateResult> = self.history(&subject, since)?.into_iter().filter(|r| !r.no_data).collect();
            let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
                continue;
            };
            if rows.len() < 2 {
                continue;
            }
            let change = last.index_score - first.index_score;
            if change.abs() >= min_change {
                out.push(Trend {
                    subject,
                    first: first.index_score,
                    latest: last.index_score,
                    change,
                    runs: rows.len(),
                });
            }
        }
        out.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));
        Ok(out)
    }

    fn comments(&self, subject: &str) -> Result<Vec<ScoredComment>> {
        let records: Vec<CommentRecord> = read_lines(&self.subject_dir(subject).join(COMMENTS_FILE))?;
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, ScoredComment> = HashMap::new();
        for r in records {
            let id = r.comment.comment_id.clone();
            if latest.insert(id.clone(), r.comment).is_none() {
                order.push(id);
            }
        }
        Ok(order.into_iter().filter_map(|id| latest.remove(&id)).collect())
    }
}
