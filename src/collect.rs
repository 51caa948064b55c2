use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::CollectorConfig;
use crate::error::SourceError;
use crate::models::{Comment, Source};
use crate::sources::{SortOrder, SourceAdapter};
use crate::text::{is_deleted_sentinel, word_count};

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: Source,
    pub order: SortOrder,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub empty: usize,
    pub deleted: usize,
    pub too_short: usize,
    pub duplicate: usize,
    pub over_cap: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.empty + self.deleted + self.too_short + self.duplicate + self.over_cap
    }

    fn add(&mut self, other: DropCounts) {
        self.empty += other.empty;
        self.deleted += other.deleted;
        self.too_short += other.too_short;
        self.duplicate += other.duplicate;
        self.over_cap += other.over_cap;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    Empty,
    Deleted,
    TooShort,
}

/// Everything one collection pass produced. `comments` holds distinct items
/// only; an empty list with failures means every source failed.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub comments: Vec<Comment>,
    pub failures: Vec<SourceFailure>,
    pub dropped: DropCounts,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

struct SourceBatch {
    comments: Vec<Comment>,
    failures: Vec<SourceFailure>,
    dropped: DropCounts,
}

fn quality_check(c: &Comment, min_words: usize) -> Result<(), DropReason> {
    let text = c.text.trim();
    if text.is_empty() {
        return Err(DropReason::Empty);
    }
    if is_deleted_sentinel(text) {
        return Err(DropReason::Deleted);
    }
    if word_count(text) < min_words {
        return Err(DropReason::TooShort);
    }
    Ok(())
}

pub struct Collector<'a> {
    config: &'a CollectorConfig,
}

impl<'a> Collector<'a> {
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self { config }
    }

    pub async fn collect(
        &self,
        subject: &str,
        adapters: &[Arc<dyn SourceAdapter>],
        cancel: &CancellationToken,
    ) -> Collection {
        let start = std::time::Instant::now();
        info!("Collection started - subject={}, sources={}", subject, adapters.len());

        // sources are independent: a slow or failing one only affects itself
        let tasks = adapters.iter().map(|a| {
            let cap = self.config.cap_for(a.source(), adapters.len());
            self.gather(subject, a.as_ref(), cap, cancel)
        });
        let batches = join_all(tasks).await;

        let mut out = Collection::default();
        let mut seen: HashSet<(Source, String)> = HashSet::new();
        for batch in batches {
            out.failures.extend(batch.failures);
            out.dropped.add(batch.dropped);
            for c in batch.comments {
                if !seen.insert((c.source, c.platform_id.clone())) {
                    out.dropped.duplicate += 1;
                    continue;
                }
                if out.comments.len() >= self.config.total_cap {
                    out.dropped.over_cap += 1;
                    continue;
                }
                out.comments.push(c);
            }
        }

        if out.comments.is_empty() {
            warn!(
                "Collection produced no comments - subject={}, failures={}",
                subject,
                out.failures.len()
            );
        }
        info!(
            "Collection completed - duration={:.2}s, comments={}, dropped={}, failures={}",
            start.elapsed().as_secs_f32(),
            out.comments.len(),
            out.dropped.total(),
            out.failures.len()
        );
        out
    }

    /// Draw from every ordering the adapter supports, splitting the
    /// remaining cap across the orderings still to go. Stops once `cap`
    /// distinct, qualifying comments are in hand.
    async fn gather(
        &self,
        subject: &str,
        adapter: &dyn SourceAdapter,
        cap: usize,
        cancel: &CancellationToken,
    ) -> SourceBatch {
        let source = adapter.source();
        let min_words = self.config.min_words_for(source);
        let orders = adapter.orderings();

        let mut batch = SourceBatch { comments: Vec::new(), failures: Vec::new(), dropped: DropCounts::default() };
        let mut seen: HashSet<String> = HashSet::new();

        for (i, order) in orders.iter().copied().enumerate() {
            let remaining = cap.saturating_sub(batch.comments.len());
            if remaining == 0 {
                break;
            }
            if cancel.is_cancelled() {
                debug!("Collection cancelled - source={}, order={}", source, order);
                break;
            }
            let left = orders.len() - i;
            let request = remaining.div_ceil(left);

            let result = match timeout(self.config.adapter_timeout(), adapter.search(subject, order, request)).await {
                Ok(r) => r,
                Err(_) => Err(SourceError::Timeout { source_tag: source, elapsed: self.config.adapter_timeout() }),
            };

            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    warn!("Source failed - source={}, order={}, error={}", source, order, e);
                    let auth = matches!(e, SourceError::Auth { .. });
                    batch.failures.push(SourceFailure { source, order, message: e.to_string() });
                    if auth {
                        break;
                    }
                    continue;
                }
            };

            let fetched = items.len();
            let mut kept = 0usize;
            for c in items {
                if batch.comments.len() >= cap {
                    batch.dropped.over_cap += 1;
                    continue;
                }
                match quality_check(&c, min_words) {
                    Err(DropReason::Empty) => batch.dropped.empty += 1,
                    Err(DropReason::Deleted) => batch.dropped.deleted += 1,
                    Err(DropReason::TooShort) => batch.dropped.too_short += 1,
                    Ok(()) => {
                        if seen.insert(c.platform_id.clone()) {
                            batch.comments.push(c);
                            kept += 1;
                        } else {
                            batch.dropped.duplicate += 1;
                        }
                    }
                }
            }
            debug!(
                "Source ordering drained - source={}, order={}, requested={}, fetched={}, kept={}",
                source, order, request, fetched, kept
            );
        }

        info!(
            "Source collection completed - source={}, comments={}, dropped={}",
            source,
            batch.comments.len(),
            batch.dropped.total()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeAdapter {
        source: Source,
        pages: HashMap<SortOrder, Vec<Comment>>,
        fail: bool,
        requests: Mutex<Vec<(SortOrder, usize)>>,
    }

    impl FakeAdapter {
        fn new(source: Source) -> Self {
            Self { source, pages: HashMap::new(), fail: false, requests: Mutex::new(Vec::new()) }
        }

        fn page(mut self, order: SortOrder, items: Vec<Comment>) -> Self {
            self.pages.insert(order, items);
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl SourceAdapter for FakeAdapter {
        fn source(&self) -> Source {
            self.source
        }

        fn orderings(&self) -> Vec<SortOrder> {
            vec![SortOrder::Relevance, SortOrder::Recent]
        }

        async fn search(&self, _subject: &str, order: SortOrder, limit: usize) -> Result<Vec<Comment>, SourceError> {
            self.requests.lock().unwrap().push((order, limit));
            if self.fail {
                return Err(SourceError::Transport { source_tag: self.source, message: "connection reset".into() });
            }
            Ok(self.pages.get(&order).cloned().unwrap_or_default().into_iter().take(limit).collect())
        }
    }

    fn comment(source: Source, id: &str, text: &str) -> Comment {
        Comment::new(source, id, text, Utc::now())
    }

    fn many(source: Source, prefix: &str, n: usize) -> Vec<Comment> {
        (0..n).map(|i| comment(source, &format!("{}{}", prefix, i), "a perfectly ordinary comment about things")).collect()
    }

    #[tokio::test]
    async fn drops_duplicates_sentinels_and_short_text() {
        let adapter = FakeAdapter::new(Source::Reddit)
            .page(SortOrder::Relevance, vec![
                comment(Source::Reddit, "a", "this is substantive enough"),
                comment(Source::Reddit, "b", "[deleted]"),
                comment(Source::Reddit, "c", "too short"),
                comment(Source::Reddit, "d", "   "),
            ])
            .page(SortOrder::Recent, vec![
                comment(Source::Reddit, "a", "this is substantive enough"),
                comment(Source::Reddit, "e", "another comment with words"),
            ]);
        let cfg = CollectorConfig::default();
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(adapter)];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        let ids: Vec<&str> = out.comments.iter().map(|c| c.platform_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
        assert_eq!(out.dropped.deleted, 1);
        assert_eq!(out.dropped.too_short, 1);
        assert_eq!(out.dropped.empty, 1);
        assert_eq!(out.dropped.duplicate, 1);
    }

    #[tokio::test]
    async fn draws_from_both_orderings_within_cap() {
        let adapter = Arc::new(
            FakeAdapter::new(Source::YouTube)
                .page(SortOrder::Relevance, many(Source::YouTube, "rel", 100))
                .page(SortOrder::Recent, many(Source::YouTube, "new", 100)),
        );
        let cfg = CollectorConfig::default(); // youtube cap 50
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![adapter.clone()];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        assert_eq!(out.comments.len(), 50);
        assert!(out.comments.iter().any(|c| c.platform_id.starts_with("rel")));
        assert!(out.comments.iter().any(|c| c.platform_id.starts_with("new")));
        assert_eq!(*adapter.requests.lock().unwrap(), vec![(SortOrder::Relevance, 25), (SortOrder::Recent, 25)]);
    }

    #[tokio::test]
    async fn shortfall_in_first_ordering_rolls_into_second() {
        let adapter = Arc::new(
            FakeAdapter::new(Source::Twitter)
                .page(SortOrder::Relevance, many(Source::Twitter, "rel", 10))
                .page(SortOrder::Recent, many(Source::Twitter, "new", 100)),
        );
        let cfg = CollectorConfig::default(); // twitter cap 50
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![adapter.clone()];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        assert_eq!(out.comments.len(), 50);
        assert_eq!(adapter.requests.lock().unwrap()[1], (SortOrder::Recent, 40));
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_others() {
        let good = FakeAdapter::new(Source::Reddit).page(SortOrder::Relevance, many(Source::Reddit, "r", 3));
        let bad = FakeAdapter::new(Source::Twitter).failing();
        let cfg = CollectorConfig::default();
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(bad), Arc::new(good)];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        assert_eq!(out.comments.len(), 3);
        assert_eq!(out.failures.len(), 2); // both orderings of the failing source
        assert!(out.failures.iter().all(|f| f.source == Source::Twitter));
    }

    #[tokio::test]
    async fn all_sources_failing_yields_empty_collection() {
        let cfg = CollectorConfig::default();
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(FakeAdapter::new(Source::Reddit).failing()),
            Arc::new(FakeAdapter::new(Source::YouTube).failing()),
        ];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        assert!(out.is_empty());
        assert_eq!(out.failures.len(), 4);
    }

    #[tokio::test]
    async fn cancelled_run_issues_no_calls() {
        let adapter = Arc::new(FakeAdapter::new(Source::Reddit).page(SortOrder::Relevance, many(Source::Reddit, "r", 3)));
        let cfg = CollectorConfig::default();
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![adapter.clone()];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let out = Collector::new(&cfg).collect("x", &adapters, &cancel).await;

        assert!(out.is_empty());
        assert!(adapter.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn total_cap_bounds_the_merged_list() {
        let mut cfg = CollectorConfig::default();
        cfg.total_cap = 4;
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(FakeAdapter::new(Source::Reddit).page(SortOrder::Relevance, many(Source::Reddit, "r", 3))),
            Arc::new(FakeAdapter::new(Source::YouTube).page(SortOrder::Relevance, many(Source::YouTube, "y", 3))),
        ];

        let out = Collector::new(&cfg).collect("x", &adapters, &CancellationToken::new()).await;

        assert_eq!(out.comments.len(), 4);
        assert_eq!(out.dropped.over_cap, 2);
    }
}
