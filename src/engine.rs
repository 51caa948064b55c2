use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::cancel::CancellationToken;
use crate::collect::{Collector, DropCounts, SourceFailure};
use crate::config::EngineConfig;
use crate::context::ContextSupplier;
use crate::ensemble::Ensemble;
use crate::estimators::PolarityEstimator;
use crate::models::{AggregateResult, Comment, ScoredComment};
use crate::sources::SourceAdapter;
use crate::store::{PersistReport, ResultStore};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: AggregateResult,
    pub scored: Vec<ScoredComment>,
    pub failures: Vec<SourceFailure>,
    pub dropped: DropCounts,
    pub context: Option<String>,
    pub cancelled: bool,
    pub persisted: Option<PersistReport>,
}

pub struct Engine {
    config: EngineConfig,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    ensemble: Ensemble,
    aggregator: Aggregator,
    context: Option<Box<dyn ContextSupplier>>,
    store: Option<Box<dyn ResultStore>>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        contextual: Option<Arc<dyn PolarityEstimator>>,
    ) -> Self {
        let ensemble = Ensemble::new(&config.ensemble, &config.weights, contextual);
        Self::with_ensemble(config, adapters, ensemble)
    }

    pub fn with_ensemble(config: EngineConfig, adapters: Vec<Arc<dyn SourceAdapter>>, ensemble: Ensemble) -> Self {
        let aggregator = Aggregator::new(&config.aggregate, &config.weights);
        Self { config, adapters, ensemble, aggregator, context: None, store: None }
    }

    pub fn with_context(mut self, supplier: Box<dyn ContextSupplier>) -> Self {
        self.context = Some(supplier);
        self
    }

    pub fn with_store(mut self, store: Box<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn run(&self, subject: &str, category: Option<&str>, cancel: &CancellationToken) -> RunReport {
        let run_start = std::time::Instant::now();
        info!(
            "Run started - subject={}, sources={}, contextual={}",
            subject,
            self.adapters.len(),
            self.ensemble.has_contextual()
        );

        let collection = Collector::new(&self.config.collector).collect(subject, &self.adapters, cancel).await;

        let context = match &self.context {
            Some(supplier) if !collection.is_empty() && !cancel.is_cancelled() => Some(supplier.get_context(subject).await),
            _ => None,
        };

        let scored = self.score_all(subject, &collection.comments, context.as_deref(), cancel).await;
        let cancelled = cancel.is_cancelled();

        let result = self.aggregator.aggregate(subject, category, &scored);
        if result.no_data {
            warn!("No data for subject - subject={}, source_failures={}", subject, collection.failures.len());
        }

        let persisted = match &self.store {
            Some(_) if cancelled => {
                info!("Run cancelled, skipping persistence - subject={}, scored={}", subject, scored.len());
                None
            }
            Some(store) => match store.persist(&result, &scored) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!("Persistence failed - subject={}, error={:#}", subject, e);
                    None
                }
            },
            None => None,
        };

        info!(
            "Run completed - duration={:.2}s, subject={}, index={:.2}, confidence={:.2}, sample={}, fallbacks={}, cancelled={}",
            run_start.elapsed().as_secs_f32(),
            subject,
            result.index_score,
            result.confidence,
            result.sample_size,
            result.fallback_count,
            cancelled
        );

        RunReport {
            result,
            scored,
            failures: collection.failures,
            dropped: collection.dropped,
            context,
            cancelled,
            persisted,
        }
    }

    async fn score_all(
        &self,
        subject: &str,
        comments: &[Comment],
        context: Option<&str>,
        cancel: &CancellationToken,
    ) -> Vec<ScoredComment> {
        let total = comments.len();
        if total == 0 {
            return Vec::new();
        }
        let batch_size = self.config.scoring.max_concurrency.max(1);
        let scoring_start = std::time::Instant::now();
        info!("Scoring starting - comments={}, batch_size={}", total, batch_size);

        let mut scored = Vec::with_capacity(total);
        let mut total_batch_time = 0.0f32;
        for (batch_no, batch) in comments.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                warn!("Scoring cancelled - scored={}/{}", scored.len(), total);
                break;
            }
            let batch_start = std::time::Instant::now();
            let results = join_all(batch.iter().map(|c| self.ensemble.score(c, subject, context))).await;
            scored.extend(results);

            let batch_elapsed = batch_start.elapsed().as_secs_f32();
            total_batch_time += batch_elapsed;
            let completed = scored.len();
            let pct = (completed as f32 / total as f32 * 100.0) as u32;
            let avg_batch_time = total_batch_time / (batch_no + 1) as f32;
            let remaining_batches = ((total - completed) as f32 / batch_size as f32).ceil() as u32;
            let eta_seconds = avg_batch_time * remaining_batches as f32;

            info!(
                "Scoring progress: {}/{} ({}%) | Batch of {}: {:.1}s | Avg batch: {:.1}s | ETA: {}m {}s",
                completed,
                total,
                pct,
                batch.len(),
                batch_elapsed,
                avg_batch_time,
                (eta_seconds / 60.0) as u32,
                (eta_seconds % 60.0) as u32
            );
        }

        debug!(
            "Scoring completed - duration={:.2}s, scored={}",
            scoring_start.elapsed().as_secs_f32(),
            scored.len()
        );
        scored
    }
}
