//! Sampler loop: fetch, estimate, store.

use crate::core::{Estimate, EstimateError, IntensityEstimator, SharedIntensityCell};
use crate::engine::lifecycle::ShutdownSignal;
use crate::source::{EventSource, SearchQuery};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What a single sampler tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// A new intensity was written to the cell
    Stored(Estimate),
    /// The source call failed; the cell was left alone
    SourceFailed,
    /// The batch could not be estimated; the cell was left alone
    Rejected(EstimateError),
}

/// Periodically samples the source and refreshes the shared cell.
pub struct Sampler {
    source: Arc<dyn EventSource>,
    estimator: IntensityEstimator,
    query: SearchQuery,
    cell: SharedIntensityCell,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        source: Arc<dyn EventSource>,
        estimator: IntensityEstimator,
        keyword: impl Into<String>,
        cell: SharedIntensityCell,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            estimator,
            query: SearchQuery::recent(keyword),
            cell,
            interval,
        }
    }

    /// Tick until shutdown. The first tick fires one interval after start.
    ///
    /// A tick already in progress runs to completion; shutdown only
    /// suppresses later ticks.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            keyword = %self.query.keyword,
            interval_secs = self.interval.as_secs_f64(),
            "Sampler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        tracing::info!("Sampler stopped");
    }

    /// Run one fetch/estimate/store cycle.
    pub async fn tick(&self) -> SampleOutcome {
        let items = match self.source.search(&self.query).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    keyword = %self.query.keyword,
                    error = %e,
                    "Failed to gather events"
                );
                return SampleOutcome::SourceFailed;
            }
        };

        match self.estimator.estimate_items(&items) {
            Ok(estimate) => {
                tracing::info!(
                    keyword = %self.query.keyword,
                    events = estimate.stats.events,
                    avg_gap_secs = estimate.stats.avg_gap_secs,
                    gap_std_dev_secs = estimate.stats.gap_std_dev_secs,
                    intensity = estimate.intensity.value(),
                    "Calculated intensity"
                );
                self.cell.store(estimate.intensity);
                SampleOutcome::Stored(estimate)
            }
            Err(e) => {
                tracing::warn!(
                    keyword = %self.query.keyword,
                    events = items.len(),
                    error = %e,
                    "Discarding batch"
                );
                SampleOutcome::Rejected(e)
            }
        }
    }
}
