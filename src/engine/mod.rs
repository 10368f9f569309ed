//! The two periodic loops and their wiring.
//!
//! ```text
//! EventSource ──▶ Sampler (6s) ──▶ IntensityCell ──▶ Publisher (1s) ──▶ Transport
//!                    ▲                                    ▲
//!                    └──────────── ShutdownSignal ────────┘
//! ```
//!
//! The loops share nothing but the cell and the shutdown signal, so the
//! publisher may republish a value up to one sample interval old.

pub mod lifecycle;
pub mod publisher;
pub mod sampler;

pub use lifecycle::{ShutdownController, ShutdownSignal};
pub use publisher::{PublishOutcome, Publisher};
pub use sampler::{SampleOutcome, Sampler};

use crate::config::{Config, PUBLISH_INTERVAL, SAMPLE_INTERVAL};
use crate::core::{create_shared_cell, IntensityEstimator, SharedIntensityCell};
use crate::source::EventSource;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

/// Sampler and publisher sharing one intensity cell.
pub struct Engine {
    sampler: Sampler,
    publisher: Publisher,
    cell: SharedIntensityCell,
}

impl Engine {
    /// Wire both loops from `config` at the fixed 6s/1s cadence.
    /// Nothing runs until [`Engine::start`].
    pub fn new(
        config: &Config,
        source: Arc<dyn EventSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let cell = create_shared_cell();
        let sampler = Sampler::new(
            source,
            IntensityEstimator::new(config.threshold_secs),
            config.keyword.clone(),
            Arc::clone(&cell),
            SAMPLE_INTERVAL,
        );
        let publisher = Publisher::new(
            transport,
            config.osc_address.clone(),
            Arc::clone(&cell),
            PUBLISH_INTERVAL,
        );

        Self {
            sampler,
            publisher,
            cell,
        }
    }

    /// Handle to the shared cell, for readers outside the loops.
    pub fn cell(&self) -> SharedIntensityCell {
        Arc::clone(&self.cell)
    }

    /// Spawn both loops on the current runtime.
    pub fn start(self, shutdown: ShutdownSignal) -> EngineHandle {
        let span = tracing::info_span!("engine", run_id = %uuid::Uuid::new_v4());
        tracing::info!(parent: &span, "Starting engine");

        let sampler = tokio::spawn(self.sampler.run(shutdown.clone()).instrument(span.clone()));
        let publisher = tokio::spawn(self.publisher.run(shutdown).instrument(span));

        EngineHandle {
            sampler,
            publisher,
            cell: self.cell,
        }
    }
}

/// Running engine.
pub struct EngineHandle {
    sampler: JoinHandle<()>,
    publisher: JoinHandle<()>,
    cell: SharedIntensityCell,
}

impl EngineHandle {
    pub fn cell(&self) -> SharedIntensityCell {
        Arc::clone(&self.cell)
    }

    /// Wait for both loops to exit after shutdown.
    pub async fn join(self) -> Result<(), JoinError> {
        let (sampler, publisher) = tokio::join!(self.sampler, self.publisher);
        sampler?;
        publisher?;
        Ok(())
    }
}
