//! Publisher loop: republish the latest intensity at a fixed cadence.

use crate::core::{Intensity, SharedIntensityCell};
use crate::engine::lifecycle::ShutdownSignal;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// What a single publisher tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing computed yet, nothing sent
    Idle,
    Sent(Intensity),
    /// Send failed; dropped until the next tick
    Failed,
}

/// Reads the shared cell and forwards its content downstream.
pub struct Publisher {
    transport: Arc<dyn Transport>,
    address: String,
    cell: SharedIntensityCell,
    interval: Duration,
}

impl Publisher {
    pub fn new(
        transport: Arc<dyn Transport>,
        address: impl Into<String>,
        cell: SharedIntensityCell,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            address: address.into(),
            cell,
            interval,
        }
    }

    /// Tick until shutdown. The first tick fires one interval after start.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            address = %self.address,
            interval_secs = self.interval.as_secs_f64(),
            "Publisher started"
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

        tracing::info!("Publisher stopped");
    }

    /// Send the current intensity, if any.
    pub async fn tick(&self) -> PublishOutcome {
        let Some(intensity) = self.cell.load() else {
            return PublishOutcome::Idle;
        };

        match self
            .transport
            .send(&self.address, i32::from(intensity.value()))
            .await
        {
            Ok(()) => {
                tracing::debug!(address = %self.address, intensity = intensity.value(), "Sent intensity");
                PublishOutcome::Sent(intensity)
            }
            Err(e) => {
                tracing::warn!(
                    address = %self.address,
                    intensity = intensity.value(),
                    error = %e,
                    "Failed to send intensity"
                );
                PublishOutcome::Failed
            }
        }
    }
}
