//! Single-slot holder for the latest intensity.
//!
//! Backed by one atomic byte, so loads and stores never wait on each other.

use crate::core::estimator::Intensity;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Marker for "no intensity computed yet".
const ABSENT: u8 = u8::MAX;

/// Latest intensity, or absent before the first successful estimate.
#[derive(Debug)]
pub struct IntensityCell {
    value: AtomicU8,
}

impl IntensityCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            value: AtomicU8::new(ABSENT),
        }
    }

    /// Replace the current content. Last write wins.
    pub fn store(&self, intensity: Intensity) {
        self.value.store(intensity.value(), Ordering::Release);
    }

    /// Current content, or `None` if nothing was ever stored.
    pub fn load(&self) -> Option<Intensity> {
        match self.value.load(Ordering::Acquire) {
            ABSENT => None,
            v => Intensity::new(v),
        }
    }

    pub fn is_present(&self) -> bool {
        self.load().is_some()
    }
}

impl Default for IntensityCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Cell shared between the sampler and the publisher.
pub type SharedIntensityCell = Arc<IntensityCell>;

/// Create a new, empty shared cell.
pub fn create_shared_cell() -> SharedIntensityCell {
    Arc::new(IntensityCell::new())
}
