//! Intensity estimation from inter-event gaps.
//!
//! A batch of timestamps is reduced to its mean gap, the gap is normalized
//! against a threshold (a mean gap at or beyond the threshold means "quiet"),
//! and the result is eased and scaled to an integer in `[0, 100]`.

use crate::core::ease::ease_in_out_cubic;
use crate::source::{SourceItem, TimestampParseError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Bounded intensity score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: Intensity = Intensity(0);
    pub const MAX: Intensity = Intensity(100);

    /// Returns `None` if `value` is above 100.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    /// Scale an eased ratio to an intensity, truncating toward zero.
    pub fn from_eased(eased: f64) -> Self {
        let scaled = (eased * 100.0).trunc();
        if scaled.is_nan() {
            return Self::MIN;
        }
        Self(scaled.clamp(0.0, 100.0) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Intensity> for u8 {
    fn from(intensity: Intensity) -> u8 {
        intensity.0
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gap statistics for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapStats {
    /// Number of events in the batch
    pub events: usize,
    /// Mean gap between adjacent events, in seconds
    pub avg_gap_secs: f64,
    /// Population standard deviation of the gaps, in seconds
    pub gap_std_dev_secs: f64,
    /// Normalized ratio before easing (1 = busiest, 0 = quiet)
    pub ratio: f64,
}

/// Result of a successful estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub intensity: Intensity,
    pub stats: GapStats,
    /// True if the batch arrived oldest-first and was reversed
    pub reordered: bool,
}

/// Why a batch produced no intensity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// Fewer than two events, so no gap exists
    InsufficientData { count: usize },
    /// An event's timestamp could not be parsed
    TimestampParse(TimestampParseError),
}

impl std::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateError::InsufficientData { count } => {
                write!(f, "Insufficient data: need at least 2 events, got {count}")
            }
            EstimateError::TimestampParse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EstimateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstimateError::TimestampParse(e) => Some(e),
            EstimateError::InsufficientData { .. } => None,
        }
    }
}

impl From<TimestampParseError> for EstimateError {
    fn from(e: TimestampParseError) -> Self {
        EstimateError::TimestampParse(e)
    }
}

/// Turns event batches into intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityEstimator {
    threshold_secs: u32,
}

impl IntensityEstimator {
    /// `threshold_secs` is the mean gap treated as zero intensity. Must be positive.
    pub fn new(threshold_secs: u32) -> Self {
        debug_assert!(threshold_secs > 0, "threshold must be positive");
        Self { threshold_secs }
    }

    pub fn threshold_secs(&self) -> u32 {
        self.threshold_secs
    }

    /// Parse every item's timestamp, then estimate.
    ///
    /// A single unparseable timestamp aborts the whole batch.
    pub fn estimate_items(&self, items: &[SourceItem]) -> Result<Estimate, EstimateError> {
        if items.len() < 2 {
            return Err(EstimateError::InsufficientData { count: items.len() });
        }

        let timestamps = items
            .iter()
            .map(SourceItem::timestamp)
            .collect::<Result<Vec<_>, _>>()?;

        self.estimate(&timestamps)
    }

    /// Estimate from timestamps ordered newest-first.
    ///
    /// A batch that is strictly oldest-first is reversed before the gap walk.
    pub fn estimate(&self, timestamps: &[DateTime<Utc>]) -> Result<Estimate, EstimateError> {
        let n = timestamps.len();
        if n < 2 {
            return Err(EstimateError::InsufficientData { count: n });
        }

        let reordered = is_oldest_first(timestamps);
        if reordered {
            tracing::warn!(events = n, "Batch arrived oldest-first, reversing");
        }

        let gaps = gaps_oldest_to_newest(timestamps, reordered);
        let avg_gap_secs = gaps.iter().sum::<f64>() / gaps.len() as f64;
        let gap_std_dev_secs = gaps.iter().population_std_dev();

        let ratio = 1.0 - (avg_gap_secs / f64::from(self.threshold_secs)).min(1.0);
        let intensity = Intensity::from_eased(ease_in_out_cubic(ratio));

        Ok(Estimate {
            intensity,
            stats: GapStats {
                events: n,
                avg_gap_secs,
                gap_std_dev_secs,
                ratio,
            },
            reordered,
        })
    }
}

/// True if the batch is non-decreasing with at least one strict increase.
fn is_oldest_first(timestamps: &[DateTime<Utc>]) -> bool {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if first < last => {
            timestamps.windows(2).all(|pair| pair[0] <= pair[1])
        }
        _ => false,
    }
}

/// Walk adjacent pairs from the oldest event to the newest, clamping
/// negative gaps to zero.
fn gaps_oldest_to_newest(timestamps: &[DateTime<Utc>], oldest_first: bool) -> Vec<f64> {
    let gap = |newer: &DateTime<Utc>, older: &DateTime<Utc>| {
        ((*newer - *older).num_milliseconds() as f64 / 1000.0).max(0.0)
    };

    if oldest_first {
        timestamps
            .windows(2)
            .map(|pair| gap(&pair[1], &pair[0]))
            .collect()
    } else {
        timestamps
            .windows(2)
            .rev()
            .map(|pair| gap(&pair[0], &pair[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 22, 10, 0, 0).unwrap()
    }

    /// Newest-first timestamps at the given second offsets from `base()`.
    fn batch(offsets: &[i64]) -> Vec<DateTime<Utc>> {
        offsets
            .iter()
            .map(|&s| base() + Duration::seconds(s))
            .collect()
    }

    #[test]
    fn test_even_gaps_at_half_threshold() {
        let estimator = IntensityEstimator::new(6);
        let estimate = estimator.estimate(&batch(&[6, 3, 0])).unwrap();

        assert_eq!(estimate.stats.avg_gap_secs, 3.0);
        assert_eq!(estimate.stats.ratio, 0.5);
        assert_eq!(estimate.intensity.value(), 50);
        assert!(!estimate.reordered);
    }

    #[test]
    fn test_gap_beyond_threshold_is_zero() {
        let estimator = IntensityEstimator::new(6);
        let estimate = estimator.estimate(&batch(&[10, 0])).unwrap();

        assert_eq!(estimate.stats.avg_gap_secs, 10.0);
        assert_eq!(estimate.stats.ratio, 0.0);
        assert_eq!(estimate.intensity, Intensity::MIN);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_zero() {
        let estimator = IntensityEstimator::new(6);
        let estimate = estimator.estimate(&batch(&[6, 0])).unwrap();
        assert_eq!(estimate.intensity.value(), 0);
    }

    #[test]
    fn test_simultaneous_events_saturate() {
        let estimator = IntensityEstimator::new(6);
        let estimate = estimator.estimate(&batch(&[5, 5])).unwrap();

        assert_eq!(estimate.stats.ratio, 1.0);
        assert_eq!(estimate.intensity, Intensity::MAX);
    }

    #[test]
    fn test_too_few_events() {
        let estimator = IntensityEstimator::new(6);
        assert_eq!(
            estimator.estimate(&[]),
            Err(EstimateError::InsufficientData { count: 0 })
        );
        assert_eq!(
            estimator.estimate(&batch(&[1])),
            Err(EstimateError::InsufficientData { count: 1 })
        );
    }

    #[test]
    fn test_out_of_order_gaps_clamp_to_zero() {
        let estimator = IntensityEstimator::new(6);
        // 4 -> 0 is a normal gap of 4, 0 -> 8 runs backwards and clamps
        let estimate = estimator.estimate(&batch(&[4, 0, 8])).unwrap();

        assert!(!estimate.reordered);
        assert_eq!(estimate.stats.avg_gap_secs, 2.0);
        assert!(estimate.stats.ratio >= 0.0);
        assert!(estimate.stats.ratio <= 1.0);
    }

    #[test]
    fn test_oldest_first_batch_is_reversed() {
        let estimator = IntensityEstimator::new(6);
        let newest_first = estimator.estimate(&batch(&[6, 3, 0])).unwrap();
        let oldest_first = estimator.estimate(&batch(&[0, 3, 6])).unwrap();

        assert!(oldest_first.reordered);
        assert_eq!(oldest_first.intensity, newest_first.intensity);
        assert_eq!(oldest_first.stats.avg_gap_secs, 3.0);
    }

    #[test]
    fn test_gap_std_dev() {
        let estimator = IntensityEstimator::new(60);
        let estimate = estimator.estimate(&batch(&[6, 4, 0])).unwrap();
        // gaps are 4 and 2
        assert_eq!(estimate.stats.avg_gap_secs, 3.0);
        assert!((estimate.stats.gap_std_dev_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intensity_always_in_range() {
        let estimator = IntensityEstimator::new(6);
        for gap in 0..20 {
            let estimate = estimator.estimate(&batch(&[gap, 0])).unwrap();
            assert!(estimate.intensity <= Intensity::MAX);
        }
    }

    #[test]
    fn test_estimate_items_parses_api_timestamps() {
        let estimator = IntensityEstimator::new(6);
        let items: Vec<SourceItem> = batch(&[6, 3, 0]).into_iter().map(SourceItem::at).collect();

        let estimate = estimator.estimate_items(&items).unwrap();
        assert_eq!(estimate.intensity.value(), 50);
        assert_eq!(estimate.stats.events, 3);
    }

    #[test]
    fn test_estimate_items_aborts_on_bad_timestamp() {
        let estimator = IntensityEstimator::new(6);
        let items = vec![
            SourceItem::at(base()),
            SourceItem::new("not a date"),
            SourceItem::at(base()),
        ];

        match estimator.estimate_items(&items) {
            Err(EstimateError::TimestampParse(e)) => assert_eq!(e.value, "not a date"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_intensity_bounds() {
        assert!(Intensity::new(100).is_some());
        assert!(Intensity::new(101).is_none());
        assert_eq!(Intensity::from_eased(0.999).value(), 99);
        assert_eq!(Intensity::from_eased(1.5), Intensity::MAX);
        assert_eq!(Intensity::from_eased(-0.2), Intensity::MIN);
        assert_eq!(Intensity::from_eased(f64::NAN), Intensity::MIN);
    }

    #[test]
    fn test_intensity_serializes_as_integer() {
        let json = serde_json::to_value(Intensity::new(42).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!(42));
    }
}
