//! Common helper functions for price-structure detection
//!
//! Thresholds, scoring constants and trailing-window statistics shared across
//! the detector and structure modules.

use crate::{OHLCVExt, OHLCV};

// ============================================================
// THRESHOLDS
// ============================================================

/// Displacement: body > avg range * DISPLACEMENT_FACTOR
pub const DISPLACEMENT_FACTOR: f64 = 1.5;
/// Bars averaged for the FVG size normalisation
pub const GAP_AVG_RANGE_PERIOD: usize = 20;
/// Bars averaged before an order block candidate
pub const ORDER_BLOCK_LOOKBACK: usize = 5;
/// Bars defining the swing high/low a sweep must take out
pub const SWEEP_LOOKBACK: usize = 10;

// ============================================================
// SCORING
// ============================================================

pub const MAX_SCORE: f64 = 100.0;
/// FVG: points per multiple of the average range
pub const GAP_SIZE_WEIGHT: f64 = 50.0;
/// FVG: bonus while the gap's center has not been traded through
pub const UNFILLED_BONUS: f64 = 30.0;
/// Order block: points per percent the displacement closes beyond the block
pub const ORDER_BLOCK_PCT_WEIGHT: f64 = 20.0;
pub const SWEEP_SCORE: f64 = 80.0;
pub const SUSPENSION_BLOCK_SCORE: f64 = 90.0;

/// Clamp into 0..=100, NaN scores as 0
#[inline]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

// ============================================================
// TRAILING WINDOWS
// ============================================================

/// Mean high-low range of up to `period` bars strictly before `at`.
///
/// The window shrinks near the start of the series; `None` when no bar
/// precedes `at`.
#[inline]
pub fn trailing_avg_range<T: OHLCV>(bars: &[T], at: usize, period: usize) -> Option<f64> {
    let at = at.min(bars.len());
    if at == 0 || period == 0 {
        return None;
    }
    let s = at.saturating_sub(period);
    mean_range(&bars[s..at])
}

/// Mean high-low range of a slice, `None` when empty
#[inline]
pub fn mean_range<T: OHLCV>(bars: &[T]) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }
    let sum: f64 = bars.iter().map(|b| b.range()).sum();
    Some(sum / bars.len() as f64)
}

#[inline]
pub fn highest_high<T: OHLCV>(bars: &[T]) -> Option<f64> {
    bars.iter().map(|b| b.high()).reduce(f64::max)
}

#[inline]
pub fn lowest_low<T: OHLCV>(bars: &[T]) -> Option<f64> {
    bars.iter().map(|b| b.low()).reduce(f64::min)
}

/// Position of `price` within `[low, high]` in percent.
/// `None` for a zero-width span.
#[inline]
pub fn percent_of_span(price: f64, low: f64, high: f64) -> Option<f64> {
    let span = high - low;
    (span > f64::EPSILON).then(|| (price - low) / span * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::bars;

    #[test]
    fn test_trailing_avg_range_shrinks_near_start() {
        let data = bars(&[
            (10.0, 12.0, 9.0, 11.0),  // range 3
            (11.0, 12.0, 11.0, 11.5), // range 1
            (11.5, 14.0, 11.0, 13.0), // range 3
        ]);
        assert_eq!(trailing_avg_range(&data, 0, 5), None);
        assert_eq!(trailing_avg_range(&data, 1, 5), Some(3.0));
        assert_eq!(trailing_avg_range(&data, 2, 5), Some(2.0));
        assert_eq!(trailing_avg_range(&data, 3, 1), Some(3.0));
    }

    #[test]
    fn test_extremes() {
        let data = bars(&[(10.0, 12.0, 9.0, 11.0), (11.0, 15.0, 10.0, 14.0)]);
        assert_eq!(highest_high(&data), Some(15.0));
        assert_eq!(lowest_low(&data), Some(9.0));
        assert_eq!(highest_high::<crate::Bar>(&[]), None);
    }

    #[test]
    fn test_percent_of_span() {
        assert_eq!(percent_of_span(15.0, 10.0, 20.0), Some(50.0));
        assert_eq!(percent_of_span(15.0, 15.0, 15.0), None);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(42.0), 42.0);
    }
}
