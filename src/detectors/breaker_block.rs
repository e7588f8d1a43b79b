//! Breaker blocks
//!
//! An order block whose polarity flips once price closes through it: a bullish
//! block closed below becomes a bearish breaker, a bearish block closed above
//! becomes a bullish breaker.

use crate::{Direction, Pattern, PatternDetail, PatternKind, OHLCV};

/// Breaker Block detector. Consumes order blocks found on the same bars.
#[derive(Debug, Clone, Default)]
pub struct BreakerBlockDetector;

impl BreakerBlockDetector {
    /// First violation of each order block, in order-block order.
    ///
    /// The search starts two bars after the block's origin. Blocks that never
    /// get closed through yield nothing, as do inputs that are not order blocks
    /// or whose origin does not line up with `bars`.
    pub fn scan<T: OHLCV>(&self, bars: &[T], order_blocks: &[Pattern]) -> Vec<Pattern> {
        order_blocks.iter().filter_map(|ob| self.detect(bars, ob)).collect()
    }

    pub fn detect<T: OHLCV>(&self, bars: &[T], order_block: &Pattern) -> Option<Pattern> {
        if order_block.kind() != PatternKind::OrderBlock {
            return None;
        }
        let origin = bars.get(order_block.index)?;
        if origin.timestamp() != order_block.timestamp {
            return None;
        }

        let bounds = order_block.bounds;
        let failed = order_block.direction;
        let later = bars.get(order_block.index + 2..)?;

        let (offset, bar) = later.iter().enumerate().find(|(_, bar)| match failed {
            Direction::Bullish => bar.close() < bounds.low,
            Direction::Bearish => bar.close() > bounds.high,
        })?;

        Some(Pattern {
            direction: failed.opposite(),
            bounds,
            timestamp: bar.timestamp(),
            index: order_block.index + 2 + offset,
            score: order_block.score,
            detail: PatternDetail::BreakerBlock {
                failed,
                order_block_at: order_block.timestamp,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::OrderBlockDetector;
    use crate::testutil::sideways;
    use crate::{Bar, PatternDetector};

    fn series(tail: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let mut out = sideways(5, 100.0);
        let start = out.len();
        for (k, &(o, h, l, c)) in tail.iter().enumerate() {
            out.push(Bar::new(crate::testutil::day(start + k), o, h, l, c));
        }
        out
    }

    #[test]
    fn test_bullish_block_closed_below_becomes_bearish_breaker() {
        let data = series(&[
            (100.5, 101.0, 99.0, 99.5), // bullish OB at 5
            (99.5, 104.0, 99.4, 103.8), // displacement
            (103.8, 104.0, 100.0, 100.5),
            (100.5, 100.8, 98.0, 98.5), // close 98.5 < 99
            (98.5, 99.0, 97.0, 97.5),   // second violation ignored
        ]);
        let obs = OrderBlockDetector::default().scan(&data);
        let bullish: Vec<_> = obs.iter().filter(|p| p.direction == Direction::Bullish).cloned().collect();
        assert_eq!(bullish.len(), 1);

        let breakers = BreakerBlockDetector.scan(&data, &bullish);
        assert_eq!(breakers.len(), 1);
        let b = &breakers[0];
        assert_eq!(b.direction, Direction::Bearish);
        assert_eq!(b.index, 8);
        assert_eq!(b.timestamp, data[8].timestamp);
        assert_eq!(b.bounds, bullish[0].bounds);
        assert_eq!(
            b.detail,
            PatternDetail::BreakerBlock { failed: Direction::Bullish, order_block_at: data[5].timestamp }
        );
    }

    #[test]
    fn test_block_never_revisited_produces_no_breaker() {
        let data = series(&[
            (100.5, 101.0, 99.0, 99.5),
            (99.5, 104.0, 99.4, 103.8),
            (103.8, 106.0, 103.5, 105.5),
            (105.5, 108.0, 105.0, 107.5),
        ]);
        let obs = OrderBlockDetector::default().scan(&data);
        assert!(!obs.is_empty());
        assert!(BreakerBlockDetector.scan(&data, &obs).is_empty());
    }

    #[test]
    fn test_displacement_bar_itself_is_skipped() {
        // The bar right after the block is never checked, even if it closes through
        let data = series(&[
            (100.0, 101.5, 99.5, 101.0), // bearish OB at 5 (high 101.5)
            (101.0, 101.2, 96.0, 96.5),  // displacement down
        ]);
        let obs = OrderBlockDetector::default().scan(&data);
        assert_eq!(obs.len(), 1);
        assert!(BreakerBlockDetector.scan(&data, &obs).is_empty());
    }

    #[test]
    fn test_mismatched_series_is_ignored() {
        let data = series(&[(100.5, 101.0, 99.0, 99.5), (99.5, 104.0, 99.4, 103.8)]);
        let obs = OrderBlockDetector::default().scan(&data);
        let other = sideways(3, 50.0);
        assert!(BreakerBlockDetector.scan(&other, &obs).is_empty());
    }
}
