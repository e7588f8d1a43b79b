//! Suspension blocks
//!
//! A single bar isolated by volume imbalances on both sides: its low sits
//! above the previous bar's high and its high sits below the next bar's low.

use crate::{Direction, OHLCVExt, Pattern, PatternDetail, PatternDetector, PatternKind, PriceBounds, OHLCV};

use super::helpers;

/// Attached to every suspension block. Classification note only: consumers
/// must not discount a block because later wicks trade into it.
pub const SUSPENSION_BLOCK_NOTE: &str = "prior opposing wicks do not invalidate this block";

/// Suspension Block detector
#[derive(Debug, Clone, Default)]
pub struct SuspensionBlockDetector;

impl PatternDetector for SuspensionBlockDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::SuspensionBlock
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern> {
        if index < 1 {
            return None;
        }
        let prev = bars.get(index - 1)?;
        let bar = bars.get(index)?;
        let next = bars.get(index + 1)?;

        let bottom_imbalance = bar.low() > prev.high();
        let top_imbalance = bar.high() < next.low();
        if !(bottom_imbalance && top_imbalance) {
            return None;
        }

        // Candle colour decides direction; a doji counts as bearish
        let direction = if bar.is_bullish() { Direction::Bullish } else { Direction::Bearish };
        let quadrants = bar.quadrants();

        Some(Pattern {
            direction,
            bounds: PriceBounds::new(bar.low(), bar.high()),
            timestamp: bar.timestamp(),
            index,
            score: helpers::SUSPENSION_BLOCK_SCORE,
            detail: PatternDetail::SuspensionBlock {
                upper_quadrant: quadrants.upper_quadrant,
                lower_quadrant: quadrants.lower_quadrant,
                note: SUSPENSION_BLOCK_NOTE,
            },
        })
    }
}
