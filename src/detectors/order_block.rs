//! Order blocks
//!
//! The last opposing candle before a displacement: a bearish candle followed by
//! a bullish candle whose body exceeds `displacement_factor` times the recent
//! average range (bullish block), or the mirror image (bearish block).

use crate::{
    params::{ParamMeta, ParamValues, ParameterizedDetector},
    Direction, Multiplier, OHLCVExt, Pattern, PatternDetail, PatternDetector, PatternKind, Period,
    PriceBounds, Result, OHLCV,
};

use super::helpers::{self, clamp_score};

/// Order Block detector
#[derive(Debug, Clone)]
pub struct OrderBlockDetector {
    /// Bars before the candidate averaged for the displacement threshold
    pub lookback: Period,
    pub displacement_factor: Multiplier,
}

impl Default for OrderBlockDetector {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(helpers::ORDER_BLOCK_LOOKBACK),
            displacement_factor: Multiplier::new_const(helpers::DISPLACEMENT_FACTOR),
        }
    }
}

impl OrderBlockDetector {
    /// `min(100, 20 * pct)` where pct is how far the displacement close runs
    /// past the block's far edge, in percent of that edge.
    fn score(direction: Direction, block_low: f64, block_high: f64, displacement_close: f64) -> f64 {
        let pct = match direction {
            Direction::Bullish => (displacement_close - block_high) / block_high * 100.0,
            Direction::Bearish => (block_low - displacement_close) / block_low * 100.0,
        };
        clamp_score(helpers::ORDER_BLOCK_PCT_WEIGHT * pct.max(0.0))
    }
}

impl PatternDetector for OrderBlockDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::OrderBlock
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern> {
        // Index 0 has no history to measure displacement against
        if index < 1 {
            return None;
        }
        let candle = bars.get(index)?;
        let next = bars.get(index + 1)?;
        let avg_range = helpers::trailing_avg_range(bars, index, self.lookback.get())?;
        let threshold = avg_range * self.displacement_factor.get();

        let (direction, displacement) = if candle.is_bearish() && next.is_bullish() {
            (Direction::Bullish, next.close() - next.open())
        } else if candle.is_bullish() && next.is_bearish() {
            (Direction::Bearish, next.open() - next.close())
        } else {
            return None;
        };

        if displacement <= threshold {
            return None;
        }

        let bounds = PriceBounds::new(candle.low(), candle.high());
        Some(Pattern {
            direction,
            bounds,
            timestamp: candle.timestamp(),
            index,
            score: Self::score(direction, bounds.low, bounds.high, next.close()),
            detail: PatternDetail::OrderBlock {
                opening_price: candle.open(),
                mean_threshold: bounds.center,
                displacement,
            },
        })
    }

    fn validate_config(&self) -> Result<()> {
        Multiplier::new(self.displacement_factor.get())?;
        Period::new(self.lookback.get())?;
        Ok(())
    }
}

static ORDER_BLOCK_PARAMS: &[ParamMeta] = &[
    ParamMeta::period(
        "lookback",
        helpers::ORDER_BLOCK_LOOKBACK,
        1,
        100,
        "Bars averaged before the candidate",
    ),
    ParamMeta::multiplier(
        "displacement_factor",
        helpers::DISPLACEMENT_FACTOR,
        1.0,
        10.0,
        "Displacement body must exceed avg range times this",
    ),
];

impl ParameterizedDetector for OrderBlockDetector {
    const KIND: PatternKind = PatternKind::OrderBlock;

    fn param_meta() -> &'static [ParamMeta] {
        ORDER_BLOCK_PARAMS
    }

    fn from_values(values: &ParamValues) -> Result<Self> {
        Ok(Self {
            lookback: values.period("lookback")?,
            displacement_factor: values.multiplier("displacement_factor")?,
        })
    }
}
