//! Liquidity sweeps
//!
//! A bar that runs the recent swing low (or high) and is immediately rejected:
//! the next bar closes back above (below) both the sweep bar's close and the
//! swept level.

use crate::{
    params::{ParamMeta, ParamValues, ParameterizedDetector},
    Direction, Pattern, PatternDetail, PatternDetector, PatternKind, Period, PriceBounds, Result,
    OHLCV,
};

use super::helpers;

/// Liquidity Sweep detector
#[derive(Debug, Clone)]
pub struct LiquiditySweepDetector {
    /// Bars defining the swing high/low
    pub lookback: Period,
}

impl Default for LiquiditySweepDetector {
    fn default() -> Self {
        Self { lookback: Period::new_const(helpers::SWEEP_LOOKBACK) }
    }
}

impl PatternDetector for LiquiditySweepDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::LiquiditySweep
    }

    fn min_bars(&self) -> usize {
        self.lookback.get() + 2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern> {
        let lookback = self.lookback.get();
        if index < lookback {
            return None;
        }
        let bar = bars.get(index)?;
        let next = bars.get(index + 1)?;
        let window = &bars[index - lookback..index];
        let swing_high = helpers::highest_high(window)?;
        let swing_low = helpers::lowest_low(window)?;

        let (direction, level, bounds) = if bar.low() < swing_low
            && next.close() > bar.close()
            && next.close() > swing_low
        {
            (Direction::Bullish, swing_low, PriceBounds::new(bar.low(), swing_low))
        } else if bar.high() > swing_high
            && next.close() < bar.close()
            && next.close() < swing_high
        {
            (Direction::Bearish, swing_high, PriceBounds::new(swing_high, bar.high()))
        } else {
            return None;
        };

        Some(Pattern {
            direction,
            bounds,
            timestamp: bar.timestamp(),
            index,
            score: helpers::SWEEP_SCORE,
            detail: PatternDetail::LiquiditySweep { level },
        })
    }
}

static LIQUIDITY_SWEEP_PARAMS: &[ParamMeta] = &[ParamMeta::period(
    "lookback",
    helpers::SWEEP_LOOKBACK,
    1,
    250,
    "Bars defining the swing high/low",
)];

impl ParameterizedDetector for LiquiditySweepDetector {
    const KIND: PatternKind = PatternKind::LiquiditySweep;

    fn param_meta() -> &'static [ParamMeta] {
        LIQUIDITY_SWEEP_PARAMS
    }

    fn from_values(values: &ParamValues) -> Result<Self> {
        Ok(Self {
            lookback: values.period("lookback")?,
        })
    }
}
