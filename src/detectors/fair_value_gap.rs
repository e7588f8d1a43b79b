//! Fair value gaps
//!
//! A three-bar formation where the middle bar moves so fast that the outer
//! bars' wicks never overlap. The untraded span is the gap; its midpoint is the
//! consequent encroachment (center) used for fill tracking.

use crate::{
    params::{ParamMeta, ParamValues, ParameterizedDetector},
    Direction, PatternDetail, PatternDetector, PatternKind, Pattern, Period, PriceBounds, Result,
    OHLCV,
};

use super::helpers::{self, clamp_score};

/// Fair Value Gap detector
///
/// Bullish when `high[i-2] < low[i]`, bearish when `low[i-2] > high[i]`, both
/// strict. The pattern is anchored on the middle bar.
#[derive(Debug, Clone)]
pub struct FairValueGapDetector {
    /// Bars averaged to normalise the gap size for scoring
    pub avg_range_period: Period,
}

impl Default for FairValueGapDetector {
    fn default() -> Self {
        Self { avg_range_period: Period::new_const(helpers::GAP_AVG_RANGE_PERIOD) }
    }
}

impl FairValueGapDetector {
    /// Whether any bar after `third` trades through `center`.
    ///
    /// Crossing the center (not the whole span) counts as filled. Appending bars
    /// can only turn an unfilled gap into a filled one.
    pub fn is_filled<T: OHLCV>(bars: &[T], third: usize, direction: Direction, center: f64) -> bool {
        let later = bars.get(third + 1..).unwrap_or(&[]);
        match direction {
            Direction::Bullish => later.iter().any(|b| b.low() <= center),
            Direction::Bearish => later.iter().any(|b| b.high() >= center),
        }
    }

    /// `min(100, 50 * size / avg_range + 30 if unfilled)`
    fn score<T: OHLCV>(&self, bars: &[T], third: usize, size: f64, filled: bool) -> f64 {
        let size_term = match helpers::trailing_avg_range(bars, third, self.avg_range_period.get()) {
            Some(avg) if avg > f64::EPSILON => helpers::GAP_SIZE_WEIGHT * size / avg,
            _ => helpers::MAX_SCORE,
        };
        let bonus = if filled { 0.0 } else { helpers::UNFILLED_BONUS };
        clamp_score(size_term + bonus)
    }
}

impl PatternDetector for FairValueGapDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::FairValueGap
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern> {
        if index < 2 {
            return None;
        }
        let first = bars.get(index - 2)?;
        let middle = bars.get(index - 1)?;
        let third = bars.get(index)?;

        let (direction, bounds) = if first.high() < third.low() {
            (Direction::Bullish, PriceBounds::new(first.high(), third.low()))
        } else if first.low() > third.high() {
            (Direction::Bearish, PriceBounds::new(third.high(), first.low()))
        } else {
            return None;
        };

        let filled = Self::is_filled(bars, index, direction, bounds.center);
        let size = bounds.size();

        Some(Pattern {
            direction,
            bounds,
            timestamp: middle.timestamp(),
            index: index - 1,
            score: self.score(bars, index, size, filled),
            detail: PatternDetail::FairValueGap { size, filled },
        })
    }
}

static FAIR_VALUE_GAP_PARAMS: &[ParamMeta] = &[ParamMeta::period(
    "avg_range_period",
    helpers::GAP_AVG_RANGE_PERIOD,
    1,
    250,
    "Bars averaged to normalise gap size",
)];

impl ParameterizedDetector for FairValueGapDetector {
    const KIND: PatternKind = PatternKind::FairValueGap;

    fn param_meta() -> &'static [ParamMeta] {
        FAIR_VALUE_GAP_PARAMS
    }

    fn from_values(values: &ParamValues) -> Result<Self> {
        Ok(Self {
            avg_range_period: values.period("avg_range_period")?,
        })
    }
}
