//! Range geometry over a trailing window

use serde::Serialize;

use crate::{detectors::helpers, require_bars, Period, Quadrants, Result, OHLCV};

/// Default trailing window, in bars
pub const DEFAULT_RANGE_WINDOW: usize = 20;

/// Where a price sits inside a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RangeZone {
    /// Below 25%
    Discount,
    /// 25% up to 50%
    LowerMid,
    /// 50% up to 75%
    UpperMid,
    /// 75% and above
    Premium,
}

impl RangeZone {
    /// Zone for a percentage of the range; boundaries belong to the upper zone
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 75.0 {
            RangeZone::Premium
        } else if percent >= 50.0 {
            RangeZone::UpperMid
        } else if percent >= 25.0 {
            RangeZone::LowerMid
        } else {
            RangeZone::Discount
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangePosition {
    pub zone: RangeZone,
    /// Percent of the range above the low. Not clamped: prices outside the
    /// range give values below 0 or above 100.
    pub percent: f64,
}

/// High, low and quadrant levels of the last `window` bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeGeometry {
    pub high: f64,
    pub low: f64,
    pub range: f64,
    pub lower_quadrant: f64,
    pub equilibrium: f64,
    pub upper_quadrant: f64,
    pub window: usize,
}

impl RangeGeometry {
    /// Geometry of the trailing `window` bars.
    ///
    /// Fails with `InsufficientData` when fewer than `window` bars exist.
    pub fn compute<T: OHLCV>(bars: &[T], window: Period) -> Result<Self> {
        let window = window.get();
        let bars = require_bars(bars, "range geometry", window)?;
        let recent = &bars[bars.len() - window..];

        // Non-empty: window > 0 and the slice is exactly `window` long
        let high = helpers::highest_high(recent).unwrap_or_default();
        let low = helpers::lowest_low(recent).unwrap_or_default();
        let Quadrants {
            lower_quadrant,
            equilibrium,
            upper_quadrant,
        } = Quadrants::of(low, high);

        Ok(Self {
            high,
            low,
            range: high - low,
            lower_quadrant,
            equilibrium,
            upper_quadrant,
            window,
        })
    }

    /// Same as [`compute`](Self::compute) with the 20-bar window
    pub fn trailing<T: OHLCV>(bars: &[T]) -> Result<Self> {
        Self::compute(bars, Period::new_const(DEFAULT_RANGE_WINDOW))
    }

    /// Classify `price` against the quadrant levels.
    ///
    /// Zones are decided on the levels themselves so the boundaries are exact:
    /// `[low, lq)`, `[lq, eq)`, `[eq, uq)`, `[uq, high]`. A zero-width range
    /// puts every price at 50%.
    pub fn classify(&self, price: f64) -> RangePosition {
        if self.range <= 0.0 {
            return RangePosition {
                zone: RangeZone::from_percent(50.0),
                percent: 50.0,
            };
        }

        let zone = if price >= self.upper_quadrant {
            RangeZone::Premium
        } else if price >= self.equilibrium {
            RangeZone::UpperMid
        } else if price >= self.lower_quadrant {
            RangeZone::LowerMid
        } else {
            RangeZone::Discount
        };

        RangePosition {
            zone,
            percent: helpers::percent_of_span(price, self.low, self.high).unwrap_or(50.0),
        }
    }
}
