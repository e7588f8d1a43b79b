//! Weekly structure classification
//!
//! Reads the latest weekly bar's close position within its own range and
//! compares it with the prior week for engulfing behaviour.

use serde::Serialize;

use crate::{detectors::helpers, require_bars, Bias, OHLCVExt, Quadrants, Result, OHLCV};

/// Attached whenever the week closes in its lower quarter
pub const DISTRIBUTION_WARNING: &str = "Weekly close at lows signals distribution, not a stop hunt";

/// Relative slack on the quadrant levels, so a close printed at exactly 25%
/// or 75% of the range still lands on the boundary
const LEVEL_TOLERANCE: f64 = 1e-9;

/// Quarter of the weekly range the close landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseZone {
    #[serde(rename = "Upper 25%")]
    Upper,
    #[serde(rename = "Middle 50%")]
    Middle,
    #[serde(rename = "Lower 25%")]
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStructure {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 0..=100; 50 when the week has no range
    pub close_position: f64,
    pub close_zone: CloseZone,
    pub character: Bias,
    pub action: &'static str,
    pub is_bearish_engulfing: bool,
    pub is_bullish_engulfing: bool,
    pub warning: Option<&'static str>,
}

impl WeeklyStructure {
    /// Classify the latest of at least two weekly bars.
    ///
    /// Both thresholds are inclusive: a close at exactly 75% is bullish and
    /// one at exactly 25% is bearish. The close is compared against the
    /// quadrant prices rather than the rounded percentage.
    pub fn analyze<T: OHLCV>(bars: &[T]) -> Result<Self> {
        let bars = require_bars(bars, "weekly structure", 2)?;
        let current = &bars[bars.len() - 1];
        let prev = &bars[bars.len() - 2];

        let close = current.close();
        let close_position = helpers::percent_of_span(close, current.low(), current.high()).unwrap_or(50.0);

        let range = current.range();
        let Quadrants {
            lower_quadrant,
            upper_quadrant,
            ..
        } = current.quadrants();
        let slack = range * LEVEL_TOLERANCE;

        let (character, action, close_zone) = if range <= 0.0 {
            (Bias::Neutral, "wait for confirmation", CloseZone::Middle)
        } else if close >= upper_quadrant - slack {
            (Bias::Bullish, "can look for longs", CloseZone::Upper)
        } else if close <= lower_quadrant + slack {
            (
                Bias::Bearish,
                "sellers in control, do not call bullish",
                CloseZone::Lower,
            )
        } else {
            (Bias::Neutral, "wait for confirmation", CloseZone::Middle)
        };

        // Body engulfs the prior week's body on the downside (or upside)
        let is_bearish_engulfing =
            current.is_bearish() && current.open() > prev.close() && current.close() < prev.open();
        let is_bullish_engulfing =
            current.is_bullish() && current.open() < prev.close() && current.close() > prev.open();

        Ok(Self {
            open: current.open(),
            high: current.high(),
            low: current.low(),
            close: current.close(),
            close_position,
            close_zone,
            character,
            action,
            is_bearish_engulfing,
            is_bullish_engulfing,
            warning: (character == Bias::Bearish).then_some(DISTRIBUTION_WARNING),
        })
    }
}
