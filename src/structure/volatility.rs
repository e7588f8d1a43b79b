//! Large-range-day flag

use serde::Serialize;

use crate::{detectors::helpers, require_bars, OHLCVExt, Result, OHLCV};

pub const VOLATILITY_MIN_BARS: usize = 10;
/// Bars in the trailing average
const AVERAGE_SPAN: usize = 9;
const LARGE_RANGE_FACTOR: f64 = 1.5;

pub const LARGE_RANGE_ADVISORY: &str =
    "Large range day: the early session is high risk, wait for a later session window";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityFlag {
    pub is_large_range_day: bool,
    pub yesterday_range: f64,
    pub avg_range: f64,
    /// `yesterday_range / avg_range`; absent when the average is zero
    pub ratio: Option<f64>,
    pub advisory: Option<&'static str>,
}

impl VolatilityFlag {
    /// Flag the last completed period against the 9 periods ending with it.
    ///
    /// The final bar is the current session; the one before it is the most
    /// recent completed period.
    pub fn detect<T: OHLCV>(bars: &[T]) -> Result<Self> {
        let bars = require_bars(bars, "volatility flag", VOLATILITY_MIN_BARS)?;
        let n = bars.len();
        let yesterday_range = bars[n - 2].range();
        let avg_range = helpers::mean_range(&bars[n - 1 - AVERAGE_SPAN..n - 1]).unwrap_or_default();

        let is_large_range_day = yesterday_range > avg_range * LARGE_RANGE_FACTOR;
        let ratio = (avg_range > 0.0).then(|| yesterday_range / avg_range);

        Ok(Self {
            is_large_range_day,
            yesterday_range,
            avg_range,
            ratio,
            advisory: is_large_range_day.then_some(LARGE_RANGE_ADVISORY),
        })
    }
}
