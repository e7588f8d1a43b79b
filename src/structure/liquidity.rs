//! Three-period liquidity matrix

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{require_bars, Result, OHLCV};

/// Periods the matrix is built from
pub const LIQUIDITY_PERIODS: usize = 3;

/// High, low and time of one source period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourcePeriod {
    pub high: f64,
    pub low: f64,
    pub timestamp: DateTime<Utc>,
}

/// A labelled resting-liquidity price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiquidityLevel {
    pub level: f64,
    pub label: &'static str,
}

/// Buy-side pools sit above the highs, sell-side pools below the lows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityMatrix {
    /// Most recent first
    pub periods: [SourcePeriod; LIQUIDITY_PERIODS],
    pub range_high: f64,
    pub range_low: f64,
    /// `[3-period high, lowest of the three highs]`
    pub buy_side: [LiquidityLevel; 2],
    /// `[3-period low, highest of the three lows]`
    pub sell_side: [LiquidityLevel; 2],
}

impl LiquidityMatrix {
    pub fn compute<T: OHLCV>(bars: &[T]) -> Result<Self> {
        let bars = require_bars(bars, "liquidity matrix", LIQUIDITY_PERIODS)?;
        let n = bars.len();
        let period = |back: usize| {
            let b = &bars[n - 1 - back];
            SourcePeriod {
                high: b.high(),
                low: b.low(),
                timestamp: b.timestamp(),
            }
        };
        let periods = [period(0), period(1), period(2)];

        let highs = periods.map(|p| p.high);
        let lows = periods.map(|p| p.low);
        let max_high = highs.into_iter().fold(f64::MIN, f64::max);
        let min_high = highs.into_iter().fold(f64::MAX, f64::min);
        let min_low = lows.into_iter().fold(f64::MAX, f64::min);
        let max_low = lows.into_iter().fold(f64::MIN, f64::max);

        Ok(Self {
            periods,
            range_high: max_high,
            range_low: min_low,
            buy_side: [
                LiquidityLevel {
                    level: max_high,
                    label: "3-period high",
                },
                LiquidityLevel {
                    level: min_high,
                    label: "lowest of the three highs",
                },
            ],
            sell_side: [
                LiquidityLevel {
                    level: min_low,
                    label: "3-period low",
                },
                LiquidityLevel {
                    level: max_low,
                    label: "highest of the three lows",
                },
            ],
        })
    }
}
