//! Market-maker buy/sell model
//!
//! Locates the dominant swing low and high of the recent window, looks for a
//! displacement candle away from either, and places the current price inside
//! the resulting dealing range.

use serde::Serialize;

use crate::{
    detectors::helpers, require_bars, Multiplier, OHLCVExt, PriceBounds, Result, OHLCV,
};

/// Fewest bars the model runs on
pub const MARKET_MAKER_MIN_BARS: usize = 10;
/// Bars the model reads from the end of the series
pub const MARKET_MAKER_WINDOW: usize = 20;
/// Trailing bars excluded from the extreme search (extreme not yet confirmed)
const UNCONFIRMED_TAIL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelKind {
    /// Market-maker buy model
    #[serde(rename = "MMBM")]
    BuyModel,
    /// Market-maker sell model
    #[serde(rename = "MMSM")]
    SellModel,
    Consolidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[serde(rename = "low-risk entry")]
    LowRiskEntry,
    #[serde(rename = "first stage")]
    FirstStage,
    #[serde(rename = "second stage (possible unicorn)")]
    PossibleUnicorn,
    #[serde(rename = "second stage")]
    SecondStage,
    #[serde(rename = "expansion/distribution")]
    Expansion,
    #[serde(rename = "waiting for displacement")]
    AwaitingDisplacement,
}

impl Phase {
    /// Buy model: measured up from the dealing-range low
    fn buy_side(position: f64) -> Self {
        if position < 25.0 {
            Phase::LowRiskEntry
        } else if position < 50.0 {
            Phase::FirstStage
        } else if position < 75.0 {
            Phase::PossibleUnicorn
        } else {
            Phase::Expansion
        }
    }

    /// Sell model: measured down from the dealing-range high
    fn sell_side(position: f64) -> Self {
        if position > 75.0 {
            Phase::LowRiskEntry
        } else if position > 50.0 {
            Phase::FirstStage
        } else if position > 25.0 {
            Phase::SecondStage
        } else {
            Phase::Expansion
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DealingRange {
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMakerModel {
    pub model: ModelKind,
    pub phase: Phase,
    /// Absent while consolidating
    pub dealing_range: Option<DealingRange>,
    /// Percent of the dealing range above its low
    pub position: Option<f64>,
    /// Lowest quarter of the range for the buy model, highest for the sell model
    pub entry_zone: Option<PriceBounds>,
}

impl MarketMakerModel {
    fn consolidation() -> Self {
        Self {
            model: ModelKind::Consolidation,
            phase: Phase::AwaitingDisplacement,
            dealing_range: None,
            position: None,
            entry_zone: None,
        }
    }

    pub fn is_consolidation(&self) -> bool {
        self.model == ModelKind::Consolidation
    }

    /// Run the model on the last 20 bars (at least 10) against `current_price`.
    ///
    /// A displacement is a candle whose body, in the model's direction,
    /// exceeds `factor` times the previous candle's range. Consolidation is a
    /// normal outcome, including for a zero-width window.
    pub fn detect<T: OHLCV>(bars: &[T], current_price: f64, factor: Multiplier) -> Result<Self> {
        let bars = require_bars(bars, "market-maker model", MARKET_MAKER_MIN_BARS)?;
        let recent = &bars[bars.len().saturating_sub(MARKET_MAKER_WINDOW)..];
        let searchable = &recent[..recent.len() - UNCONFIRMED_TAIL];

        let Some((low_idx, low)) = first_extreme(searchable, |b| b.low(), |a, b| a < b) else {
            return Ok(Self::consolidation());
        };
        let Some((high_idx, high)) = first_extreme(searchable, |b| b.high(), |a, b| a > b) else {
            return Ok(Self::consolidation());
        };
        let width = high - low;
        if width <= 0.0 {
            return Ok(Self::consolidation());
        }

        let factor = factor.get();
        let bullish_displacement = recent[low_idx + 1..].windows(2).any(|w| {
            w[1].is_bullish() && w[1].close() - w[1].open() > w[0].range() * factor
        });
        let bearish_displacement = recent[high_idx + 1..].windows(2).any(|w| {
            w[1].is_bearish() && w[1].open() - w[1].close() > w[0].range() * factor
        });

        let position = helpers::percent_of_span(current_price, low, high);
        let dealing_range = Some(DealingRange { high, low });

        if bullish_displacement && current_price > low {
            let position = position.unwrap_or(50.0);
            return Ok(Self {
                model: ModelKind::BuyModel,
                phase: Phase::buy_side(position),
                dealing_range,
                position: Some(position),
                entry_zone: Some(PriceBounds::new(low, low + width * 0.25)),
            });
        }

        if bearish_displacement && current_price < high {
            let position = position.unwrap_or(50.0);
            return Ok(Self {
                model: ModelKind::SellModel,
                phase: Phase::sell_side(position),
                dealing_range,
                position: Some(position),
                entry_zone: Some(PriceBounds::new(high - width * 0.25, high)),
            });
        }

        Ok(Self::consolidation())
    }
}

/// Index and value of the first bar whose key beats every earlier one
fn first_extreme<T: OHLCV>(
    bars: &[T],
    key: impl Fn(&T) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<(usize, f64)> {
    bars.iter()
        .enumerate()
        .map(|(i, b)| (i, key(b)))
        .reduce(|best, cur| if better(cur.1, best.1) { cur } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{bars, flat};

    const QUIET: (f64, f64, f64, f64) = (100.0, 101.0, 99.0, 100.5);

    fn factor() -> Multiplier {
        Multiplier::new(1.5).unwrap()
    }

    /// Swing low of 95 at bar 5, displacement up at bar 7 (high 102)
    fn buy_setup() -> Vec<(f64, f64, f64, f64)> {
        let mut rows = vec![QUIET; 20];
        rows[5] = (100.0, 100.5, 95.0, 96.0);
        rows[6] = (96.0, 97.0, 95.5, 96.5); // range 1.5
        rows[7] = (96.5, 102.0, 96.4, 101.5); // body 5 > 2.25
        rows
    }

    #[test]
    fn test_flat_series_is_consolidation() {
        let m = MarketMakerModel::detect(&flat(20, 100.0), 100.0, factor()).unwrap();
        assert!(m.is_consolidation());
        assert_eq!(m.phase, Phase::AwaitingDisplacement);
        assert_eq!(m.position, None);
    }

    #[test]
    fn test_buy_model_phases() {
        let data = bars(&buy_setup());

        let m = MarketMakerModel::detect(&data, 96.0, factor()).unwrap();
        assert_eq!(m.model, ModelKind::BuyModel);
        assert_eq!(m.dealing_range, Some(DealingRange { high: 102.0, low: 95.0 }));
        assert_eq!(m.phase, Phase::LowRiskEntry);
        assert_eq!(m.entry_zone, Some(PriceBounds::new(95.0, 96.75)));

        let m = MarketMakerModel::detect(&data, 97.0, factor()).unwrap();
        assert_eq!(m.phase, Phase::FirstStage);
        let m = MarketMakerModel::detect(&data, 100.0, factor()).unwrap();
        assert_eq!(m.phase, Phase::PossibleUnicorn);
        let m = MarketMakerModel::detect(&data, 101.5, factor()).unwrap();
        assert_eq!(m.phase, Phase::Expansion);
    }

    #[test]
    fn test_price_below_swing_low_is_not_a_buy_model() {
        let data = bars(&buy_setup());
        let m = MarketMakerModel::detect(&data, 94.0, factor()).unwrap();
        assert_ne!(m.model, ModelKind::BuyModel);
    }

    #[test]
    fn test_sell_model_phases() {
        let mut rows = vec![QUIET; 20];
        rows[5] = (100.0, 105.0, 99.5, 104.0);
        rows[6] = (104.0, 104.5, 103.0, 103.5); // range 1.5
        rows[7] = (103.5, 103.6, 98.0, 98.5); // body 5 down
        let data = bars(&rows);

        let m = MarketMakerModel::detect(&data, 104.0, factor()).unwrap();
        assert_eq!(m.model, ModelKind::SellModel);
        assert_eq!(m.dealing_range, Some(DealingRange { high: 105.0, low: 98.0 }));
        assert_eq!(m.phase, Phase::LowRiskEntry);
        assert_eq!(m.entry_zone, Some(PriceBounds::new(103.25, 105.0)));

        let m = MarketMakerModel::detect(&data, 100.0, factor()).unwrap();
        assert_eq!(m.phase, Phase::SecondStage);
    }

    #[test]
    fn test_last_three_bars_do_not_set_the_extreme() {
        let mut rows = buy_setup();
        rows[18] = (100.0, 100.5, 90.0, 91.0);
        let data = bars(&rows);
        let m = MarketMakerModel::detect(&data, 100.0, factor()).unwrap();
        assert_eq!(m.model, ModelKind::BuyModel);
        assert_eq!(m.dealing_range.map(|r| r.low), Some(95.0));
    }

    #[test]
    fn test_reads_only_the_last_twenty_bars() {
        let mut rows = vec![(100.0, 130.0, 60.0, 100.5); 10];
        rows.extend(buy_setup());
        let data = bars(&rows);
        let m = MarketMakerModel::detect(&data, 96.0, factor()).unwrap();
        assert_eq!(m.dealing_range, Some(DealingRange { high: 102.0, low: 95.0 }));
    }

    #[test]
    fn test_insufficient_data() {
        let err = MarketMakerModel::detect(&flat(9, 100.0), 100.0, factor()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_serialized_labels() {
        let data = bars(&buy_setup());
        let json = serde_json::to_value(MarketMakerModel::detect(&data, 100.0, factor()).unwrap()).unwrap();
        assert_eq!(json["model"], "MMBM");
        assert_eq!(json["phase"], "second stage (possible unicorn)");
        assert_eq!(json["dealingRange"]["low"], 95.0);
    }
}
