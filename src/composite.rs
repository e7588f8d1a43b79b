//! Composite analysis
//!
//! Runs every structure analysis and pattern detector over one daily series
//! (plus an optional weekly series) and folds them into a single verdict with
//! bias, confidence and warnings.
//!
//! Sub-analyses that lack history are left out of the verdict rather than
//! failing it; only an empty daily series is an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    detectors::{
        helpers, BreakerBlockDetector, FairValueGapDetector, OrderBlockDetector,
        SuspensionBlockDetector,
    },
    structure::{
        LiquidityMatrix, MarketMakerModel, RangeGeometry, RangePosition, VolatilityFlag,
        WeeklyStructure, DEFAULT_RANGE_WINDOW, DISTRIBUTION_WARNING,
    },
    params::ParameterizedDetector,
    AnalysisError, BarSeries, Bias, Multiplier, Pattern, PatternDetector, Period, Result,
};

/// Added when the latest week is a bearish engulfing candle
pub const BEARISH_ENGULFING_WARNING: &str = "Weekly bearish engulfing: strong sell signal";

// ============================================================
// CONFIGURATION
// ============================================================

/// Analyzer settings. Every field has a default, so a partial JSON object
/// deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Bars in the range-geometry window
    pub range_window: Period,
    /// Bars averaged to normalise fair value gap size
    pub gap_avg_range_period: Period,
    /// Bars averaged before an order block candidate
    pub order_block_lookback: Period,
    /// Displacement threshold for order blocks and the market-maker model
    pub displacement_factor: Multiplier,
    /// Most recent suspension blocks kept in the verdict
    pub max_suspension_blocks: Period,
    pub max_gaps: Period,
    pub max_order_blocks: Period,
    pub max_breaker_blocks: Period,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            range_window: Period::new_const(DEFAULT_RANGE_WINDOW),
            gap_avg_range_period: Period::new_const(helpers::GAP_AVG_RANGE_PERIOD),
            order_block_lookback: Period::new_const(helpers::ORDER_BLOCK_LOOKBACK),
            displacement_factor: Multiplier::new_const(helpers::DISPLACEMENT_FACTOR),
            max_suspension_blocks: Period::new_const(5),
            max_gaps: Period::new_const(10),
            max_order_blocks: Period::new_const(5),
            max_breaker_blocks: Period::new_const(3),
        }
    }
}

impl AnalyzerConfig {
    /// Checks every count and builds both detectors, so detector parameters
    /// outside their published bounds are rejected here.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("range_window", self.range_window),
            ("max_suspension_blocks", self.max_suspension_blocks),
            ("max_gaps", self.max_gaps),
            ("max_order_blocks", self.max_order_blocks),
            ("max_breaker_blocks", self.max_breaker_blocks),
        ];
        for (name, value) in counts {
            if value.get() == 0 {
                return Err(AnalysisError::InvalidConfig(format!("{name} must be > 0")));
            }
        }
        self.gap_detector()?;
        self.order_block_detector()?;
        Ok(())
    }

    pub fn gap_detector(&self) -> Result<FairValueGapDetector> {
        FairValueGapDetector::with_params(&HashMap::from([(
            "avg_range_period",
            self.gap_avg_range_period.get() as f64,
        )]))
    }

    pub fn order_block_detector(&self) -> Result<OrderBlockDetector> {
        OrderBlockDetector::with_params(&HashMap::from([
            ("lookback", self.order_block_lookback.get() as f64),
            ("displacement_factor", self.displacement_factor.get()),
        ]))
    }
}

// ============================================================
// VERDICT
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

/// Detector output, each list truncated to its most recent entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPatterns {
    pub gaps: Vec<Pattern>,
    /// Suspension blocks
    pub imbalance_blocks: Vec<Pattern>,
    pub order_blocks: Vec<Pattern>,
    pub breaker_blocks: Vec<Pattern>,
}

impl DetectedPatterns {
    pub fn total(&self) -> usize {
        self.gaps.len() + self.imbalance_blocks.len() + self.order_blocks.len() + self.breaker_blocks.len()
    }
}

/// Result of [`CompositeAnalyzer::analyze`]. `None` fields had too little
/// history to compute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeVerdict {
    pub current_price: f64,
    pub bias: Bias,
    pub confidence: Confidence,
    /// Current price against the range geometry
    pub price_zone: Option<RangePosition>,
    pub weekly_structure: Option<WeeklyStructure>,
    pub range_geometry: Option<RangeGeometry>,
    pub patterns: DetectedPatterns,
    pub liquidity_matrix: Option<LiquidityMatrix>,
    pub market_maker_model: Option<MarketMakerModel>,
    pub volatility_flag: Option<VolatilityFlag>,
    pub warnings: Vec<String>,
}

// ============================================================
// ANALYZER
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct CompositeAnalyzer {
    config: AnalyzerConfig,
}

impl CompositeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `daily` (and `weekly` when given) at `current_price`, which
    /// defaults to the last daily close.
    pub fn analyze(
        &self,
        daily: &BarSeries,
        weekly: Option<&BarSeries>,
        current_price: Option<f64>,
    ) -> Result<CompositeVerdict> {
        let bars = daily.require("composite analysis", 1)?;
        let current_price = match current_price {
            Some(p) if p.is_finite() && p > 0.0 => p,
            Some(_) => return Err(AnalysisError::InvalidValue("current price must be finite and positive")),
            None => daily.latest_close().unwrap_or_default(),
        };
        let cfg = &self.config;

        let range_geometry = optional(RangeGeometry::compute(bars, cfg.range_window))?;
        let weekly_structure = match weekly {
            Some(w) => optional(WeeklyStructure::analyze(w.as_slice()))?,
            None => {
                debug!("no weekly series, skipping weekly structure");
                None
            },
        };
        let liquidity_matrix = optional(LiquidityMatrix::compute(bars))?;
        let market_maker_model =
            optional(MarketMakerModel::detect(bars, current_price, cfg.displacement_factor))?;
        let volatility_flag = optional(VolatilityFlag::detect(bars))?;

        let gaps = cfg.gap_detector()?.scan(bars);
        let imbalance_blocks = SuspensionBlockDetector.scan(bars);
        let order_blocks = cfg.order_block_detector()?.scan(bars);
        // Breakers come from every order block, not just the ones reported
        let breaker_blocks = BreakerBlockDetector.scan(bars, &order_blocks);

        let mut warnings = Vec::new();
        let mut bias = Bias::Neutral;
        if let Some(ws) = &weekly_structure {
            bias = ws.character;
            if bias == Bias::Bearish {
                warnings.push(DISTRIBUTION_WARNING.to_string());
            }
            if ws.is_bearish_engulfing {
                warnings.push(BEARISH_ENGULFING_WARNING.to_string());
            }
        }
        if let Some(advisory) = volatility_flag.as_ref().and_then(|v| v.advisory) {
            warnings.push(advisory.to_string());
        }

        let mut confidence = Confidence::Low;
        let displaced = market_maker_model.as_ref().is_some_and(|m| !m.is_consolidation());
        if range_geometry.is_some() && displaced {
            confidence = Confidence::Medium;
            if !imbalance_blocks.is_empty() {
                confidence = Confidence::High;
            }
        }

        let patterns = DetectedPatterns {
            gaps: most_recent(gaps, cfg.max_gaps),
            imbalance_blocks: most_recent(imbalance_blocks, cfg.max_suspension_blocks),
            order_blocks: most_recent(order_blocks, cfg.max_order_blocks),
            breaker_blocks: most_recent(breaker_blocks, cfg.max_breaker_blocks),
        };

        debug!(
            bars = bars.len(),
            patterns = patterns.total(),
            ?bias,
            ?confidence,
            "composite analysis complete"
        );

        Ok(CompositeVerdict {
            current_price,
            bias,
            confidence,
            price_zone: range_geometry.map(|g| g.classify(current_price)),
            weekly_structure,
            range_geometry,
            patterns,
            liquidity_matrix,
            market_maker_model,
            volatility_flag,
            warnings,
        })
    }
}

/// `InsufficientData` becomes `None`; anything else still fails the call
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalysisError::InsufficientData { analysis, need, got }) => {
            debug!(analysis, need, got, "omitting analysis: insufficient data");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

/// Keep the last `n` patterns, oldest first
fn most_recent(mut patterns: Vec<Pattern>, n: Period) -> Vec<Pattern> {
    let skip = patterns.len().saturating_sub(n.get());
    patterns.drain(..skip);
    patterns
}
