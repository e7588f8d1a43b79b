//! # ictscan - price-structure pattern engine
//!
//! Classifies directional trading setups from a bar series: fair value gaps,
//! suspension blocks, order blocks, breaker blocks, liquidity sweeps, range
//! geometry, liquidity levels, weekly structure, a market-maker phase model and
//! a large-range-day flag. The [`composite`] analyzer folds all of them into one
//! verdict and the [`scanner`] ranks setups across many symbols.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ictscan::prelude::*;
//!
//! let bars: Vec<Bar> = (0..30)
//!     .map(|i| {
//!         let base = 100.0 + i as f64;
//!         let at = Utc.timestamp_opt(1_700_000_000 + i * 86_400, 0).unwrap();
//!         Bar::new(at, base, base + 2.0, base - 1.0, base + 1.0)
//!     })
//!     .collect();
//!
//! let daily = BarSeries::new(bars).unwrap();
//! let verdict = CompositeAnalyzer::default().analyze(&daily, None, None).unwrap();
//! println!("{:?} ({:?})", verdict.bias, verdict.confidence);
//!
//! // Scan one detector family over the same bars
//! let engine = EngineBuilder::new()
//!     .add(BuiltinDetector::FairValueGap(FairValueGapDetector::with_defaults()))
//!     .build()
//!     .unwrap();
//! let gaps = engine.scan(daily.as_slice()).unwrap();
//! assert!(gaps.iter().all(|p| p.kind() == PatternKind::FairValueGap));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod composite;
pub mod detectors;
pub mod params;
pub mod scanner;
pub mod structure;

pub mod prelude {
    pub use crate::{
        // Composite
        composite::{AnalyzerConfig, CompositeAnalyzer, CompositeVerdict, Confidence, DetectedPatterns},
        // Detectors
        detectors::*,
        // Parameters
        params::{ParamMeta, ParamType, ParamValues, ParameterizedDetector},
        // Scanner
        scanner::{scan_parallel, ChartReport, ScanHit, ScanQuery, ScanReport, Scanner, ScannerConfig},
        // Structure
        structure::*,
        // Errors
        AnalysisError,
        // Data
        Bar,
        BarSeries,
        Bias,
        // Engine
        BuiltinDetector,
        Direction,
        EngineBuilder,
        Multiplier,
        OHLCVExt,
        Pattern,
        PatternDetail,
        PatternDetector,
        PatternEngine,
        PatternKind,
        Period,
        PriceBounds,
        Quadrants,
        Result,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data for {analysis}: need {need} bars, got {got}")]
    InsufficientData {
        analysis: &'static str,
        need: usize,
        got: usize,
    },

    #[error("Invalid input at bar {index}: {reason}")]
    InvalidInput { index: usize, reason: &'static str },
}

impl AnalysisError {
    #[inline]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Positive, finite scaling factor (e.g. the 1.5x displacement threshold)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Multiplier(f64);

impl Multiplier {
    /// Create a new Multiplier, validating the value is finite and > 0
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Multiplier cannot be NaN or infinite",
            ));
        }
        if value <= 0.0 {
            return Err(AnalysisError::OutOfRange {
                field: "Multiplier",
                value,
                min: f64::EPSILON,
                max: f64::MAX,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for Multiplier {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Multiplier {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Multiplier::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// 25/50/75% levels of a price span
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quadrants {
    pub lower_quadrant: f64,
    pub equilibrium: f64,
    pub upper_quadrant: f64,
}

impl Quadrants {
    #[inline]
    pub fn of(low: f64, high: f64) -> Self {
        let range = high - low;
        Self {
            lower_quadrant: low + range * 0.25,
            equilibrium: low + range * 0.5,
            upper_quadrant: low + range * 0.75,
        }
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Quadrant levels of this single candle's high-low span
    #[inline]
    fn quadrants(&self) -> Quadrants {
        Quadrants::of(self.low(), self.high())
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan() || p.is_infinite()) {
            return Err(AnalysisError::InvalidInput {
                index: 0,
                reason: "non-finite price in OHLC",
            });
        }
        if prices.iter().any(|p| *p <= 0.0) {
            return Err(AnalysisError::InvalidInput {
                index: 0,
                reason: "prices must be positive",
            });
        }
        if self.high() < self.low() {
            return Err(AnalysisError::InvalidInput {
                index: 0,
                reason: "high < low",
            });
        }
        let (lo, hi) = (self.low(), self.high());
        if !(lo..=hi).contains(&self.open()) || !(lo..=hi).contains(&self.close()) {
            return Err(AnalysisError::InvalidInput {
                index: 0,
                reason: "open/close outside high-low range",
            });
        }
        let volume = self.volume();
        if volume.is_nan() || volume.is_infinite() || volume < 0.0 {
            return Err(AnalysisError::InvalidInput {
                index: 0,
                reason: "volume must be finite and non-negative",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate every bar plus strictly increasing timestamps
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            AnalysisError::InvalidInput { reason, .. } => AnalysisError::InvalidInput { index: i, reason },
            other => other,
        })?;
        if i > 0 && bar.timestamp() <= bars[i - 1].timestamp() {
            return Err(AnalysisError::InvalidInput {
                index: i,
                reason: "timestamps must be strictly increasing",
            });
        }
    }
    Ok(())
}

// ============================================================
// BAR / BAR SERIES
// ============================================================

/// One OHLCV sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Validated, read-only sequence of bars ordered by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap a bar vector.
    ///
    /// Rejects malformed bars and duplicate or out-of-order timestamps with
    /// [`AnalysisError::InvalidInput`]. An empty series is valid.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        validate_bars(&bars)?;
        Ok(Self { bars })
    }

    #[inline]
    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    #[inline]
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// The bars, or `InsufficientData` when fewer than `need` exist
    pub fn require(&self, analysis: &'static str, need: usize) -> Result<&[Bar]> {
        require_bars(&self.bars, analysis, need)
    }
}

impl AsRef<[Bar]> for BarSeries {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}

impl TryFrom<Vec<Bar>> for BarSeries {
    type Error = AnalysisError;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        BarSeries::new(bars)
    }
}

impl<'de> Deserialize<'de> for BarSeries {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let bars = Vec::<Bar>::deserialize(d)?;
        BarSeries::new(bars).map_err(serde::de::Error::custom)
    }
}

/// Slice guard shared by every windowed analysis
#[inline]
pub fn require_bars<'a, T>(bars: &'a [T], analysis: &'static str, need: usize) -> Result<&'a [T]> {
    if bars.len() < need {
        return Err(AnalysisError::InsufficientData {
            analysis,
            need,
            got: bars.len(),
        });
    }
    Ok(bars)
}

// ============================================================
// PATTERN - result of detection
// ============================================================

/// Direction of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Bullish => Direction::Bearish,
            Direction::Bearish => Direction::Bullish,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
        }
    }
}

/// Overall market bias
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// Low/high/center price band of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBounds {
    pub low: f64,
    pub high: f64,
    pub center: f64,
}

impl PriceBounds {
    /// Bounds spanning `a` and `b` in either order; center is the midpoint
    #[inline]
    pub fn new(a: f64, b: f64) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low,
            high,
            center: (low + high) / 2.0,
        }
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        (self.low..=self.high).contains(&price)
    }
}

/// Closed set of pattern kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    FairValueGap,
    SuspensionBlock,
    OrderBlock,
    BreakerBlock,
    LiquiditySweep,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::FairValueGap,
        PatternKind::SuspensionBlock,
        PatternKind::OrderBlock,
        PatternKind::BreakerBlock,
        PatternKind::LiquiditySweep,
    ];

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            PatternKind::FairValueGap => "FVG",
            PatternKind::SuspensionBlock => "Suspension Block",
            PatternKind::OrderBlock => "Order Block",
            PatternKind::BreakerBlock => "Breaker Block",
            PatternKind::LiquiditySweep => "Liquidity Sweep",
        }
    }
}

/// Kind-specific metadata. The serde tag doubles as the pattern `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternDetail {
    #[serde(rename_all = "camelCase")]
    FairValueGap { size: f64, filled: bool },
    #[serde(rename_all = "camelCase")]
    SuspensionBlock {
        upper_quadrant: f64,
        lower_quadrant: f64,
        note: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    OrderBlock {
        opening_price: f64,
        mean_threshold: f64,
        displacement: f64,
    },
    #[serde(rename_all = "camelCase")]
    BreakerBlock {
        failed: Direction,
        order_block_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    LiquiditySweep { level: f64 },
}

/// One detected pattern. Value object: downstream code filters, sorts or
/// re-scores copies, never the detector's output in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub direction: Direction,
    pub bounds: PriceBounds,
    /// Origin bar time
    pub timestamp: DateTime<Utc>,
    /// Origin bar index in the scanned slice
    pub index: usize,
    /// 0..=100
    pub score: f64,
    #[serde(flatten)]
    pub detail: PatternDetail,
}

impl Pattern {
    pub fn kind(&self) -> PatternKind {
        match self.detail {
            PatternDetail::FairValueGap { .. } => PatternKind::FairValueGap,
            PatternDetail::SuspensionBlock { .. } => PatternKind::SuspensionBlock,
            PatternDetail::OrderBlock { .. } => PatternKind::OrderBlock,
            PatternDetail::BreakerBlock { .. } => PatternKind::BreakerBlock,
            PatternDetail::LiquiditySweep { .. } => PatternKind::LiquiditySweep,
        }
    }

    /// One-line summary, e.g. `BULLISH FVG at $1.10 - $1.20 (CE: $1.15) [UNFILLED]`
    pub fn describe(&self) -> String {
        let direction = self.direction.as_str().to_uppercase();
        let label = self.kind().label();
        let PriceBounds { low, high, center } = self.bounds;
        match self.detail {
            PatternDetail::FairValueGap { filled, .. } => format!(
                "{direction} {label} at ${low:.2} - ${high:.2} (CE: ${center:.2}) [{}]",
                if filled { "FILLED" } else { "UNFILLED" }
            ),
            PatternDetail::LiquiditySweep { level } => format!("{direction} {label} at ${level:.2}"),
            _ => format!("{direction} {label} at ${low:.2} - ${high:.2}"),
        }
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// Per-bar pattern detector
pub trait PatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;
    fn min_bars(&self) -> usize;
    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    /// Every match in `bars`, oldest first. Too-short input yields no matches.
    fn scan<T: OHLCV>(&self, bars: &[T]) -> Vec<Pattern> {
        if bars.len() < self.min_bars() {
            return Vec::new();
        }
        (0..bars.len()).filter_map(|i| self.detect(bars, i)).collect()
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin per-bar detectors - enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<Pattern> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, bars, index)),*
                }
            }

            #[inline]
            pub fn kind(&self) -> PatternKind {
                match self {
                    $(Self::$variant(d) => PatternDetector::kind(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    FairValueGap(FairValueGapDetector),
    SuspensionBlock(SuspensionBlockDetector),
    OrderBlock(OrderBlockDetector),
    LiquiditySweep(LiquiditySweepDetector),
}

impl BuiltinDetector {
    /// Default-configured detector for a kind. Breakers need prior order
    /// blocks and have no per-bar detector.
    pub fn default_for(kind: PatternKind) -> Option<Self> {
        match kind {
            PatternKind::FairValueGap => Some(Self::FairValueGap(Default::default())),
            PatternKind::SuspensionBlock => Some(Self::SuspensionBlock(Default::default())),
            PatternKind::OrderBlock => Some(Self::OrderBlock(Default::default())),
            PatternKind::LiquiditySweep => Some(Self::LiquiditySweep(Default::default())),
            PatternKind::BreakerBlock => None,
        }
    }
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub min_score: Option<f64>,
    pub validate_data: bool,
    pub kind_filter: Option<Vec<PatternKind>>,
}

/// Runs a set of builtin detectors over a bar slice
#[derive(Debug, Clone)]
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    config: EngineConfig,
}

impl PatternEngine {
    pub fn detectors(&self) -> &[BuiltinDetector] {
        &self.builtin
    }

    /// Detect patterns at a single bar index.
    pub fn scan_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Vec<Pattern> {
        let mut results = Vec::new();
        for detector in &self.builtin {
            if bars.len() < detector.min_bars() {
                continue;
            }
            if let Some(p) = detector.detect(bars, index) {
                if self.should_include(&p) {
                    results.push(p);
                }
            }
        }
        results
    }

    /// Scan all bars and return a flat list of patterns, oldest first.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<Pattern>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }
        Ok((0..bars.len()).flat_map(|i| self.scan_at(bars, i)).collect())
    }

    fn should_include(&self, p: &Pattern) -> bool {
        if let Some(min) = self.config.min_score {
            if p.score < min {
                return false;
            }
        }
        if let Some(ref filter) = self.config.kind_filter {
            if !filter.contains(&p.kind()) {
                return false;
            }
        }
        true
    }

    fn validate(&self) -> Result<()> {
        for d in &self.builtin {
            d.validate_config()?;
        }
        if let Some(min) = self.config.min_score {
            if !(0.0..=100.0).contains(&min) {
                return Err(AnalysisError::OutOfRange {
                    field: "min_score",
                    value: min,
                    min: 0.0,
                    max: 100.0,
                });
            }
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every per-bar detector with its default configuration
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin
            .extend(PatternKind::ALL.into_iter().filter_map(BuiltinDetector::default_for));
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Set minimum score filter
    pub fn min_score(mut self, score: f64) -> Self {
        self.config.min_score = Some(score);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific kinds only
    pub fn only_kinds(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.kind_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// TEST FIXTURES
// ============================================================


// ============================================================
// TESTS
// ============================================================
