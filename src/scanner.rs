//! Cross-symbol scanning
//!
//! Runs the pattern engine over many symbols in parallel, then ranks the
//! matches: best score first, at most one result per symbol, top `limit`
//! symbols kept. [`Scanner::analyze_chart`] runs the same query over a single
//! symbol and keeps every match.
//!
//! ```rust
//! use ictscan::prelude::*;
//!
//! let query = ScanQuery::parse("find 10 bullish order blocks");
//! assert_eq!(query.limit, 10);
//! assert_eq!(query.direction, Some(Direction::Bullish));
//! assert_eq!(query.kinds, vec![PatternKind::OrderBlock]);
//! ```

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    detectors::{helpers, FairValueGapDetector, LiquiditySweepDetector, OrderBlockDetector},
    params::ParameterizedDetector,
    require_bars, validate_bars, AnalysisError, Bar, BarSeries, BuiltinDetector, Direction, EngineBuilder,
    Multiplier, Pattern, PatternEngine, PatternKind, Period, Result, OHLCV,
};

pub const DEFAULT_SCAN_LIMIT: usize = 10;

/// Kinds a query can ask for. Breakers and suspension blocks are composite-only.
const SCANNABLE: [PatternKind; 3] = [
    PatternKind::FairValueGap,
    PatternKind::OrderBlock,
    PatternKind::LiquiditySweep,
];

// ============================================================
// QUERY
// ============================================================

/// Parsed free-text query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanQuery {
    /// The lowercased query text
    pub text: String,
    pub limit: usize,
    /// Requested kinds, in scan order. Never empty.
    pub kinds: Vec<PatternKind>,
    /// `None` keeps both directions
    pub direction: Option<Direction>,
}

impl ScanQuery {
    /// Parse with the default limit of 10
    pub fn parse(text: &str) -> Self {
        Self::parse_with_default(text, DEFAULT_SCAN_LIMIT)
    }

    /// Parse `text`. Unrecognised words are ignored.
    ///
    /// - the first run of digits is the limit
    /// - `fvg`, `fair value`, `gap` select fair value gaps
    /// - `order block`, or the word `ob`/`obs`, selects order blocks. Unlike
    ///   the other keywords `ob` must stand alone: as a plain substring it
    ///   would fire on words such as `global` or `problem`.
    /// - `liquidity`, `sweep` select liquidity sweeps
    /// - `bullish` wins over `bearish` when both appear
    ///
    /// No kind keyword means every scannable kind.
    pub fn parse_with_default(text: &str, default_limit: usize) -> Self {
        let text = text.to_lowercase();

        let limit = text
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty())
            .and_then(|run| run.parse().ok())
            .unwrap_or(default_limit);

        let has_word = |w: &str| text.split(|c: char| !c.is_alphanumeric()).any(|t| t == w);
        let wants = |kind: PatternKind| match kind {
            PatternKind::FairValueGap => {
                text.contains("fvg") || text.contains("fair value") || text.contains("gap")
            },
            PatternKind::OrderBlock => text.contains("order block") || has_word("ob") || has_word("obs"),
            PatternKind::LiquiditySweep => text.contains("liquidity") || text.contains("sweep"),
            PatternKind::SuspensionBlock | PatternKind::BreakerBlock => false,
        };

        let mut kinds: Vec<PatternKind> = SCANNABLE.into_iter().filter(|k| wants(*k)).collect();
        if kinds.is_empty() {
            kinds = SCANNABLE.to_vec();
        }

        let direction = if text.contains("bullish") {
            Some(Direction::Bullish)
        } else if text.contains("bearish") {
            Some(Direction::Bearish)
        } else {
            None
        };

        Self {
            text,
            limit,
            kinds,
            direction,
        }
    }

    /// Whether `pattern` passes the kind and direction filters
    pub fn matches(&self, pattern: &Pattern) -> bool {
        self.kinds.contains(&pattern.kind()) && self.direction.map_or(true, |d| pattern.direction == d)
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Limit when the query names none
    pub default_limit: usize,
    /// Worker threads; `None` uses rayon's global pool
    pub max_concurrency: Option<usize>,
    pub gap_avg_range_period: Period,
    pub order_block_lookback: Period,
    pub displacement_factor: Multiplier,
    pub sweep_lookback: Period,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SCAN_LIMIT,
            max_concurrency: None,
            gap_avg_range_period: Period::new_const(helpers::GAP_AVG_RANGE_PERIOD),
            order_block_lookback: Period::new_const(helpers::ORDER_BLOCK_LOOKBACK),
            displacement_factor: Multiplier::new_const(helpers::DISPLACEMENT_FACTOR),
            sweep_lookback: Period::new_const(helpers::SWEEP_LOOKBACK),
        }
    }
}

impl ScannerConfig {
    /// Also builds every scannable detector, so parameters outside their
    /// published bounds fail here rather than mid-scan.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == Some(0) {
            return Err(AnalysisError::InvalidConfig("max_concurrency must be > 0".into()));
        }
        for kind in SCANNABLE {
            self.detector(kind)?;
        }
        Ok(())
    }

    /// Detector for `kind` built from this config; `None` for kinds a query
    /// cannot ask for
    fn detector(&self, kind: PatternKind) -> Result<Option<BuiltinDetector>> {
        let detector = match kind {
            PatternKind::FairValueGap => {
                let params = HashMap::from([("avg_range_period", self.gap_avg_range_period.get() as f64)]);
                BuiltinDetector::FairValueGap(FairValueGapDetector::with_params(&params)?)
            },
            PatternKind::OrderBlock => {
                let params = HashMap::from([
                    ("lookback", self.order_block_lookback.get() as f64),
                    ("displacement_factor", self.displacement_factor.get()),
                ]);
                BuiltinDetector::OrderBlock(OrderBlockDetector::with_params(&params)?)
            },
            PatternKind::LiquiditySweep => {
                let params = HashMap::from([("lookback", self.sweep_lookback.get() as f64)]);
                BuiltinDetector::LiquiditySweep(LiquiditySweepDetector::with_params(&params)?)
            },
            PatternKind::SuspensionBlock | PatternKind::BreakerBlock => return Ok(None),
        };
        Ok(Some(detector))
    }

    /// Engine running the detectors a query asks for
    pub fn engine_for(&self, query: &ScanQuery) -> Result<PatternEngine> {
        let mut builder = EngineBuilder::new();
        for &kind in &query.kinds {
            if let Some(detector) = self.detector(kind)? {
                builder = builder.add_checked(detector)?;
            }
        }
        builder.build()
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<Pattern>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(engine: &PatternEngine, instruments: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// REPORT
// ============================================================

/// One symbol's best match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHit {
    pub symbol: String,
    pub latest_price: f64,
    #[serde(flatten)]
    pub pattern: Pattern,
}

/// A pattern with its one-line description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    #[serde(flatten)]
    pub pattern: Pattern,
    pub description: String,
}

/// Every match for a query in one symbol's bars, best first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    pub symbol: String,
    pub query: ScanQuery,
    pub latest_price: f64,
    /// Matches before the limit was applied
    pub total_patterns_found: usize,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub patterns: Vec<ChartEntry>,
    pub summary: String,
}

/// A symbol dropped from the scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub query: ScanQuery,
    /// Symbols analysed successfully
    pub symbols_scanned: usize,
    pub symbols_failed: Vec<ScanFailure>,
    /// Matches across all symbols after the kind and direction filters
    pub total_patterns_found: usize,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub results: Vec<ScanHit>,
    pub summary: String,
}

// ============================================================
// SCANNER
// ============================================================

#[derive(Debug)]
pub struct Scanner {
    config: ScannerConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.max_concurrency {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| AnalysisError::InvalidConfig(format!("thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Parse `text` with this scanner's default limit and scan
    pub fn scan_text<S: AsRef<str> + Sync>(&self, universe: &[(S, Vec<Bar>)], text: &str) -> Result<ScanReport> {
        let query = ScanQuery::parse_with_default(text, self.config.default_limit);
        self.scan(universe, &query)
    }

    /// Scan every `(symbol, bars)` pair for `query`.
    ///
    /// A symbol whose bars are empty or malformed is dropped and listed in
    /// `symbols_failed`; it never fails the whole scan.
    pub fn scan<S: AsRef<str> + Sync>(&self, universe: &[(S, Vec<Bar>)], query: &ScanQuery) -> Result<ScanReport> {
        let engine = self.config.engine_for(query)?;

        let mut failures = Vec::new();
        let mut valid: Vec<(&str, &[Bar])> = Vec::with_capacity(universe.len());
        for (symbol, bars) in universe {
            let symbol = symbol.as_ref();
            let checked = require_bars(bars, "scan", 1).and_then(|bars| validate_bars(bars).map(|()| bars));
            match checked {
                Ok(bars) => valid.push((symbol, bars)),
                Err(error) => {
                    warn!(symbol, %error, "dropping symbol from scan");
                    failures.push(ScanFailure {
                        symbol: symbol.to_string(),
                        error: error.to_string(),
                    });
                },
            }
        }

        let (results, errors) = match &self.pool {
            Some(pool) => pool.install(|| scan_parallel(&engine, valid.clone())),
            None => scan_parallel(&engine, valid.clone()),
        };
        for ScanError { symbol, error } in errors {
            warn!(symbol = %symbol, %error, "dropping symbol from scan");
            failures.push(ScanFailure {
                symbol,
                error: error.to_string(),
            });
        }

        let latest: HashMap<&str, f64> = valid
            .iter()
            .map(|(sym, bars)| (*sym, bars.last().map_or(0.0, |b| b.close)))
            .collect();

        let mut matches: Vec<ScanHit> = results
            .iter()
            .flat_map(|r| {
                let latest_price = latest.get(r.symbol.as_str()).copied().unwrap_or_default();
                r.patterns.iter().filter(|p| query.matches(p)).map(move |p| ScanHit {
                    symbol: r.symbol.clone(),
                    latest_price,
                    pattern: p.clone(),
                })
            })
            .collect();
        let total_patterns_found = matches.len();

        matches.sort_by(rank);
        let mut seen = HashSet::new();
        matches.retain(|hit| seen.insert(hit.symbol.clone()));
        matches.truncate(query.limit);

        let bullish_count = matches.iter().filter(|h| h.pattern.direction.is_bullish()).count();
        let bearish_count = matches.len() - bullish_count;
        let symbols_scanned = results.len();

        info!(
            query = %query.text,
            symbols_scanned,
            symbols_failed = failures.len(),
            total_patterns_found,
            results = matches.len(),
            "scan complete"
        );

        let summary = format!(
            "Scanned {symbols_scanned} symbols. Found {total_patterns_found} patterns matching \"{}\". \
             Showing top {} results ({bullish_count} bullish, {bearish_count} bearish).",
            query.text,
            matches.len(),
        );

        Ok(ScanReport {
            query: query.clone(),
            symbols_scanned,
            symbols_failed: failures,
            total_patterns_found,
            bullish_count,
            bearish_count,
            results: matches,
            summary,
        })
    }

    /// Run `query` over one symbol's bars.
    ///
    /// Unlike [`scan`](Self::scan) every matching pattern is kept, ranked by
    /// score (ties go to the most recent) and cut to `query.limit`. An empty
    /// series is an error here rather than a dropped symbol.
    pub fn analyze_chart(&self, symbol: &str, series: &BarSeries, query: &ScanQuery) -> Result<ChartReport> {
        let bars = series.require("chart analysis", 1)?;
        let engine = self.config.engine_for(query)?;

        let mut patterns: Vec<Pattern> =
            engine.scan(bars)?.into_iter().filter(|p| query.matches(p)).collect();
        let total_patterns_found = patterns.len();
        patterns.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| b.index.cmp(&a.index)));
        patterns.truncate(query.limit);

        let bullish_count = patterns.iter().filter(|p| p.direction.is_bullish()).count();
        let bearish_count = patterns.len() - bullish_count;

        info!(
            symbol,
            query = %query.text,
            total_patterns_found,
            results = patterns.len(),
            "chart analysis complete"
        );

        let summary = format!(
            "Found {} patterns for \"{}\". \
             {bullish_count} bullish, {bearish_count} bearish setups identified.",
            patterns.len(),
            query.text,
        );

        Ok(ChartReport {
            symbol: symbol.to_string(),
            query: query.clone(),
            latest_price: series.latest_close().unwrap_or_default(),
            total_patterns_found,
            bullish_count,
            bearish_count,
            patterns: patterns
                .into_iter()
                .map(|pattern| ChartEntry {
                    description: pattern.describe(),
                    pattern,
                })
                .collect(),
            summary,
        })
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            config: ScannerConfig::default(),
            pool: None,
        }
    }
}

/// Score descending, then symbol, then most recent pattern first
fn rank(a: &ScanHit, b: &ScanHit) -> Ordering {
    b.pattern
        .score
        .total_cmp(&a.pattern.score)
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| b.pattern.index.cmp(&a.pattern.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let q = ScanQuery::parse("show me something");
        assert_eq!(q.limit, 10);
        assert_eq!(q.kinds, SCANNABLE.to_vec());
        assert_eq!(q.direction, None);
    }

    #[test]
    fn test_parse_limit_kind_direction() {
        let q = ScanQuery::parse("Find 25 BEARISH FVGs");
        assert_eq!(q.limit, 25);
        assert_eq!(q.kinds, vec![PatternKind::FairValueGap]);
        assert_eq!(q.direction, Some(Direction::Bearish));
        assert_eq!(q.text, "find 25 bearish fvgs");
    }

    #[test]
    fn test_parse_multiple_kinds() {
        let q = ScanQuery::parse("gaps and liquidity sweeps");
        assert_eq!(q.kinds, vec![PatternKind::FairValueGap, PatternKind::LiquiditySweep]);
    }

    #[test]
    fn test_ob_is_a_whole_word() {
        assert_eq!(ScanQuery::parse("bullish ob").kinds, vec![PatternKind::OrderBlock]);
        assert_eq!(ScanQuery::parse("problem stocks").kinds, SCANNABLE.to_vec());
        assert_eq!(ScanQuery::parse("global bullish gaps").kinds, vec![PatternKind::FairValueGap]);
    }

    #[test]
    fn test_bullish_wins_over_bearish() {
        assert_eq!(ScanQuery::parse("bearish or bullish").direction, Some(Direction::Bullish));
    }

    #[test]
    fn test_default_limit_override() {
        assert_eq!(ScanQuery::parse_with_default("fvg", 3).limit, 3);
        assert_eq!(ScanQuery::parse_with_default("top 7 fvg", 3).limit, 7);
    }

    #[test]
    fn test_engine_for_query() {
        let cfg = ScannerConfig::default();
        let engine = cfg.engine_for(&ScanQuery::parse("order blocks")).unwrap();
        assert_eq!(engine.detectors().len(), 1);
        assert_eq!(engine.detectors()[0].kind(), PatternKind::OrderBlock);

        let engine = cfg.engine_for(&ScanQuery::parse("")).unwrap();
        assert_eq!(engine.detectors().len(), 3);
    }

    #[test]
    fn test_config_validation() {
        let cfg = ScannerConfig {
            max_concurrency: Some(0),
            ..Default::default()
        };
        assert!(Scanner::new(cfg).is_err());

        let cfg: ScannerConfig = serde_json::from_str(r#"{"max_concurrency": 2, "default_limit": 5}"#).unwrap();
        let scanner = Scanner::new(cfg).unwrap();
        assert_eq!(scanner.config().default_limit, 5);

        let cfg = ScannerConfig {
            sweep_lookback: Period::new_const(300),
            ..Default::default()
        };
        let err = Scanner::new(cfg).unwrap_err();
        assert!(matches!(err, AnalysisError::OutOfRange { field: "lookback", .. }));
    }
}
