//! Cross-symbol scanner tests: ranking, de-duplication, limits and dropped
//! symbols, plus single-symbol chart analysis.

mod common;

use common::{bars, Row, QUIET};
use ictscan::prelude::*;

/// One bullish gap, score 50 / 2.75 + 30
fn gap_symbol() -> Vec<Bar> {
    bars(&[
        (10.0, 11.0, 9.0, 10.5),
        (10.5, 14.0, 10.5, 13.5),
        (13.5, 15.0, 12.0, 14.5),
    ])
}

/// One bearish order block, score ~60.3
fn order_block_symbol() -> Vec<Bar> {
    let mut rows = vec![QUIET; 5];
    rows.push((100.0, 101.5, 99.5, 101.0));
    rows.push((101.0, 101.2, 96.0, 96.5));
    bars(&rows)
}

/// One bullish liquidity sweep, score 80
fn sweep_symbol() -> Vec<Bar> {
    let mut rows = vec![QUIET; 10];
    rows.push((100.0, 100.2, 98.0, 98.6));
    rows.push((98.6, 100.8, 98.5, 100.5));
    bars(&rows)
}

/// Three bullish gaps, the first one scoring highest
fn multi_gap_symbol() -> Vec<Bar> {
    bars(&[
        (10.0, 11.0, 9.0, 10.5),
        (10.5, 14.0, 10.5, 13.5),
        (13.5, 15.0, 12.0, 14.5),
        (14.5, 18.0, 14.5, 17.5),
        (17.5, 19.0, 16.0, 18.5),
    ])
}

fn universe() -> Vec<(String, Vec<Bar>)> {
    let bad: Row = (10.0, 9.0, 12.0, 11.0); // high < low
    vec![
        ("AAA".to_string(), gap_symbol()),
        ("BBB".to_string(), order_block_symbol()),
        ("CCC".to_string(), sweep_symbol()),
        ("BAD".to_string(), bars(&[bad])),
        ("EMPTY".to_string(), Vec::new()),
    ]
}

fn symbols(report: &ScanReport) -> Vec<&str> {
    report.results.iter().map(|h| h.symbol.as_str()).collect()
}

#[test]
fn test_all_kinds_ranked_by_score() {
    let report = Scanner::default().scan_text(&universe(), "show me setups").unwrap();

    assert_eq!(symbols(&report), vec!["CCC", "BBB", "AAA"]);
    assert!(report.results.windows(2).all(|w| w[0].pattern.score >= w[1].pattern.score));
    assert_eq!(report.symbols_scanned, 3);
    assert_eq!(report.total_patterns_found, 3);
    assert_eq!(report.bullish_count, 2);
    assert_eq!(report.bearish_count, 1);

    let failed: Vec<&str> = report.symbols_failed.iter().map(|f| f.symbol.as_str()).collect();
    assert_eq!(failed, vec!["BAD", "EMPTY"]);
}

#[test]
fn test_direction_filter() {
    let report = Scanner::default().scan_text(&universe(), "bullish").unwrap();
    assert_eq!(symbols(&report), vec!["CCC", "AAA"]);
    assert_eq!(report.total_patterns_found, 2);
    assert_eq!(report.bearish_count, 0);

    let report = Scanner::default().scan_text(&universe(), "bearish order blocks").unwrap();
    assert_eq!(symbols(&report), vec!["BBB"]);
    assert_eq!(report.results[0].pattern.kind(), PatternKind::OrderBlock);
}

#[test]
fn test_kind_filter() {
    let report = Scanner::default().scan_text(&universe(), "fvg").unwrap();
    assert_eq!(symbols(&report), vec!["AAA"]);

    let report = Scanner::default().scan_text(&universe(), "liquidity sweeps").unwrap();
    assert_eq!(symbols(&report), vec!["CCC"]);
    assert_eq!(report.results[0].pattern.detail, PatternDetail::LiquiditySweep { level: 99.0 });
}

#[test]
fn test_limit_never_fabricates_results() {
    let report = Scanner::default().scan_text(&universe(), "top 2").unwrap();
    assert_eq!(symbols(&report), vec!["CCC", "BBB"]);

    let report = Scanner::default().scan_text(&universe(), "top 50").unwrap();
    assert_eq!(report.results.len(), 3);
}

#[test]
fn test_one_result_per_symbol() {
    let universe = vec![("MULTI", multi_gap_symbol()), ("AAA", gap_symbol())];
    let report = Scanner::default().scan(&universe, &ScanQuery::parse("gaps")).unwrap();

    assert_eq!(report.total_patterns_found, 4);
    assert_eq!(report.results.len(), 2);

    let multi = report.results.iter().find(|h| h.symbol == "MULTI").unwrap();
    let best = FairValueGapDetector::default()
        .scan(&multi_gap_symbol())
        .into_iter()
        .map(|p| p.score)
        .fold(f64::MIN, f64::max);
    assert_eq!(multi.pattern.score, best);
    assert_eq!(multi.pattern.index, 1);
}

#[test]
fn test_equal_scores_tie_break_on_symbol() {
    let universe = vec![("ZZZ", gap_symbol()), ("AAA", gap_symbol())];
    let report = Scanner::default().scan(&universe, &ScanQuery::parse("fvg")).unwrap();
    assert_eq!(symbols(&report), vec!["AAA", "ZZZ"]);
}

#[test]
fn test_bounded_pool_matches_global_pool() {
    let config = ScannerConfig {
        max_concurrency: Some(2),
        ..Default::default()
    };
    let bounded = Scanner::new(config).unwrap().scan_text(&universe(), "").unwrap();
    let global = Scanner::default().scan_text(&universe(), "").unwrap();
    assert_eq!(bounded, global);
}

#[test]
fn test_default_limit_from_config() {
    let config = ScannerConfig {
        default_limit: 1,
        ..Default::default()
    };
    let report = Scanner::new(config).unwrap().scan_text(&universe(), "setups").unwrap();
    assert_eq!(symbols(&report), vec!["CCC"]);
}

#[test]
fn test_report_json() {
    let report = Scanner::default().scan_text(&universe(), "find 10 bullish setups").unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["symbolsScanned"], 3);
    assert_eq!(json["query"]["limit"], 10);
    assert_eq!(json["query"]["direction"], "bullish");

    let top = &json["results"][0];
    assert_eq!(top["symbol"], "CCC");
    assert_eq!(top["latestPrice"], 100.5);
    assert_eq!(top["type"], "liquidity_sweep");
    assert_eq!(top["score"], 80.0);

    assert_eq!(
        report.summary,
        "Scanned 3 symbols. Found 2 patterns matching \"find 10 bullish setups\". \
         Showing top 2 results (2 bullish, 0 bearish)."
    );
}

#[test]
fn test_scan_parallel_splits_errors() {
    let engine = EngineBuilder::new().with_all_defaults().validate_data(true).build().unwrap();
    let good = gap_symbol();
    let bad = bars(&[(10.0, 9.0, 12.0, 11.0)]);
    let instruments = vec![("GOOD", good.as_slice()), ("BAD", bad.as_slice())];

    let (results, errors) = scan_parallel(&engine, instruments);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol, "GOOD");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, "BAD");
}

#[test]
fn test_out_of_order_bars_dropped_without_failing_scan() {
    let mut shuffled = gap_symbol();
    shuffled.swap(0, 2);
    let universe = vec![("AAA", gap_symbol()), ("SHUF", shuffled)];
    let report = Scanner::default().scan_text(&universe, "").unwrap();

    assert_eq!(symbols(&report), vec!["AAA"]);
    assert_eq!(report.symbols_failed.len(), 1);
    assert_eq!(report.symbols_failed[0].symbol, "SHUF");
    assert!(report.symbols_failed[0].error.contains("strictly increasing"));
}

// ============================================================
// SINGLE-SYMBOL CHART ANALYSIS
// ============================================================

#[test]
fn test_chart_keeps_every_pattern_of_one_symbol() {
    let series = BarSeries::new(multi_gap_symbol()).unwrap();
    let report = Scanner::default()
        .analyze_chart("MULTI", &series, &ScanQuery::parse("gaps"))
        .unwrap();

    assert_eq!(report.symbol, "MULTI");
    assert_eq!(report.total_patterns_found, 3);
    assert_eq!(report.patterns.len(), 3);
    assert!(report.patterns.windows(2).all(|w| w[0].pattern.score >= w[1].pattern.score));
    assert_eq!(report.patterns[0].pattern.index, 1);
    assert_eq!(report.bullish_count, 3);
    assert_eq!(report.bearish_count, 0);
    assert_eq!(report.latest_price, 18.5);
    assert!(report.patterns.iter().all(|e| e.description.starts_with("BULLISH FVG at $")));
    assert_eq!(
        report.summary,
        "Found 3 patterns for \"gaps\". 3 bullish, 0 bearish setups identified."
    );
}

#[test]
fn test_chart_limit_and_direction() {
    let series = BarSeries::new(multi_gap_symbol()).unwrap();
    let scanner = Scanner::default();

    let report = scanner.analyze_chart("MULTI", &series, &ScanQuery::parse("top 2 gaps")).unwrap();
    assert_eq!(report.total_patterns_found, 3);
    assert_eq!(report.patterns.len(), 2);
    assert_eq!(report.patterns[0].pattern.index, 1);

    let report = scanner.analyze_chart("MULTI", &series, &ScanQuery::parse("bearish fvg")).unwrap();
    assert!(report.patterns.is_empty());
    assert_eq!(
        report.summary,
        "Found 0 patterns for \"bearish fvg\". 0 bullish, 0 bearish setups identified."
    );
}

#[test]
fn test_chart_json_and_empty_series() {
    let series = BarSeries::new(order_block_symbol()).unwrap();
    let report = Scanner::default().analyze_chart("BBB", &series, &ScanQuery::parse("ob")).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["symbol"], "BBB");
    assert_eq!(json["totalPatternsFound"], 1);
    assert_eq!(json["patterns"][0]["type"], "order_block");
    assert_eq!(json["patterns"][0]["direction"], "bearish");
    assert!(json["patterns"][0]["description"].as_str().unwrap().starts_with("BEARISH Order Block at $"));

    let empty = BarSeries::new(Vec::new()).unwrap();
    let err = Scanner::default().analyze_chart("EMPTY", &empty, &ScanQuery::parse("")).unwrap_err();
    assert!(err.is_insufficient_data());
}
