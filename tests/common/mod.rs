//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ictscan::prelude::*;

pub type Row = (f64, f64, f64, f64);

/// Quiet sideways bar: range 2, small bullish body
pub const QUIET: Row = (100.0, 101.0, 99.0, 100.5);

/// Midnight UTC, `i` days after 2024-01-01
pub fn day(i: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + i as i64 * 86_400, 0).unwrap()
}

/// Daily bars from (open, high, low, close) rows
pub fn bars(rows: &[Row]) -> Vec<Bar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Bar::new(day(i), o, h, l, c))
        .collect()
}

pub fn series(rows: &[Row]) -> BarSeries {
    BarSeries::new(bars(rows)).unwrap()
}

/// Minimal OHLCV implementation, to exercise the generic detector API
#[derive(Debug, Clone, Copy)]
pub struct TestBar {
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub t: DateTime<Utc>,
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.t
    }
}

pub fn test_bars(rows: &[Row]) -> Vec<TestBar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| TestBar { o, h, l, c, t: day(i) })
        .collect()
}

/// 25 daily bars with a swing low at 5, a bearish order block at 4 that
/// breaks at 7, a bullish order block at 6 and a suspension block at 22.
pub fn composite_rows() -> Vec<Row> {
    let mut rows = vec![QUIET; 25];
    rows[5] = (100.0, 100.5, 95.0, 96.0);
    rows[6] = (96.5, 97.0, 95.5, 96.0);
    rows[7] = (96.5, 102.0, 96.4, 101.5);
    rows[22] = (102.0, 103.0, 101.5, 102.8);
    rows[23] = (104.0, 105.0, 103.5, 104.5);
    rows[24] = (104.5, 105.5, 104.0, 105.0);
    rows
}

/// Two weekly bars, the latest closing at 90% of its range
pub fn bullish_weeks() -> Vec<Row> {
    vec![(100.0, 104.0, 96.0, 101.0), (101.0, 110.0, 100.0, 109.0)]
}
