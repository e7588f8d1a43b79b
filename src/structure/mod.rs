//! Whole-window structure analyses
//!
//! Unlike the per-bar detectors these read a trailing window of the series and
//! return one summary value, or `InsufficientData` when the window is short.
//!
//! - **Range geometry**: trailing high/low with quadrant levels and zoning
//! - **Liquidity matrix**: buy-side and sell-side pools from the last 3 periods
//! - **Weekly structure**: close position, character and engulfing checks
//! - **Market-maker model**: dealing range and phase after a displacement
//! - **Volatility flag**: outsized prior period vs. the trailing average

pub mod liquidity;
pub mod market_maker;
pub mod range;
pub mod volatility;
pub mod weekly;

pub use liquidity::*;
pub use market_maker::*;
pub use range::*;
pub use volatility::*;
pub use weekly::*;
