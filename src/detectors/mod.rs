//! Price-structure pattern detectors
//!
//! # Pattern Families
//!
//! - **Fair value gaps**: three-bar price gaps, with fill tracking
//! - **Suspension blocks**: single bars isolated by gaps on both sides
//! - **Order blocks**: last opposing bar before a displacement move
//! - **Breaker blocks**: order blocks later invalidated by a close through them
//! - **Liquidity sweeps**: a swing extreme taken out and immediately rejected

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
    ($($detector:ty),* $(,)?) => {
        $(impl $detector {
            pub fn with_defaults() -> Self { Self::default() }
        })*
    };
}

pub mod breaker_block;
pub mod fair_value_gap;
pub mod liquidity_sweep;
pub mod order_block;
pub mod suspension_block;

impl_with_defaults!(
    fair_value_gap::FairValueGapDetector,
    suspension_block::SuspensionBlockDetector,
    order_block::OrderBlockDetector,
    breaker_block::BreakerBlockDetector,
    liquidity_sweep::LiquiditySweepDetector,
);

// Re-export all detectors for convenience
pub use breaker_block::*;
pub use fair_value_gap::*;
pub use liquidity_sweep::*;
pub use order_block::*;
pub use suspension_block::*;
