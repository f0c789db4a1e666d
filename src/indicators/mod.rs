//! Indicator library
//!
//! Pure transforms from a close-price column to one or more derived
//! columns. Each indicator is available both as a free function returning
//! plain `Vec<Option<f64>>` series and as a configured [`Indicator`] that
//! returns a keyed [`IndicatorResult`].
//!
//! - **SMA**: rolling mean, undefined for the first `w - 1` bars
//! - **EMA**: recursive smoothing seeded with the first close
//! - **MACD**: fast/slow EMA spread, signal EMA and histogram
//! - **Bollinger Bands**: SMA envelope at `num_std` sample deviations
//! - **RSI**: simple-average gain/loss oscillator in `[0, 100]`

pub mod helpers;

mod bollinger;
mod macd;
mod moving_average;
mod rsi;

pub use bollinger::{bollinger, BollingerIndicator, BollingerOutput};
pub use macd::{macd, MacdIndicator, MacdOutput, MacdParams};
pub use moving_average::{ema, sma, EmaIndicator, SmaIndicator};
pub use rsi::{rsi, rsi_value, RsiIndicator};

use crate::{
    series::{IndicatorKey, IndicatorResult, TimeSeries},
    Result,
};

// ============================================================
// INDICATOR TRAIT
// ============================================================

/// A configured indicator over the close column
pub trait Indicator: Send + Sync {
    /// Keys of the columns `compute` returns, in output order
    fn keys(&self) -> Vec<IndicatorKey>;

    /// Bars needed before the first defined value
    fn min_bars(&self) -> usize;

    fn compute(&self, close: &[f64]) -> IndicatorResult;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    /// Compute over a series' close column (`DataUnavailable` if absent).
    fn compute_series(&self, series: &TimeSeries) -> Result<IndicatorResult> {
        Ok(self.compute(series.close()?))
    }
}

// ============================================================
// BUILTIN INDICATORS - generated via macro
// ============================================================

/// Macro to generate BuiltinIndicator enum without boilerplate
macro_rules! define_builtin_indicators {
    (
        $(
            $variant:ident($indicator:ty)
        ),* $(,)?
    ) => {
        /// All builtin indicators - enum dispatch
        #[derive(Debug, Clone, PartialEq)]
        pub enum BuiltinIndicator {
            $($variant($indicator)),*
        }

        impl Indicator for BuiltinIndicator {
            #[inline]
            fn keys(&self) -> Vec<IndicatorKey> {
                match self {
                    $(Self::$variant(i) => Indicator::keys(i)),*
                }
            }

            #[inline]
            fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(i) => Indicator::min_bars(i)),*
                }
            }

            #[inline]
            fn compute(&self, close: &[f64]) -> IndicatorResult {
                match self {
                    $(Self::$variant(i) => Indicator::compute(i, close)),*
                }
            }

            fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(i) => Indicator::validate_config(i)),*
                }
            }
        }
    };
}

define_builtin_indicators! {
    Sma(SmaIndicator),
    Ema(EmaIndicator),
    Macd(MacdIndicator),
    Bollinger(BollingerIndicator),
    Rsi(RsiIndicator),
}
