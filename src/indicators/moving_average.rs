//! Simple and exponential moving averages

use super::helpers::{ema_over, mean, rolling_apply, to_defined};
use super::Indicator;
use crate::{
    series::{DerivedColumn, IndicatorKey, IndicatorResult},
    Window,
};

/// Mean of the `w` most recent closes ending at each index.
///
/// Undefined for `i < w - 1` or when the window holds an undefined close.
pub fn sma(close: &[f64], window: Window) -> Vec<Option<f64>> {
    rolling_apply(&to_defined(close), window, |xs| Some(mean(xs)))
}

/// Recursive EMA (`adjust = false` convention), seeded with the first close.
///
/// Defined from the first defined close onward, no warm-up gap.
pub fn ema(close: &[f64], window: Window) -> Vec<Option<f64>> {
    ema_over(&to_defined(close), window)
}

/// SMA over a configurable window
#[derive(Debug, Clone, PartialEq)]
pub struct SmaIndicator {
    pub window: Window,
}

impl Default for SmaIndicator {
    fn default() -> Self {
        Self {
            window: Window::new_const(20),
        }
    }
}

impl SmaIndicator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Indicator for SmaIndicator {
    fn keys(&self) -> Vec<IndicatorKey> {
        vec![IndicatorKey::Sma(self.window)]
    }

    fn min_bars(&self) -> usize {
        self.window.get()
    }

    fn compute(&self, close: &[f64]) -> IndicatorResult {
        IndicatorResult {
            columns: vec![DerivedColumn::new(
                IndicatorKey::Sma(self.window),
                sma(close, self.window),
            )],
        }
    }
}

/// EMA over a configurable span
#[derive(Debug, Clone, PartialEq)]
pub struct EmaIndicator {
    pub window: Window,
}

impl Default for EmaIndicator {
    fn default() -> Self {
        Self {
            window: Window::new_const(20),
        }
    }
}

impl EmaIndicator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Indicator for EmaIndicator {
    fn keys(&self) -> Vec<IndicatorKey> {
        vec![IndicatorKey::Ema(self.window)]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn compute(&self, close: &[f64]) -> IndicatorResult {
        IndicatorResult {
            columns: vec![DerivedColumn::new(
                IndicatorKey::Ema(self.window),
                ema(close, self.window),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: usize) -> Window {
        Window::new(n).unwrap()
    }

    #[test]
    fn test_sma_five_bar_example() {
        let close = [10.0, 11.0, 9.0, 12.0, 13.0];
        assert_eq!(
            sma(&close, w(2)),
            vec![None, Some(10.5), Some(10.0), Some(10.5), Some(12.5)]
        );
    }

    #[test]
    fn test_sma_window_longer_than_series() {
        let close = [1.0, 2.0, 3.0];
        assert!(sma(&close, w(5)).iter().all(Option::is_none));
    }

    #[test]
    fn test_sma_window_one_is_identity() {
        let close = [4.0, 5.5, 6.0];
        assert_eq!(sma(&close, w(1)), vec![Some(4.0), Some(5.5), Some(6.0)]);
    }

    #[test]
    fn test_ema_seed_is_first_close() {
        let close = [10.0, 11.0, 12.0];
        let out = ema(&close, w(3));
        assert_eq!(out[0], Some(10.0));
        // alpha = 0.5
        assert_eq!(out[1], Some(10.5));
        assert_eq!(out[2], Some(11.25));
    }

    #[test]
    fn test_ema_no_warmup_gap() {
        let close: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!(ema(&close, w(26)).iter().all(Option::is_some));
    }

    #[test]
    fn test_ema_skips_leading_nan() {
        let close = [f64::NAN, 10.0, 12.0];
        let out = ema(&close, w(1));
        assert_eq!(out, vec![None, Some(10.0), Some(12.0)]);
    }

    #[test]
    fn test_indicator_keys_encode_window() {
        let result = SmaIndicator::new(w(2)).compute(&[1.0, 3.0]);
        assert_eq!(result.get(IndicatorKey::Sma(w(2))), Some(&[None, Some(2.0)][..]));
        assert_eq!(EmaIndicator::new(w(9)).keys(), vec![IndicatorKey::Ema(w(9))]);
    }
}
