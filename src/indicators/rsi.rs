//! Relative Strength Index

use super::helpers::{mean, rolling_apply};
use super::Indicator;
use crate::{
    series::{defined, DerivedColumn, IndicatorKey, IndicatorResult},
    Window,
};

/// RSI from rolling mean gain/loss.
///
/// Zero-loss windows resolve explicitly: flat (`gain == loss == 0`) is 50,
/// gains only is 100.
#[inline]
pub fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Simple-average RSI over `window` bars of close-to-close deltas.
///
/// Bar 0 has no predecessor and contributes a zero delta, so the first
/// value lands at index `w - 1`. A delta touching an undefined close is
/// undefined and blanks every window containing it.
pub fn rsi(close: &[f64], window: Window) -> Vec<Option<f64>> {
    let deltas: Vec<Option<f64>> = (0..close.len())
        .map(|i| {
            let curr = defined(close[i])?;
            if i == 0 {
                return Some(0.0);
            }
            Some(curr - defined(close[i - 1])?)
        })
        .collect();

    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = rolling_apply(&gains, window, |xs| Some(mean(xs)));
    let avg_loss = rolling_apply(&losses, window, |xs| Some(mean(xs)));

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| Some(rsi_value((*g)?, (*l)?)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiIndicator {
    pub window: Window,
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self {
            window: Window::new_const(14),
        }
    }
}

impl RsiIndicator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Indicator for RsiIndicator {
    fn keys(&self) -> Vec<IndicatorKey> {
        vec![IndicatorKey::Rsi(self.window)]
    }

    fn min_bars(&self) -> usize {
        self.window.get()
    }

    fn compute(&self, close: &[f64]) -> IndicatorResult {
        IndicatorResult {
            columns: vec![DerivedColumn::new(
                IndicatorKey::Rsi(self.window),
                rsi(close, self.window),
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
    fn test_rsi_value_degenerate_cases() {
        assert_eq!(rsi_value(0.0, 0.0), 50.0);
        assert_eq!(rsi_value(1.5, 0.0), 100.0);
        assert_eq!(rsi_value(0.0, 2.0), 0.0);
        assert_eq!(rsi_value(1.0, 1.0), 50.0);
    }

    #[test]
    fn test_rsi_warmup() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&close, w(14));
        assert!(out[..13].iter().all(Option::is_none));
        assert!(out[13..].iter().all(Option::is_some));
    }

    #[test]
    fn test_rsi_rising_is_100() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&close, w(14))[19], Some(100.0));
    }

    #[test]
    fn test_rsi_flat_is_50() {
        let out = rsi(&[42.0; 16], w(14));
        assert_eq!(out[15], Some(50.0));
    }

    #[test]
    fn test_rsi_falling_is_0() {
        let close: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi(&close, w(14))[15], Some(0.0));
    }

    #[test]
    fn test_rsi_known_value() {
        // deltas over window 3 ending at index 3: +2, -1, +1 -> gain 1, loss 1/3
        let close = [10.0, 12.0, 11.0, 12.0];
        let out = rsi(&close, w(3));
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((out[3].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_nan_blanks_windows() {
        let close = [10.0, 11.0, f64::NAN, 12.0, 13.0, 14.0];
        let out = rsi(&close, w(2));
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert_eq!(out[4], None);
        assert_eq!(out[5], Some(100.0));
    }
}
