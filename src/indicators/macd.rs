//! MACD (Moving Average Convergence Divergence)

use super::helpers::{difference, ema_over, to_defined};
use super::Indicator;
use crate::{
    series::{DerivedColumn, IndicatorKey, IndicatorResult},
    AlertError, Result, Window,
};

/// MACD spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdParams {
    pub fast: Window,
    pub slow: Window,
    pub signal: Window,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: Window::new_const(12),
            slow: Window::new_const(26),
            signal: Window::new_const(9),
        }
    }
}

impl MacdParams {
    pub fn validate(&self) -> Result<()> {
        if self.fast >= self.slow {
            return Err(AlertError::InvalidConfig(format!(
                "MACD fast span ({}) must be shorter than slow span ({})",
                self.fast, self.slow
            )));
        }
        Ok(())
    }
}

/// The three MACD series, aligned with the input
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    /// EMA(fast) - EMA(slow)
    pub line: Vec<Option<f64>>,
    /// EMA(line, signal)
    pub signal: Vec<Option<f64>>,
    /// line - signal
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(close: &[f64], params: MacdParams) -> MacdOutput {
    let prices = to_defined(close);
    let fast = ema_over(&prices, params.fast);
    let slow = ema_over(&prices, params.slow);

    let line = difference(&fast, &slow);
    let signal = ema_over(&line, params.signal);
    let histogram = difference(&line, &signal);

    MacdOutput {
        line,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdIndicator {
    pub params: MacdParams,
}

impl MacdIndicator {
    pub fn new(params: MacdParams) -> Self {
        Self { params }
    }
}

impl Indicator for MacdIndicator {
    fn keys(&self) -> Vec<IndicatorKey> {
        vec![
            IndicatorKey::MacdLine,
            IndicatorKey::MacdSignal,
            IndicatorKey::MacdHist,
        ]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn compute(&self, close: &[f64]) -> IndicatorResult {
        let out = macd(close, self.params);
        IndicatorResult {
            columns: vec![
                DerivedColumn::new(IndicatorKey::MacdLine, out.line),
                DerivedColumn::new(IndicatorKey::MacdSignal, out.signal),
                DerivedColumn::new(IndicatorKey::MacdHist, out.histogram),
            ],
        }
    }

    fn validate_config(&self) -> Result<()> {
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ema;

    #[test]
    fn test_line_is_fast_minus_slow() {
        let close: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let params = MacdParams::default();
        let out = macd(&close, params);
        let fast = ema(&close, params.fast);
        let slow = ema(&close, params.slow);
        for i in 0..close.len() {
            assert_eq!(out.line[i], Some(fast[i].unwrap() - slow[i].unwrap()));
        }
    }

    #[test]
    fn test_histogram_is_line_minus_signal() {
        let close: Vec<f64> = (0..60).map(|i| 50.0 + i as f64 * 0.3).collect();
        let out = macd(&close, MacdParams::default());
        for i in 0..close.len() {
            assert_eq!(out.histogram[i], Some(out.line[i].unwrap() - out.signal[i].unwrap()));
        }
    }

    #[test]
    fn test_first_bar_is_zero() {
        let out = macd(&[42.0, 43.0], MacdParams::default());
        assert_eq!(out.line[0], Some(0.0));
        assert_eq!(out.signal[0], Some(0.0));
        assert_eq!(out.histogram[0], Some(0.0));
    }

    #[test]
    fn test_params_validation() {
        assert!(MacdParams::default().validate().is_ok());
        let inverted = MacdParams {
            fast: Window::new(26).unwrap(),
            slow: Window::new(12).unwrap(),
            signal: Window::new(9).unwrap(),
        };
        assert!(inverted.validate().unwrap_err().is_configuration());
    }
}
