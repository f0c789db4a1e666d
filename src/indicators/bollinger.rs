//! Bollinger Bands

use super::helpers::{mean, rolling_apply, sample_std, to_defined};
use super::Indicator;
use crate::{
    series::{DerivedColumn, IndicatorKey, IndicatorResult},
    AlertError, Result, Window,
};

/// Middle/upper/lower bands, aligned with the input
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// `Middle = SMA(w)`, `Upper/Lower = Middle +/- num_std * sigma`.
///
/// Sigma is the rolling sample standard deviation, so the bands need at
/// least two values per window: with `w = 1` only the middle band is defined.
pub fn bollinger(close: &[f64], window: Window, num_std: f64) -> BollingerOutput {
    let prices = to_defined(close);
    let middle = rolling_apply(&prices, window, |xs| Some(mean(xs)));
    let sigma = rolling_apply(&prices, window, sample_std);

    let (upper, lower): (Vec<Option<f64>>, Vec<Option<f64>>) = middle
        .iter()
        .zip(&sigma)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerOutput {
        middle,
        upper,
        lower,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerIndicator {
    pub window: Window,
    pub num_std: f64,
}

impl Default for BollingerIndicator {
    fn default() -> Self {
        Self {
            window: Window::new_const(20),
            num_std: 2.0,
        }
    }
}

impl BollingerIndicator {
    pub fn new(window: Window, num_std: f64) -> Self {
        Self { window, num_std }
    }
}

impl Indicator for BollingerIndicator {
    fn keys(&self) -> Vec<IndicatorKey> {
        vec![
            IndicatorKey::BollingerMiddle(self.window),
            IndicatorKey::BollingerUpper(self.window),
            IndicatorKey::BollingerLower(self.window),
        ]
    }

    fn min_bars(&self) -> usize {
        self.window.get().max(2)
    }

    fn compute(&self, close: &[f64]) -> IndicatorResult {
        let out = bollinger(close, self.window, self.num_std);
        IndicatorResult {
            columns: vec![
                DerivedColumn::new(IndicatorKey::BollingerMiddle(self.window), out.middle),
                DerivedColumn::new(IndicatorKey::BollingerUpper(self.window), out.upper),
                DerivedColumn::new(IndicatorKey::BollingerLower(self.window), out.lower),
            ],
        }
    }

    fn validate_config(&self) -> Result<()> {
        if !self.num_std.is_finite() || self.num_std <= 0.0 {
            return Err(AlertError::InvalidValue(
                "Bollinger num_std must be positive and finite",
            ));
        }
        Ok(())
    }
}
