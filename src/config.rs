//! Alert request configuration: defaults, normalization, validation and
//! TOML loading.
//!
//! An [`AlertConfig`] is everything one alert request needs besides the
//! price data itself:
//!
//! ```toml
//! ticker = "aapl"
//! indicators = ["SMA", "RSI", "Bollinger Bands"]
//! dual_sma_mode = "status"
//!
//! [windows]
//! sma_ema = 20
//! rsi = 14
//! bollinger = 20
//!
//! [display_range]
//! lookback = "6mo"
//! interval = "1d"
//! ```
//!
//! Normalization trims and upper-cases the ticker and drops repeated
//! indicator selections (first occurrence wins). Validation happens before
//! any computation, and every failure is a configuration error.

use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

pub use crate::indicators::MacdParams;
pub use crate::patterns::PatternConfig;
use crate::{
    engine::{DualSmaMode, IndicatorKind},
    params::{self, get_window},
    AlertError, Result, Window,
};

// ============================================================
// WINDOWS & THRESHOLDS
// ============================================================

/// Rolling windows for the short-horizon indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Windows {
    /// Shared by SMA and EMA
    pub sma_ema: Window,
    pub rsi: Window,
    pub bollinger: Window,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            sma_ema: Window::new_const(20),
            rsi: Window::new_const(14),
            bollinger: Window::new_const(20),
        }
    }
}

impl Windows {
    /// Build from form-style inputs; missing keys use their defaults.
    pub fn from_params(form: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            sma_ema: get_window(form, params::SMA_EMA_WINDOW.name)?,
            rsi: get_window(form, params::RSI_WINDOW.name)?,
            bollinger: get_window(form, params::BOLLINGER_WINDOW.name)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        params::SMA_EMA_WINDOW.validate(self.sma_ema.get() as f64)?;
        params::RSI_WINDOW.validate(self.rsi.get() as f64)?;
        params::BOLLINGER_WINDOW.validate(self.bollinger.get() as f64)
    }
}

/// RSI zone boundaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiThresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl RsiThresholds {
    pub fn validate(&self) -> Result<()> {
        params::RSI_OVERBOUGHT.validate(self.overbought)?;
        params::RSI_OVERSOLD.validate(self.oversold)?;
        if self.oversold >= self.overbought {
            return Err(AlertError::InvalidConfig(format!(
                "RSI oversold level ({}) must be below overbought level ({})",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }
}

// ============================================================
// HISTORY RANGE
// ============================================================

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AlertError;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| AlertError::InvalidConfig(format!(
                        concat!("unknown ", stringify!($name), " `{}`"),
                        s
                    )))
            }
        }
    };
}

string_enum! {
    /// How far back the market-data collaborator should fetch
    Lookback {
        Days7 => "7d",
        Days60 => "60d",
        Month1 => "1mo",
        Months3 => "3mo",
        Months6 => "6mo",
        Year1 => "1y",
        Years2 => "2y",
        Years5 => "5y",
    }
}

string_enum! {
    /// Bar size requested from the market-data collaborator
    Interval {
        Minutes5 => "5m",
        Minutes15 => "15m",
        Day1 => "1d",
        Week1 => "1wk",
    }
}

impl Interval {
    /// Bars shorter than a trading day
    pub fn is_intraday(&self) -> bool {
        matches!(self, Interval::Minutes5 | Interval::Minutes15)
    }
}

/// Lookback + bar interval of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryRange {
    pub lookback: Lookback,
    pub interval: Interval,
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self::new(Lookback::Months3, Interval::Day1)
    }
}

impl HistoryRange {
    /// Fixed range used for the 50/200-day SMA context
    pub const LONG_HORIZON: HistoryRange = HistoryRange::new(Lookback::Years2, Interval::Day1);

    /// Timeframe choices offered by the dashboard, by label
    pub const PRESETS: &'static [(&'static str, HistoryRange)] = &[
        ("5 Minutes", HistoryRange::new(Lookback::Days7, Interval::Minutes5)),
        ("15 Minutes", HistoryRange::new(Lookback::Days60, Interval::Minutes15)),
        ("1 Day", HistoryRange::new(Lookback::Month1, Interval::Day1)),
        ("1 Month", HistoryRange::new(Lookback::Months6, Interval::Day1)),
        ("1 Year", HistoryRange::new(Lookback::Year1, Interval::Day1)),
        ("5 Years", HistoryRange::new(Lookback::Years5, Interval::Week1)),
    ];

    pub const fn new(lookback: Lookback, interval: Interval) -> Self {
        Self { lookback, interval }
    }

    pub fn preset(label: &str) -> Option<HistoryRange> {
        Self::PRESETS
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label.trim()))
            .map(|(_, r)| *r)
    }
}

// ============================================================
// ALERT CONFIG
// ============================================================

fn default_indicators() -> Vec<IndicatorKind> {
    vec![IndicatorKind::Sma]
}

fn default_num_std() -> f64 {
    params::BOLLINGER_NUM_STD.default
}

fn default_long_windows() -> Vec<Window> {
    vec![Window::new_const(50), Window::new_const(200)]
}

/// Everything one alert request needs besides the price data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    pub ticker: String,
    /// Selected indicators, in display order
    #[serde(default = "default_indicators")]
    pub indicators: Vec<IndicatorKind>,
    #[serde(default)]
    pub windows: Windows,
    #[serde(default = "default_num_std")]
    pub bollinger_num_std: f64,
    #[serde(default)]
    pub macd: MacdParams,
    #[serde(default)]
    pub rsi_thresholds: RsiThresholds,
    #[serde(default)]
    pub dual_sma_mode: DualSmaMode,
    /// SMA lengths checked over the long horizon
    #[serde(default = "default_long_windows")]
    pub long_sma_windows: Vec<Window>,
    #[serde(default)]
    pub display_range: HistoryRange,
    #[serde(default)]
    pub patterns: PatternConfig,
}

impl AlertConfig {
    /// Defaults for `ticker`: SMA(20) over three months of daily bars,
    /// 50/200-day SMA crossing checks.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            indicators: default_indicators(),
            windows: Windows::default(),
            bollinger_num_std: default_num_std(),
            macd: MacdParams::default(),
            rsi_thresholds: RsiThresholds::default(),
            dual_sma_mode: DualSmaMode::default(),
            long_sma_windows: default_long_windows(),
            display_range: HistoryRange::default(),
            patterns: PatternConfig::default(),
        }
    }

    pub fn with_indicators(mut self, indicators: impl IntoIterator<Item = IndicatorKind>) -> Self {
        self.indicators = indicators.into_iter().collect();
        self
    }

    pub fn with_windows(mut self, windows: Windows) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_dual_sma_mode(mut self, mode: DualSmaMode) -> Self {
        self.dual_sma_mode = mode;
        self
    }

    pub fn with_display_range(mut self, range: HistoryRange) -> Self {
        self.display_range = range;
        self
    }

    pub fn with_patterns(mut self, patterns: PatternConfig) -> Self {
        self.patterns = patterns;
        self
    }

    /// Trim/upper-case the ticker and drop repeated indicator selections.
    pub fn normalized(mut self) -> Self {
        self.ticker = self.ticker.trim().to_uppercase();
        let mut seen = Vec::with_capacity(self.indicators.len());
        self.indicators.retain(|k| {
            if seen.contains(k) {
                false
            } else {
                seen.push(*k);
                true
            }
        });
        self
    }

    /// Reject anything that would make the request meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(AlertError::InvalidConfig(
                "Please enter a stock ticker symbol.".to_string(),
            ));
        }
        if self.indicators.is_empty() {
            return Err(AlertError::InvalidConfig(
                "Select at least one indicator.".to_string(),
            ));
        }
        if self.long_sma_windows.is_empty() {
            return Err(AlertError::InvalidConfig(
                "At least one long-horizon SMA window is required.".to_string(),
            ));
        }
        self.windows.validate()?;
        params::BOLLINGER_NUM_STD.validate(self.bollinger_num_std)?;
        params::MACD_FAST.validate(self.macd.fast.get() as f64)?;
        params::MACD_SLOW.validate(self.macd.slow.get() as f64)?;
        params::MACD_SIGNAL.validate(self.macd.signal.get() as f64)?;
        self.macd.validate()?;
        self.rsi_thresholds.validate()?;
        params::GAP_THRESHOLD.validate(self.patterns.gap_threshold.get())?;
        params::SWING_HALF_WINDOW.validate(self.patterns.swing_half_window.get() as f64)
    }

    /// Parse, normalize and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AlertConfig = toml::from_str(s).map_err(|e| AlertError::Parse(e.to_string()))?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Like [`AlertConfig::from_toml_str`], reading from a file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AlertError::Parse(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlertConfig::new("AAPL");
        assert_eq!(config.indicators, vec![IndicatorKind::Sma]);
        assert_eq!(config.windows.sma_ema.get(), 20);
        assert_eq!(config.windows.rsi.get(), 14);
        assert_eq!(config.bollinger_num_std, 2.0);
        assert_eq!(config.dual_sma_mode, DualSmaMode::Crossing);
        assert_eq!(config.long_sma_windows, vec![Window::new(50).unwrap(), Window::new(200).unwrap()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalization() {
        let config = AlertConfig::new("  msft ")
            .with_indicators([IndicatorKind::Rsi, IndicatorKind::Sma, IndicatorKind::Rsi])
            .normalized();
        assert_eq!(config.ticker, "MSFT");
        assert_eq!(config.indicators, vec![IndicatorKind::Rsi, IndicatorKind::Sma]);
    }

    #[test]
    fn test_empty_ticker_rejected() {
        let err = AlertConfig::new("   ").validate().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Invalid config: Please enter a stock ticker symbol.");
    }

    #[test]
    fn test_no_indicators_rejected() {
        let err = AlertConfig::new("AAPL").with_indicators(Vec::<IndicatorKind>::new()).validate().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_window_range_enforced() {
        let windows = Windows {
            sma_ema: Window::new(201).unwrap(),
            ..Windows::default()
        };
        let err = AlertConfig::new("AAPL").with_windows(windows).validate().unwrap_err();
        assert!(matches!(err, AlertError::OutOfRange { field: "sma_ema_window", .. }));
    }

    #[test]
    fn test_rsi_thresholds_order() {
        let bad = RsiThresholds {
            overbought: 30.0,
            oversold: 70.0,
        };
        assert!(bad.validate().is_err());
        assert!(RsiThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_windows_from_params() {
        let mut form = HashMap::new();
        form.insert("sma_ema_window", 50.0);
        let windows = Windows::from_params(&form).unwrap();
        assert_eq!(windows.sma_ema.get(), 50);
        assert_eq!(windows.bollinger.get(), 20);

        form.insert("rsi_window", 0.0);
        assert!(Windows::from_params(&form).is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = AlertConfig::from_toml_str(
            r#"
            ticker = " tsla "
            indicators = ["SMA", "rsi", "Bollinger Bands", "SMA"]
            dual_sma_mode = "status"

            [windows]
            sma_ema = 10
            rsi = 7

            [display_range]
            lookback = "6mo"
            interval = "1d"

            [patterns]
            gap_threshold = 0.02
            "#,
        )
        .unwrap();

        assert_eq!(config.ticker, "TSLA");
        assert_eq!(
            config.indicators,
            vec![IndicatorKind::Sma, IndicatorKind::Rsi, IndicatorKind::BollingerBands]
        );
        assert_eq!(config.windows.sma_ema.get(), 10);
        assert_eq!(config.windows.rsi.get(), 7);
        assert_eq!(config.windows.bollinger.get(), 20);
        assert_eq!(config.dual_sma_mode, DualSmaMode::Status);
        assert_eq!(config.display_range, HistoryRange::new(Lookback::Months6, Interval::Day1));
        assert_eq!(config.patterns.gap_threshold.get(), 0.02);
        assert_eq!(config.patterns.swing_half_window.get(), 2);
    }

    #[test]
    fn test_from_toml_rejects_zero_window() {
        let err = AlertConfig::from_toml_str("ticker = \"AAPL\"\n[windows]\nrsi = 0\n").unwrap_err();
        assert!(matches!(err, AlertError::Parse(_)));
    }

    #[test]
    fn test_from_toml_rejects_unknown_field() {
        assert!(AlertConfig::from_toml_str("ticker = \"AAPL\"\ncolour = \"red\"\n").is_err());
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = AlertConfig::load_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, AlertError::Parse(_)));
    }

    #[test]
    fn test_lookback_and_interval_parse() {
        assert_eq!("2Y".parse::<Lookback>().unwrap(), Lookback::Years2);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Week1);
        assert!("3w".parse::<Interval>().is_err());
        assert_eq!(Lookback::Months3.to_string(), "3mo");
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            HistoryRange::preset("5 years"),
            Some(HistoryRange::new(Lookback::Years5, Interval::Week1))
        );
        assert_eq!(HistoryRange::preset("10 Years"), None);
        assert_eq!(HistoryRange::LONG_HORIZON.lookback, Lookback::Years2);
    }
}
