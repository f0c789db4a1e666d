//! # YATIA - Yet Another Technical Indicator Alerter
//!
//! Technical indicators, crossover/threshold events and price-structure
//! annotations over a single ticker's OHLCV series.
//!
//! ## Quick Start
//!
//! ```rust
//! use yatia::prelude::*;
//!
//! let closes = [10.0, 11.0, 9.0, 12.0, 13.0];
//! let window = Window::new(2).unwrap();
//!
//! let sma = yatia::indicators::sma(&closes, window);
//! assert_eq!(sma, vec![None, Some(10.5), Some(10.0), Some(10.5), Some(12.5)]);
//!
//! let prices: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
//! assert_eq!(crossover(&prices, &sma), Detection::Quiet);
//! ```
//!
//! The [`engine::AlertEngine`] ties the pieces together: it computes the
//! selected indicators over a display series, runs the event detector on the
//! latest two bars, annotates gaps and swing points, and checks the
//! 50/200-day SMA context over a long-horizon series.

pub mod config;
pub mod engine;
pub mod events;
pub mod indicators;
pub mod params;
pub mod patterns;
pub mod records;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::{
            AlertConfig, HistoryRange, Interval, Lookback, MacdParams, RsiThresholds, Windows,
        },
        // Engine
        engine::{
            evaluate_parallel, AlertEngine, AlertReport, DualSmaMode, EvaluationError,
            HistoryProvider, IndicatorKind, LongHorizon,
        },
        // Event detection
        events::{classify_level, crossover, position, Cross, Detection, LevelReading, Position, RsiZone},
        // Indicators
        indicators::{BollingerOutput, BuiltinIndicator, Indicator, MacdOutput},
        // Parameters
        params::{get_ratio, get_window, ParamMeta, ParamType},
        // Patterns
        patterns::{recognize, PatternAnnotation, PatternConfig},
        // Records
        records::{bar_records, BarRecord, RecordIndicator},
        // Series
        series::{ColumnSet, DerivedColumn, Field, IndicatorKey, IndicatorResult, Observation, TimeSeries},
        // Core types
        AlertError,
        AlertEvent,
        Ratio,
        Result,
        Severity,
        Window,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AlertError>;

/// Errors surfaced to the caller.
///
/// Short history and RSI zero-division are not errors: they resolve to
/// undefined values or explicit RSI rules inside the library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlertError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{field} data for {ticker} not available")]
    DataUnavailable {
        ticker: String,
        field: series::Field,
    },

    #[error("Invalid series at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: &'static str },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AlertError {
    /// True for errors caused by caller configuration (rejected before any
    /// computation).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AlertError::InvalidValue(_) | AlertError::OutOfRange { .. } | AlertError::InvalidConfig(_)
        )
    }

    /// True when a required column is absent from the fetched series.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, AlertError::DataUnavailable { .. })
    }
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AlertError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AlertError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Rolling window / smoothing span in bars (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window(usize);

impl Window {
    /// Create a new Window, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AlertError::InvalidValue("Window must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Window {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Window {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Window::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAIT
// ============================================================

/// Core OHLCV data trait
///
/// Any field may be NaN when upstream data is missing for that bar.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Bar open time as unix seconds.
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

// ============================================================
// ALERTS
// ============================================================

/// How a presentation layer should render an alert banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Immutable alert record produced by the engine
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlertEvent {
    /// Timestamp of the bar the alert refers to, if any
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub severity: Severity,
    pub message: String,
}

impl AlertEvent {
    pub fn new(
        timestamp: Option<chrono::DateTime<chrono::Utc>>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================
// TESTS
// ============================================================
