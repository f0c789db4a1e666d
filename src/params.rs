//! Parameter metadata for indicator and recognizer knobs
//!
//! This module describes every tunable the engine accepts, enabling:
//! - Boundary validation of form-style inputs (windows, thresholds)
//! - Parameter documentation
//! - Automatic configuration UI generation (defaults and allowed ranges)
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use yatia::params::{get_window, PARAMS};
//!
//! for param in PARAMS {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut form = HashMap::new();
//! form.insert("rsi_window", 21.0);
//! assert_eq!(get_window(&form, "rsi_window").unwrap().get(), 21);
//! assert_eq!(get_window(&form, "sma_ema_window").unwrap().get(), 20);
//! ```

use std::collections::HashMap;

use crate::{AlertError, Ratio, Result, Window};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Window value (positive integer)
  Window,
  /// Unbounded real multiplier or level
  Scalar,
}

/// Metadata for a single parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "rsi_window")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Allowed range: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn window(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Window, default, range, description }
  }

  pub const fn scalar(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Scalar, default, range, description }
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(AlertError::InvalidValue("Parameter cannot be NaN or infinite"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(AlertError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Window => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AlertError::InvalidValue("Window must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Ratio | ParamType::Scalar => Ok(()),
    }
  }
}

// ============================================================
// KNOWN PARAMETERS
// ============================================================

pub const SMA_EMA_WINDOW: ParamMeta =
  ParamMeta::window("sma_ema_window", 20.0, (1.0, 200.0, 1.0), "SMA/EMA period window");
pub const RSI_WINDOW: ParamMeta =
  ParamMeta::window("rsi_window", 14.0, (1.0, 100.0, 1.0), "RSI period window");
pub const BOLLINGER_WINDOW: ParamMeta =
  ParamMeta::window("bollinger_window", 20.0, (1.0, 100.0, 1.0), "Bollinger Bands period window");
pub const BOLLINGER_NUM_STD: ParamMeta = ParamMeta::scalar(
  "bollinger_num_std",
  2.0,
  (0.1, 10.0, 0.1),
  "Band distance from the middle band, in sample standard deviations",
);
pub const MACD_FAST: ParamMeta =
  ParamMeta::window("macd_fast", 12.0, (1.0, 100.0, 1.0), "MACD fast EMA span");
pub const MACD_SLOW: ParamMeta =
  ParamMeta::window("macd_slow", 26.0, (2.0, 200.0, 1.0), "MACD slow EMA span");
pub const MACD_SIGNAL: ParamMeta =
  ParamMeta::window("macd_signal", 9.0, (1.0, 100.0, 1.0), "MACD signal EMA span");
pub const RSI_OVERBOUGHT: ParamMeta =
  ParamMeta::scalar("rsi_overbought", 70.0, (0.0, 100.0, 1.0), "RSI level above which a reading is overbought");
pub const RSI_OVERSOLD: ParamMeta =
  ParamMeta::scalar("rsi_oversold", 30.0, (0.0, 100.0, 1.0), "RSI level below which a reading is oversold");
pub const GAP_THRESHOLD: ParamMeta = ParamMeta::ratio(
  "gap_threshold",
  0.01,
  (0.0, 0.5, 0.005),
  "Relative open-vs-previous-close move flagged as a gap",
);
pub const SWING_HALF_WINDOW: ParamMeta =
  ParamMeta::window("swing_half_window", 2.0, (1.0, 50.0, 1.0), "Bars on each side of a swing point");

/// Every parameter the engine understands
pub const PARAMS: &[ParamMeta] = &[
  SMA_EMA_WINDOW,
  RSI_WINDOW,
  BOLLINGER_WINDOW,
  BOLLINGER_NUM_STD,
  MACD_FAST,
  MACD_SLOW,
  MACD_SIGNAL,
  RSI_OVERBOUGHT,
  RSI_OVERSOLD,
  GAP_THRESHOLD,
  SWING_HALF_WINDOW,
];

/// Look up parameter metadata by name
pub fn param(name: &str) -> Option<&'static ParamMeta> {
  PARAMS.iter().find(|p| p.name == name)
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

fn lookup(params: &HashMap<&str, f64>, key: &str, expected: ParamType) -> Result<f64> {
  let meta = param(key).ok_or_else(|| AlertError::InvalidConfig(format!("unknown parameter `{key}`")))?;
  if meta.param_type != expected {
    return Err(AlertError::InvalidConfig(format!("parameter `{key}` is not a {expected:?}")));
  }
  let value = params.get(key).copied().unwrap_or(meta.default);
  meta.validate(value)?;
  Ok(value)
}

/// Get a validated Window from params with the metadata default as fallback
pub fn get_window(params: &HashMap<&str, f64>, key: &str) -> Result<Window> {
  let value = lookup(params, key, ParamType::Window)?;
  Window::new(value as usize)
}

/// Get a validated Ratio from params with the metadata default as fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str) -> Result<Ratio> {
  Ratio::new(lookup(params, key, ParamType::Ratio)?)
}

/// Get a validated scalar from params with the metadata default as fallback
pub fn get_scalar(params: &HashMap<&str, f64>, key: &str) -> Result<f64> {
  lookup(params, key, ParamType::Scalar)
}

// ============================================================
// TESTS
// ============================================================
