//! Price-structure recognizer
//!
//! One pass over the whole series, independent of the selected indicators:
//! - **Gaps**: open of bar `i` versus close of bar `i - 1`, beyond a
//!   relative threshold (default 1%)
//! - **Swing points**: a bar whose high (low) is the maximum (minimum) of the
//!   `2k + 1` bars centered on it (default `k = 2`). Ties all count.
//!
//! Bars without enough neighbours are never flagged.

use crate::{
    series::{Field, TimeSeries},
    Ratio, Result, Window,
};

/// Recognizer knobs
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    /// Relative open-vs-previous-close move that counts as a gap
    pub gap_threshold: Ratio,
    /// Bars on each side of a swing candidate
    pub swing_half_window: Window,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            gap_threshold: Ratio::new_const(0.01),
            swing_half_window: Window::new_const(2),
        }
    }
}

/// Per-bar structural flags
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct PatternAnnotation {
    pub gap_up: bool,
    pub gap_down: bool,
    /// `open - previous close` when a gap is flagged, else 0
    pub gap_size: f64,
    pub swing_high: bool,
    pub swing_low: bool,
}

/// Gap flags for the bar opening at `open` after a bar closing at `prev_close`.
///
/// Returns `(gap_up, gap_down, gap_size)`. Undefined prices never gap.
pub fn classify_gap(prev_close: f64, open: f64, threshold: Ratio) -> (bool, bool, f64) {
    if !prev_close.is_finite() || !open.is_finite() {
        return (false, false, 0.0);
    }
    let t = threshold.get();
    if open > prev_close * (1.0 + t) {
        (true, false, open - prev_close)
    } else if open < prev_close * (1.0 - t) {
        (false, true, open - prev_close)
    } else {
        (false, false, 0.0)
    }
}

/// Indices whose value is the extremum of the centered `2k + 1` window.
///
/// `better(a, b)` is true when `a` beats `b` (greater for highs, smaller for
/// lows). A window holding an undefined value yields no swing.
fn swing_points<F>(values: &[f64], k: usize, better: F) -> Vec<bool>
where
    F: Fn(f64, f64) -> bool,
{
    let n = values.len();
    let mut flags = vec![false; n];
    if n < 2 * k + 1 {
        return flags;
    }

    for i in k..n - k {
        let window = &values[i - k..=i + k];
        if window.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let center = values[i];
        flags[i] = window.iter().all(|&v| !better(v, center));
    }
    flags
}

/// Annotate raw open/high/low/close columns.
///
/// All four slices must be aligned; only the shortest common prefix is used.
pub fn annotate(open: &[f64], high: &[f64], low: &[f64], close: &[f64], config: PatternConfig) -> Vec<PatternAnnotation> {
    let n = open.len().min(high.len()).min(low.len()).min(close.len());
    let k = config.swing_half_window.get();

    let swing_high = swing_points(&high[..n], k, |a, b| a > b);
    let swing_low = swing_points(&low[..n], k, |a, b| a < b);

    (0..n)
        .map(|i| {
            let (gap_up, gap_down, gap_size) = if i == 0 {
                (false, false, 0.0)
            } else {
                classify_gap(close[i - 1], open[i], config.gap_threshold)
            };
            PatternAnnotation {
                gap_up,
                gap_down,
                gap_size,
                swing_high: swing_high[i],
                swing_low: swing_low[i],
            }
        })
        .collect()
}

/// Annotate a series. Needs open, high, low and close columns.
pub fn recognize(series: &TimeSeries, config: PatternConfig) -> Result<Vec<PatternAnnotation>> {
    Ok(annotate(
        series.column(Field::Open)?,
        series.column(Field::High)?,
        series.column(Field::Low)?,
        series.column(Field::Close)?,
        config,
    ))
}

// ============================================================
// TESTS
// ============================================================
