//! Per-bar chart records
//!
//! Flattens a series, a handful of requested indicator columns and the
//! gap/swing annotations into one serializable row per bar. This is what a
//! charting front end consumes.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    indicators::{BuiltinIndicator, EmaIndicator, Indicator, RsiIndicator, SmaIndicator},
    patterns::{recognize, PatternConfig},
    series::{defined, format_in, ColumnSet, Field, IndicatorKey, TimeSeries},
    AlertError, Result, Window,
};

const DEFAULT_MA_WINDOW: Window = Window::new_const(20);
const DEFAULT_RSI_WINDOW: Window = Window::new_const(14);

/// Indicator column a record request can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordIndicator {
    Sma(Window),
    Ema(Window),
    Rsi(Window),
}

impl RecordIndicator {
    pub fn key(&self) -> IndicatorKey {
        match *self {
            RecordIndicator::Sma(w) => IndicatorKey::Sma(w),
            RecordIndicator::Ema(w) => IndicatorKey::Ema(w),
            RecordIndicator::Rsi(w) => IndicatorKey::Rsi(w),
        }
    }

    pub fn indicator(&self) -> BuiltinIndicator {
        match *self {
            RecordIndicator::Sma(w) => BuiltinIndicator::Sma(SmaIndicator::new(w)),
            RecordIndicator::Ema(w) => BuiltinIndicator::Ema(EmaIndicator::new(w)),
            RecordIndicator::Rsi(w) => BuiltinIndicator::Rsi(RsiIndicator::new(w)),
        }
    }

    /// Parse a comma-separated list such as `"sma20,ema20,rsi"`.
    ///
    /// Empty entries are ignored; repeats collapse to the first occurrence.
    pub fn parse_list(list: &str) -> Result<Vec<RecordIndicator>> {
        let mut out: Vec<RecordIndicator> = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let indicator = item.parse()?;
            if !out.contains(&indicator) {
                out.push(indicator);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for RecordIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIndicator::Sma(w) => write!(f, "sma{w}"),
            RecordIndicator::Ema(w) => write!(f, "ema{w}"),
            RecordIndicator::Rsi(w) => write!(f, "rsi{w}"),
        }
    }
}

impl FromStr for RecordIndicator {
    type Err = AlertError;

    /// `sma20`, `EMA50`, `rsi`, `rsi21` ... A bare name takes its default window.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let unknown = || AlertError::InvalidConfig(format!("unknown indicator `{}`", s.trim()));

        let split = lower.find(|c: char| c.is_ascii_digit()).unwrap_or(lower.len());
        let (name, digits) = lower.split_at(split);

        let window = |default: Window| -> Result<Window> {
            if digits.is_empty() {
                return Ok(default);
            }
            let n: usize = digits.parse().map_err(|_| unknown())?;
            Window::new(n)
        };

        match name {
            "sma" => Ok(RecordIndicator::Sma(window(DEFAULT_MA_WINDOW)?)),
            "ema" => Ok(RecordIndicator::Ema(window(DEFAULT_MA_WINDOW)?)),
            "rsi" => Ok(RecordIndicator::Rsi(window(DEFAULT_RSI_WINDOW)?)),
            _ => Err(unknown()),
        }
    }
}

/// One chart row
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BarRecord {
    pub date: String,
    pub close: f64,
    pub volume: f64,
    pub gap_up: bool,
    pub gap_down: bool,
    pub gap_size: f64,
    pub swing_high: bool,
    pub swing_low: bool,
    /// Requested indicator values keyed by column label; undefined is `null`
    #[serde(flatten)]
    pub indicators: IndexMap<String, Option<f64>>,
}

/// Build chart rows for `series`.
///
/// Needs open, high, low and close. Bars with an undefined close or volume
/// are left out, so a series without a volume column yields no rows.
pub fn bar_records(series: &TimeSeries, requested: &[RecordIndicator], patterns: PatternConfig) -> Result<Vec<BarRecord>> {
    let close = series.close()?;
    let annotations = recognize(series, patterns)?;

    let mut columns = ColumnSet::new();
    for r in requested {
        columns.merge(r.indicator().compute(close));
    }

    let Ok(volume) = series.column(Field::Volume) else {
        warn!(ticker = %series.ticker(), "volume column missing, no records produced");
        return Ok(Vec::new());
    };

    let (stamp_fmt, tz) = (series.timestamp_format(), series.timezone());
    let records: Vec<BarRecord> = series
        .timestamps()
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = defined(close[i])?;
            let volume = defined(volume[i])?;
            let a = annotations[i];
            let indicators = requested
                .iter()
                .map(|r| {
                    let key = r.key();
                    let value = columns.get(key).and_then(|v| v[i]);
                    (key.label(), value)
                })
                .collect();
            Some(BarRecord {
                date: format_in(ts, tz, stamp_fmt),
                close,
                volume,
                gap_up: a.gap_up,
                gap_down: a.gap_down,
                gap_size: a.gap_size,
                swing_high: a.swing_high,
                swing_low: a.swing_low,
                indicators,
            })
        })
        .collect();

    debug!(
        ticker = %series.ticker(),
        bars = series.len(),
        records = records.len(),
        "built chart records"
    );
    Ok(records)
}

/// Serialize rows as a JSON array.
pub fn to_json(records: &[BarRecord]) -> Result<String> {
    serde_json::to_string(records).map_err(|e| AlertError::Parse(e.to_string()))
}
