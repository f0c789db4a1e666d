//! Time series data model
//!
//! [`TimeSeries`] holds one ticker's bars column-wise. Each OHLCV column is
//! optional because the market-data collaborator may omit it (unknown
//! ticker, unsupported interval). Indicator outputs are never written back
//! into a `TimeSeries`; they come back as an [`IndicatorResult`] that the
//! caller merges into its own [`ColumnSet`].

use std::fmt;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::{config::Interval, AlertError, Result, Window, OHLCV};

const DAILY_FORMAT: &str = "%Y-%m-%d";
const INTRADAY_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================================
// FIELDS & OBSERVATIONS
// ============================================================

/// Raw OHLCV column identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::Volume => "Volume",
        })
    }
}

/// One bar
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OHLCV for Observation {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp.timestamp())
    }
}

// ============================================================
// TIME SERIES
// ============================================================

/// Ordered OHLCV bars for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    ticker: String,
    timestamps: Vec<DateTime<Utc>>,
    /// Bar size, when the data source reports it
    interval: Option<Interval>,
    /// Exchange time zone used to render bar dates (UTC by default)
    tz: Tz,
    open: Option<Vec<f64>>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    close: Option<Vec<f64>>,
    volume: Option<Vec<f64>>,
}

impl TimeSeries {
    /// Create an empty-column series over the given timestamps.
    ///
    /// Timestamps must be strictly increasing.
    pub fn new(ticker: impl Into<String>, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(AlertError::InvalidSeries {
                index: index + 1,
                reason: "timestamps must be strictly increasing",
            });
        }
        Ok(Self {
            ticker: ticker.into(),
            timestamps,
            interval: None,
            tz: Tz::UTC,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        })
    }

    /// Attach a raw column. Length must match the timestamps.
    pub fn with_column(mut self, field: Field, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.timestamps.len() {
            return Err(AlertError::InvalidSeries {
                index: values.len().min(self.timestamps.len()),
                reason: "column length does not match timestamps",
            });
        }
        *self.slot(field) = Some(values);
        Ok(self)
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Exchange time zone, e.g. `Asia/Kolkata` for NSE listings.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Build a fully-populated series from bars carrying timestamps.
    pub fn from_bars<T: OHLCV>(ticker: impl Into<String>, bars: &[T]) -> Result<Self> {
        let timestamps = bars
            .iter()
            .enumerate()
            .map(|(index, bar)| {
                bar.timestamp()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .ok_or(AlertError::InvalidSeries {
                        index,
                        reason: "missing or invalid timestamp",
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(ticker, timestamps)?
            .with_column(Field::Open, bars.iter().map(|b| b.open()).collect())?
            .with_column(Field::High, bars.iter().map(|b| b.high()).collect())?
            .with_column(Field::Low, bars.iter().map(|b| b.low()).collect())?
            .with_column(Field::Close, bars.iter().map(|b| b.close()).collect())?
            .with_column(Field::Volume, bars.iter().map(|b| b.volume()).collect())
    }

    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[inline]
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Raw column, or `DataUnavailable` naming the missing field.
    pub fn column(&self, field: Field) -> Result<&[f64]> {
        self.get(field).ok_or_else(|| AlertError::DataUnavailable {
            ticker: self.ticker.clone(),
            field,
        })
    }

    #[inline]
    pub fn close(&self) -> Result<&[f64]> {
        self.column(Field::Close)
    }

    /// Close column as explicit optional values (non-finite -> `None`).
    pub fn close_values(&self) -> Result<Vec<Option<f64>>> {
        Ok(self.close()?.iter().map(|&v| defined(v)).collect())
    }

    #[inline]
    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }

    #[inline]
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Daily or coarser bars.
    ///
    /// Decided by the interval when known, else by every bar starting at
    /// local midnight in the series' time zone.
    pub fn is_daily(&self) -> bool {
        match self.interval {
            Some(interval) => !interval.is_intraday(),
            None => self
                .timestamps
                .iter()
                .all(|t| t.with_timezone(&self.tz).time() == NaiveTime::MIN),
        }
    }

    /// `strftime` pattern for this series' bar stamps
    pub fn timestamp_format(&self) -> &'static str {
        if self.is_daily() {
            DAILY_FORMAT
        } else {
            INTRADAY_FORMAT
        }
    }

    /// Render a timestamp the way alerts and records show it.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        format_in(ts, self.tz, self.timestamp_format())
    }

    fn get(&self, field: Field) -> Option<&[f64]> {
        match field {
            Field::Open => self.open.as_deref(),
            Field::High => self.high.as_deref(),
            Field::Low => self.low.as_deref(),
            Field::Close => self.close.as_deref(),
            Field::Volume => self.volume.as_deref(),
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<Vec<f64>> {
        match field {
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
            Field::Volume => &mut self.volume,
        }
    }
}

/// Render `ts` in `tz` with a `strftime` pattern
#[inline]
pub fn format_in(ts: DateTime<Utc>, tz: Tz, fmt: &str) -> String {
    ts.with_timezone(&tz).format(fmt).to_string()
}

/// `Some(v)` for finite values, `None` otherwise
#[inline]
pub fn defined(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

// ============================================================
// DERIVED COLUMNS
// ============================================================

/// Typed identity of a derived column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKey {
    Sma(Window),
    Ema(Window),
    MacdLine,
    MacdSignal,
    MacdHist,
    BollingerMiddle(Window),
    BollingerUpper(Window),
    BollingerLower(Window),
    Rsi(Window),
}

impl IndicatorKey {
    /// Column label used by charts and JSON output
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKey::Sma(w) => write!(f, "SMA_{w}"),
            IndicatorKey::Ema(w) => write!(f, "EMA_{w}"),
            IndicatorKey::MacdLine => f.write_str("MACD_Line"),
            IndicatorKey::MacdSignal => f.write_str("MACD_Signal"),
            IndicatorKey::MacdHist => f.write_str("MACD_Hist"),
            IndicatorKey::BollingerMiddle(w) => write!(f, "BB_Middle_{w}"),
            IndicatorKey::BollingerUpper(w) => write!(f, "BB_Upper_{w}"),
            IndicatorKey::BollingerLower(w) => write!(f, "BB_Lower_{w}"),
            IndicatorKey::Rsi(w) => write!(f, "RSI_{w}"),
        }
    }
}

impl serde::Serialize for IndicatorKey {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// One named output series aligned 1:1 with the source bars
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DerivedColumn {
    pub key: IndicatorKey,
    pub values: Vec<Option<f64>>,
}

impl DerivedColumn {
    pub fn new(key: IndicatorKey, values: Vec<Option<f64>>) -> Self {
        Self { key, values }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

/// Output of one indicator computation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorResult {
    pub columns: Vec<DerivedColumn>,
}

impl IndicatorResult {
    pub fn get(&self, key: IndicatorKey) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = IndicatorKey> + '_ {
        self.columns.iter().map(|c| c.key)
    }
}

/// Caller-owned, insertion-ordered view of derived columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSet {
    columns: IndexMap<IndicatorKey, Vec<Option<f64>>>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every column of `result`; an existing key is replaced in place.
    pub fn merge(&mut self, result: IndicatorResult) {
        for column in result.columns {
            self.columns.insert(column.key, column.values);
        }
    }

    pub fn get(&self, key: IndicatorKey) -> Option<&[Option<f64>]> {
        self.columns.get(&key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: IndicatorKey) -> bool {
        self.columns.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = IndicatorKey> + '_ {
        self.columns.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKey, &[Option<f64>])> {
        self.columns.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Latest value of every column, keyed by label
    pub fn latest_values(&self) -> IndexMap<String, Option<f64>> {
        self.columns
            .iter()
            .map(|(k, v)| (k.label(), v.last().copied().flatten()))
            .collect()
    }
}

// ============================================================
// TESTS
// ============================================================
