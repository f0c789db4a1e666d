//! Alert engine
//!
//! Orchestrates the indicator library, the event detector and the pattern
//! recognizer for one [`AlertConfig`]:
//!
//! 1. every selected indicator is computed over the display series and its
//!    latest two bars are probed for an event
//! 2. gaps and swing points are annotated over the whole display series
//! 3. the 50/200-day SMAs are checked over a separate long-horizon series,
//!    either for a fresh crossing or for the current above/below status
//!
//! Alerts come out in selection order, followed by the long-horizon
//! messages. A missing close column on the display series fails the whole
//! request; everything else degrades to an error banner for the affected
//! part only.

use std::{fmt, str::FromStr};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::{AlertConfig, HistoryRange},
    events::{classify_level, crossover, position, Cross, Detection, Position, RsiZone},
    indicators::{
        helpers::to_defined, sma, BollingerIndicator, BuiltinIndicator, EmaIndicator, Indicator,
        MacdIndicator, RsiIndicator, SmaIndicator,
    },
    patterns::{recognize, PatternAnnotation},
    series::{ColumnSet, DerivedColumn, Field, IndicatorKey, IndicatorResult, TimeSeries},
    AlertError, AlertEvent, Result, Severity, Window,
};

// ============================================================
// SELECTION
// ============================================================

/// Indicators a caller can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Macd,
    BollingerBands,
    Rsi,
    Volume,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Macd,
        IndicatorKind::BollingerBands,
        IndicatorKind::Rsi,
        IndicatorKind::Volume,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::BollingerBands => "Bollinger Bands",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Volume => "Volume",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IndicatorKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| AlertError::InvalidConfig(format!("unknown indicator `{s}`")))
    }
}

impl serde::Serialize for IndicatorKind {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> serde::Deserialize<'de> for IndicatorKind {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How the long-horizon SMAs are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DualSmaMode {
    /// Alert only when price crossed the SMA on the latest bar
    #[default]
    Crossing,
    /// Always report whether price sits above or below the SMA
    Status,
}

// ============================================================
// DATA COLLABORATOR
// ============================================================

/// Source of raw price history (the external market-data service).
///
/// Implementations own retries and timeouts; the engine only calls `fetch`.
pub trait HistoryProvider: Send + Sync {
    fn fetch(&self, ticker: &str, range: HistoryRange) -> Result<TimeSeries>;
}

// ============================================================
// REPORT
// ============================================================

/// Long-horizon SMA context
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongHorizon {
    /// One `SMA_n` column per configured long window
    pub columns: ColumnSet,
}

/// Everything one evaluation produced
#[derive(Debug, Clone, PartialEq)]
pub struct AlertReport {
    pub ticker: String,
    /// Banners in emission order
    pub alerts: Vec<AlertEvent>,
    /// Derived columns over the display series, in selection order
    pub columns: ColumnSet,
    /// Per-bar gap/swing flags over the display series
    pub patterns: Vec<PatternAnnotation>,
    pub long_horizon: Option<LongHorizon>,
}

impl AlertReport {
    /// Latest value of every display column, keyed by label
    pub fn latest_values(&self) -> indexmap::IndexMap<String, Option<f64>> {
        self.columns.latest_values()
    }

    pub fn errors(&self) -> impl Iterator<Item = &AlertEvent> {
        self.alerts.iter().filter(|a| a.is_error())
    }

    pub fn messages(&self) -> Vec<&str> {
        self.alerts.iter().map(|a| a.message.as_str()).collect()
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Validated alert engine for one request configuration
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: AlertConfig,
}

impl AlertEngine {
    /// Normalize and validate `config`. Fails before any computation.
    pub fn new(config: AlertConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let engine = Self { config };
        for kind in &engine.config.indicators {
            if let Some(indicator) = engine.indicator_for(*kind) {
                indicator.validate_config()?;
            }
        }
        Ok(engine)
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Configured indicator behind a selection (`None` for Volume)
    pub fn indicator_for(&self, kind: IndicatorKind) -> Option<BuiltinIndicator> {
        let windows = self.config.windows;
        let indicator = match kind {
            IndicatorKind::Sma => BuiltinIndicator::Sma(SmaIndicator::new(windows.sma_ema)),
            IndicatorKind::Ema => BuiltinIndicator::Ema(EmaIndicator::new(windows.sma_ema)),
            IndicatorKind::Macd => BuiltinIndicator::Macd(MacdIndicator::new(self.config.macd)),
            IndicatorKind::BollingerBands => BuiltinIndicator::Bollinger(BollingerIndicator::new(
                windows.bollinger,
                self.config.bollinger_num_std,
            )),
            IndicatorKind::Rsi => BuiltinIndicator::Rsi(RsiIndicator::new(windows.rsi)),
            IndicatorKind::Volume => return None,
        };
        Some(indicator)
    }

    /// Fetch both horizons through `provider` and evaluate.
    ///
    /// A failed display fetch fails the request; a failed long-horizon fetch
    /// becomes an error banner. A fetched series that does not report its
    /// bar size is tagged with the interval it was requested at.
    pub fn run<P: HistoryProvider + ?Sized>(&self, provider: &P) -> Result<AlertReport> {
        let ticker = &self.config.ticker;
        let range = self.config.display_range;
        let mut shown = provider.fetch(ticker, range)?;
        if shown.interval().is_none() {
            shown = shown.with_interval(range.interval);
        }
        let mut report = self.evaluate_display(&shown)?;

        match provider.fetch(ticker, HistoryRange::LONG_HORIZON) {
            Ok(long) => self.attach_long_horizon(&mut report, &long),
            Err(error) => {
                warn!(ticker = %ticker, %error, "long-horizon fetch failed");
                report
                    .alerts
                    .push(AlertEvent::new(None, Severity::Error, format!("Error: {error}")));
            },
        }

        info!(ticker = %ticker, alerts = report.alerts.len(), "evaluation complete");
        Ok(report)
    }

    /// Evaluate both horizons over already-fetched series.
    pub fn evaluate(&self, shown: &TimeSeries, long: &TimeSeries) -> Result<AlertReport> {
        let mut report = self.evaluate_display(shown)?;
        self.attach_long_horizon(&mut report, long);
        debug!(ticker = %report.ticker, alerts = report.alerts.len(), "evaluation complete");
        Ok(report)
    }

    /// Selected indicators and patterns over the display series only.
    ///
    /// Missing open/high/low does not fail the request, but the skipped
    /// gap/swing pass is reported as an error banner.
    pub fn evaluate_display(&self, series: &TimeSeries) -> Result<AlertReport> {
        let ticker = self.config.ticker.as_str();
        let got = series.ticker();
        if !got.eq_ignore_ascii_case(ticker) {
            warn!(expected = %ticker, got = %got, "series ticker differs from request");
        }

        let close = series.close()?;
        let prices = to_defined(close);
        let bars = series.len();
        let latest = series.latest_timestamp();
        let stamp = latest.map(|ts| series.format_timestamp(ts)).unwrap_or_default();

        let mut alerts = Vec::new();
        let mut columns = ColumnSet::new();

        for &kind in &self.config.indicators {
            let Some(indicator) = self.indicator_for(kind) else {
                // Volume: nothing to compute, only the column's presence matters.
                if series.has_column(Field::Volume) {
                    alerts.push(AlertEvent::new(latest, Severity::Success, "Showing volume data."));
                } else {
                    warn!(ticker = %ticker, "volume column missing");
                    alerts.push(AlertEvent::new(
                        latest,
                        Severity::Error,
                        format!("Volume data for {ticker} not available."),
                    ));
                }
                continue;
            };

            let need = indicator.min_bars();
            if bars < need {
                debug!(indicator = %kind, bars, need, "insufficient history, values stay undefined");
            }

            let result = indicator.compute(close);
            if let Some(message) = self.describe(kind, &prices, &result, &stamp) {
                alerts.push(AlertEvent::new(latest, Severity::Success, message));
            }
            columns.merge(result);
        }

        let patterns = match recognize(series, self.config.patterns) {
            Ok(patterns) => patterns,
            Err(error) => {
                warn!(ticker = %ticker, %error, "skipping gap/swing annotation");
                alerts.push(AlertEvent::new(
                    latest,
                    Severity::Error,
                    format!("{error}; gap and swing annotation skipped."),
                ));
                Vec::new()
            },
        };

        Ok(AlertReport {
            ticker: ticker.to_string(),
            alerts,
            columns,
            patterns,
            long_horizon: None,
        })
    }

    /// Alert text for one computed indicator, `None` when nothing fired.
    fn describe(
        &self,
        kind: IndicatorKind,
        prices: &[Option<f64>],
        result: &IndicatorResult,
        stamp: &str,
    ) -> Option<String> {
        let ticker = &self.config.ticker;
        let column = move |key: IndicatorKey| result.get(key).unwrap_or_default();

        match kind {
            IndicatorKind::Sma | IndicatorKind::Ema => {
                let w = self.config.windows.sma_ema;
                let key = if kind == IndicatorKind::Sma {
                    IndicatorKey::Sma(w)
                } else {
                    IndicatorKey::Ema(w)
                };
                let detection = crossover(prices, column(key));
                debug!(indicator = %key, ?detection, "price crossover probe");
                let side = match detection.detected()? {
                    Cross::Above => "above",
                    Cross::Below => "below",
                };
                Some(format!(
                    "ALERT: {stamp} - {ticker} price crossed {side} the {w}-period {kind}!"
                ))
            },
            IndicatorKind::Macd => {
                let detection = crossover(column(IndicatorKey::MacdLine), column(IndicatorKey::MacdSignal));
                debug!(?detection, "MACD crossover probe");
                Some(match detection.detected()? {
                    Cross::Above => format!("ALERT: {ticker} MACD line crossed ABOVE Signal line (bullish)."),
                    Cross::Below => format!("ALERT: {ticker} MACD line crossed BELOW Signal line (bearish)."),
                })
            },
            IndicatorKind::BollingerBands => {
                Some("Bollinger Bands calculated. No automatic alerts implemented.".to_string())
            },
            IndicatorKind::Rsi => {
                let key = IndicatorKey::Rsi(self.config.windows.rsi);
                match classify_level(column(key), self.config.rsi_thresholds) {
                    Detection::Detected(reading) => {
                        let mut msg = format!("Latest RSI: {:.2}.", reading.value);
                        match reading.zone {
                            RsiZone::Overbought => msg.push_str(" RSI indicates overbought condition."),
                            RsiZone::Oversold => msg.push_str(" RSI indicates oversold condition."),
                            RsiZone::Neutral => {},
                        }
                        Some(msg)
                    },
                    Detection::Quiet | Detection::InsufficientData => {
                        Some("RSI unavailable: insufficient data.".to_string())
                    },
                }
            },
            IndicatorKind::Volume => None,
        }
    }

    /// Add the long-horizon SMA columns and messages to `report`.
    pub fn attach_long_horizon(&self, report: &mut AlertReport, long: &TimeSeries) {
        let ticker = &self.config.ticker;
        let latest = long.latest_timestamp();

        let close = match long.close() {
            Ok(close) => close,
            Err(error) => {
                warn!(ticker = %ticker, %error, "long-horizon close missing");
                report.alerts.push(AlertEvent::new(
                    None,
                    Severity::Error,
                    format!("Close price for {ticker} not found in extended data."),
                ));
                return;
            },
        };
        let prices = to_defined(close);

        let mut columns = ColumnSet::new();
        for &w in &self.config.long_sma_windows {
            let values = sma(close, w);
            if let Some(message) = self.long_horizon_message(&prices, &values, w) {
                report.alerts.push(AlertEvent::new(latest, Severity::Info, message));
            }
            columns.merge(IndicatorResult {
                columns: vec![DerivedColumn::new(IndicatorKey::Sma(w), values)],
            });
        }

        report.long_horizon = Some(LongHorizon { columns });
    }

    fn long_horizon_message(&self, prices: &[Option<f64>], sma: &[Option<f64>], w: Window) -> Option<String> {
        let ticker = &self.config.ticker;
        let insufficient = || format!("INFO: not enough history for the {w}-day SMA.");

        match self.config.dual_sma_mode {
            DualSmaMode::Crossing => match crossover(prices, sma) {
                Detection::Detected(Cross::Above) => Some(format!(
                    "ALERT: {ticker} price just crossed ABOVE the {w}-day SMA (bullish)."
                )),
                Detection::Detected(Cross::Below) => Some(format!(
                    "ALERT: {ticker} price just crossed BELOW the {w}-day SMA (bearish)."
                )),
                Detection::Quiet => None,
                Detection::InsufficientData => Some(insufficient()),
            },
            DualSmaMode::Status => match position(prices, sma) {
                Detection::Detected(Position::Above) => {
                    Some(format!("INFO: {ticker} price is ABOVE the {w}-day SMA."))
                },
                Detection::Detected(Position::Below) => {
                    Some(format!("INFO: {ticker} price is BELOW the {w}-day SMA."))
                },
                Detection::Detected(Position::Equal) => {
                    Some(format!("INFO: {ticker} price is EQUAL to the {w}-day SMA."))
                },
                Detection::Quiet | Detection::InsufficientData => Some(insufficient()),
            },
        }
    }
}

// ============================================================
// PARALLEL EVALUATION
// ============================================================

/// Failed request in a parallel batch
#[derive(Debug, Clone)]
pub struct EvaluationError {
    pub ticker: String,
    pub error: AlertError,
}

/// Evaluate independent `(engine, display series, long series)` requests in parallel.
///
/// Each request works on its own series; nothing is shared between them.
pub fn evaluate_parallel<'a, I>(requests: I) -> (Vec<AlertReport>, Vec<EvaluationError>)
where
    I: IntoParallelIterator<Item = (&'a AlertEngine, &'a TimeSeries, &'a TimeSeries)>,
{
    let results: Vec<_> = requests
        .into_par_iter()
        .map(|(engine, shown, long)| {
            engine.evaluate(shown, long).map_err(|error| EvaluationError {
                ticker: engine.config().ticker.clone(),
                error,
            })
        })
        .collect();

    let mut reports = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => reports.push(r),
            Err(e) => errors.push(e),
        }
    }

    (reports, errors)
}

// ============================================================
// TESTS
// ============================================================
