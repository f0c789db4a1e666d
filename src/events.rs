//! Event detector
//!
//! Classifies the transition between the two most recent bars of a pair of
//! aligned series. Every check answers with a [`Detection`]; none of them
//! fails, because the engine may probe a freshly-fetched series that is still
//! too short to say anything.

use crate::config::RsiThresholds;

/// Outcome of a detector probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection<T> {
    /// The probe fired and carries its reading
    Detected(T),
    /// Enough data, nothing happened
    Quiet,
    /// Fewer than two bars, or an undefined value where one was needed
    InsufficientData,
}

impl<T> Detection<T> {
    #[inline]
    pub fn detected(self) -> Option<T> {
        match self {
            Detection::Detected(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Detection::InsufficientData)
    }
}

/// Direction of a crossover of series `a` through series `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Cross {
    Above,
    Below,
}

/// Static relation of the latest `a` value to the latest `b` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Position {
    Above,
    Below,
    Equal,
}

/// Zone of a bounded oscillator reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

/// Latest oscillator value plus its zone
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LevelReading {
    pub value: f64,
    pub zone: RsiZone,
}

/// Last two aligned values of both series, if all four are defined.
fn last_pair(a: &[Option<f64>], b: &[Option<f64>]) -> Option<((f64, f64), (f64, f64))> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let (ia, ib) = (a.len() - 2, b.len() - 2);
    Some((
        (a[ia]?, b[ib]?),
        (a[ia + 1]?, b[ib + 1]?),
    ))
}

/// Crossover of `a` through `b` between the last two bars.
///
/// `Above` when `prev.a < prev.b` and `latest.a > latest.b`, `Below` for the
/// mirror case. Touching (equality on either bar) is not a cross.
pub fn crossover(a: &[Option<f64>], b: &[Option<f64>]) -> Detection<Cross> {
    let Some(((prev_a, prev_b), (last_a, last_b))) = last_pair(a, b) else {
        return Detection::InsufficientData;
    };

    if prev_a < prev_b && last_a > last_b {
        Detection::Detected(Cross::Above)
    } else if prev_a > prev_b && last_a < last_b {
        Detection::Detected(Cross::Below)
    } else {
        Detection::Quiet
    }
}

/// Where the latest `a` sits relative to the latest `b`.
pub fn position(a: &[Option<f64>], b: &[Option<f64>]) -> Detection<Position> {
    let (Some(Some(x)), Some(Some(y))) = (a.last(), b.last()) else {
        return Detection::InsufficientData;
    };

    let pos = if x > y {
        Position::Above
    } else if x < y {
        Position::Below
    } else {
        Position::Equal
    };
    Detection::Detected(pos)
}

/// Latest oscillator reading and zone. Always fires when the value is defined.
pub fn classify_level(values: &[Option<f64>], thresholds: RsiThresholds) -> Detection<LevelReading> {
    let Some(Some(value)) = values.last().copied() else {
        return Detection::InsufficientData;
    };

    let zone = if value > thresholds.overbought {
        RsiZone::Overbought
    } else if value < thresholds.oversold {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    };
    Detection::Detected(LevelReading { value, zone })
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_cross_above() {
        let price = s(&[9.0, 11.0]);
        let sma = s(&[10.0, 10.0]);
        assert_eq!(crossover(&price, &sma), Detection::Detected(Cross::Above));
    }

    #[test]
    fn test_cross_below() {
        let price = s(&[11.0, 9.0]);
        let sma = s(&[10.0, 10.0]);
        assert_eq!(crossover(&price, &sma), Detection::Detected(Cross::Below));
    }

    #[test]
    fn test_antisymmetric_roles() {
        let price = s(&[9.0, 11.0]);
        let sma = s(&[10.0, 10.0]);
        assert_eq!(crossover(&sma, &price), Detection::Detected(Cross::Below));
    }

    #[test]
    fn test_touch_is_not_cross() {
        assert_eq!(crossover(&s(&[10.0, 11.0]), &s(&[10.0, 10.0])), Detection::Quiet);
        assert_eq!(crossover(&s(&[9.0, 10.0]), &s(&[10.0, 10.0])), Detection::Quiet);
    }

    #[test]
    fn test_staying_above_is_quiet() {
        // closes [10,11,9,12,13] vs SMA(2) [_,10.5,10,10.5,12.5]
        let price = s(&[10.0, 11.0, 9.0, 12.0, 13.0]);
        let sma = vec![None, Some(10.5), Some(10.0), Some(10.5), Some(12.5)];
        assert_eq!(crossover(&price, &sma), Detection::Quiet);
        // truncated at bar 3: prev 9 < 10, latest 12 > 10.5
        assert_eq!(crossover(&price[..4], &sma[..4]), Detection::Detected(Cross::Above));
    }

    #[test]
    fn test_undefined_values_never_fire() {
        let price = s(&[9.0, 11.0]);
        assert_eq!(crossover(&price, &[None, Some(10.0)]), Detection::InsufficientData);
        assert_eq!(crossover(&price, &[Some(10.0), None]), Detection::InsufficientData);
        assert_eq!(
            crossover(&[Some(9.0), None], &s(&[10.0, 10.0])),
            Detection::InsufficientData
        );
    }

    #[test]
    fn test_short_series_is_insufficient() {
        assert_eq!(crossover(&s(&[1.0]), &s(&[2.0])), Detection::InsufficientData);
        assert_eq!(crossover(&[], &[]), Detection::InsufficientData);
        assert!(position(&[], &[]).is_insufficient());
    }

    #[test]
    fn test_position() {
        assert_eq!(position(&s(&[1.0, 5.0]), &s(&[3.0, 4.0])), Detection::Detected(Position::Above));
        assert_eq!(position(&s(&[3.0]), &s(&[4.0])), Detection::Detected(Position::Below));
        assert_eq!(position(&s(&[4.0]), &s(&[4.0])), Detection::Detected(Position::Equal));
        assert_eq!(position(&s(&[4.0]), &[None]), Detection::InsufficientData);
    }

    #[test]
    fn test_classify_level_zones() {
        let t = RsiThresholds::default();
        let read = |v: f64| classify_level(&[Some(v)], t).detected().unwrap();
        assert_eq!(read(75.0).zone, RsiZone::Overbought);
        assert_eq!(read(25.0).zone, RsiZone::Oversold);
        assert_eq!(read(50.0).zone, RsiZone::Neutral);
        assert_eq!(read(70.0).zone, RsiZone::Neutral);
        assert_eq!(read(30.0).zone, RsiZone::Neutral);
        assert_eq!(read(42.5).value, 42.5);
    }

    #[test]
    fn test_classify_level_undefined() {
        let t = RsiThresholds::default();
        assert!(classify_level(&[Some(50.0), None], t).is_insufficient());
        assert!(classify_level(&[], t).is_insufficient());
    }
}
