//! Property tests for indicator and detector invariants.

use proptest::prelude::*;
use yatia::indicators::{bollinger, ema, macd, rsi, sma};
use yatia::prelude::*;

fn closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1_000.0, 0..120)
}

fn window() -> impl Strategy<Value = Window> {
    (1usize..40).prop_map(|n| Window::new(n).unwrap())
}

fn optional(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

proptest! {
    #[test]
    fn prop_sma_warmup_then_mean(close in closes(), w in window()) {
        let out = sma(&close, w);
        prop_assert_eq!(out.len(), close.len());
        let n = w.get();
        for (i, v) in out.iter().enumerate() {
            if i + 1 < n {
                prop_assert!(v.is_none());
            } else {
                let slice = &close[i + 1 - n..=i];
                let expected = slice.iter().sum::<f64>() / n as f64;
                prop_assert!((v.unwrap() - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }

    #[test]
    fn prop_ema_starts_at_first_close(close in closes(), w in window()) {
        let out = ema(&close, w);
        prop_assert_eq!(out.len(), close.len());
        if let Some(&first) = close.first() {
            prop_assert_eq!(out[0], Some(first));
        }
        prop_assert!(out.iter().all(Option::is_some));
    }

    #[test]
    fn prop_macd_histogram_is_difference(close in closes()) {
        let out = macd(&close, MacdParams::default());
        for i in 0..close.len() {
            let (l, s, h) = (out.line[i].unwrap(), out.signal[i].unwrap(), out.histogram[i].unwrap());
            prop_assert_eq!(h, l - s);
        }
    }

    #[test]
    fn prop_bollinger_symmetric(close in closes(), w in (2usize..40).prop_map(|n| Window::new(n).unwrap())) {
        let out = bollinger(&close, w, 2.0);
        for i in 0..close.len() {
            match (out.upper[i], out.middle[i], out.lower[i]) {
                (Some(u), Some(m), Some(l)) => {
                    prop_assert!(l <= m && m <= u);
                    prop_assert!(((u - m) - (m - l)).abs() <= 1e-9 * u.abs().max(1.0));
                }
                (None, _, None) => prop_assert!(i + 1 < w.get()),
                _ => prop_assert!(false, "bands defined on one side only"),
            }
        }
    }

    #[test]
    fn prop_rsi_bounded(close in closes(), w in window()) {
        for v in rsi(&close, w).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn prop_crossover_antisymmetric(a in closes(), b in closes()) {
        let n = a.len().min(b.len());
        let (a, b) = (optional(&a[..n]), optional(&b[..n]));
        let flipped = match crossover(&a, &b) {
            Detection::Detected(Cross::Above) => Detection::Detected(Cross::Below),
            Detection::Detected(Cross::Below) => Detection::Detected(Cross::Above),
            other => other,
        };
        prop_assert_eq!(crossover(&b, &a), flipped);
    }

    #[test]
    fn prop_indicators_idempotent(close in closes(), w in window()) {
        for indicator in [
            BuiltinIndicator::Sma(yatia::indicators::SmaIndicator::new(w)),
            BuiltinIndicator::Ema(yatia::indicators::EmaIndicator::new(w)),
            BuiltinIndicator::Rsi(yatia::indicators::RsiIndicator::new(w)),
        ] {
            prop_assert_eq!(indicator.compute(&close), indicator.compute(&close));
        }
    }
}
