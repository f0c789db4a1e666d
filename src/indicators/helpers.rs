//! Rolling-window and smoothing primitives shared by the indicators.
//!
//! All helpers work on `Option<f64>` so an undefined input is explicit. None
//! of them relies on NaN propagation.

use crate::{series::defined, Window};

/// Map raw prices to explicit optional values (non-finite -> `None`).
#[inline]
pub fn to_defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| defined(v)).collect()
}

/// Apply `f` to every full window ending at each index.
///
/// Output is `None` for `i < w - 1` and for any window holding an undefined
/// value; otherwise it is whatever `f` returns for the window's values.
pub fn rolling_apply<F>(values: &[Option<f64>], window: Window, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let w = window.get();
    let mut buf = Vec::with_capacity(w);
    (0..values.len())
        .map(|i| {
            if i + 1 < w {
                return None;
            }
            buf.clear();
            for v in &values[i + 1 - w..=i] {
                buf.push((*v)?);
            }
            f(&buf)
        })
        .collect()
}

/// Arithmetic mean. Callers pass non-empty slices.
#[inline]
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (Bessel's correction). `None` for fewer than 2 values.
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    Some((ss / (xs.len() - 1) as f64).sqrt())
}

/// Recursive exponential smoothing, `alpha = 2 / (w + 1)`.
///
/// Seeded with the first defined value. An undefined value after the seed
/// carries the previous result forward.
pub fn ema_over(values: &[Option<f64>], window: Window) -> Vec<Option<f64>> {
    let alpha = 2.0 / (window.get() as f64 + 1.0);
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            prev = match (prev, *v) {
                (None, seed) => seed,
                (Some(p), Some(x)) => Some(alpha * x + (1.0 - alpha) * p),
                (Some(p), None) => Some(p),
            };
            prev
        })
        .collect()
}

/// Element-wise `a - b`, defined only where both sides are.
pub fn difference(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| Some((*x)? - (*y)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: usize) -> Window {
        Window::new(n).unwrap()
    }

    #[test]
    fn test_rolling_apply_skips_incomplete_windows() {
        let values = to_defined(&[1.0, 2.0, 3.0, 4.0]);
        let out = rolling_apply(&values, w(3), |xs| Some(mean(xs)));
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_rolling_apply_undefined_poisons_window() {
        let values = to_defined(&[1.0, f64::NAN, 3.0, 4.0, 5.0]);
        let out = rolling_apply(&values, w(2), |xs| Some(mean(xs)));
        assert_eq!(out, vec![None, None, None, Some(3.5), Some(4.5)]);
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[5.0]), None);
        let s = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn test_ema_over_seed_and_carry() {
        let values = vec![None, Some(10.0), None, Some(13.0)];
        let out = ema_over(&values, w(2));
        // alpha = 2/3
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(10.0));
        assert_eq!(out[2], Some(10.0));
        assert!((out[3].unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_difference_requires_both_sides() {
        let a = vec![Some(3.0), None, Some(1.0)];
        let b = vec![Some(1.0), Some(1.0), None];
        assert_eq!(difference(&a, &b), vec![Some(2.0), None, None]);
    }
}
