//! Method and smoothing transforms over an aggregated value series.
//!
//! Differencing always runs before the rolling average. Both rewrite values
//! in place and never change the series length.

use crate::models::{Method, RollingWindow, SeriesPoint};

/// Replaces each value with its day-over-day change. Index 0 keeps its
/// cumulative value since it has no predecessor.
pub fn difference(values: &mut [f64]) {
    for i in (1..values.len()).rev() {
        values[i] -= values[i - 1];
    }
}

/// Backward rolling mean over `width + 1` points ending at each index.
///
/// Indices below `width - 1` are left untouched. At index `width - 1` the
/// window reaches one point before the series start; that point counts as
/// zero so every smoothed value shares the same divisor. Walking from the end
/// keeps every read on values that have not been rewritten yet.
pub fn rolling_average(values: &mut [f64], width: usize) {
    if width <= 1 {
        return;
    }
    let divisor = (width + 1) as f64;
    for i in (width - 1..values.len()).rev() {
        let start = i.saturating_sub(width);
        let sum: f64 = values[start..=i].iter().sum();
        values[i] = sum / divisor;
    }
}

pub fn apply(values: &mut [f64], method: Method, window: RollingWindow) {
    if method == Method::Difference {
        difference(values);
    }
    rolling_average(values, window.get());
}

/// Pure form of [`apply`] over dated points.
pub fn transform(series: &[SeriesPoint], method: Method, window: RollingWindow) -> Vec<SeriesPoint> {
    let mut values: Vec<f64> = series.iter().map(|p| p.value).collect();
    apply(&mut values, method, window);
    series
        .iter()
        .zip(values)
        .map(|(point, value)| SeriesPoint {
            date: point.date,
            value,
        })
        .collect()
}
