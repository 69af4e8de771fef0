use crate::models::{CobwebPoint, SeriesPoint};

/// Pairs each value with the previous one; the first point pairs with zero.
pub fn cobweb(series: &[SeriesPoint]) -> Vec<CobwebPoint> {
    let mut previous = 0.0;
    series
        .iter()
        .map(|point| {
            let pair = CobwebPoint {
                x: previous,
                y: point.value,
            };
            previous = point.value;
            pair
        })
        .collect()
}
