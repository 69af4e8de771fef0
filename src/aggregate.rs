use chrono::NaiveDate;

use crate::models::{Metric, SeriesPoint};
use crate::store::RecordStore;

/// One point per distinct date, with one value column per requested metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregated {
    pub dates: Vec<NaiveDate>,
    columns: Vec<(Metric, Vec<f64>)>,
}

impl Aggregated {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn values(&self, metric: Metric) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, values)| values.as_slice())
    }

    pub fn points(&self, metric: Metric) -> Vec<SeriesPoint> {
        self.values(metric)
            .map(|values| {
                self.dates
                    .iter()
                    .zip(values)
                    .map(|(&date, &value)| SeriesPoint { date, value })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Collapses date-ordered `indices` into one bucket per date in a single pass.
///
/// A record dated after the last bucket opens a new bucket; any other record
/// is summed into the last bucket. Indices must already be date-ascending;
/// nothing is sorted here.
pub fn aggregate(store: &RecordStore, indices: &[usize], metrics: &[Metric]) -> Aggregated {
    let dates = store.dates();
    let sources: Vec<&[f64]> = metrics.iter().map(|&m| store.values(m)).collect();

    let mut out_dates: Vec<NaiveDate> = Vec::new();
    let mut out_values: Vec<Vec<f64>> = vec![Vec::new(); metrics.len()];
    let mut current: Option<NaiveDate> = None;

    for &i in indices {
        let date = dates[i];
        if current.map_or(true, |last| date > last) {
            out_dates.push(date);
            for (column, source) in out_values.iter_mut().zip(&sources) {
                column.push(source[i]);
            }
            current = Some(date);
        } else {
            for (column, source) in out_values.iter_mut().zip(&sources) {
                if let Some(last) = column.last_mut() {
                    *last += source[i];
                }
            }
        }
    }

    Aggregated {
        dates: out_dates,
        columns: metrics.iter().copied().zip(out_values).collect(),
    }
}
