use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{Metric, Record};

/// Immutable, column-oriented view of the raw feed, kept in source order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    dates: Vec<NaiveDate>,
    states: Vec<String>,
    counties: Vec<String>,
    cases: Vec<f64>,
    deaths: Vec<f64>,
}

#[derive(serde::Deserialize)]
struct CsvRow {
    date: NaiveDate,
    county: String,
    state: String,
    #[serde(default)]
    cases: String,
    #[serde(default)]
    deaths: String,
}

impl RecordStore {
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut store = Self::default();
        for record in records {
            store.push(record);
        }
        store
    }

    /// Reads the NYT county layout; columns other than date, county, state,
    /// cases and deaths are ignored.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut store = Self::default();

        for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = result.with_context(|| format!("malformed record at row {}", line + 1))?;
            store.push(Record {
                date: row.date,
                state: row.state,
                county: row.county,
                cases: normalize_count(&row.cases),
                deaths: normalize_count(&row.deaths),
            });
        }

        Ok(store)
    }

    pub fn load_csv(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        let store = Self::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("failed to parse dataset {}", path.display()))?;
        tracing::info!(records = store.len(), path = %path.display(), "dataset loaded");
        Ok(store)
    }

    fn push(&mut self, record: Record) {
        self.dates.push(record.date);
        self.states.push(record.state);
        self.counties.push(record.county);
        self.cases.push(record.cases);
        self.deaths.push(record.deaths);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn counties(&self) -> &[String] {
        &self.counties
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Cases => &self.cases,
            Metric::Deaths => &self.deaths,
        }
    }

    pub fn distinct_states(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.states.iter().map(String::as_str).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Every (state, county) pair present, sorted by state then county.
    pub fn regions(&self) -> Vec<(String, String)> {
        let set: BTreeSet<(&str, &str)> = self
            .states
            .iter()
            .zip(self.counties.iter())
            .map(|(state, county)| (state.as_str(), county.as_str()))
            .collect();
        set.into_iter()
            .map(|(state, county)| (state.to_string(), county.to_string()))
            .collect()
    }
}

/// Missing, non-numeric, negative or non-finite counts become zero.
pub fn normalize_count(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
date,county,state,fips,cases,deaths
2020-01-21,Snohomish,Washington,53061,1,0
2020-01-22,Snohomish,Washington,53061,1,
2020-01-24,Cook,Illinois,17031,1,0
2020-01-24,Unknown,Illinois,,n/a,0
";

    #[test]
    fn parses_nyt_layout_and_ignores_fips() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.dates()[2],
            NaiveDate::from_ymd_opt(2020, 1, 24).unwrap()
        );
        assert_eq!(store.states()[0], "Washington");
        assert_eq!(store.counties()[2], "Cook");
        assert_eq!(store.values(Metric::Cases), &[1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_values_become_zero() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.values(Metric::Deaths)[1], 0.0);
        assert_eq!(store.values(Metric::Cases)[3], 0.0);
        assert_eq!(normalize_count("-4"), 0.0);
        assert_eq!(normalize_count("NaN"), 0.0);
        assert_eq!(normalize_count(" 12 "), 12.0);
    }

    #[test]
    fn rejects_unparseable_dates() {
        let bad = "date,county,state,cases,deaths\n01/02/2020,Cook,Illinois,1,0\n";
        assert!(RecordStore::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn option_lists_are_sorted_and_distinct() {
        let store = RecordStore::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.distinct_states(), vec!["Illinois", "Washington"]);
        assert_eq!(
            store.regions(),
            vec![
                ("Illinois".to_string(), "Cook".to_string()),
                ("Illinois".to_string(), "Unknown".to_string()),
                ("Washington".to_string(), "Snohomish".to_string()),
            ]
        );
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = RecordStore::load_csv(file.path()).unwrap();
        assert_eq!(store.len(), 4);
        assert!(!store.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordStore::load_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open dataset"));
    }
}
