use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv";
pub const DEFAULT_CACHE_FILE: &str = "covid_data.csv";
pub const CACHE_ENV: &str = "COVID_PANELS_CACHE";
pub const URL_ENV: &str = "COVID_PANELS_URL";

/// The feed is published once a day.
pub const MAX_CACHE_AGE: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_file: PathBuf,
    pub data_url: String,
    pub max_cache_age: Duration,
}

impl Config {
    /// Command-line values win, then the environment, then defaults.
    pub fn resolve(cache_file: Option<PathBuf>, data_url: Option<String>) -> Self {
        Self::resolve_with(cache_file, data_url, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        cache_file: Option<PathBuf>,
        data_url: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let cache_file = cache_file
            .or_else(|| env(CACHE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
        let data_url = data_url
            .or_else(|| env(URL_ENV))
            .unwrap_or_else(|| DEFAULT_DATA_URL.to_string());

        Self {
            cache_file,
            data_url,
            max_cache_age: MAX_CACHE_AGE,
        }
    }
}
