use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No cache existed; it was downloaded.
    Created,
    /// An update was requested and the cache was older than the max age.
    Refreshed,
    /// An update was requested but the cache is still fresh.
    UpToDate,
    /// Cache reused without checking its age.
    Reused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Download(CacheStatus),
    Keep(CacheStatus),
}

/// True when the file is strictly older than `max_age`. A modification time
/// in the future counts as fresh.
pub fn is_stale(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    now.duration_since(modified)
        .map(|age| age > max_age)
        .unwrap_or(false)
}

fn plan(modified: Option<SystemTime>, now: SystemTime, update: bool, max_age: Duration) -> Plan {
    match modified {
        None => Plan::Download(CacheStatus::Created),
        Some(modified) if update && is_stale(modified, now, max_age) => {
            Plan::Download(CacheStatus::Refreshed)
        }
        Some(_) if update => Plan::Keep(CacheStatus::UpToDate),
        Some(_) => Plan::Keep(CacheStatus::Reused),
    }
}

fn modified_time(path: &Path) -> anyhow::Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.modified().unwrap_or(SystemTime::UNIX_EPOCH))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to stat {}", path.display())),
    }
}

/// Makes sure the cached dataset exists, downloading it when missing or, if
/// `update` is set, when it has gone stale.
pub async fn ensure_cache(config: &Config, update: bool) -> anyhow::Result<CacheStatus> {
    let path = config.cache_file.as_path();
    let modified = modified_time(path)?;

    match plan(modified, SystemTime::now(), update, config.max_cache_age) {
        Plan::Download(status) => {
            info!(path = %path.display(), url = %config.data_url, ?status, "downloading dataset");
            let bytes = download(&config.data_url, path).await?;
            info!(bytes, "dataset cached");
            Ok(status)
        }
        Plan::Keep(status) => {
            match status {
                CacheStatus::UpToDate => info!(path = %path.display(), "data already up to date"),
                _ => info!(path = %path.display(), "using cached data"),
            }
            Ok(status)
        }
    }
}

/// Writes the feed into a sibling temp file, then renames it over the cache
/// so an interrupted transfer never leaves a truncated dataset behind.
pub async fn download(url: &str, path: &Path) -> anyhow::Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("cache directory {} is not writable", parent.display()))?;
    }

    let body = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("server rejected request for {url}"))?
        .bytes()
        .await
        .context("failed to read response body")?;

    let partial = path.with_extension("part");
    tokio::fs::write(&partial, &body)
        .await
        .with_context(|| format!("failed to write {}", partial.display()))?;
    tokio::fs::rename(&partial, path)
        .await
        .with_context(|| format!("failed to move download into {}", path.display()))?;

    Ok(body.len() as u64)
}
