//! Disk-backed TTL cache for analysis API responses.
//!
//! Preview payloads are expensive for the scraper to assemble, so successful
//! bodies are kept for a fixed window and re-served without touching the
//! network. The cache file lives under the XDG cache directory and survives
//! restarts; a version bump invalidates it wholesale.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "odds_terminal";
const CACHE_FILE: &str = "preview_cache.json";

static CACHE: Mutex<Option<PreviewCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PreviewCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: u64,
}

pub fn fetch_json_cached(client: &Client, url: &str, ttl: Duration) -> Result<String> {
    let now = system_time_to_secs(SystemTime::now()).unwrap_or_default();

    let fresh = {
        let mut guard = CACHE.lock().expect("preview cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache
            .entries
            .get(url)
            .filter(|entry| now.saturating_sub(entry.fetched_at) < ttl.as_secs())
            .map(|entry| entry.body.clone())
    };
    if let Some(body) = fresh {
        return Ok(body);
    }

    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }

    refresh_cache_entry(
        url,
        CacheEntry {
            body: body.clone(),
            fetched_at: now,
        },
    );
    Ok(body)
}

fn refresh_cache_entry(key: &str, entry: CacheEntry) {
    let mut guard = CACHE.lock().expect("preview cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> PreviewCacheFile {
    let Some(path) = cache_path() else {
        return PreviewCacheFile::default();
    };
    let Some(raw) = fs::read_to_string(path).ok() else {
        return PreviewCacheFile::default();
    };
    let cache = serde_json::from_str::<PreviewCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return PreviewCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &PreviewCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize preview cache")?;
    fs::write(&tmp, json).context("write preview cache")?;
    fs::rename(&tmp, &path).context("swap preview cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
