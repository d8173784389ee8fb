//! Conditional-GET cache for catalog-sized JSON payloads.
//!
//! The song catalog barely changes between play sessions, so responses are
//! revalidated with ETag / Last-Modified instead of refetched in full. A 304
//! serves the body straight from disk.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "score_terminal";
const CACHE_FILE: &str = "http_cache.json";

static CACHE: Mutex<Option<BodyCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct BodyCacheFile {
    version: u32,
    entries: HashMap<String, CachedBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedBody {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

impl CachedBody {
    fn validators(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(etag) = self.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = self.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
        req
    }
}

/// GET `url`, revalidating against the cached body when one exists.
pub fn fetch_json_cached(client: &Client, url: &str, token: Option<&str>) -> Result<String> {
    let cached = lookup(url);

    let mut req = client.get(url);
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, token);
    }
    if let Some(entry) = cached.as_ref() {
        req = entry.validators(req);
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let headers = resp.headers().clone();

    if status == StatusCode::NOT_MODIFIED {
        let entry = cached.context("received 304 without cache body")?;
        let body = entry.body.clone();
        store(url, entry);
        return Ok(body);
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }

    let header_string = |name: reqwest::header::HeaderName| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    };
    store(
        url,
        CachedBody {
            body: body.clone(),
            etag: header_string(ETAG),
            last_modified: header_string(LAST_MODIFIED),
            fetched_at: unix_now(),
        },
    );
    Ok(body)
}

fn lookup(url: &str) -> Option<CachedBody> {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    guard.get_or_insert_with(load_cache_file).entries.get(url).cloned()
}

fn store(url: &str, entry: CachedBody) {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(url.to_string(), entry);
    // Persisting is best-effort; the in-memory copy stays authoritative.
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> BodyCacheFile {
    let loaded = cache_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|raw| serde_json::from_str::<BodyCacheFile>(&raw).ok())
        .unwrap_or_default();
    if loaded.version != CACHE_VERSION {
        return BodyCacheFile::default();
    }
    loaded
}

fn save_cache_file(cache: &BodyCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
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
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
