//! `syncview cache show|clear` – inspect the file-backed result cache.

use anyhow::Result;
use serde_json::{json, Value};
use std::time::Duration;
use syncview_core::cache::{is_fresh, now_ms, CacheEntry, CacheStore};
use syncview_core::config::SyncviewConfig;

pub async fn run_cache_show(cfg: &SyncviewConfig, key: &str) -> Result<()> {
    let cache_cfg = cfg.cache_or_default();
    let store = CacheStore::from_config(&cache_cfg)?;
    let Some(entry) = store.read::<Value>(key) else {
        println!("No cache entry for {key:?}.");
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(&summary(&entry, cache_cfg.expiry_ms))?);
    Ok(())
}

fn summary(entry: &CacheEntry<Value>, expiry_ms: u64) -> Value {
    json!({
        "timestamp": entry.timestamp,
        "ageMs": entry.age_at(now_ms()).as_millis() as u64,
        "fresh": is_fresh(entry, Duration::from_millis(expiry_ms)),
        "totalCount": entry.payload.total_count,
        "items": entry.payload.items,
    })
}

pub async fn run_cache_clear(cfg: &SyncviewConfig, key: &str) -> Result<()> {
    let store = CacheStore::from_config(&cfg.cache_or_default())?;
    store.remove(key);
    println!("Cleared cache entry {key:?}.");
    Ok(())
}
