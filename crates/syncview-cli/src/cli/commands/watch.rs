//! `syncview watch` – keep a source synchronized and report state changes.
//!
//! Reads single-letter commands from stdin: `r` refresh, `h` hide, `v` show,
//! `p` print the filtered records, `q` quit.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use syncview_core::cache::CacheStore;
use syncview_core::config::SyncviewConfig;
use syncview_core::filter::{FilterEngine, FilterState};
use syncview_core::scheduler::{SyncOptions, SyncPhase, SyncScheduler, SyncState, Visibility};
use syncview_core::source::Source;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::args::WatchArgs;

fn options_for(cfg: &SyncviewConfig, args: &WatchArgs) -> SyncOptions {
    let mut options = SyncOptions::from_config(cfg);
    if let Some(ms) = args.interval_ms {
        options.refresh_interval = Duration::from_millis(ms);
    }
    if args.auto {
        options.enable_auto_refresh = true;
    }
    if let Some(n) = args.max_retries {
        options.max_retries = n;
    }
    options
}

fn open_source(args: &WatchArgs) -> Result<Source<Value>> {
    let source = Source::parse(&args.source)?;
    match source {
        Source::Http(mut http) => {
            for header in &args.headers {
                let (name, value) = header
                    .split_once(':')
                    .with_context(|| format!("header must be \"Name: value\", got {header:?}"))?;
                http = http.header(name, value);
            }
            Ok(Source::Http(http))
        }
        Source::File(_) if !args.headers.is_empty() => {
            anyhow::bail!("--header only applies to http sources")
        }
        file => Ok(file),
    }
}

/// One-line summary of a state snapshot.
pub(crate) fn describe(state: &SyncState<Value>, matching: usize) -> String {
    match state.phase {
        SyncPhase::Idle => "[idle]".to_string(),
        SyncPhase::Fetching => format!("[fetching] {} items shown", state.items.len()),
        SyncPhase::Retrying => format!(
            "[retrying] attempt {} failed, backing off ({} items shown)",
            state.retry_count,
            state.items.len()
        ),
        SyncPhase::Ready => format!(
            "[ready] {} items (total {}), {} match",
            state.items.len(),
            state.total_count,
            matching
        ),
        SyncPhase::Failed => format!(
            "[failed] {} ({} items shown)",
            state.error.as_deref().unwrap_or("unknown error"),
            state.items.len()
        ),
    }
}

fn print_records(engine: &FilterEngine, filter: &FilterState, items: &[Value]) -> Result<()> {
    let page = engine.page(items, filter);
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

pub async fn run_watch(cfg: &SyncviewConfig, args: WatchArgs) -> Result<()> {
    let filter = args.filter.to_state()?;
    let engine = FilterEngine::new(args.filter.search_fields.clone());
    let source = open_source(&args)?;
    let label = source.describe();

    let visibility = Visibility::default();
    let mut builder = SyncScheduler::builder(source)
        .options(options_for(cfg, &args))
        .visibility(&visibility);
    if let Some(key) = &args.cache_key {
        let store = CacheStore::from_config(&cfg.cache_or_default())?;
        builder = builder.cache(store, key.clone());
    }
    let scheduler = builder.start();
    let mut rx = scheduler.subscribe();
    tracing::info!(source = %label, "watching");

    if args.once {
        let state = rx
            .wait_for(|s| matches!(s.phase, SyncPhase::Ready | SyncPhase::Failed))
            .await
            .context("scheduler stopped")?
            .clone();
        scheduler.dispose();
        if state.phase == SyncPhase::Failed {
            let err = state.error.unwrap_or_default();
            anyhow::bail!("fetch from {} failed: {}", label, err);
        }
        return print_records(&engine, &filter, &state.items);
    }

    println!("watching {label} (commands: r refresh, h hide, v show, p print, q quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                let matching = engine.evaluate(&state.items, &filter).len();
                println!("{}", describe(&state, matching));
            }
            line = lines.next_line(), if stdin_open => {
                match line?.as_deref().map(str::trim) {
                    None => stdin_open = false,
                    Some("r") => {
                        scheduler.trigger_refresh();
                    }
                    Some("h") => visibility.set_visible(false),
                    Some("v") => visibility.set_visible(true),
                    Some("p") => {
                        let items = scheduler.state().items;
                        print_records(&engine, &filter, &items)?;
                    }
                    Some("q") => break,
                    Some("") => {}
                    Some(other) => println!("unknown command {other:?}"),
                }
            }
        }
    }
    scheduler.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_failed_keeps_item_count() {
        let state = SyncState {
            items: vec![json!({"a": 1})],
            error: Some("HTTP 503".into()),
            phase: SyncPhase::Failed,
            ..SyncState::default()
        };
        assert_eq!(describe(&state, 1), "[failed] HTTP 503 (1 items shown)");
    }

    #[test]
    fn headers_rejected_for_files() {
        let args = WatchArgs {
            source: "/tmp/scores.json".into(),
            interval_ms: None,
            auto: false,
            max_retries: None,
            cache_key: None,
            headers: vec!["Authorization: Bearer x".into()],
            once: true,
            filter: Default::default(),
        };
        assert!(open_source(&args).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = WatchArgs {
            source: "x.json".into(),
            interval_ms: Some(500),
            auto: true,
            max_retries: Some(7),
            cache_key: None,
            headers: Vec::new(),
            once: false,
            filter: Default::default(),
        };
        let options = options_for(&SyncviewConfig::default(), &args);
        assert_eq!(options.refresh_interval, Duration::from_millis(500));
        assert!(options.enable_auto_refresh);
        assert_eq!(options.max_retries, 7);
        assert_eq!(options.retry_delay, Duration::from_secs(2));
    }
}
