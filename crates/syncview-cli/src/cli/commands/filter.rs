//! `syncview filter` – evaluate a filter state against a JSON record file.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use syncview_core::filter::FilterEngine;
use syncview_core::source::decode_outcome;

use crate::cli::args::FilterArgs;

pub async fn run_filter(input: &Path, args: &FilterArgs) -> Result<()> {
    let state = args.to_state()?;
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let records = decode_outcome::<Value>(&bytes)
        .with_context(|| format!("failed to decode records in {}", input.display()))?;
    let engine = FilterEngine::new(args.search_fields.clone());
    let page = engine.page(&records.items, &state);
    tracing::debug!(
        input = %input.display(),
        total = page.total_items,
        page = page.page,
        "filter command"
    );
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
