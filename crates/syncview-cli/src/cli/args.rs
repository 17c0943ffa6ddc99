//! Argument groups shared by several subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use syncview_core::filter::{FilterExpression, FilterOperator, FilterState, SortOrder};

/// Filter, search, sort and paging flags.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// JSON file holding a full filter state (expressions, groups, sort, paging).
    #[arg(long = "state", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Free-text search term.
    #[arg(long)]
    pub search: Option<String>,

    /// Field searched by --search (repeatable; default: every field).
    #[arg(long = "search-field", value_name = "FIELD")]
    pub search_fields: Vec<String>,

    /// Filter expression FIELD:OPERATOR[:VALUE], e.g. score:greater:5 (repeatable, AND-combined).
    #[arg(long = "where", value_name = "EXPR")]
    pub filters: Vec<String>,

    /// Sort by this field.
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    /// Records per page (0 = all on one page).
    #[arg(long)]
    pub page_size: Option<usize>,

    /// 1-based page number.
    #[arg(long)]
    pub page: Option<usize>,
}

/// Parse `FIELD:OPERATOR[:VALUE]`. VALUE is read as JSON when it parses,
/// otherwise as a plain string.
pub fn parse_expression(text: &str) -> Result<FilterExpression> {
    let mut parts = text.splitn(3, ':');
    let field = parts.next().unwrap_or_default().trim();
    let op = parts.next().map(str::trim).unwrap_or_default();
    if field.is_empty() || op.is_empty() {
        anyhow::bail!("filter must look like FIELD:OPERATOR[:VALUE], got {text:?}");
    }
    let operator: FilterOperator = serde_json::from_value(Value::String(op.to_string()))
        .with_context(|| format!("unknown filter operator {op:?}"))?;
    let value = match parts.next() {
        None => Value::Null,
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    };
    Ok(FilterExpression::new(field, operator, value))
}

impl FilterArgs {
    /// Build the filter state: the `--state` file first, flags layered on top.
    pub fn to_state(&self) -> Result<FilterState> {
        let mut state = match &self.state_file {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read filter state {}", path.display()))?;
                serde_json::from_str(&data)
                    .with_context(|| format!("invalid filter state in {}", path.display()))?
            }
            None => FilterState::default(),
        };
        if let Some(search) = &self.search {
            state.search = search.clone();
        }
        for text in &self.filters {
            state.expressions.push(parse_expression(text)?);
        }
        if let Some(field) = &self.sort_by {
            state.sort_by = Some(field.clone());
        }
        if self.desc {
            state.sort_order = SortOrder::Desc;
        }
        if let Some(size) = self.page_size {
            state.page_size = size;
        }
        if let Some(page) = self.page {
            state.current_page = page;
        }
        Ok(state)
    }
}

/// Flags of `syncview watch`.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// JSON file path or http(s) URL to synchronize.
    pub source: String,

    /// Refresh interval in milliseconds (overrides config).
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Enable the periodic auto-refresh timer.
    #[arg(long)]
    pub auto: bool,

    /// Attempts per fetch before giving up (overrides config).
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Persist results under this cache key and seed from it on start.
    #[arg(long, value_name = "KEY")]
    pub cache_key: Option<String>,

    /// Extra request header for http sources, "Name: value" (repeatable).
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Fetch once, print the (filtered) records as JSON and exit.
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}
