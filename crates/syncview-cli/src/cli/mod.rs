//! CLI for the syncview data-synchronization layer.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use syncview_core::config;

use args::{FilterArgs, WatchArgs};
use commands::{
    run_cache_clear, run_cache_show, run_completions, run_config, run_filter, run_watch,
};

/// Top-level CLI for syncview.
#[derive(Debug, Parser)]
#[command(name = "syncview")]
#[command(about = "syncview: keep remote record sets fresh, cached and filterable", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Keep a file or http(s) source synchronized and report state changes.
    Watch(WatchArgs),

    /// Filter, sort and page a JSON record file.
    Filter {
        /// JSON file: an array of records or {"items": [...], "totalCount": n}.
        input: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Inspect or clear cached results.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show the config file path and effective settings.
    Config,

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Print the cached entry for a key.
    Show {
        /// Cache key (as passed to `watch --cache-key`).
        key: String,
    },
    /// Remove the cached entry for a key.
    Clear {
        /// Cache key.
        key: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Watch(args) => run_watch(&cfg, args).await?,
            CliCommand::Filter { input, filter } => run_filter(&input, &filter).await?,
            CliCommand::Cache { action } => match action {
                CacheAction::Show { key } => run_cache_show(&cfg, &key).await?,
                CacheAction::Clear { key } => run_cache_clear(&cfg, &key).await?,
            },
            CliCommand::Config => run_config(&cfg).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
