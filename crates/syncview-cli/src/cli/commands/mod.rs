//! CLI command handlers, one file per command.

mod cache;
mod completions;
mod config;
mod filter;
mod watch;

pub use cache::{run_cache_clear, run_cache_show};
pub use completions::run_completions;
pub use config::run_config;
pub use filter::run_filter;
pub use watch::run_watch;
