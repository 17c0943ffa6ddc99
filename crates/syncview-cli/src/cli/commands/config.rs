//! `syncview config` – show config location and effective values.

use anyhow::Result;
use syncview_core::config::{self, SyncviewConfig};

pub async fn run_config(cfg: &SyncviewConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.effective_toml()?);
    Ok(())
}
