use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Refresh scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Period of the auto-refresh timer and the staleness threshold, in milliseconds.
    pub interval_ms: u64,
    /// Whether the periodic timer runs at all.
    pub auto_refresh: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            auto_refresh: false,
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per logical fetch before the failure becomes terminal.
    pub max_retries: u32,
    /// Backoff base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Backoff growth factor.
    pub factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            factor: 2.0,
        }
    }
}

/// Result cache parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age after which a cached entry is no longer considered fresh, in milliseconds.
    pub expiry_ms: u64,
    /// Cache directory; defaults to `$XDG_CACHE_HOME/syncview`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_ms: 300_000,
            dir: None,
        }
    }
}

/// Global configuration loaded from `~/.config/syncview/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncviewConfig {
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional cache settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

impl SyncviewConfig {
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn cache_or_default(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }

    /// Effective configuration (optional sections filled with defaults) as TOML.
    pub fn effective_toml(&self) -> Result<String> {
        let effective = SyncviewConfig {
            refresh: self.refresh.clone(),
            retry: Some(self.retry_or_default()),
            cache: Some(self.cache_or_default()),
        };
        Ok(toml::to_string_pretty(&effective)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("syncview")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncviewConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncviewConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SyncviewConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SyncviewConfig::default();
        assert_eq!(cfg.refresh.interval_ms, 30_000);
        assert!(!cfg.refresh.auto_refresh);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_or_default().max_retries, 3);
        assert_eq!(cfg.retry_or_default().base_delay_ms, 2_000);
        assert_eq!(cfg.cache_or_default().expiry_ms, 300_000);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SyncviewConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SyncviewConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn effective_toml_fills_optional_sections() {
        let out = SyncviewConfig::default().effective_toml().unwrap();
        assert!(out.contains("[retry]"));
        assert!(out.contains("max_retries = 3"));
        assert!(out.contains("expiry_ms = 300000"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: SyncviewConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, SyncviewConfig::default());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            [refresh]
            interval_ms = 5000
            auto_refresh = true

            [retry]
            max_retries = 5
            base_delay_ms = 250
            max_delay_ms = 4000
            factor = 1.5

            [cache]
            expiry_ms = 60000
            dir = "/tmp/syncview-cache"
        "#;
        let cfg: SyncviewConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.refresh.interval_ms, 5000);
        assert!(cfg.refresh.auto_refresh);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.base_delay_ms, 250);
        assert!((retry.factor - 1.5).abs() < 1e-9);
        let cache = cfg.cache.as_ref().unwrap();
        assert_eq!(cache.expiry_ms, 60_000);
        assert_eq!(
            cache.dir.as_deref(),
            Some(std::path::Path::new("/tmp/syncview-cache"))
        );
    }
}
