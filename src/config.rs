// =============================================================================
// Service Configuration
// =============================================================================
//
// Every tunable lives here. Loaded from a JSON file at startup; every field
// carries `#[serde(default)]` so a partial (or empty) file still loads. A few
// deployment-specific values can be overridden from the environment (after
// `.env` has been read).
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/stocks")
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_period() -> usize {
    500
}

fn default_max_watchlist_symbols() -> usize {
    50
}

// =============================================================================
// RequestLimits
// =============================================================================

/// Per-request caps applied at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    /// Largest look-back accepted for any period parameter.
    pub max_period: usize,
    /// Largest number of symbols in one watchlist request.
    pub max_watchlist_symbols: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_period: default_max_period(),
            max_watchlist_symbols: default_max_watchlist_symbols(),
        }
    }
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of `<SYMBOL>.csv` files loaded into the bar store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// CORS origins. A single `"*"` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_max_period")]
    pub max_period: usize,

    #[serde(default = "default_max_watchlist_symbols")]
    pub max_watchlist_symbols: usize,

    /// Display names keyed by symbol. Symbols without an entry use the
    /// symbol itself.
    #[serde(default)]
    pub symbol_names: HashMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
            allowed_origins: default_allowed_origins(),
            max_period: default_max_period(),
            max_watchlist_symbols: default_max_watchlist_symbols(),
            symbol_names: HashMap::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            data_dir = %config.data_dir.display(),
            bind_addr = %config.bind_addr,
            "service config loaded"
        );

        Ok(config)
    }

    /// Apply `STOCKVIEW_BIND_ADDR`, `STOCKVIEW_DATA_DIR` and
    /// `STOCKVIEW_ALLOWED_ORIGINS` (comma-separated) from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("STOCKVIEW_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(dir) = lookup("STOCKVIEW_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(origins) = lookup("STOCKVIEW_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !origins.is_empty() {
                self.allowed_origins = origins;
            }
        }
    }

    /// Same as `apply_overrides` against the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            max_period: self.max_period,
            max_watchlist_symbols: self.max_watchlist_symbols,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.data_dir, PathBuf::from("data/stocks"));
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(cfg.limits(), RequestLimits::default());
        assert!(cfg.symbol_names.is_empty());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.max_period, 500);
        assert_eq!(cfg.max_watchlist_symbols, 50);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "max_period": 100, "symbol_names": { "AAPL": "Apple Inc." } }"#;
        let cfg: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.max_period, 100);
        assert_eq!(cfg.symbol_names["AAPL"], "Apple Inc.");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
    }

    #[test]
    fn overrides_replace_values() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_overrides(|key| match key {
            "STOCKVIEW_BIND_ADDR" => Some("127.0.0.1:9000".into()),
            "STOCKVIEW_ALLOWED_ORIGINS" => Some("http://a.test, http://b.test,".into()),
            _ => None,
        });
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(cfg.data_dir, PathBuf::from("data/stocks"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_overrides(|_| Some("  ".into()));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cfg.json");
        std::fs::write(&path, r#"{ "data_dir": "/srv/bars" }"#).unwrap();
        let cfg = ServiceConfig::load(&path).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/bars"));
        assert!(ServiceConfig::load(tmp.path().join("missing.json")).is_err());
    }
}
