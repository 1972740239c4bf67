/// Configuration for the history manager: defaults, JSON files and env overrides.
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept before the oldest one is evicted.
pub const DEFAULT_MAX_SIZE: usize = 10_000;

/// Environment variable overriding `max_size` in [`HistoryConfig::from_env`].
pub const MAX_SIZE_ENV: &str = "UNDO_HISTORY_MAX_SIZE";

/// Configuration for a `HistoryManager`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max entries in the history stack. Always at least 1.
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl HistoryConfig {
    /// Config with the given capacity, clamped to at least one entry.
    pub fn with_max_size(max_size: usize) -> Self {
        let mut config = Self { max_size };
        config.sanitize();
        config
    }

    /// Clamps values into their valid ranges.
    pub fn sanitize(&mut self) {
        if self.max_size == 0 {
            tracing::warn!("max_size of 0 is not allowed, using 1");
            self.max_size = 1;
        }
    }

    /// Defaults, with `UNDO_HISTORY_MAX_SIZE` applied when it holds a
    /// positive integer.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(MAX_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_size = n,
                _ => tracing::warn!("Ignoring invalid {MAX_SIZE_ENV} value: {raw:?}"),
            }
        }
        config
    }

    /// Loads config from a JSON file.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read history config at {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<HistoryConfig>(&contents) {
            Ok(mut config) => {
                config.sanitize();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse history config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_size, 10_000);
    }

    #[test]
    fn test_zero_max_size_is_clamped() {
        assert_eq!(HistoryConfig::with_max_size(0).max_size, 1);
        assert_eq!(HistoryConfig::with_max_size(25).max_size, 25);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: HistoryConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, HistoryConfig::default());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = HistoryConfig::load(&dir.path().join("missing.json"));
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_load_broken_json_returns_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert_eq!(HistoryConfig::load(&path), HistoryConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        HistoryConfig::with_max_size(42).save(&path).expect("save");
        assert_eq!(HistoryConfig::load(&path).max_size, 42);
    }

    #[test]
    fn test_load_sanitizes_zero() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"max_size": 0}"#).expect("write");
        assert_eq!(HistoryConfig::load(&path).max_size, 1);
    }

    #[test]
    fn test_from_env() {
        // Save and restore env var
        let original = std::env::var(MAX_SIZE_ENV).ok();

        std::env::set_var(MAX_SIZE_ENV, "128");
        assert_eq!(HistoryConfig::from_env().max_size, 128);

        std::env::set_var(MAX_SIZE_ENV, "0");
        assert_eq!(HistoryConfig::from_env().max_size, DEFAULT_MAX_SIZE);

        std::env::set_var(MAX_SIZE_ENV, "lots");
        assert_eq!(HistoryConfig::from_env().max_size, DEFAULT_MAX_SIZE);

        // Restore
        match original {
            Some(val) => std::env::set_var(MAX_SIZE_ENV, val),
            None => std::env::remove_var(MAX_SIZE_ENV),
        }
    }
}
