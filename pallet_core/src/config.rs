//! # Application Configuration
//!
//! Settings are stored as human-readable JSON. A missing file means
//! defaults, so a fresh install runs without any setup. Saves are atomic:
//! write to `.tmp`, sync, then rename over the target.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pallet_core::config::AppConfig;
//! use std::path::Path;
//!
//! let mut config = AppConfig::load(Path::new("palletmap.json"))?;
//! config.poll_interval_ms = 250;
//! config.save(Path::new("palletmap.json"))?;
//! # Ok::<(), pallet_core::errors::StoreError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{StoreError, StoreResult};
use crate::sequencer::DESTINATION_SLOTS;

/// Runtime settings shared by the GUI and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the three SQLite files
    pub data_dir: PathBuf,
    pub pallets_db: String,
    pub orders_db: String,
    pub io_db: String,
    /// I/O polling period while a map is loaded
    pub poll_interval_ms: u64,
    /// Size of the cyclic destination domain
    pub destination_slots: i64,
    pub dark_mode: bool,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("DB"),
            pallets_db: "pallets.db".to_string(),
            orders_db: "ordenes.db".to_string(),
            io_db: "IO.db".to_string(),
            poll_interval_ms: 500,
            destination_slots: DESTINATION_SLOTS,
            dark_mode: true,
            window_width: 1280.0,
            window_height: 800.0,
        }
    }
}

impl AppConfig {
    pub fn pallets_path(&self) -> PathBuf {
        self.data_dir.join(&self.pallets_db)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_db)
    }

    pub fn io_path(&self) -> PathBuf {
        self.data_dir.join(&self.io_db)
    }

    /// Poll period, never shorter than 50 ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(AppConfig::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            StoreError::file_error("read config", path.display().to_string(), e.to_string())
        })?;
        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| StoreError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save with atomic write semantics.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| StoreError::SerializationError {
            reason: e.to_string(),
        })?;

        let tmp_path = path.with_extension("json.tmp");

        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            StoreError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            StoreError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.sync_all().map_err(|e| {
            StoreError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::file_error("rename to final", path.display().to_string(), e.to_string())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_config_path(name: &str) -> PathBuf {
        temp_dir().join(format!("palletmap_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.destination_slots, 11);
        assert_eq!(config.pallets_path(), Path::new("DB").join("pallets.db"));
        assert_eq!(config.io_path(), Path::new("DB").join("IO.db"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_config_path("missing_never_written");
        let _ = fs::remove_file(&path);
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_config_path("save_load");
        let mut config = AppConfig::default();
        config.poll_interval_ms = 250;
        config.data_dir = PathBuf::from("/srv/warehouse");
        config.save(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_config_path("partial");
        fs::write(&path, r#"{ "poll_interval_ms": 10 }"#).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.poll_interval_ms, 10);
        assert_eq!(loaded.poll_interval(), Duration::from_millis(50));
        assert_eq!(loaded.orders_db, "ordenes.db");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let path = temp_config_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
