use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use crate::session::{CorrectionPolicy, SessionConfig, TestDuration};
use crate::word_source::DEFAULT_WORD_SOURCE_URL;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u64,
    pub word_count: usize,
    pub word_source_url: String,
    pub fetch_timeout_secs: u64,
    pub refill_threshold: usize,
    pub rescore_corrections: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: TestDuration::default().secs(),
            word_count: 1000,
            word_source_url: DEFAULT_WORD_SOURCE_URL.to_string(),
            fetch_timeout_secs: 10,
            refill_threshold: 50,
            rescore_corrections: false,
        }
    }
}

impl Config {
    /// Unknown durations fall back to the default option
    pub fn duration(&self) -> TestDuration {
        TestDuration::from_secs(self.duration_secs).unwrap_or_default()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            word_count: self.word_count.max(1),
            refill_threshold: self.refill_threshold,
            correction: if self.rescore_corrections {
                CorrectionPolicy::Rescore
            } else {
                CorrectionPolicy::KeepScore
            },
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path =
            AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typesprint_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(err) => {
                    log::warn!("ignoring unreadable config {}: {err}", self.path.display());
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            duration_secs: 120,
            word_count: 250,
            word_source_url: "http://localhost:9000/word".into(),
            fetch_timeout_secs: 3,
            refill_threshold: 10,
            rescore_corrections: true,
        };
        store.save(&cfg).unwrap();
        assert!(path.exists());
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"duration_secs": 30}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.duration(), TestDuration::Short);
        assert_eq!(cfg.word_count, 1000);
        assert_eq!(cfg.word_source_url, DEFAULT_WORD_SOURCE_URL);
    }

    #[test]
    fn unsupported_duration_falls_back() {
        let cfg = Config {
            duration_secs: 45,
            ..Config::default()
        };
        assert_eq!(cfg.duration(), TestDuration::Medium);
    }

    #[test]
    fn session_config_maps_policy() {
        let cfg = Config {
            rescore_corrections: true,
            word_count: 0,
            ..Config::default()
        };
        let sc = cfg.session_config();
        assert_eq!(sc.correction, CorrectionPolicy::Rescore);
        assert_eq!(sc.word_count, 1);
        assert_eq!(
            Config::default().session_config().correction,
            CorrectionPolicy::KeepScore
        );
    }
}
