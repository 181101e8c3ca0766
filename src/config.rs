use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::sample::{DEFAULT_CAP, DEFAULT_SEED};
use crate::session::SessionOptions;

/// Recommendations shown when `-n` is not given.
pub const DEFAULT_TOP_N: usize = 3;

/// Application configuration loaded from TOML config file.
/// All fields have defaults; the config file is optional.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Song dataset (CSV) used when `--dataset` is not given.
    pub dataset: Option<PathBuf>,
    /// Maximum number of songs kept in the working catalog.
    pub sample_cap: usize,
    /// Seed for working-catalog sampling.
    pub seed: u64,
    /// Number of parallel workers. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// Recommendations per query.
    pub default_top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            sample_cap: DEFAULT_CAP,
            seed: DEFAULT_SEED,
            workers: 0,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/songsim/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    /// Session build options from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            sample_cap: self.sample_cap,
            seed: self.seed,
            workers: self.resolve_workers(),
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
