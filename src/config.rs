use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::runtime::TICK_RATE_MS;
use crate::snippets::Difficulty;

pub const MIN_TICK_RATE_MS: u64 = 16;
pub const MAX_TICK_RATE_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub difficulty: Option<Difficulty>,
    pub tick_rate_ms: u64,
    pub results_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "javascript".to_string(),
            difficulty: None,
            tick_rate_ms: TICK_RATE_MS,
            results_log: false,
        }
    }
}

impl Config {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.clamp(MIN_TICK_RATE_MS, MAX_TICK_RATE_MS))
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Self {
            language: s.language.clone(),
            difficulty: s.difficulty,
            tick_rate_ms: s.tick_rate.as_millis() as u64,
            results_log: s.results_log,
        }
    }
}

/// Where the text to type comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetSource {
    /// Random pick for the configured language and difficulty.
    Random,
    /// A bundled snippet by id.
    ById(String),
    /// Text given on the command line or read from a file.
    Custom(String),
}

/// Effective settings after merging the config file with command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub language: String,
    pub difficulty: Option<Difficulty>,
    pub source: SnippetSource,
    pub tick_rate: Duration,
    pub results_log: bool,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            language: cfg.language.to_lowercase(),
            difficulty: cfg.difficulty,
            source: SnippetSource::Random,
            tick_rate: cfg.tick_rate(),
            results_log: cfg.results_log,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
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
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}
