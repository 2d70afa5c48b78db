use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::Result;

pub const DEFAULT_COUNTDOWN_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub student_name: Option<String>,
    pub school: Option<String>,
    /// Last quiz category; `None` means all questions.
    pub quiz_category: Option<String>,
    pub drill_scenario: Option<u32>,
    pub shuffle_questions: bool,
    pub countdown_ms: u64,
    pub record_history: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            student_name: None,
            school: None,
            quiz_category: None,
            drill_scenario: None,
            shuffle_questions: false,
            countdown_ms: DEFAULT_COUNTDOWN_MS,
            record_history: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Countdown interval, never below 1ms so a bad file cannot spin the timer.
    pub fn countdown_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.countdown_ms.max(1))
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
    /// Read the config file. A missing file yields defaults; an unreadable or
    /// malformed one is an error.
    pub fn read(&self) -> Result<Config> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

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
        self.read().unwrap_or_else(|err| {
            warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
