use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::device_settings::{clamp_session_timeout, DEFAULT_SESSION_TIMEOUT_MINUTES};
use crate::settings::{InitSettings, WordCount};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub word_count: usize,
    pub label: String,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
    pub log_level: String,
    /// idle minutes before the settings screen closes
    pub session_timeout_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_count: 24,
            label: String::new(),
            pin_protection: true,
            passphrase_protection: false,
            log_level: "info".to_string(),
            session_timeout_minutes: DEFAULT_SESSION_TIMEOUT_MINUTES,
        }
    }
}

impl Config {
    /// Configured seed length, falling back to the default for unsupported values
    pub fn word_count(&self) -> WordCount {
        WordCount::try_from(self.word_count).unwrap_or_else(|err| {
            log::warn!("ignoring configured word count: {}", err);
            InitSettings::default().word_count
        })
    }

    pub fn session_timeout(&self) -> u32 {
        clamp_session_timeout(self.session_timeout_minutes)
    }

    /// Keeps the log level and session timeout, takes everything else from `settings`
    pub fn with_settings(&self, settings: &InitSettings) -> Self {
        Self {
            word_count: settings.word_count.words(),
            label: settings.label.clone(),
            pin_protection: settings.pin_protection,
            passphrase_protection: settings.passphrase_protection,
            ..self.clone()
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "cipherpad") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("cipherpad_config.json")
        };
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
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("ignoring unreadable config {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
