use crate::error::{Result, UseWebhookError};
use crate::webhook::null_as_default;
use crate::{SETTINGS_FILENAME, Settings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable state kept between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhook_history: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_used: String,
}

impl Config {
    /// Marks `webhook_id` as last used and appends it to the history once.
    pub fn remember(&mut self, webhook_id: &str) {
        self.last_used = webhook_id.to_string();
        if !self.webhook_history.iter().any(|id| id == webhook_id) {
            self.webhook_history.push(webhook_id.to_string());
        }
    }
}

/// Reads and writes [`Config`] as pretty JSON at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the configured override, else `~/.usewebhook`.
    pub fn locate(settings: &Settings) -> Result<Self> {
        if let Some(path) = &settings.config_path {
            return Ok(Self::new(path.clone()));
        }
        let home = home_dir().ok_or(UseWebhookError::ConfigPathUnavailable)?;
        Ok(Self::new(home.join(SETTINGS_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields an empty config.
    pub fn load(&self) -> Result<Config> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, starting empty", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&data).map_err(|e| {
            UseWebhookError::ConfigError(format!(
                "Failed to parse config file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let data = serde_json::to_string_pretty(config)?;
        let mut file = open_private(&self.path)?;
        file.write_all(data.as_bytes())?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_suppresses_duplicates() {
        let mut config = Config::default();
        config.remember("aaa");
        config.remember("bbb");
        config.remember("aaa");
        assert_eq!(config.webhook_history, vec!["aaa", "bbb"]);
        assert_eq!(config.last_used, "aaa");
    }

    #[test]
    fn null_history_loads_empty() {
        let config: Config =
            serde_json::from_str(r#"{"webhook_history": null, "last_used": "x"}"#).unwrap();
        assert!(config.webhook_history.is_empty());
        assert_eq!(config.last_used, "x");
    }

    #[test]
    fn override_path_wins() {
        let settings = Settings {
            config_path: Some(PathBuf::from("/tmp/custom-usewebhook.json")),
            ..Settings::default()
        };
        let store = ConfigStore::locate(&settings).unwrap();
        assert_eq!(store.path(), Path::new("/tmp/custom-usewebhook.json"));
    }
}
