pub mod display;
pub mod error;
pub mod fetcher;
pub mod forward;
pub mod identifier;
pub mod logging;
pub mod poll;
pub mod sniff;
pub mod startup;
pub mod store;
pub mod webhook;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://usewebhook.com/api/webhooks/";
pub const DEFAULT_BASE_URL: &str = "https://usewebhook.com";
pub const SETTINGS_FILENAME: &str = ".usewebhook";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Process-wide settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub base_url: String,
    /// Explicit path for the settings file. Falls back to `~/.usewebhook`.
    pub config_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// Rotated log files kept on disk, when set.
    pub log_max_files: Option<usize>,
    /// `minutely`, `hourly`, `daily` or `never`.
    pub log_rotation: Option<String>,
    pub poll_interval: Duration,
    pub retry_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup. Unparseable
    /// intervals keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(value) = lookup("USEWEBHOOK_API_URL").filter(|v| !v.is_empty()) {
            settings.api_url = value;
        }
        if let Some(value) = lookup("USEWEBHOOK_BASE_URL").filter(|v| !v.is_empty()) {
            settings.base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("USEWEBHOOK_CONFIG").filter(|v| !v.is_empty()) {
            settings.config_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("USEWEBHOOK_LOG_DIR").filter(|v| !v.is_empty()) {
            settings.log_dir = Some(PathBuf::from(value));
        }
        if let Some(count) = lookup("USEWEBHOOK_LOG_MAX_FILES").and_then(|v| v.parse::<usize>().ok()) {
            settings.log_max_files = Some(count);
        }
        if let Some(value) = lookup("USEWEBHOOK_LOG_ROTATION").filter(|v| !v.is_empty()) {
            settings.log_rotation = Some(value);
        }
        if let Some(ms) = lookup("USEWEBHOOK_POLL_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
            settings.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = lookup("USEWEBHOOK_RETRY_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
            settings.retry_interval = Duration::from_millis(ms);
        }

        settings
    }

    pub fn dashboard_url(&self, webhook_id: &str) -> String {
        format!("{}?id={}", self.base_url, webhook_id)
    }

    pub fn listening_url(&self, webhook_id: &str) -> String {
        format!("{}/{}", self.base_url, webhook_id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            config_path: None,
            log_dir: None,
            log_max_files: None,
            log_rotation: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Parameters for one run of the poll loop.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub full_log: bool,
    pub forward_to: Option<String>,
    pub webhook_id: String,
    /// Set when only one captured request should be fetched.
    pub request_id: Option<String>,
    pub poll_interval: Duration,
    pub retry_interval: Duration,
}

impl AppConfig {
    pub fn new(webhook_id: String, settings: &Settings) -> Self {
        Self {
            full_log: false,
            forward_to: None,
            webhook_id,
            request_id: None,
            poll_interval: settings.poll_interval,
            retry_interval: settings.retry_interval,
        }
    }

    /// Returns true when the run fetches a single request and exits.
    pub fn is_single_request(&self) -> bool {
        self.request_id
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn settings_defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.poll_interval, Duration::from_secs(3));
        assert_eq!(settings.retry_interval, Duration::from_secs(1));
        assert!(settings.config_path.is_none());
        assert!(settings.log_max_files.is_none());
        assert!(settings.log_rotation.is_none());
    }

    #[test]
    fn settings_read_overrides_and_ignore_bad_numbers() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("USEWEBHOOK_API_URL", "http://127.0.0.1:9000/api/webhooks/"),
            ("USEWEBHOOK_BASE_URL", "http://127.0.0.1:9000/"),
            ("USEWEBHOOK_POLL_INTERVAL_MS", "250"),
            ("USEWEBHOOK_RETRY_INTERVAL_MS", "soon"),
            ("USEWEBHOOK_LOG_MAX_FILES", "3"),
            ("USEWEBHOOK_LOG_ROTATION", "hourly"),
        ]);
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_url, "http://127.0.0.1:9000/api/webhooks/");
        assert_eq!(settings.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.retry_interval, DEFAULT_RETRY_INTERVAL);
        assert_eq!(settings.log_max_files, Some(3));
        assert_eq!(settings.log_rotation.as_deref(), Some("hourly"));
        assert_eq!(
            settings.dashboard_url("abc"),
            "http://127.0.0.1:9000?id=abc"
        );
        assert_eq!(settings.listening_url("abc"), "http://127.0.0.1:9000/abc");
    }

    #[test]
    fn single_request_mode_needs_non_empty_id() {
        let settings = Settings::default();
        let mut config = AppConfig::new("abc".to_string(), &settings);
        assert!(!config.is_single_request());
        config.request_id = Some(String::new());
        assert!(!config.is_single_request());
        config.request_id = Some("req_1".to_string());
        assert!(config.is_single_request());
    }
}
