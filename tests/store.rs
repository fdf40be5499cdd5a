#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use tempfile::TempDir;
use usewebhook::error::UseWebhookError;
use usewebhook::store::{Config, ConfigStore};

fn temp_store() -> (TempDir, ConfigStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = ConfigStore::new(dir.path().join(".usewebhook"));
    (dir, store)
}

#[test]
fn missing_file_loads_empty_config() {
    let (_dir, store) = temp_store();
    let config = store.load().expect("load");
    assert_eq!(config, Config::default());
}

#[test]
fn save_then_load_round_trips() {
    let (_dir, store) = temp_store();
    let config = Config {
        webhook_history: vec!["aaa".to_string(), "bbb".to_string()],
        last_used: "bbb".to_string(),
    };

    store.save(&config).expect("save");
    assert_eq!(store.load().expect("load"), config);

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"webhook_history\""));
    assert!(raw.contains("\"last_used\": \"bbb\""));
}

#[test]
fn same_webhook_across_runs_is_recorded_once() {
    let (_dir, store) = temp_store();

    for _ in 0..2 {
        let mut config = store.load().expect("load");
        config.remember("0123456789abcdef0123456789abcdef");
        store.save(&config).expect("save");
    }

    let config = store.load().expect("load");
    assert_eq!(
        config.webhook_history,
        vec!["0123456789abcdef0123456789abcdef".to_string()]
    );
    assert_eq!(config.last_used, "0123456789abcdef0123456789abcdef");
}

#[test]
fn saving_shorter_config_truncates_file() {
    let (_dir, store) = temp_store();
    let long = Config {
        webhook_history: (0..20).map(|i| format!("webhook-{i}")).collect(),
        last_used: "webhook-19".to_string(),
    };
    store.save(&long).unwrap();

    let short = Config {
        webhook_history: vec!["x".to_string()],
        last_used: "x".to_string(),
    };
    store.save(&short).unwrap();
    assert_eq!(store.load().unwrap(), short);
}

#[test]
fn corrupt_file_is_a_config_error() {
    let (_dir, store) = temp_store();
    fs::write(store.path(), "{ not json").unwrap();
    assert!(matches!(store.load(), Err(UseWebhookError::ConfigError(_))));
}

#[test]
fn save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("missing").join(".usewebhook"));
    assert!(matches!(
        store.save(&Config::default()),
        Err(UseWebhookError::IoError(_))
    ));
}

#[cfg(unix)]
#[test]
fn config_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, store) = temp_store();
    store.save(&Config::default()).unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
