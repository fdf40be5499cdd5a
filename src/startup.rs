//! Per-run setup: pick the webhook, record it and build the poll parameters

use crate::error::{Result, UseWebhookError};
use crate::identifier::select_webhook;
use crate::store::{Config, ConfigStore};
use crate::{AppConfig, Settings};
use tracing::{debug, warn};

/// What the operator asked for on the command line
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub webhook: Option<String>,
    pub request_id: Option<String>,
    pub forward_to: Option<String>,
    pub full_log: bool,
}

/// Everything the binary needs before polling starts
#[derive(Debug)]
pub struct Startup {
    pub app_config: AppConfig,
    /// Config as remembered for this run, whether or not it reached disk.
    pub config: Config,
    pub generated: bool,
    /// Set when the config file could not be written. The run goes on.
    pub save_error: Option<UseWebhookError>,
}

/// Loads the config, selects the webhook, remembers it and builds the
/// `AppConfig`. Only load and selection failures are fatal.
pub fn prepare_run(args: RunArgs, settings: &Settings, store: &ConfigStore) -> Result<Startup> {
    let mut config = store.load()?;
    debug!("Loaded config from {}", store.path().display());

    let selection = select_webhook(
        args.webhook.as_deref(),
        args.request_id.as_deref(),
        &config.last_used,
    )?;

    config.remember(&selection.webhook_id);
    let save_error = store.save(&config).err();
    if let Some(e) = &save_error {
        warn!("Unable to save config to {}: {}", store.path().display(), e);
    }

    let mut app_config = AppConfig::new(selection.webhook_id, settings);
    app_config.request_id = selection.request_id;
    app_config.forward_to = args.forward_to.filter(|f| !f.is_empty());
    app_config.full_log = args.full_log;

    Ok(Startup {
        app_config,
        config,
        generated: selection.generated,
        save_error,
    })
}
