mod cli;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::process::ExitCode;
use tracing::info;
use usewebhook::error::Result;
use usewebhook::fetcher::WebhookFetcher;
use usewebhook::forward::Forwarder;
use usewebhook::logging::{FileLogger, setup_logging};
use usewebhook::poll::{PollLoop, PollOutcome};
use usewebhook::startup::{RunArgs, prepare_run};
use usewebhook::store::ConfigStore;
use usewebhook::{Settings, display};

/// Resolves the webhook, records it in the config file and polls until done
async fn run(cli: Cli, settings: Settings) -> Result<PollOutcome> {
    let store = ConfigStore::locate(&settings)?;
    let args = RunArgs {
        webhook: cli.webhook,
        request_id: cli.request_id,
        forward_to: cli.forward_to,
        full_log: cli.log_details,
    };
    let startup = prepare_run(args, &settings, &store)?;

    if startup.generated {
        display::print_generated_notice();
    }
    if let Some(e) = &startup.save_error {
        println!("{}", format!("Warning: Unable to save config: {}", e).yellow());
    }
    let app_config = startup.app_config;

    display::print_banner(&app_config, &settings);
    if app_config.is_single_request() {
        info!("Fetching a single request from webhook {}", app_config.webhook_id);
    } else {
        info!("Polling {}", settings.listening_url(&app_config.webhook_id));
    }

    let poller = PollLoop::new(
        app_config,
        WebhookFetcher::new(settings.api_url.clone()),
        Forwarder::new(),
    );
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    Ok(poller.run(shutdown).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let file_logger = FileLogger::from_settings(&settings);
    let _guard = setup_logging(file_logger.as_ref());

    match run(cli, settings).await {
        Ok(outcome) => ExitCode::from(outcome.exit_status()),
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            ExitCode::FAILURE
        }
    }
}
