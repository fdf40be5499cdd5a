use clap::Parser;

/// Listen and forward requests to your usewebhook.com endpoint
#[derive(Debug, Parser)]
#[command(name = "usewebhook", version)]
pub struct Cli {
    /// Webhook ID or URL; defaults to the last used webhook, or a new one
    #[arg(value_name = "WEBHOOK_ID_OR_URL")]
    pub webhook: Option<String>,

    /// The request ID to fetch (optional)
    #[arg(short = 'r', long = "request-id")]
    pub request_id: Option<String>,

    /// Forward incoming requests to the provided URL (optional)
    #[arg(short = 'f', long = "forward-to")]
    pub forward_to: Option<String>,

    /// Log full request details
    #[arg(short = 'l', long = "log-details")]
    pub log_details: bool,
}
