use crate::error::{Result, UseWebhookError};
use crate::webhook::WebhookResponse;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use std::future::Future;
use tracing::debug;

/// Query sent with each poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchParams {
    /// Everything captured after the watermark
    Since(DateTime<Utc>),
    /// One specific captured request
    RequestId(String),
}

impl FetchParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        match self {
            FetchParams::Since(watermark) => vec![(
                "since",
                watermark.to_rfc3339_opts(SecondsFormat::Secs, true),
            )],
            FetchParams::RequestId(id) => vec![("request_id", id.clone())],
        }
    }
}

/// Anything that can return captured requests for a webhook
pub trait WebhookSource {
    fn fetch(
        &self,
        webhook_id: &str,
        params: &FetchParams,
    ) -> impl Future<Output = Result<WebhookResponse>>;
}

/// Fetches captured requests from the usewebhook API
#[derive(Debug, Clone)]
pub struct WebhookFetcher {
    client: reqwest::Client,
    api_url: String,
}

impl WebhookFetcher {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn endpoint(&self, webhook_id: &str) -> String {
        format!("{}{}", self.api_url, webhook_id)
    }
}

impl WebhookSource for WebhookFetcher {
    async fn fetch(&self, webhook_id: &str, params: &FetchParams) -> Result<WebhookResponse> {
        let url = self.endpoint(webhook_id);
        debug!("GET {} {:?}", url, params);

        let resp = self
            .client
            .get(&url)
            .query(&params.to_query())
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(UseWebhookError::UnexpectedStatus(resp.status().as_u16()));
        }

        let body = resp.bytes().await?;
        let webhook_resp: WebhookResponse = serde_json::from_slice(&body)?;
        debug!("Fetched {} request(s)", webhook_resp.requests.len());
        Ok(webhook_resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn since_uses_second_precision_utc() {
        let watermark = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 5).unwrap();
        assert_eq!(
            FetchParams::Since(watermark).to_query(),
            vec![("since", "2024-05-01T10:00:05Z".to_string())]
        );
    }

    #[test]
    fn request_id_query() {
        assert_eq!(
            FetchParams::RequestId("req_1".to_string()).to_query(),
            vec![("request_id", "req_1".to_string())]
        );
    }

    #[test]
    fn endpoint_appends_webhook_id() {
        let fetcher = WebhookFetcher::new("https://usewebhook.com/api/webhooks/");
        assert_eq!(
            fetcher.endpoint("abc"),
            "https://usewebhook.com/api/webhooks/abc"
        );
    }
}
