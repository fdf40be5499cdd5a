//! Replays captured requests against an operator-chosen destination

use crate::error::{Result, UseWebhookError};
use crate::sniff::detect_content_type;
use crate::webhook::{BASE64_CONTENT_TYPE, ORIGINAL_CONTENT_TYPE_HEADER, WebhookRequest};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::header::{
    CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, HeaderMap, HeaderName, HeaderValue,
    TRANSFER_ENCODING,
};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// A fully reconstructed request, ready to send
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Result of one successful forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReport {
    pub status: u16,
    pub elapsed: Duration,
    pub destination: String,
}

/// Anything that can replay a captured request
pub trait Forward {
    fn forward(
        &self,
        request: &WebhookRequest,
        destination: &str,
    ) -> impl Future<Output = Result<ForwardReport>>;
}

/// Builds the outbound request for `request` against `destination`.
///
/// Bodies marked `application/base64` are decoded, their real content type
/// is sniffed from the decoded bytes and `X-Original-Content-Type` is
/// dropped. `Host` always names the destination.
pub fn prepare(request: &WebhookRequest, destination: &str) -> Result<OutboundRequest> {
    let target = if request.query.is_empty() {
        destination.to_string()
    } else {
        format!("{}?{}", destination, request.query)
    };
    let url = Url::parse(&target).map_err(|e| {
        UseWebhookError::MalformedRequest(format!("invalid URL '{}': {}", target, e))
    })?;

    let method = if request.method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            UseWebhookError::MalformedRequest(format!("invalid method '{}'", request.method))
        })?
    };

    let mut headers = HeaderMap::new();
    for (key, value) in &request.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            UseWebhookError::MalformedRequest(format!("invalid header name '{}'", key))
        })?;
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING || name == CONNECTION {
            continue;
        }
        let value = HeaderValue::from_str(value).map_err(|_| {
            UseWebhookError::MalformedRequest(format!("invalid value for header '{}'", key))
        })?;
        headers.insert(name, value);
    }

    let mut body = request.body.clone().into_bytes();
    let is_base64 = headers
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == BASE64_CONTENT_TYPE.as_bytes());
    if is_base64 {
        body = STANDARD.decode(&request.body)?;
        let sniffed = detect_content_type(&body);
        debug!("Decoded Base64 body of {} bytes as {}", body.len(), sniffed);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(sniffed));
        headers.remove(ORIGINAL_CONTENT_TYPE_HEADER);
    }

    Url::parse(destination).map_err(|e| {
        UseWebhookError::MalformedRequest(format!("invalid URL '{}': {}", destination, e))
    })?;
    let host = authority(destination).ok_or_else(|| {
        UseWebhookError::MalformedRequest(format!("destination '{}' has no host", destination))
    })?;
    let host = HeaderValue::from_str(host)
        .map_err(|_| UseWebhookError::MalformedRequest(format!("invalid host '{}'", host)))?;
    headers.insert(HOST, host);

    Ok(OutboundRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Host and port exactly as written in `destination`, minus any userinfo.
/// `Url::port` hides an explicit default port, so the text is sliced instead.
fn authority(destination: &str) -> Option<&str> {
    let (_, rest) = destination.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    (!authority.is_empty()).then_some(authority)
}

/// Sends reconstructed requests over HTTP
#[derive(Debug, Clone, Default)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, outbound: OutboundRequest) -> Result<ForwardReport> {
        let destination = outbound.url.to_string();
        let mut builder = self
            .client
            .request(outbound.method, outbound.url)
            .headers(outbound.headers);
        if !outbound.body.is_empty() {
            builder = builder.body(outbound.body);
        }

        let start = Instant::now();
        let resp = builder.send().await?;
        let elapsed = start.elapsed();

        Ok(ForwardReport {
            status: resp.status().as_u16(),
            elapsed,
            destination,
        })
    }
}

impl Forward for Forwarder {
    async fn forward(&self, request: &WebhookRequest, destination: &str) -> Result<ForwardReport> {
        let outbound = prepare(request, destination)?;
        self.send(outbound).await
    }
}
