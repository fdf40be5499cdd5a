//! Webhook related structures

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Marker content type used by the capture service for Base64 encoded bodies
pub const BASE64_CONTENT_TYPE: &str = "application/base64";

/// Header carrying the real content type of a Base64 encoded body
pub const ORIGINAL_CONTENT_TYPE_HEADER: &str = "X-Original-Content-Type";

/// One HTTP call captured by the remote service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

impl WebhookRequest {
    /// Case-insensitive header lookup. The last matching key wins, like a
    /// header map built by inserting every pair in order.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .last()
    }
}

/// A batch of captured requests returned by one poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub requests: Vec<WebhookRequest>,
}

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
