//! Webhook identifier parsing and per-run webhook selection

use crate::error::{Result, UseWebhookError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use uuid::Uuid;

const RELATIVE_BASE: &str = "https://usewebhook.com/";

static WEBHOOK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:usewebhook\.com/)?([0-9a-fA-F]{32})(?:\?.*)?$")
        .expect("webhook ID pattern is valid")
});

/// Webhook and optional request ID extracted from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIds {
    pub webhook_id: String,
    pub request_id: Option<String>,
}

/// Parses a bare webhook ID, a `usewebhook.com/<id>` URL, or a dashboard URL
/// carrying `?id=...&req=...`.
pub fn resolve(input: &str) -> Result<ResolvedIds> {
    if let Some(token) = direct_webhook_id(input) {
        return Ok(ResolvedIds {
            webhook_id: token.to_string(),
            request_id: None,
        });
    }

    // The url parser silently drops tabs and newlines; treat any control
    // character as a malformed URL instead.
    if input.chars().any(|c| c.is_ascii_control()) {
        return Err(UseWebhookError::InvalidUrlFormat);
    }

    let base = Url::parse(RELATIVE_BASE).map_err(|_| UseWebhookError::InvalidUrlFormat)?;
    let parsed = Url::options()
        .base_url(Some(&base))
        .parse(input)
        .map_err(|_| UseWebhookError::InvalidUrlFormat)?;

    let query_value = |name: &str| {
        parsed
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default()
    };

    let webhook_id = query_value("id");
    if webhook_id.is_empty() {
        return Err(UseWebhookError::InvalidWebhookId);
    }
    let request_id = Some(query_value("req")).filter(|r| !r.is_empty());

    Ok(ResolvedIds {
        webhook_id,
        request_id,
    })
}

/// Matches `[http(s)://][usewebhook.com/]<32 hex>[?...]` and returns the hex token.
fn direct_webhook_id(input: &str) -> Option<&str> {
    WEBHOOK_ID_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str())
}

/// Creates a fresh random webhook ID (32 lowercase hex digits)
pub fn generate_webhook_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Outcome of choosing which webhook a run listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub webhook_id: String,
    pub request_id: Option<String>,
    /// True when no ID was supplied or remembered and a new one was made.
    pub generated: bool,
}

/// Picks the webhook for this run from the positional argument, the last
/// used ID, or a newly generated one. A request ID embedded in the argument
/// overrides the one passed by flag.
pub fn select_webhook(
    argument: Option<&str>,
    request_id_flag: Option<&str>,
    last_used: &str,
) -> Result<Selection> {
    let flag = request_id_flag
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    match argument {
        Some(raw) => {
            let resolved = resolve(raw)?;
            Ok(Selection {
                webhook_id: resolved.webhook_id,
                request_id: resolved.request_id.or(flag),
                generated: false,
            })
        }
        None if !last_used.is_empty() => Ok(Selection {
            webhook_id: last_used.to_string(),
            request_id: flag,
            generated: false,
        }),
        None => Ok(Selection {
            webhook_id: generate_webhook_id(),
            request_id: flag,
            generated: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0123456789abcdefABCDEF0123456789";

    #[test]
    fn direct_ids_with_and_without_prefixes() {
        for input in [
            ID.to_string(),
            format!("https://{ID}"),
            format!("http://usewebhook.com/{ID}"),
            format!("https://usewebhook.com/{ID}"),
            format!("usewebhook.com/{ID}"),
            format!("https://usewebhook.com/{ID}?foo=bar"),
        ] {
            let resolved = resolve(&input).unwrap();
            assert_eq!(resolved.webhook_id, ID, "input {input}");
            assert_eq!(resolved.request_id, None, "input {input}");
        }
    }

    #[test]
    fn dashboard_url_yields_both_ids() {
        let resolved = resolve("https://usewebhook.com/?id=ABC&req=XYZ").unwrap();
        assert_eq!(resolved.webhook_id, "ABC");
        assert_eq!(resolved.request_id.as_deref(), Some("XYZ"));
    }

    #[test]
    fn relative_query_is_accepted() {
        let resolved = resolve("?id=ABC").unwrap();
        assert_eq!(resolved.webhook_id, "ABC");
        assert_eq!(resolved.request_id, None);
    }

    #[test]
    fn first_id_parameter_wins() {
        let resolved = resolve("https://usewebhook.com/?id=one&id=two").unwrap();
        assert_eq!(resolved.webhook_id, "one");
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(matches!(
            resolve("https://usewebhook.com/?req=XYZ"),
            Err(UseWebhookError::InvalidWebhookId)
        ));
        assert!(matches!(
            resolve("not-a-webhook"),
            Err(UseWebhookError::InvalidWebhookId)
        ));
        assert!(matches!(
            resolve("https://usewebhook.com/?id="),
            Err(UseWebhookError::InvalidWebhookId)
        ));
    }

    #[test]
    fn unparseable_url_is_rejected() {
        assert!(matches!(
            resolve("http://[::1"),
            Err(UseWebhookError::InvalidUrlFormat)
        ));
    }

    #[test]
    fn newline_in_query_is_an_invalid_url() {
        assert_eq!(direct_webhook_id(&format!("{ID}?a\nb")), None);
        assert!(matches!(
            resolve(&format!("{ID}?a\nb")),
            Err(UseWebhookError::InvalidUrlFormat)
        ));
        assert!(matches!(
            resolve("https://usewebhook.com/?id=ABC\t"),
            Err(UseWebhookError::InvalidUrlFormat)
        ));
    }

    #[test]
    fn prefix_must_precede_the_token() {
        assert_eq!(direct_webhook_id(&format!("ftp://{ID}")), None);
        assert_eq!(direct_webhook_id(&format!("{ID}/extra")), None);
    }

    #[test]
    fn short_hex_is_not_a_direct_id() {
        assert_eq!(direct_webhook_id("abc123"), None);
        assert_eq!(direct_webhook_id(&format!("{ID}0")), None);
    }

    #[test]
    fn generated_ids_are_32_lowercase_hex() {
        let id = generate_webhook_id();
        assert_eq!(id.len(), 32);
        assert!(id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        assert_ne!(id, generate_webhook_id());
    }

    #[test]
    fn selection_prefers_argument_then_last_used() {
        let selection = select_webhook(Some(ID), Some("req_flag"), "previous").unwrap();
        assert_eq!(selection.webhook_id, ID);
        assert_eq!(selection.request_id.as_deref(), Some("req_flag"));
        assert!(!selection.generated);

        let selection =
            select_webhook(Some("https://usewebhook.com/?id=ABC&req=XYZ"), Some("req_flag"), "")
                .unwrap();
        assert_eq!(selection.request_id.as_deref(), Some("XYZ"));

        let selection = select_webhook(None, None, "previous").unwrap();
        assert_eq!(selection.webhook_id, "previous");
        assert!(!selection.generated);

        let selection = select_webhook(None, Some(""), "").unwrap();
        assert!(selection.generated);
        assert_eq!(selection.request_id, None);
        assert_eq!(selection.webhook_id.len(), 32);
    }
}
