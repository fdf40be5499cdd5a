//! Console output for captured requests, forward results and the startup banner

use crate::webhook::WebhookRequest;
use crate::{AppConfig, Settings};
use colored::Colorize;
use serde::Serialize;
use std::borrow::Cow;
use std::time::Duration;

const EMPTY: &str = "(empty)";

/// A value shown in a request dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    /// Renders the value, using `(empty)` for absent or zero-length values.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Absent => Cow::Borrowed(EMPTY),
            FieldValue::Text(s) if s.is_empty() => Cow::Borrowed(EMPTY),
            FieldValue::Text(s) => Cow::Borrowed(*s),
            FieldValue::Bytes(b) if b.is_empty() => Cow::Borrowed(EMPTY),
            FieldValue::Bytes(b) => String::from_utf8_lossy(*b),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Text)
    }
}

impl<'a> From<&'a [u8]> for FieldValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        FieldValue::Bytes(value)
    }
}

fn or_empty<'a>(value: impl Into<FieldValue<'a>>) -> String {
    value.into().render().into_owned()
}

/// Pretty JSON with four-space indentation
fn pretty_json<T: Serialize>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => String::new(),
    }
}

/// Multi-line dump of every captured field
pub fn format_full(request: &WebhookRequest) -> String {
    let field = |label: &str, value: String| {
        format!("{}{}\n", format!("{label}: ").cyan(), value.bright_black())
    };

    let mut out = String::new();
    out.push_str(
        &format!("\n=== Start of Request ID: {} ===", request.request_id)
            .yellow()
            .to_string(),
    );
    out.push('\n');
    out.push_str(&field("Timestamp", request.timestamp.clone()));
    out.push_str(&field("Source IP (anonymized)", or_empty(request.ip.as_str())));
    out.push_str(&field("Method", or_empty(request.method.as_str())));
    out.push_str(&field("Query", or_empty(request.query.as_str())));
    out.push_str(&field("Headers", or_empty(pretty_json(&request.headers).as_str())));
    out.push_str(&field("Body", or_empty(request.body.as_str())));
    out.push_str(
        &format!("=== End of Request ID: {} ===", request.request_id)
            .yellow()
            .to_string(),
    );
    out
}

/// One-line summary of a captured request
pub fn format_summary(request: &WebhookRequest) -> String {
    format!(
        "{} {}{} {}{} {}{} {}{}",
        "[INCOMING]".yellow(),
        "timestamp=".bright_black(),
        or_empty(request.timestamp.as_str()).yellow(),
        "ip=".bright_black(),
        or_empty(request.ip.as_str()).yellow(),
        "method=".bright_black(),
        or_empty(request.method.as_str()).yellow(),
        "request_id=".bright_black(),
        or_empty(request.request_id.as_str()).yellow(),
    )
}

pub fn print_request(request: &WebhookRequest, full_log: bool) {
    if full_log {
        println!("{}", format_full(request));
    } else {
        println!("{}", format_summary(request));
    }
}

pub fn format_forwarded(status: u16, elapsed: Duration, destination: &str) -> String {
    format!(
        "{} {}{} {}{}ms {}{}",
        "[FORWARDED]".blue(),
        "status=".bright_black(),
        status.to_string().blue(),
        "time=".bright_black(),
        elapsed.as_millis().to_string().blue(),
        "destination=".bright_black(),
        destination.blue(),
    )
}

pub fn print_forwarded(status: u16, elapsed: Duration, destination: &str) {
    println!("{}", format_forwarded(status, elapsed, destination));
}

pub fn print_generated_notice() {
    println!(
        "{}",
        "No webhook ID or URL provided, creating a new one...".bright_black()
    );
}

pub fn print_not_found(request_id: &str) {
    println!(
        "{}",
        format!("No requests found for request ID: {request_id}").red()
    );
}

pub fn print_banner(config: &AppConfig, settings: &Settings) {
    if let Some(request_id) = config.request_id.as_deref().filter(|r| !r.is_empty()) {
        println!(
            "{}\n",
            format!(
                "Single request mode. Retrieving webhook={} request={}",
                config.webhook_id, request_id
            )
            .green()
        );
        return;
    }

    println!(
        "{}",
        format!("Dashboard URL: {}", settings.dashboard_url(&config.webhook_id)).green()
    );
    println!(
        "{}",
        format!("Listening at: {}", settings.listening_url(&config.webhook_id)).green()
    );
    if let Some(forward_to) = &config.forward_to {
        println!("{}", format!("Forwarding to: {forward_to}").green());
    }
    println!("{}", "\nPress Ctrl+C to stop\n".bright_black());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WebhookRequest {
        let mut request = WebhookRequest {
            request_id: "req_42".to_string(),
            timestamp: "2024-05-01T10:00:00Z".to_string(),
            ip: "203.0.113.x".to_string(),
            method: "POST".to_string(),
            ..WebhookRequest::default()
        };
        request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        request
    }

    #[test]
    fn empty_values_render_placeholder() {
        assert_eq!(FieldValue::Absent.render(), "(empty)");
        assert_eq!(FieldValue::from("").render(), "(empty)");
        assert_eq!(FieldValue::from(None::<&str>).render(), "(empty)");
        assert_eq!(FieldValue::Bytes(b"").render(), "(empty)");
        assert_eq!(FieldValue::from("GET").render(), "GET");
        assert_eq!(FieldValue::from(&b"raw"[..]).render(), "raw");
    }

    #[test]
    fn summary_contains_identifying_fields() {
        let line = format_summary(&sample());
        assert!(line.contains("[INCOMING]"));
        assert!(line.contains("2024-05-01T10:00:00Z"));
        assert!(line.contains("203.0.113.x"));
        assert!(line.contains("POST"));
        assert!(line.contains("req_42"));
    }

    #[test]
    fn full_dump_marks_empty_fields_and_indents_headers() {
        let block = format_full(&sample());
        assert!(block.contains("=== Start of Request ID: req_42 ==="));
        assert!(block.contains("=== End of Request ID: req_42 ==="));
        assert!(block.contains("    \"Content-Type\": \"application/json\""));
        assert!(block.contains("(empty)"));
    }

    #[test]
    fn forwarded_line_reports_latency_in_millis() {
        let line = format_forwarded(201, Duration::from_millis(37), "http://localhost:3000/hook");
        assert!(line.contains("[FORWARDED]"));
        assert!(line.contains("201"));
        assert!(line.contains("37"));
        assert!(line.contains("http://localhost:3000/hook"));
    }
}
