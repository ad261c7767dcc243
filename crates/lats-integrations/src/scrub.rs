//! # Sensitive Data Scrubbing
//!
//! Request context passes through here before it is logged or attached to
//! an error report.
//!
//! ## What Gets Redacted
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Headers      authorization, cookie, x-api-key                         │
//! │  JSON keys    *password*, *token*, *secret*, api_key / apikey,         │
//! │               credentials (whole subtree)                              │
//! │  URLs         /waInstance{id}/{method}/{token}  → token segment        │
//! │               ?token=...&apiKey=...             → query values         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Replacement for every scrubbed value.
pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_HEADERS: [&str; 3] = ["authorization", "cookie", "x-api-key"];

const SENSITIVE_KEY_PARTS: [&str; 6] = [
    "password",
    "token",
    "secret",
    "api_key",
    "apikey",
    "credentials",
];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_PARTS.iter().any(|part| key.contains(part))
}

/// Copies headers for logging, redacting credentials.
pub fn scrub_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().to_ascii_lowercase();
            let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                REDACTED.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name, value)
        })
        .collect()
}

/// Redacts sensitive keys anywhere in a JSON document.
pub fn scrub_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    scrub_json(entry);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(scrub_json),
        _ => {}
    }
}

/// Redacts the Green API token path segment and sensitive query values.
///
/// ```rust
/// use lats_integrations::scrub::scrub_url;
///
/// assert_eq!(
///     scrub_url("https://api.green-api.com/waInstance1101/sendMessage/d75b3a66"),
///     "https://api.green-api.com/waInstance1101/sendMessage/[REDACTED]"
/// );
/// ```
pub fn scrub_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let segments: Vec<String> = url
        .path_segments()
        .map(|s| s.map(str::to_string).collect())
        .unwrap_or_default();

    if let Some(pos) = segments.iter().position(|s| s.starts_with("waInstance")) {
        if segments.len() > pos + 2 {
            let mut scrubbed = segments.clone();
            scrubbed[pos + 2] = REDACTED.to_string();
            url.set_path(&format!("/{}", scrubbed.join("/")));
        }
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if is_sensitive_key(&k) {
                    REDACTED.to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    // The query serializer percent-encodes the brackets.
    url.to_string().replace("%5BREDACTED%5D", REDACTED)
}

/// Scrubs every URL embedded in free text (e.g. an HTTP client error).
pub fn scrub_text(text: &str) -> String {
    text.split(' ')
        .map(|word| match word.find("http") {
            Some(start) => {
                let rest = &word[start..];
                let end = rest
                    .find(|c: char| matches!(c, ')' | '"' | '\'' | ',' | '>'))
                    .unwrap_or(rest.len());
                format!(
                    "{}{}{}",
                    &word[..start],
                    scrub_url(&rest[..end]),
                    &rest[end..]
                )
            }
            None => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
