//! Utility functions for notification channels

use crate::error::{NotifyError, Result};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of a response body kept in error messages
pub const MAX_BODY_LENGTH: usize = 4000;

/// Delivery attempts per recipient before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Truncate a string to at most `max_len` bytes, snapping back to a char boundary
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}

/// Redact sensitive fields from JSON configuration
///
/// Replaces values for keys that commonly carry secrets (password, token,
/// secret, api_key, credentials) with `"***"`, recursing into nested values.
pub fn redact_sensitive_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let key_lower = key.to_lowercase();
                let is_sensitive = key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower.contains("api_key")
                    || key_lower.contains("apikey")
                    || key_lower.contains("credentials");

                if is_sensitive {
                    redacted.insert(key.clone(), Value::String("***".to_string()));
                } else if val.is_object() || val.is_array() {
                    redacted.insert(key.clone(), redact_sensitive_json(val));
                } else {
                    redacted.insert(key.clone(), val.clone());
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_json).collect()),
        _ => value.clone(),
    }
}

/// Send an HTTP request up to [`MAX_ATTEMPTS`] times with exponential backoff
/// (100ms, 200ms). `build` is called once per attempt since a request
/// builder is consumed by `send`.
pub async fn send_with_retry<F>(service: &str, build: F) -> Result<()>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut last_err = None;
    for attempt in 0..MAX_ATTEMPTS {
        match build().send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            Ok(resp) => {
                let status = resp.status();
                let body = match resp.text().await {
                    Ok(text) => truncate_string(&text, MAX_BODY_LENGTH),
                    Err(e) => format!("[Failed to read response body: {e}]"),
                };
                tracing::warn!(
                    attempt = attempt + 1,
                    service,
                    status = %status,
                    "Endpoint returned non-success status, retrying"
                );
                last_err = Some(NotifyError::ApiError {
                    service: service.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    service,
                    error = %e,
                    "Request failed, retrying"
                );
                last_err = Some(e.into());
            }
        }
        if attempt + 1 < MAX_ATTEMPTS {
            tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt))).await;
        }
    }
    Err(last_err.unwrap_or_else(|| NotifyError::Other(format!("{service}: no attempt made"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 5), "hello... [truncated]");
    }

    #[test]
    fn test_truncate_string_respects_char_boundary() {
        // "ü" is two bytes; cutting at byte 2 would split it
        assert_eq!(truncate_string("aü bc", 2), "a... [truncated]");
    }

    #[test]
    fn test_redact_sensitive_json() {
        let json = serde_json::json!({
            "gateway_url": "https://sms.example.com/send",
            "api_key": "abc123",
            "nested": {
                "access_token": "xyz789",
                "public_value": "visible"
            }
        });

        let redacted = redact_sensitive_json(&json);
        assert_eq!(redacted["gateway_url"], "https://sms.example.com/send");
        assert_eq!(redacted["api_key"], "***");
        assert_eq!(redacted["nested"]["access_token"], "***");
        assert_eq!(redacted["nested"]["public_value"], "visible");
    }
}
