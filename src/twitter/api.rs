//! Core Twitter API utilities.
//!
//! This module contains low-level API utilities for making signed requests
//! to the Twitter API and mapping its failures onto [`PublishError`].

use log::{debug, error, info, warn};
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

use crate::config::TwitterCredentials;
use crate::oauth::build_oauth1_header;
use crate::text::truncate_chars;

/// Base URL of the Twitter/X API.
pub const API_BASE: &str = "https://api.x.com";

/// Reasons a post did not go out.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Twitter API not connected")]
    NotConnected,

    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    #[error("Forbidden (duplicate post or suspended account): {0}")]
    Forbidden(String),

    #[error("Twitter API rejected the credentials")]
    Unauthorized,

    #[error("Twitter API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request to Twitter API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected Twitter API response: {0}")]
    InvalidResponse(String),
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_len`: Maximum length in characters before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    let char_count = sanitized.chars().count();
    if char_count > max_len {
        format!(
            "{}... [truncated, {} total chars]",
            truncate_chars(&sanitized, max_len),
            char_count
        )
    } else {
        sanitized
    }
}

/// Maps a non-success HTTP status onto a [`PublishError`].
pub fn classify_status(status: StatusCode, body: &str) -> PublishError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => PublishError::RateLimited,
        StatusCode::FORBIDDEN => PublishError::Forbidden(sanitize_for_logging(body, 200)),
        StatusCode::UNAUTHORIZED => PublishError::Unauthorized,
        other => PublishError::Api {
            status: other.as_u16(),
            body: sanitize_for_logging(body, 200),
        },
    }
}

/// Pulls `data.<field>` out of a v2 API response body.
pub fn extract_data_field(response_text: &str, field: &str) -> Result<String, PublishError> {
    let json: serde_json::Value = serde_json::from_str(response_text)
        .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

    json.get("data")
        .and_then(|data| data.get(field))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            PublishError::InvalidResponse(format!(
                "missing data.{} in {}",
                field,
                sanitize_for_logging(response_text, 200)
            ))
        })
}

/// Makes an OAuth 1.0a signed request to the Twitter API.
///
/// # Parameters
///
/// - `client`: Shared HTTP client
/// - `credentials`: The four OAuth 1.0a credentials
/// - `method`: HTTP method
/// - `url`: Full endpoint URL without query string
/// - `body`: Optional JSON payload
/// - `operation_name`: Human-readable name for the operation (for logging)
///
/// # Returns
///
/// - `Ok(String)`: The API response body on success
/// - `Err(PublishError)`: If the request fails or the API returns an error status
pub(crate) async fn send_signed_request(
    client: &Client,
    credentials: &TwitterCredentials,
    method: Method,
    url: &str,
    body: Option<&serde_json::Value>,
    operation_name: &str,
) -> Result<String, PublishError> {
    info!("Making signed request for operation: {}", operation_name);

    let auth_header = build_oauth1_header(credentials, method.as_str(), url, &[]);
    let mut request = client
        .request(method, url)
        .header("Authorization", auth_header);
    if let Some(payload) = body {
        debug!(
            "Request payload for '{}': {}",
            operation_name,
            sanitize_for_logging(&payload.to_string(), 400)
        );
        request = request.json(payload);
    }

    let response = request.send().await?;
    let status = response.status();
    info!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    let response_text = response.text().await?;
    if status.is_success() {
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    let err = classify_status(status, &response_text);
    match err {
        PublishError::RateLimited | PublishError::Forbidden(_) => {
            warn!("Operation '{}' rejected: {}", operation_name, err)
        }
        _ => error!("Operation '{}' failed: {}", operation_name, err),
    }
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("a\nb\tc", 50), "a b c");
        assert_eq!(sanitize_for_logging("bell\u{7}", 50), "bell?");
        assert_eq!(
            sanitize_for_logging("▓▓▓▓▓▓", 3),
            "▓▓▓... [truncated, 6 total chars]"
        );
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            PublishError::RateLimited
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "duplicate content"),
            PublishError::Forbidden(body) if body == "duplicate content"
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, ""),
            PublishError::Unauthorized
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "oops"),
            PublishError::Api { status: 502, .. }
        ));
    }

    #[test]
    fn test_extract_data_field() {
        let body = r#"{"data":{"id":"1445880548472328192","text":"hi"}}"#;
        assert_eq!(extract_data_field(body, "id").unwrap(), "1445880548472328192");
        assert!(matches!(
            extract_data_field(r#"{"errors":[]}"#, "id"),
            Err(PublishError::InvalidResponse(_))
        ));
        assert!(extract_data_field("not json", "id").is_err());
    }
}
