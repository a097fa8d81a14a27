//! OAuth authentication module for Twitter/X API integration.
//!
//! Posting on behalf of the art account uses OAuth 1.0a User Context
//! authentication: every request carries an `Authorization: OAuth ...` header
//! signed with HMAC-SHA1 over the request method, URL and parameters, keyed by
//! the consumer secret and the access token secret.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;

use crate::config::TwitterCredentials;

type HmacSha1 = Hmac<Sha1>;

/// Percent-encodes a value the way OAuth 1.0a requires (RFC 3986 unreserved set).
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the signature base string: `METHOD&url&sorted-params`.
///
/// # Parameters
///
/// - `method`: HTTP method, upper case
/// - `url`: Base URL without query string
/// - `params`: Every OAuth and request parameter, unencoded
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Signs a base string with HMAC-SHA1 and returns the base64 signature.
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Generates a random alphanumeric nonce.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Current Unix time in seconds, as OAuth expects it.
pub fn current_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Builds the Authorization header for OAuth 1.0a User Context authentication
/// with an explicit nonce and timestamp.
///
/// `request_params` are query or form parameters that take part in the
/// signature. JSON bodies do not, so v2 `POST /2/tweets` passes none.
///
/// # Format
///
/// ```text
/// OAuth oauth_consumer_key="...", oauth_nonce="...", oauth_signature="...", ...
/// ```
pub fn build_oauth1_header_with(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> String {
    let oauth_params: [(&str, &str); 6] = [
        ("oauth_consumer_key", credentials.api_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let all_params: Vec<(&str, &str)> = oauth_params
        .iter()
        .chain(request_params.iter())
        .copied()
        .collect();

    let base_string = signature_base_string(method, url, &all_params);
    let signature = sign(
        &base_string,
        &credentials.api_secret,
        &credentials.access_secret,
    );

    let mut header_params: Vec<(&str, String)> = oauth_params
        .iter()
        .map(|(k, v)| (*k, v.to_string()))
        .collect();
    header_params.push(("oauth_signature", signature));
    header_params.sort_by(|a, b| a.0.cmp(b.0));

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {}", fields)
}

/// Builds the Authorization header for OAuth 1.0a User Context authentication
/// with a fresh nonce and the current timestamp.
pub fn build_oauth1_header(
    credentials: &TwitterCredentials,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
) -> String {
    build_oauth1_header_with(
        credentials,
        method,
        url,
        request_params,
        &generate_nonce(),
        &current_timestamp(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Credentials from Twitter's "Creating a signature" walkthrough.
    fn reference_credentials() -> TwitterCredentials {
        TwitterCredentials {
            api_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            api_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    #[test]
    fn test_percent_encoding_uses_unreserved_set() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_reference_signature() {
        let header = build_oauth1_header_with(
            &reference_credentials(),
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &[
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                ("include_entities", "true"),
            ],
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            "1318622958",
        );

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(!header.contains("status="));
    }

    #[test]
    fn test_fresh_headers_differ() {
        let creds = reference_credentials();
        let a = build_oauth1_header(&creds, "POST", "https://api.x.com/2/tweets", &[]);
        let b = build_oauth1_header(&creds, "POST", "https://api.x.com/2/tweets", &[]);
        assert_ne!(a, b);
    }
}
