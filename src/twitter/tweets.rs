//! Tweet operations for Twitter API.
//!
//! This module contains the [`TwitterPoster`], which verifies the account
//! credentials and posts single tweets or reply chains using the Twitter API v2.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, Method};
use serde_json::{json, Value};

use crate::config::TwitterCredentials;
use crate::text::{fit_to_limit, PLATFORM_LIMIT};

use super::api::{extract_data_field, send_signed_request, PublishError, API_BASE};
use super::Publisher;

/// Posts to Twitter/X on behalf of the art account.
#[derive(Debug)]
pub struct TwitterPoster {
    client: Client,
    credentials: Option<TwitterCredentials>,
    api_base: String,
    connected: bool,
    username: Option<String>,
}

impl TwitterPoster {
    /// Creates a disconnected poster. Call [`TwitterPoster::connect`] before posting.
    pub fn new(credentials: Option<TwitterCredentials>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            api_base: API_BASE.to_string(),
            connected: false,
            username: None,
        }
    }

    /// Creates a poster from `TWITTER_*` environment variables (or `.env.local`).
    pub fn from_env() -> Self {
        Self::new(TwitterCredentials::from_env())
    }

    /// Points the poster at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Username of the authenticated account, once connected.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Verifies the credentials against `GET /2/users/me`.
    ///
    /// # Returns
    ///
    /// `true` if the account could be authenticated; the poster is then connected.
    pub async fn connect(&mut self) -> bool {
        let Some(credentials) = self.credentials.as_ref() else {
            warn!("Twitter API credentials not found in environment");
            self.connected = false;
            return false;
        };

        let url = format!("{}/2/users/me", self.api_base);
        let result = send_signed_request(
            &self.client,
            credentials,
            Method::GET,
            &url,
            None,
            "verify_credentials",
        )
        .await
        .and_then(|body| extract_data_field(&body, "username"));

        match result {
            Ok(username) => {
                info!("Twitter API connected, authenticated as: @{}", username);
                self.username = Some(username);
                self.connected = true;
            }
            Err(e) => {
                warn!("Twitter API connection failed: {}", e);
                self.connected = false;
            }
        }
        self.connected
    }

    async fn create_tweet(
        &self,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<String, PublishError> {
        let credentials = match (self.connected, self.credentials.as_ref()) {
            (true, Some(credentials)) => credentials,
            _ => return Err(PublishError::NotConnected),
        };

        if text.chars().count() > PLATFORM_LIMIT {
            warn!(
                "Tweet too long ({} chars), truncating",
                text.chars().count()
            );
        }
        let text = fit_to_limit(text);

        let payload = tweet_payload(&text, reply_to);
        let url = format!("{}/2/tweets", self.api_base);
        let operation = if reply_to.is_some() {
            "post_thread_reply"
        } else {
            "post_tweet"
        };
        let body = send_signed_request(
            &self.client,
            credentials,
            Method::POST,
            &url,
            Some(&payload),
            operation,
        )
        .await?;

        let id = extract_data_field(&body, "id")?;
        info!("Tweet posted successfully: ID {}", id);
        Ok(id)
    }

    /// Posts a thread: every tweet after the first replies to the one before it.
    ///
    /// Stops at the first failure.
    ///
    /// # Returns
    ///
    /// - `Ok(ids)`: the ids of all posted tweets, in order
    /// - `Err(PublishError)`: the failure that interrupted the thread
    pub async fn post_thread(&self, tweets: &[String]) -> Result<Vec<String>, PublishError> {
        let mut ids: Vec<String> = Vec::with_capacity(tweets.len());

        for (i, text) in tweets.iter().enumerate() {
            let id = self
                .create_tweet(text, ids.last().map(String::as_str))
                .await
                .map_err(|e| {
                    warn!("Failed to post thread tweet {}/{}: {}", i + 1, tweets.len(), e);
                    e
                })?;
            info!("Thread tweet {}/{} posted", i + 1, tweets.len());
            ids.push(id);
        }

        Ok(ids)
    }
}

#[async_trait]
impl Publisher for TwitterPoster {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn post_text(&self, text: &str) -> Result<String, PublishError> {
        self.create_tweet(text, None).await
    }
}

/// Request body for `POST /2/tweets`, optionally chained to an earlier tweet.
fn tweet_payload(text: &str, reply_to: Option<&str>) -> Value {
    match reply_to {
        Some(id) => json!({
            "text": text,
            "reply": { "in_reply_to_tweet_id": id }
        }),
        None => json!({ "text": text }),
    }
}

/// Public web URL of a posted tweet.
pub fn status_url(tweet_id: &str) -> String {
    format!("https://twitter.com/i/web/status/{}", tweet_id)
}
