//! Twitter/X API integration module.
//!
//! This module contains the publishing collaborator: the [`Publisher`] seam
//! the broadcaster posts through, and [`TwitterPoster`], its implementation
//! against the Twitter/X API v2 using OAuth 1.0a User Context authentication.

mod api;
mod tweets;

use async_trait::async_trait;

pub use api::{classify_status, sanitize_for_logging, PublishError, API_BASE};
pub use tweets::{status_url, TwitterPoster};

/// Something that can publish a post.
#[async_trait]
pub trait Publisher {
    /// Whether the publisher is ready to post.
    fn is_connected(&self) -> bool;

    /// Publishes `text` and returns the id of the new post.
    ///
    /// Text over the platform limit is cut to 277 characters plus `...`.
    async fn post_text(&self, text: &str) -> Result<String, PublishError>;
}
