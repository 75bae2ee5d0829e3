// Convenience endpoints for the classic v1 API surface.
// Thin wrappers that compose relative paths for query(); bodies stay opaque text.

use crate::client::InstagramClient;
use crate::error::Result;

impl InstagramClient {
    /// Get the profile of the token's owner.
    pub async fn user_self(&mut self) -> Result<String> {
        self.query("users/self").await
    }

    /// Get a user's profile.
    pub async fn user(&mut self, user_id: &str) -> Result<String> {
        self.query(&format!("users/{}", user_id)).await
    }

    /// Get the most recent media published by the token's owner.
    pub async fn user_recent_media(&mut self, count: u32) -> Result<String> {
        self.query(&format!("users/self/media/recent?count={}", count))
            .await
    }

    /// Get a media object.
    pub async fn media(&mut self, media_id: &str) -> Result<String> {
        self.query(&format!("media/{}", media_id)).await
    }

    /// Get recently tagged media.
    pub async fn tag_recent_media(&mut self, tag: &str) -> Result<String> {
        self.query(&format!("tags/{}/media/recent", tag)).await
    }
}
