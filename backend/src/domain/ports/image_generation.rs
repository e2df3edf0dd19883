//! Driving port for AI image generation.

use async_trait::async_trait;

use crate::domain::{Error, GeneratedImage, Prompt, UserId};

/// Generating artwork for AI designs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    /// Generate and fetch an image for `user_id`.
    async fn generate(&self, user_id: &UserId, prompt: &Prompt) -> Result<GeneratedImage, Error>;
}
