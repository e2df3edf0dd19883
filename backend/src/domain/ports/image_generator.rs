//! Port for the external AI image generation service.
//!
//! Both calls are bounded by wall-clock budgets enforced in the adapter;
//! exceeding them yields [`ImageGeneratorError::Timeout`].

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{DownloadedImage, Prompt};

use super::define_port_error;

/// Budget for the generation call.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
/// Budget for downloading the generated image.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

define_port_error! {
    /// Errors raised by image generator adapters.
    pub enum ImageGeneratorError {
        /// No endpoint or key is configured.
        NotConfigured => "image generation is not configured",
        /// A stage exceeded its budget.
        Timeout { stage: String } => "image {stage} timed out",
        /// The service could not be reached.
        Transport { message: String } => "image service request failed: {message}",
        /// The service refused the request.
        Rejected { status: u16, message: String } =>
            "image service rejected the request with status {status}: {message}",
        /// The service answered with an unexpected payload.
        Decode { message: String } => "image service response could not be decoded: {message}",
    }
}

/// Generates and fetches images for AI designs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Ask the service for an image and return its URL.
    async fn generate(&self, prompt: &Prompt) -> Result<String, ImageGeneratorError>;

    /// Download a generated image.
    async fn download(&self, image_url: &str) -> Result<DownloadedImage, ImageGeneratorError>;
}

/// Generator used when no AI endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageGenerator;

#[async_trait]
impl ImageGenerator for DisabledImageGenerator {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, ImageGeneratorError> {
        Err(ImageGeneratorError::not_configured())
    }

    async fn download(&self, _image_url: &str) -> Result<DownloadedImage, ImageGeneratorError> {
        Err(ImageGeneratorError::not_configured())
    }
}
