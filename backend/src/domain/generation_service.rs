//! AI image generation for designs.
//!
//! Generation and download each run under a fixed wall-clock budget. The
//! budgets are enforced here as well as in the adapter so that a slow
//! adapter can never hold a request open indefinitely.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{DOWNLOAD_TIMEOUT, GENERATION_TIMEOUT, ImageGeneration, ImageGenerator, ImageGeneratorError};
use super::{Error, GeneratedImage, Prompt, UserId};

/// Service implementing [`ImageGeneration`].
#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn ImageGenerator>,
    generation_budget: Duration,
    download_budget: Duration,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            generation_budget: GENERATION_TIMEOUT,
            download_budget: DOWNLOAD_TIMEOUT,
        }
    }

    /// Override the wall-clock budgets.
    pub fn with_budgets(mut self, generation: Duration, download: Duration) -> Self {
        self.generation_budget = generation;
        self.download_budget = download;
        self
    }

    async fn bounded<T>(
        stage: &'static str,
        budget: Duration,
        call: impl Future<Output = Result<T, ImageGeneratorError>>,
    ) -> Result<T, ImageGeneratorError> {
        tokio::time::timeout(budget, call)
            .await
            .unwrap_or_else(|_| Err(ImageGeneratorError::timeout(stage)))
    }

    fn map_error(error: ImageGeneratorError) -> Error {
        match error {
            ImageGeneratorError::NotConfigured => {
                Error::service_unavailable("image generation is not configured")
            }
            ImageGeneratorError::Timeout { stage } => {
                Error::timeout(format!("image {stage} timed out; please try again"))
            }
            ImageGeneratorError::Transport { message } => {
                Error::service_unavailable(format!("image service unavailable: {message}"))
            }
            ImageGeneratorError::Rejected { status, message } if status < 500 => {
                Error::invalid_request(message)
            }
            ImageGeneratorError::Rejected { message, .. } => {
                Error::service_unavailable(format!("image service failed: {message}"))
            }
            ImageGeneratorError::Decode { message } => {
                Error::internal(format!("image service response invalid: {message}"))
            }
        }
    }
}

#[async_trait]
impl ImageGeneration for GenerationService {
    async fn generate(&self, user_id: &UserId, prompt: &Prompt) -> Result<GeneratedImage, Error> {
        if user_id.is_transient() {
            return Err(Error::forbidden("sign in to generate AI images"));
        }
        let image_url = Self::bounded("generation", self.generation_budget, self.generator.generate(prompt))
            .await
            .map_err(|err| {
                warn!(%user_id, error = %err, "image generation failed");
                Self::map_error(err)
            })?;
        let image = Self::bounded("download", self.download_budget, self.generator.download(&image_url))
            .await
            .map_err(|err| {
                warn!(%user_id, error = %err, "image download failed");
                Self::map_error(err)
            })?;
        info!(%user_id, size_bytes = image.bytes.len(), "image generated");
        Ok(GeneratedImage {
            image_url,
            content_type: image.content_type,
            size_bytes: image.bytes.len(),
        })
    }
}
