//! Reqwest-backed image generation adapter.
//!
//! Targets an images API that accepts `{ "prompt", "n", "size" }` and answers
//! with `{ "data": [{ "url" }] }`. Each call carries its own timeout:
//! [`GENERATION_TIMEOUT`] for generation and [`DOWNLOAD_TIMEOUT`] for the
//! image fetch. Downloads larger than [`MAX_IMAGE_BYTES`] are abandoned.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{DOWNLOAD_TIMEOUT, GENERATION_TIMEOUT, ImageGenerator, ImageGeneratorError};
use crate::domain::{DownloadedImage, Prompt};

const IMAGE_SIZE: &str = "1024x1024";
const DEFAULT_CONTENT_TYPE: &str = "image/png";
/// Largest image body accepted from the image host.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct GenerationDto {
    data: Vec<ImageDto>,
}

#[derive(Debug, Deserialize)]
struct ImageDto {
    url: Option<String>,
}

fn ensure_within_limit(len: usize) -> Result<(), ImageGeneratorError> {
    if len > MAX_IMAGE_BYTES {
        return Err(ImageGeneratorError::decode(format!(
            "image body exceeds {MAX_IMAGE_BYTES} bytes"
        )));
    }
    Ok(())
}

fn append_capped(buffer: &mut Vec<u8>, chunk: &[u8]) -> Result<(), ImageGeneratorError> {
    ensure_within_limit(buffer.len().saturating_add(chunk.len()))?;
    buffer.extend_from_slice(chunk);
    Ok(())
}

/// [`ImageGenerator`] calling a hosted images endpoint.
pub struct HttpImageGenerator {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

fn map_transport_error(stage: &str, error: reqwest::Error) -> ImageGeneratorError {
    if error.is_timeout() {
        ImageGeneratorError::timeout(stage)
    } else {
        ImageGeneratorError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageGeneratorError {
    let preview: String = String::from_utf8_lossy(body).chars().take(200).collect();
    ImageGeneratorError::rejected(status.as_u16(), preview)
}

fn first_url(body: &[u8]) -> Result<String, ImageGeneratorError> {
    let decoded: GenerationDto = serde_json::from_slice(body)
        .map_err(|err| ImageGeneratorError::decode(format!("invalid generation payload: {err}")))?;
    decoded
        .data
        .into_iter()
        .find_map(|image| image.url)
        .ok_or_else(|| ImageGeneratorError::decode("generation payload has no image url"))
}

impl HttpImageGenerator {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: Zeroizing<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ImageGeneratorError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(GENERATION_TIMEOUT)
            .bearer_auth(self.api_key.as_str())
            .json(&json!({ "prompt": prompt.as_str(), "n": 1, "size": IMAGE_SIZE }))
            .send()
            .await
            .map_err(|err| map_transport_error("generation", err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error("generation", err))?;
        debug!(status = status.as_u16(), "image generation response");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        first_url(body.as_ref())
    }

    async fn download(&self, image_url: &str) -> Result<DownloadedImage, ImageGeneratorError> {
        let url = Url::parse(image_url)
            .map_err(|err| ImageGeneratorError::decode(format!("invalid image url: {err}")))?;
        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|err| map_transport_error("download", err))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();
        if let Some(declared) = response.content_length() {
            ensure_within_limit(usize::try_from(declared).unwrap_or(usize::MAX))?;
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| map_transport_error("download", err))?
        {
            append_capped(&mut bytes, &chunk)?;
        }
        if !status.is_success() {
            return Err(map_status_error(status, &bytes));
        }
        Ok(DownloadedImage {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"data":[{"url":"https://img.example/1.png"}]}"#, Some("https://img.example/1.png"))]
    #[case(r#"{"data":[{"b64_json":"AAAA"}]}"#, None)]
    #[case(r#"{"data":[]}"#, None)]
    fn extracts_first_url(#[case] body: &str, #[case] expected: Option<&str>) {
        let url = first_url(body.as_bytes()).ok();
        assert_eq!(url.as_deref(), expected);
    }

    #[rstest]
    fn status_errors_keep_code() {
        let err = map_status_error(StatusCode::TOO_MANY_REQUESTS, b"slow down");
        assert_eq!(
            err,
            ImageGeneratorError::Rejected {
                status: 429,
                message: "slow down".to_owned()
            }
        );
    }

    #[rstest]
    fn image_body_is_collected_up_to_the_cap() {
        let mut buffer = Vec::new();
        append_capped(&mut buffer, &vec![0_u8; MAX_IMAGE_BYTES - 1]).expect("below cap");
        append_capped(&mut buffer, &[1]).expect("exactly at cap");
        assert_eq!(buffer.len(), MAX_IMAGE_BYTES);

        let err = append_capped(&mut buffer, &[2]).expect_err("past cap");
        assert_eq!(err.kind(), "decode");
        assert_eq!(buffer.len(), MAX_IMAGE_BYTES);
    }

    #[rstest]
    #[case(0, true)]
    #[case(MAX_IMAGE_BYTES, true)]
    #[case(MAX_IMAGE_BYTES + 1, false)]
    #[case(usize::MAX, false)]
    fn declared_length_is_checked_before_reading(#[case] declared: usize, #[case] accepted: bool) {
        assert_eq!(ensure_within_limit(declared).is_ok(), accepted);
    }
}
