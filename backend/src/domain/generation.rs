//! AI image generation values.

use serde::{Deserialize, Serialize};

/// Maximum prompt length after trimming.
pub const PROMPT_MAX: usize = 1000;

/// Validation errors for [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptValidationError {
    #[error("prompt must not be empty")]
    Empty,
    #[error("prompt must be at most {max} characters")]
    TooLong { max: usize },
}

/// Trimmed text prompt sent to the image service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prompt(String);

impl Prompt {
    pub fn new(raw: &str) -> Result<Self, PromptValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PromptValidationError::Empty);
        }
        if trimmed.chars().count() > PROMPT_MAX {
            return Err(PromptValidationError::TooLong { max: PROMPT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Prompt> for String {
    fn from(value: Prompt) -> Self {
        value.0
    }
}

impl TryFrom<String> for Prompt {
    type Error = PromptValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Image bytes fetched from the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Result of a completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image_url: String,
    pub content_type: String,
    pub size_bytes: usize,
}
