//! AI image generation handler.
//!
//! ```text
//! POST /api/v1/generate
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GeneratedImage, Prompt};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, prompt_error, require, required_user_id};

const USER_ID: FieldName = FieldName::new("userId");
const PROMPT: FieldName = FieldName::new("prompt");

/// Request payload for generating an image.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[schema(example = "a sleepy tabby in watercolour")]
    pub prompt: Option<String>,
    pub user_id: Option<String>,
}

/// Generated image reference.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageResponse {
    pub image_url: String,
    pub content_type: String,
    pub size_bytes: usize,
}

impl From<GeneratedImage> for GeneratedImageResponse {
    fn from(value: GeneratedImage) -> Self {
        Self {
            image_url: value.image_url,
            content_type: value.content_type,
            size_bytes: value.size_bytes,
        }
    }
}

/// Generate artwork for an AI design.
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Image generated", body = GeneratedImageResponse),
        (status = 400, description = "Invalid prompt", body = ErrorSchema),
        (status = 403, description = "Transient users cannot generate images", body = ErrorSchema),
        (status = 503, description = "Image service unavailable", body = ErrorSchema),
        (status = 504, description = "Generation or download timed out", body = ErrorSchema)
    ),
    tags = ["generation"],
    operation_id = "generateImage"
)]
#[post("/generate")]
pub async fn generate(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateRequest>,
) -> ApiResult<web::Json<GeneratedImageResponse>> {
    let payload = payload.into_inner();
    let user_id = required_user_id(payload.user_id, USER_ID)?;
    let prompt = require(payload.prompt, PROMPT)?;
    let prompt = Prompt::new(&prompt).map_err(|err| prompt_error(&err))?;
    let image = state.generation.generate(&user_id, &prompt).await?;
    Ok(web::Json(image.into()))
}
