//! Like HTTP handlers.
//!
//! ```text
//! GET  /api/v1/likes?designId=&userId=
//! POST /api/v1/likes
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::LikeStatus;
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_user_id, required_design_id, required_user_id,
};

const USER_ID: FieldName = FieldName::new("userId");
const DESIGN_ID: FieldName = FieldName::new("designId");

/// Like status lookup.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LikesQuery {
    pub design_id: Option<String>,
    /// Report whether this user liked the design.
    pub user_id: Option<String>,
}

/// Request payload for toggling a like.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub user_id: Option<String>,
    pub design_id: Option<String>,
}

/// Like count and the caller's like state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub likes_count: u64,
    pub liked: bool,
}

impl From<LikeStatus> for LikeStatusResponse {
    fn from(value: LikeStatus) -> Self {
        Self {
            likes_count: value.likes_count,
            liked: value.liked,
        }
    }
}

/// Like count of a design.
#[utoipa::path(
    get,
    path = "/api/v1/likes",
    params(LikesQuery),
    responses(
        (status = 200, description = "Like status", body = LikeStatusResponse),
        (status = 400, description = "Missing design id", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "getLikes"
)]
#[get("/likes")]
pub async fn like_status(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<LikesQuery>,
) -> ApiResult<web::Json<LikeStatusResponse>> {
    let query = query.into_inner();
    let design_id = required_design_id(query.design_id, DESIGN_ID)?;
    let user_id = query
        .user_id
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_user_id(raw, USER_ID))
        .transpose()?;
    let status = state
        .likes
        .status(&caller.into_inner(), &design_id, user_id)
        .await?;
    Ok(web::Json(status.into()))
}

/// Flip a user's like on a design.
#[utoipa::path(
    post,
    path = "/api/v1/likes",
    request_body = ToggleLikeRequest,
    responses(
        (status = 200, description = "New like status", body = LikeStatusResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "toggleLike"
)]
#[post("/likes")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<ToggleLikeRequest>,
) -> ApiResult<web::Json<LikeStatusResponse>> {
    let payload = payload.into_inner();
    let user_id = required_user_id(payload.user_id, USER_ID)?;
    let design_id = required_design_id(payload.design_id, DESIGN_ID)?;
    let status = state
        .likes
        .toggle(&caller.into_inner(), &user_id, &design_id)
        .await?;
    Ok(web::Json(status.into()))
}
