//! Comment HTTP handlers.
//!
//! ```text
//! GET  /api/v1/comments?designId=
//! POST /api/v1/comments
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Comment, CommentContent, PostedComment};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::{CommentSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, interaction_error, require, required_design_id, required_user_id,
};

const USER_ID: FieldName = FieldName::new("userId");
const DESIGN_ID: FieldName = FieldName::new("designId");
const CONTENT: FieldName = FieldName::new("content");

/// Thread selector.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommentsQuery {
    pub design_id: Option<String>,
}

/// Request payload for posting a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentRequest {
    pub design_id: Option<String>,
    pub user_id: Option<String>,
    #[schema(example = "Love the ears!")]
    pub content: Option<String>,
}

/// Comments of one design.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    #[schema(value_type = Vec<CommentSchema>)]
    pub comments: Vec<Comment>,
}

/// A posted comment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostedCommentResponse {
    #[schema(value_type = CommentSchema)]
    pub comment: Comment,
    /// Synthesised for a transient user and not stored.
    pub is_temp: bool,
}

impl From<PostedComment> for PostedCommentResponse {
    fn from(value: PostedComment) -> Self {
        Self {
            comment: value.comment,
            is_temp: value.is_temp,
        }
    }
}

/// Comments on a design, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/comments",
    params(CommentsQuery),
    responses(
        (status = 200, description = "Comments", body = CommentsResponse),
        (status = 400, description = "Missing design id", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "listComments"
)]
#[get("/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<CommentsQuery>,
) -> ApiResult<web::Json<CommentsResponse>> {
    let design_id = required_design_id(query.into_inner().design_id, DESIGN_ID)?;
    let comments = state.comments.list(&caller.into_inner(), &design_id).await?;
    Ok(web::Json(CommentsResponse { comments }))
}

/// Post a comment on a design.
///
/// Stored comments answer `201`; a transient user's comment is echoed back
/// with `200` and `isTemp: true`.
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = PostCommentRequest,
    responses(
        (status = 201, description = "Comment stored", body = PostedCommentResponse),
        (status = 200, description = "Transient comment, not stored", body = PostedCommentResponse),
        (status = 400, description = "Invalid comment", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "postComment"
)]
#[post("/comments")]
pub async fn post_comment(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<PostCommentRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let design_id = required_design_id(payload.design_id, DESIGN_ID)?;
    let author_id = required_user_id(payload.user_id, USER_ID)?;
    let content = require(payload.content, CONTENT)?;
    let content = CommentContent::new(&content).map_err(|err| interaction_error(&err))?;

    let posted = state
        .comments
        .post(&caller.into_inner(), &design_id, &author_id, content)
        .await?;
    let mut response = if posted.is_temp {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    Ok(response.json(PostedCommentResponse::from(posted)))
}
