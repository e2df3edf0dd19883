//! Follow HTTP handlers.
//!
//! ```text
//! GET    /api/v1/follows?userId=
//! POST   /api/v1/follows
//! DELETE /api/v1/follows?followerId=&followedId=
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Connections, Follow, FollowOutcome, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::{ErrorSchema, FollowSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, required_user_id};

const USER_ID: FieldName = FieldName::new("userId");
const FOLLOWER_ID: FieldName = FieldName::new("followerId");
const FOLLOWED_ID: FieldName = FieldName::new("followedId");

/// Follow edge, as query or body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FollowPairRequest {
    pub follower_id: Option<String>,
    pub followed_id: Option<String>,
}

impl FollowPairRequest {
    fn into_ids(self) -> ApiResult<(UserId, UserId)> {
        Ok((
            required_user_id(self.follower_id, FOLLOWER_ID)?,
            required_user_id(self.followed_id, FOLLOWED_ID)?,
        ))
    }
}

/// Subject of the connections listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConnectionsQuery {
    pub user_id: Option<String>,
}

/// Follower and followee ids of one user.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionsResponse {
    #[schema(value_type = Vec<String>)]
    pub followers: Vec<UserId>,
    #[schema(value_type = Vec<String>)]
    pub following: Vec<UserId>,
}

impl From<Connections> for ConnectionsResponse {
    fn from(value: Connections) -> Self {
        Self {
            followers: value.followers,
            following: value.following,
        }
    }
}

/// Outcome of a follow request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowOutcomeResponse {
    #[schema(value_type = FollowSchema)]
    pub follow: Follow,
    pub already_following: bool,
}

impl From<FollowOutcome> for FollowOutcomeResponse {
    fn from(value: FollowOutcome) -> Self {
        Self {
            follow: value.follow,
            already_following: value.already_following,
        }
    }
}

/// Followers and followees of a user.
#[utoipa::path(
    get,
    path = "/api/v1/follows",
    params(ConnectionsQuery),
    responses(
        (status = 200, description = "Connections", body = ConnectionsResponse),
        (status = 400, description = "Missing user id", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "listFollows"
)]
#[get("/follows")]
pub async fn list_follows(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<ConnectionsQuery>,
) -> ApiResult<web::Json<ConnectionsResponse>> {
    let user_id = required_user_id(query.into_inner().user_id, USER_ID)?;
    let connections = state
        .follows
        .connections(&caller.into_inner(), &user_id)
        .await?;
    Ok(web::Json(connections.into()))
}

/// Follow another designer.
#[utoipa::path(
    post,
    path = "/api/v1/follows",
    request_body = FollowPairRequest,
    responses(
        (status = 200, description = "Follow stored or already present", body = FollowOutcomeResponse),
        (status = 400, description = "Invalid request or self-follow", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "follow"
)]
#[post("/follows")]
pub async fn follow(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<FollowPairRequest>,
) -> ApiResult<web::Json<FollowOutcomeResponse>> {
    let (follower_id, followed_id) = payload.into_inner().into_ids()?;
    let outcome = state
        .follows
        .follow(&caller.into_inner(), &follower_id, &followed_id)
        .await?;
    Ok(web::Json(outcome.into()))
}

/// Stop following. Unfollowing an absent edge succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/follows",
    params(FollowPairRequest),
    responses(
        (status = 204, description = "Follow removed or already absent"),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "unfollow"
)]
#[delete("/follows")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<FollowPairRequest>,
) -> ApiResult<HttpResponse> {
    let (follower_id, followed_id) = query.into_inner().into_ids()?;
    state
        .follows
        .unfollow(&caller.into_inner(), &follower_id, &followed_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, test_app};
    use crate::outbound::store::InMemoryRecordStore;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn follow_request(follower: &str, followed: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/v1/follows")
            .set_json(json!({ "followerId": follower, "followedId": followed }))
    }

    #[actix_web::test]
    async fn follow_is_reported_in_both_directions() {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;

        let first = actix_test::call_service(&app, follow_request("u1", "u2").to_request()).await;
        let first: Value = actix_test::read_body_json(first).await;
        assert_eq!(first["alreadyFollowing"], json!(false));
        let again = actix_test::call_service(&app, follow_request("u1", "u2").to_request()).await;
        let again: Value = actix_test::read_body_json(again).await;
        assert_eq!(again["alreadyFollowing"], json!(true));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/follows?userId=u2")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "followers": ["u1"], "following": [] }));
    }

    #[actix_web::test]
    async fn self_follow_is_rejected() {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;

        let res = actix_test::call_service(&app, follow_request("u1", "u1").to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unfollow_is_idempotent() {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;
        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::delete()
                    .uri("/api/v1/follows?followerId=u1&followedId=u2")
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NO_CONTENT);
        }
    }
}
