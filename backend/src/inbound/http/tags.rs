//! Tag HTTP handlers.
//!
//! ```text
//! GET    /api/v1/tags?designId=
//! GET    /api/v1/tags
//! POST   /api/v1/tags
//! DELETE /api/v1/tags?designId=&tag=
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Tag, TagName, TagSet};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, require, required_design_id, tags_error,
};

const DESIGN_ID: FieldName = FieldName::new("designId");
const TAGS: FieldName = FieldName::new("tags");
const TAG: FieldName = FieldName::new("tag");

/// Number of tags returned by the popular listing.
pub const POPULAR_TAGS_LIMIT: usize = 20;

/// Tag lookup. Without `designId` the most used tags are returned.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TagsQuery {
    pub design_id: Option<String>,
}

/// Association to remove.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RemoveTagQuery {
    pub design_id: Option<String>,
    pub tag: Option<String>,
}

/// Request payload replacing a design's tags.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTagsRequest {
    pub design_id: Option<String>,
    /// Up to ten names; trimmed, lowercased and deduplicated.
    #[schema(example = json!(["cat", "night"]))]
    pub tags: Option<Vec<String>>,
}

/// Tag names of one design.
#[derive(Debug, Serialize, ToSchema)]
pub struct DesignTagsResponse {
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<TagName>,
}

/// Tag with its usage count.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularTag {
    pub id: String,
    #[schema(value_type = String)]
    pub name: TagName,
    pub usage_count: u64,
}

impl From<Tag> for PopularTag {
    fn from(value: Tag) -> Self {
        Self {
            id: value.id,
            name: value.name,
            usage_count: value.usage_count,
        }
    }
}

/// Most used tags.
#[derive(Debug, Serialize, ToSchema)]
pub struct PopularTagsResponse {
    pub tags: Vec<PopularTag>,
}

/// Tags of a design, or the most used tags.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    params(TagsQuery),
    responses(
        (status = 200, description = "Tag names of the design, or popular tags when no design is given",
            body = DesignTagsResponse),
        (status = 400, description = "Invalid design id", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<TagsQuery>,
) -> ApiResult<HttpResponse> {
    let caller = caller.into_inner();
    let design_id = query
        .into_inner()
        .design_id
        .filter(|raw| !raw.trim().is_empty());
    let Some(design_id) = design_id else {
        let tags = state.tags.popular(&caller, POPULAR_TAGS_LIMIT).await?;
        return Ok(HttpResponse::Ok().json(PopularTagsResponse {
            tags: tags.into_iter().map(PopularTag::from).collect(),
        }));
    };
    let design_id = required_design_id(Some(design_id), DESIGN_ID)?;
    let tags = state.tags.tags_for(&caller, &design_id).await?;
    Ok(HttpResponse::Ok().json(DesignTagsResponse { tags }))
}

/// Replace the tag set of a design.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = ReplaceTagsRequest,
    responses(
        (status = 200, description = "Stored tag names", body = DesignTagsResponse),
        (status = 400, description = "Invalid tags", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "replaceTags"
)]
#[post("/tags")]
pub async fn replace_tags(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<ReplaceTagsRequest>,
) -> ApiResult<web::Json<DesignTagsResponse>> {
    let payload = payload.into_inner();
    let design_id = required_design_id(payload.design_id, DESIGN_ID)?;
    let raw = require(payload.tags, TAGS)?;
    let tags = TagSet::parse(&raw).map_err(|err| tags_error(&err))?;
    let tags = state
        .tags
        .replace(&caller.into_inner(), &design_id, tags)
        .await?;
    Ok(web::Json(DesignTagsResponse { tags }))
}

/// Detach one tag. Detaching an absent tag succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/tags",
    params(RemoveTagQuery),
    responses(
        (status = 204, description = "Tag detached or already absent"),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "removeTag"
)]
#[delete("/tags")]
pub async fn remove_tag(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<RemoveTagQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let design_id = required_design_id(query.design_id, DESIGN_ID)?;
    let raw = require(query.tag, TAG)?;
    let tag = TagName::new(&raw).map_err(|err| tags_error(&err))?;
    state
        .tags
        .remove(&caller.into_inner(), &design_id, &tag)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTagCatalogue;
    use crate::inbound::http::test_utils::{memory_state, test_app};
    use crate::outbound::store::InMemoryRecordStore;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn replace(design: &str, tags: Value) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/v1/tags")
            .set_json(json!({ "designId": design, "tags": tags }))
    }

    #[actix_web::test]
    async fn replacing_tags_normalises_and_lists_them() {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;

        let res = actix_test::call_service(
            &app,
            replace("d1", json!([" Cat ", "cat", "Night"])).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "tags": ["cat", "night"] }));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/tags?designId=d1")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "tags": ["cat", "night"] }));
    }

    #[rstest]
    #[case(json!((0..11).map(|i| format!("t{i}")).collect::<Vec<_>>()))]
    #[case(json!(["ok", "   "]))]
    #[case(json!(["x".repeat(51)]))]
    #[actix_web::test]
    async fn invalid_tag_sets_are_rejected(#[case] tags: Value) {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;

        let res = actix_test::call_service(&app, replace("d1", tags).to_request()).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], json!("invalid_tags"));
        assert!(store.calls().is_empty());
    }

    #[actix_web::test]
    async fn popular_tags_use_camel_case_counts() {
        let mut tags = MockTagCatalogue::new();
        tags.expect_popular()
            .withf(|_, limit| *limit == POPULAR_TAGS_LIMIT)
            .times(1)
            .returning(|_, _| {
                Ok(vec![Tag {
                    id: "t1".to_owned(),
                    name: TagName::new("cat").expect("tag"),
                    usage_count: 3,
                }])
            });
        let store = Arc::new(InMemoryRecordStore::default());
        let mut state = memory_state(&store);
        state.tags = Arc::new(tags);
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/tags").to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({ "tags": [{ "id": "t1", "name": "cat", "usageCount": 3 }] })
        );
    }

    #[actix_web::test]
    async fn removing_a_tag_is_idempotent() {
        let store = Arc::new(InMemoryRecordStore::default());
        let app = actix_test::init_service(test_app(memory_state(&store))).await;
        actix_test::call_service(&app, replace("d1", json!(["cat"])).to_request()).await;

        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::delete()
                    .uri("/api/v1/tags?designId=d1&tag=Cat")
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NO_CONTENT);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/tags?designId=d1")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "tags": [] }));
    }
}
