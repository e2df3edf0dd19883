//! Design HTTP handlers.
//!
//! ```text
//! GET    /api/v1/designs?userId=&isPublic=
//! GET    /api/v1/designs/{id}
//! POST   /api/v1/designs
//! PUT    /api/v1/designs/{id}
//! DELETE /api/v1/designs/{id}?userId=
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Design, DesignDraft, DesignFilter, DesignPatch, NewDesign, UserId, Visibility,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::{DesignSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, design_error, missing_field_error, parse_design_id, required_user_id,
};

const USER_ID: FieldName = FieldName::new("userId");
const OWNER_ID: FieldName = FieldName::new("user_id");
const DESIGN_ID: FieldName = FieldName::new("id");

/// Listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DesignsQuery {
    /// Only designs owned by this user.
    pub user_id: Option<String>,
    /// Only public (`true`) or private (`false`) designs. Other values are
    /// ignored.
    pub is_public: Option<String>,
}

/// Acting user of an owner-only mutation.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActingUserQuery {
    pub user_id: Option<String>,
}

/// Request payload for creating a design.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateDesignRequest {
    #[schema(example = "Midnight Whiskers")]
    pub title: Option<String>,
    #[schema(example = "temp-1718000000000-k3j9x2")]
    pub user_id: Option<String>,
    /// `vector` (default) or `ai_image`.
    pub design_type: Option<String>,
    /// Required for vector designs.
    pub components: Option<Value>,
    /// Required for AI image designs.
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
}

/// Request payload for changing a design.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateDesignRequest {
    /// Acting user; must own the design.
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub components: Option<Value>,
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
}

/// Design list envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct DesignsResponse {
    #[schema(value_type = Vec<DesignSchema>)]
    pub designs: Vec<Design>,
}

/// Single design envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct DesignResponse {
    #[schema(value_type = DesignSchema)]
    pub design: Design,
}

impl From<CreateDesignRequest> for DesignDraft {
    fn from(value: CreateDesignRequest) -> Self {
        Self {
            title: value.title,
            owner_id: value.user_id,
            design_type: value.design_type,
            components: value.components,
            image_url: value.image_url,
            is_public: value.is_public,
        }
    }
}

/// Build the listing filter. Listing never fails: an unparseable
/// visibility is dropped, and `None` means no design can match.
fn parse_filter(query: DesignsQuery) -> Option<DesignFilter> {
    let visibility = query.is_public.and_then(|raw| {
        let parsed = raw.trim().to_ascii_lowercase().parse::<bool>();
        if parsed.is_err() {
            debug!(is_public = %raw, "ignoring unparseable visibility filter");
        }
        parsed.ok().map(Visibility::from_public)
    });
    let owner_id = match query.user_id.filter(|raw| !raw.trim().is_empty()) {
        None => None,
        Some(raw) => match UserId::new(raw.trim()) {
            Ok(owner) => Some(owner),
            Err(err) => {
                debug!(error = %err, "owner filter matches no user");
                return None;
            }
        },
    };
    Some(DesignFilter {
        owner_id,
        visibility,
    })
}

fn parse_new_design(payload: CreateDesignRequest) -> ApiResult<NewDesign> {
    if payload
        .user_id
        .as_deref()
        .is_none_or(|raw| raw.trim().is_empty())
    {
        return Err(missing_field_error(OWNER_ID));
    }
    NewDesign::parse(DesignDraft::from(payload)).map_err(|err| design_error(&err))
}

/// List designs, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/designs",
    description = "Always answers 200. When the store is unreachable the list \
                   falls back to recently written designs or is empty.",
    params(DesignsQuery),
    responses(
        (status = 200, description = "Designs", body = DesignsResponse)
    ),
    tags = ["designs"],
    operation_id = "listDesigns"
)]
#[get("/designs")]
pub async fn list_designs(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<DesignsQuery>,
) -> web::Json<DesignsResponse> {
    let designs = match parse_filter(query.into_inner()) {
        Some(filter) => state.designs.list(&caller.into_inner(), &filter).await,
        None => Vec::new(),
    };
    web::Json(DesignsResponse { designs })
}

/// Fetch one design.
#[utoipa::path(
    get,
    path = "/api/v1/designs/{id}",
    params(("id" = String, Path, description = "Design id")),
    responses(
        (status = 200, description = "Design", body = DesignResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["designs"],
    operation_id = "getDesign"
)]
#[get("/designs/{id}")]
pub async fn get_design(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    path: web::Path<String>,
) -> ApiResult<web::Json<DesignResponse>> {
    let id = parse_design_id(path.into_inner(), DESIGN_ID)?;
    let design = state.designs.get(&caller.into_inner(), &id).await?;
    Ok(web::Json(DesignResponse { design }))
}

/// Save a new design.
#[utoipa::path(
    post,
    path = "/api/v1/designs",
    request_body = CreateDesignRequest,
    responses(
        (status = 201, description = "Design saved", body = DesignResponse),
        (status = 400, description = "Invalid design", body = ErrorSchema),
        (status = 403, description = "Transient users cannot save AI designs", body = ErrorSchema),
        (status = 500, description = "Every storage tier rejected the design", body = ErrorSchema)
    ),
    tags = ["designs"],
    operation_id = "createDesign"
)]
#[post("/designs")]
pub async fn create_design(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<CreateDesignRequest>,
) -> ApiResult<HttpResponse> {
    let design = parse_new_design(payload.into_inner())?;
    let design = state.designs.create(&caller.into_inner(), design).await?;
    Ok(HttpResponse::Created().json(DesignResponse { design }))
}

/// Change an owned design.
#[utoipa::path(
    put,
    path = "/api/v1/designs/{id}",
    params(("id" = String, Path, description = "Design id")),
    request_body = UpdateDesignRequest,
    responses(
        (status = 200, description = "Design updated", body = DesignResponse),
        (status = 400, description = "Invalid change", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["designs"],
    operation_id = "updateDesign"
)]
#[put("/designs/{id}")]
pub async fn update_design(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    path: web::Path<String>,
    payload: web::Json<UpdateDesignRequest>,
) -> ApiResult<web::Json<DesignResponse>> {
    let id = parse_design_id(path.into_inner(), DESIGN_ID)?;
    let payload = payload.into_inner();
    let acting = required_user_id(payload.user_id, OWNER_ID)?;
    let patch = DesignPatch {
        title: payload.title,
        components: payload.components,
        image_url: payload.image_url,
        is_public: payload.is_public,
    };
    let design = state
        .designs
        .update(&caller.into_inner(), &id, &acting, patch)
        .await?;
    Ok(web::Json(DesignResponse { design }))
}

/// Remove an owned design. Removing an absent design succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/designs/{id}",
    params(("id" = String, Path, description = "Design id"), ActingUserQuery),
    responses(
        (status = 204, description = "Design removed or already absent"),
        (status = 400, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema)
    ),
    tags = ["designs"],
    operation_id = "deleteDesign"
)]
#[delete("/designs/{id}")]
pub async fn delete_design(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    path: web::Path<String>,
    query: web::Query<ActingUserQuery>,
) -> ApiResult<HttpResponse> {
    let id = parse_design_id(path.into_inner(), DESIGN_ID)?;
    let acting = required_user_id(query.into_inner().user_id, USER_ID)?;
    state
        .designs
        .delete(&caller.into_inner(), &id, &acting)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "designs_tests.rs"]
mod tests;
