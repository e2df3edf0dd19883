//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the wire shape of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Not permitted, even with elevated store privileges.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing feature is not available.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// A remote call exceeded its time budget.
    #[schema(rename = "timeout")]
    Timeout,
    /// The write was rejected by every storage tier.
    #[schema(rename = "persistence_failed")]
    PersistenceFailed,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "user_id is required")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, e.g. `{ "field", "code" }` or the
    /// storage `reason` of a failed design save.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Design`].
///
/// Saved design as stored in the `designs` relation.
#[derive(ToSchema)]
#[schema(as = crate::domain::Design)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DesignSchema {
    #[schema(example = "9b2e5c1a-4f0d-4a51-8d3e-2f6f0c7b1a22")]
    id: String,
    #[schema(example = "Midnight Whiskers")]
    title: String,
    /// Owner id; `temp-` prefixed for transient users.
    #[schema(example = "temp-1718000000000-k3j9x2")]
    user_id: String,
    /// `vector` or `ai_image`.
    #[schema(example = "vector")]
    design_type: String,
    /// Slot selections of a vector design.
    components: Option<serde_json::Value>,
    /// Image location of an AI design.
    image_url: Option<String>,
    is_public: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: Option<String>,
    likes_count: u64,
    comments_count: u64,
}

/// OpenAPI schema for [`crate::domain::Favorite`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Favorite)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FavoriteSchema {
    user_id: String,
    design_id: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Follow`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Follow)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FollowSchema {
    follower_id: String,
    followed_id: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Comment`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Comment)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommentSchema {
    id: String,
    design_id: String,
    /// Author id.
    user_id: String,
    #[schema(example = "Love the ears!")]
    content: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Profile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Profile)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProfileSchema {
    id: String,
    username: Option<String>,
    email: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}
