//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every gallery endpoint of the inbound HTTP layer, the
//! domain schema wrappers from [`crate::inbound::http::schemas`] and two
//! security schemes: the session cookie set by `POST /api/v1/auth/login`
//! and the equivalent bearer token.
//!
//! Swagger UI serves the document in debug builds; the `openapi-dump` binary
//! prints it for external tooling.

use crate::inbound::http::auth::{
    LoginRequest, ProfileResponse, RegisterRequest, RegisterResponse, SessionResponse, SessionUser,
};
use crate::inbound::http::comments::{CommentsResponse, PostCommentRequest, PostedCommentResponse};
use crate::inbound::http::designs::{
    CreateDesignRequest, DesignResponse, DesignsResponse, UpdateDesignRequest,
};
use crate::inbound::http::favorites::{
    FavoriteOutcomeResponse, FavoritePairRequest, FavoritesResponse,
};
use crate::inbound::http::follows::{ConnectionsResponse, FollowOutcomeResponse, FollowPairRequest};
use crate::inbound::http::generation::{GenerateRequest, GeneratedImageResponse};
use crate::inbound::http::likes::{LikeStatusResponse, ToggleLikeRequest};
use crate::inbound::http::schemas::{
    CommentSchema, DesignSchema, ErrorCodeSchema, ErrorSchema, FavoriteSchema, FollowSchema,
    ProfileSchema,
};
use crate::inbound::http::tags::{
    DesignTagsResponse, PopularTag, PopularTagsResponse, ReplaceTagsRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie and bearer schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Access token returned by POST /api/v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pawprint gallery API",
        description = "Designs, social interactions, tags and accounts for the \
                       pet illustration gallery. Anonymous callers are served \
                       at the least privileged storage tier.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security((), ("SessionCookie" = []), ("BearerToken" = [])),
    paths(
        crate::inbound::http::designs::list_designs,
        crate::inbound::http::designs::get_design,
        crate::inbound::http::designs::create_design,
        crate::inbound::http::designs::update_design,
        crate::inbound::http::designs::delete_design,
        crate::inbound::http::likes::like_status,
        crate::inbound::http::likes::toggle_like,
        crate::inbound::http::favorites::list_favorites,
        crate::inbound::http::favorites::add_favorite,
        crate::inbound::http::favorites::remove_favorite,
        crate::inbound::http::follows::list_follows,
        crate::inbound::http::follows::follow,
        crate::inbound::http::follows::unfollow,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::post_comment,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::replace_tags,
        crate::inbound::http::tags::remove_tag,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::profile,
        crate::inbound::http::generation::generate,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        DesignSchema,
        FavoriteSchema,
        FollowSchema,
        CommentSchema,
        ProfileSchema,
        CreateDesignRequest,
        UpdateDesignRequest,
        DesignsResponse,
        DesignResponse,
        ToggleLikeRequest,
        LikeStatusResponse,
        FavoritePairRequest,
        FavoritesResponse,
        FavoriteOutcomeResponse,
        FollowPairRequest,
        ConnectionsResponse,
        FollowOutcomeResponse,
        PostCommentRequest,
        CommentsResponse,
        PostedCommentResponse,
        ReplaceTagsRequest,
        DesignTagsResponse,
        PopularTag,
        PopularTagsResponse,
        LoginRequest,
        RegisterRequest,
        SessionUser,
        SessionResponse,
        RegisterResponse,
        ProfileResponse,
        GenerateRequest,
        GeneratedImageResponse,
    )),
    tags(
        (name = "designs", description = "Saving, listing and editing designs"),
        (name = "interactions", description = "Likes, favourites, follows and comments"),
        (name = "tags", description = "Design tags"),
        (name = "auth", description = "Sign-in and profiles via the hosted auth provider"),
        (name = "generation", description = "AI image generation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema registration and field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const DESIGN_SCHEMA_NAME: &str = "crate.domain.Design";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "traceId")]
    #[case(DESIGN_SCHEMA_NAME, "design_type")]
    #[case(DESIGN_SCHEMA_NAME, "likes_count")]
    fn registered_schemas_expose_wire_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/designs")]
    #[case("/api/v1/designs/{id}")]
    #[case("/api/v1/likes")]
    #[case("/api/v1/favorites")]
    #[case("/api/v1/follows")]
    #[case("/api/v1/comments")]
    #[case("/api/v1/tags")]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/auth/profile")]
    #[case("/api/v1/generate")]
    #[case("/health/ready")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn both_security_schemes_are_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
