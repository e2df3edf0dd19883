//! Favourite HTTP handlers.
//!
//! ```text
//! GET    /api/v1/favorites?userId=
//! POST   /api/v1/favorites
//! DELETE /api/v1/favorites?userId=&designId=
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Favorite, FavoriteKey, FavoriteOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::credentials::RequestCaller;
use crate::inbound::http::schemas::{ErrorSchema, FavoriteSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, required_design_id, required_user_id};

const USER_ID: FieldName = FieldName::new("userId");
const DESIGN_ID: FieldName = FieldName::new("designId");

/// Favourite pair, as query or body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FavoritePairRequest {
    pub user_id: Option<String>,
    pub design_id: Option<String>,
}

impl FavoritePairRequest {
    fn into_key(self) -> ApiResult<FavoriteKey> {
        Ok(FavoriteKey {
            user_id: required_user_id(self.user_id, USER_ID)?,
            design_id: required_design_id(self.design_id, DESIGN_ID)?,
        })
    }
}

/// Owner filter of the favourites listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FavoritesQuery {
    pub user_id: Option<String>,
}

/// Favourites of one user.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    #[schema(value_type = Vec<FavoriteSchema>)]
    pub favorites: Vec<Favorite>,
}

/// Outcome of adding a favourite.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteOutcomeResponse {
    #[schema(value_type = FavoriteSchema)]
    pub favorite: Favorite,
    /// The pair already existed; nothing was written.
    pub already_favorited: bool,
    /// Transient user's favourite, kept in process memory only.
    pub is_temp: bool,
}

impl From<FavoriteOutcome> for FavoriteOutcomeResponse {
    fn from(value: FavoriteOutcome) -> Self {
        Self {
            favorite: value.favorite,
            already_favorited: value.already_favorited,
            is_temp: value.is_temp,
        }
    }
}

/// List a user's favourites, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    params(FavoritesQuery),
    responses(
        (status = 200, description = "Favourites", body = FavoritesResponse),
        (status = 400, description = "Missing user id", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "listFavorites"
)]
#[get("/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<FavoritesQuery>,
) -> ApiResult<web::Json<FavoritesResponse>> {
    let user_id = required_user_id(query.into_inner().user_id, USER_ID)?;
    let favorites = state.favorites.list(&caller.into_inner(), &user_id).await?;
    Ok(web::Json(FavoritesResponse { favorites }))
}

/// Bookmark a design.
#[utoipa::path(
    post,
    path = "/api/v1/favorites",
    request_body = FavoritePairRequest,
    responses(
        (status = 200, description = "Favourite stored or already present", body = FavoriteOutcomeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "addFavorite"
)]
#[post("/favorites")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    payload: web::Json<FavoritePairRequest>,
) -> ApiResult<web::Json<FavoriteOutcomeResponse>> {
    let key = payload.into_inner().into_key()?;
    let outcome = state.favorites.add(&caller.into_inner(), key).await?;
    Ok(web::Json(outcome.into()))
}

/// Remove a bookmark. Removing an absent favourite succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/favorites",
    params(FavoritePairRequest),
    responses(
        (status = 204, description = "Favourite removed or already absent"),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["interactions"],
    operation_id = "removeFavorite"
)]
#[delete("/favorites")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    caller: RequestCaller,
    query: web::Query<FavoritePairRequest>,
) -> ApiResult<HttpResponse> {
    let key = query.into_inner().into_key()?;
    state.favorites.remove(&caller.into_inner(), &key).await?;
    Ok(HttpResponse::NoContent().finish())
}
