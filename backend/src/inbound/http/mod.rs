//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate requests into driving port calls on [`state::HttpState`]
//! and map domain errors onto the JSON error envelope. [`configure`] mounts
//! every gallery endpoint; callers place it under the `/api/v1` scope.

use actix_web::web;

pub mod auth;
pub mod comments;
pub mod credentials;
pub mod designs;
pub mod error;
pub mod favorites;
pub mod follows;
pub mod generation;
pub mod health;
pub mod likes;
pub mod schemas;
pub mod session;
pub mod state;
pub mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

/// Register the gallery endpoints on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(designs::list_designs)
        .service(designs::get_design)
        .service(designs::create_design)
        .service(designs::update_design)
        .service(designs::delete_design)
        .service(likes::like_status)
        .service(likes::toggle_like)
        .service(favorites::list_favorites)
        .service(favorites::add_favorite)
        .service(favorites::remove_favorite)
        .service(follows::list_follows)
        .service(follows::follow)
        .service(follows::unfollow)
        .service(comments::list_comments)
        .service(comments::post_comment)
        .service(tags::list_tags)
        .service(tags::replace_tags)
        .service(tags::remove_tag)
        .service(auth::login)
        .service(auth::register)
        .service(auth::logout)
        .service(auth::profile)
        .service(generation::generate);
}
