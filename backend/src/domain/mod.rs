//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed gallery entities (designs, likes,
//! favourites, follows, comments, tags) and the services that implement the
//! driving ports on top of the tiered record store.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Design, NewDesign, DesignPatch: artwork aggregate and its commands.
//! - TieredStore: record store access with privilege escalation.
//! - *Service: driving port implementations used by the HTTP adapter.
//! - MirrorStore, GalleryService, LikeController, PreferenceController:
//!   the client-side view over the local mirror.

pub mod ports;
pub mod reconcile;

mod account_service;
mod auth;
mod comment_service;
mod controllers;
mod counters;
mod design;
mod design_service;
mod error;
mod favorite_service;
mod follow_service;
mod gallery;
mod generation;
mod generation_service;
mod interactions;
mod like_service;
mod mirror;
mod profile;
mod tag_service;
mod tags;
mod tiered_store;
mod trace_id;
mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    AccessToken, AuthSession, AuthUser, Caller, CredentialsValidationError, LoginCredentials,
    PASSWORD_MIN, Registered, Registration,
};
pub use self::comment_service::CommentService;
pub use self::controllers::{
    Confirmation, LikeController, LikeSnapshot, PreferenceController, PreferenceTarget,
};
pub use self::counters::DesignCounter;
pub use self::design::{
    Components, DEFAULT_TITLE, Design, DesignContent, DesignDraft, DesignFilter, DesignId,
    DesignKind, DesignPatch, DesignRow, DesignValidationError, LOCAL_ID_PREFIX, NewDesign,
    TITLE_MAX, Visibility,
};
pub use self::design_service::{CachedDesign, DesignCache, DesignService};
pub use self::error::{Error, ErrorCode};
pub use self::favorite_service::{FavoriteLedger, FavoriteService};
pub use self::follow_service::FollowService;
pub use self::gallery::GalleryService;
pub use self::generation::{
    DownloadedImage, GeneratedImage, PROMPT_MAX, Prompt, PromptValidationError,
};
pub use self::generation_service::GenerationService;
pub use self::interactions::{
    COMMENT_MAX, Comment, CommentContent, Connections, Favorite, FavoriteKey, FavoriteOutcome,
    Follow, FollowOutcome, InteractionValidationError, Like, LikeStatus, PostedComment,
};
pub use self::like_service::LikeService;
pub use self::mirror::MirrorStore;
pub use self::profile::Profile;
pub use self::tag_service::TagService;
pub use self::tags::{TAG_NAME_MAX, TAGS_PER_DESIGN_MAX, Tag, TagName, TagSet, TagValidationError};
pub use self::tiered_store::{CredentialPolicy, EscalateOnRejection, Tiered, TieredStore};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{TRANSIENT_PREFIX, USER_ID_MAX, UserId, UserIdValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use pawprint::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
