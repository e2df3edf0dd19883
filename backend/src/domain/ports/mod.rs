//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`RecordStore`, `FallbackCache`, `LocalMirror`,
//! `InteractionGateway`, `DesignFeed`, `AuthProvider`, `ImageGenerator`) are
//! implemented by outbound adapters. Driving ports (`DesignCatalogue`,
//! `LikeInteractions`, ...) are implemented by domain services and called
//! by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod auth_provider;
mod comment_thread;
mod design_catalogue;
mod design_feed;
mod fallback_cache;
mod favorite_interactions;
mod follow_interactions;
mod image_generation;
mod image_generator;
mod interaction_gateway;
mod like_interactions;
mod local_mirror;
mod record_store;
mod tag_catalogue;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::Accounts;
#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError, FixtureAuthProvider};
#[cfg(test)]
pub use comment_thread::MockCommentThread;
pub use comment_thread::CommentThread;
#[cfg(test)]
pub use design_catalogue::MockDesignCatalogue;
pub use design_catalogue::DesignCatalogue;
#[cfg(test)]
pub use design_feed::MockDesignFeed;
pub use design_feed::DesignFeed;
pub use fallback_cache::FallbackCache;
#[cfg(test)]
pub use favorite_interactions::MockFavoriteInteractions;
pub use favorite_interactions::FavoriteInteractions;
#[cfg(test)]
pub use follow_interactions::MockFollowInteractions;
pub use follow_interactions::FollowInteractions;
#[cfg(test)]
pub use image_generation::MockImageGeneration;
pub use image_generation::ImageGeneration;
#[cfg(test)]
pub use image_generator::MockImageGenerator;
pub use image_generator::{
    DOWNLOAD_TIMEOUT, DisabledImageGenerator, GENERATION_TIMEOUT, ImageGenerator,
    ImageGeneratorError,
};
#[cfg(test)]
pub use interaction_gateway::MockInteractionGateway;
pub use interaction_gateway::{GatewayError, InteractionGateway, ToggleState};
#[cfg(test)]
pub use like_interactions::MockLikeInteractions;
pub use like_interactions::LikeInteractions;
#[cfg(test)]
pub use local_mirror::MockLocalMirror;
pub use local_mirror::{LocalMirror, LocalMirrorError, MirrorKey};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{
    AccessTier, Credential, Filter, Operation, Order, RecordStore, RecordStoreError, Relation,
    Row, StoreRequest, decode_rows, encode_row,
};
#[cfg(test)]
pub use tag_catalogue::MockTagCatalogue;
pub use tag_catalogue::TagCatalogue;
