//! Driving port for likes.

use async_trait::async_trait;

use crate::domain::{Caller, DesignId, Error, LikeStatus, UserId};

/// Like status and toggling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeInteractions: Send + Sync {
    /// Like count of a design and, when `user_id` is given, whether that user
    /// liked it.
    async fn status(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        user_id: Option<UserId>,
    ) -> Result<LikeStatus, Error>;

    /// Flip the like of `user_id` on `design_id`.
    async fn toggle(
        &self,
        caller: &Caller,
        user_id: &UserId,
        design_id: &DesignId,
    ) -> Result<LikeStatus, Error>;
}
