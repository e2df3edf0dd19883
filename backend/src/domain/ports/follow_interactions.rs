//! Driving port for follows.

use async_trait::async_trait;

use crate::domain::{Caller, Connections, Error, FollowOutcome, UserId};

/// Following other designers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowInteractions: Send + Sync {
    /// Followers and followees of `user_id`.
    async fn connections(&self, caller: &Caller, user_id: &UserId) -> Result<Connections, Error>;

    /// Follow `followed_id`. A repeated follow reports `already_following`.
    async fn follow(
        &self,
        caller: &Caller,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<FollowOutcome, Error>;

    /// Stop following. Unfollowing an absent edge succeeds.
    async fn unfollow(
        &self,
        caller: &Caller,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<(), Error>;
}
