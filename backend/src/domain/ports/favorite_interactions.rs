//! Driving port for favourites.

use async_trait::async_trait;

use crate::domain::{Caller, Error, Favorite, FavoriteKey, FavoriteOutcome, UserId};

/// Bookmarking designs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteInteractions: Send + Sync {
    /// Favourites of `user_id`, newest first.
    async fn list(&self, caller: &Caller, user_id: &UserId) -> Result<Vec<Favorite>, Error>;

    /// Add a favourite. A repeated add reports `already_favorited`.
    async fn add(&self, caller: &Caller, key: FavoriteKey) -> Result<FavoriteOutcome, Error>;

    /// Remove a favourite. Removing an absent favourite succeeds.
    async fn remove(&self, caller: &Caller, key: &FavoriteKey) -> Result<(), Error>;
}
