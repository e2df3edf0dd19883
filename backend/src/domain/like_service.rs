//! Like toggling.
//!
//! Toggling checks for an existing `(user_id, design_id)` row, then deletes
//! or inserts it. The check and the write are not atomic; concurrent toggles
//! may both insert. The design's `likes_count` is recounted afterwards; a
//! failed recount never fails a toggle whose write was stored.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::counters::{self, DesignCounter};
use super::ports::{LikeInteractions, Relation, Row, StoreRequest, encode_row};
use super::{Caller, DesignId, Error, Like, LikeStatus, TieredStore, UserId};

/// Service implementing [`LikeInteractions`].
#[derive(Clone)]
pub struct LikeService {
    store: TieredStore,
    clock: Arc<dyn Clock>,
}

impl LikeService {
    pub fn new(store: TieredStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn pair_request(request: StoreRequest, user_id: &UserId, design_id: &DesignId) -> StoreRequest {
        request
            .eq("user_id", user_id.as_str())
            .eq("design_id", design_id.as_str())
    }

    fn liked_by(rows: &[Row], user_id: &UserId) -> bool {
        rows.iter().any(|row| {
            row.get("user_id")
                .and_then(|value| value.as_str())
                .is_some_and(|id| id == user_id.as_str())
        })
    }
}

#[async_trait]
impl LikeInteractions for LikeService {
    async fn status(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        user_id: Option<UserId>,
    ) -> Result<LikeStatus, Error> {
        let request = StoreRequest::select(Relation::Likes).eq("design_id", design_id.as_str());
        let rows = self.store.select(caller, &request).await?;
        Ok(LikeStatus {
            liked: user_id.is_some_and(|user| Self::liked_by(&rows.value, &user)),
            likes_count: u64::try_from(rows.value.len()).unwrap_or(u64::MAX),
        })
    }

    async fn toggle(
        &self,
        caller: &Caller,
        user_id: &UserId,
        design_id: &DesignId,
    ) -> Result<LikeStatus, Error> {
        let existing = self
            .store
            .select(
                caller,
                &Self::pair_request(StoreRequest::select(Relation::Likes), user_id, design_id),
            )
            .await?;
        let liked = if existing.value.is_empty() {
            let like = Like {
                user_id: user_id.clone(),
                design_id: design_id.clone(),
                created_at: self.clock.utc(),
            };
            let request = StoreRequest::insert(Relation::Likes, vec![encode_row(&like)?]);
            self.store.run(caller, &request).await?;
            true
        } else {
            let request =
                Self::pair_request(StoreRequest::delete(Relation::Likes), user_id, design_id);
            self.store.run(caller, &request).await?;
            false
        };
        let likes_count =
            match counters::count(&self.store, caller, DesignCounter::Likes, design_id).await {
                Ok(total) => {
                    counters::publish(&self.store, caller, DesignCounter::Likes, design_id, total)
                        .await;
                    total
                }
                Err(err) => {
                    // Lower bound: the caller's own like is known to be stored.
                    warn!(%design_id, error = %err, "like stored but recount failed");
                    u64::from(liked)
                }
            };
        info!(%design_id, %user_id, liked, likes_count, "like toggled");
        Ok(LikeStatus { liked, likes_count })
    }
}
