//! Favourites.
//!
//! Authenticated users' favourites live in the record store. Transient users
//! never reach the store: their favourites are synthesised, marked
//! `is_temp`, and remembered in a bounded in-process ledger so that a
//! repeated request reports `already_favorited` instead of failing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ports::{FallbackCache, FavoriteInteractions, Relation, StoreRequest, decode_rows, encode_row};
use super::reconcile::merge;
use super::{Caller, Error, Favorite, FavoriteKey, FavoriteOutcome, TieredStore, UserId};

/// Ledger of transient users' favourites.
pub type FavoriteLedger = Arc<dyn FallbackCache<FavoriteKey, Favorite>>;

/// Service implementing [`FavoriteInteractions`].
#[derive(Clone)]
pub struct FavoriteService {
    store: TieredStore,
    ledger: FavoriteLedger,
    clock: Arc<dyn Clock>,
}

impl FavoriteService {
    pub fn new(store: TieredStore, ledger: FavoriteLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            ledger,
            clock,
        }
    }

    fn pair(request: StoreRequest, key: &FavoriteKey) -> StoreRequest {
        request
            .eq("user_id", key.user_id.as_str())
            .eq("design_id", key.design_id.as_str())
    }

    fn new_favorite(&self, key: FavoriteKey) -> Favorite {
        Favorite {
            user_id: key.user_id,
            design_id: key.design_id,
            created_at: self.clock.utc(),
        }
    }

    fn add_transient(&self, key: FavoriteKey) -> FavoriteOutcome {
        if let Some(existing) = self.ledger.get(&key) {
            debug!(user_id = %key.user_id, design_id = %key.design_id, "transient favourite already recorded");
            return FavoriteOutcome {
                favorite: existing,
                already_favorited: true,
                is_temp: true,
            };
        }
        let favorite = self.new_favorite(key.clone());
        self.ledger.insert(key, favorite.clone());
        FavoriteOutcome {
            favorite,
            already_favorited: false,
            is_temp: true,
        }
    }
}

#[async_trait]
impl FavoriteInteractions for FavoriteService {
    async fn list(&self, caller: &Caller, user_id: &UserId) -> Result<Vec<Favorite>, Error> {
        let local: Vec<Favorite> = self
            .ledger
            .snapshot()
            .into_iter()
            .filter(|favorite| &favorite.user_id == user_id)
            .collect();
        if user_id.is_transient() {
            return Ok(merge(Vec::new(), local));
        }
        let request = StoreRequest::select(Relation::Favorites)
            .eq("user_id", user_id.as_str())
            .order_desc("created_at");
        let remote = self.store.select_as::<Favorite>(caller, &request).await?;
        Ok(merge(remote.value, local))
    }

    async fn add(&self, caller: &Caller, key: FavoriteKey) -> Result<FavoriteOutcome, Error> {
        if key.user_id.is_transient() {
            return Ok(self.add_transient(key));
        }
        let existing = self
            .store
            .select_as::<Favorite>(caller, &Self::pair(StoreRequest::select(Relation::Favorites), &key))
            .await?;
        if let Some(favorite) = existing.value.into_iter().next() {
            return Ok(FavoriteOutcome {
                favorite,
                already_favorited: true,
                is_temp: false,
            });
        }
        let favorite = self.new_favorite(key);
        let request = StoreRequest::insert(Relation::Favorites, vec![encode_row(&favorite)?]);
        let stored = self.store.run(caller, &request).await?;
        let favorite = decode_rows::<Favorite>(stored.value)
            .ok()
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or(favorite);
        info!(user_id = %favorite.user_id, design_id = %favorite.design_id, tier = %stored.tier, "favourite added");
        Ok(FavoriteOutcome {
            favorite,
            already_favorited: false,
            is_temp: false,
        })
    }

    async fn remove(&self, caller: &Caller, key: &FavoriteKey) -> Result<(), Error> {
        if key.user_id.is_transient() {
            self.ledger.remove(key);
            return Ok(());
        }
        let request = Self::pair(StoreRequest::delete(Relation::Favorites), key);
        self.store.run(caller, &request).await?;
        Ok(())
    }
}
