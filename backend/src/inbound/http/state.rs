//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::{
    Accounts, AuthProvider, CommentThread, DesignCatalogue, FavoriteInteractions,
    FollowInteractions, ImageGeneration, ImageGenerator, LikeInteractions, TagCatalogue,
};
use crate::domain::{
    AccountService, CommentService, DesignCache, DesignService, FavoriteLedger, FavoriteService,
    FollowService, GenerationService, LikeService, TagService, TieredStore,
};
use crate::outbound::cache::TtlCache;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub designs: Arc<dyn DesignCatalogue>,
    pub likes: Arc<dyn LikeInteractions>,
    pub favorites: Arc<dyn FavoriteInteractions>,
    pub follows: Arc<dyn FollowInteractions>,
    pub comments: Arc<dyn CommentThread>,
    pub tags: Arc<dyn TagCatalogue>,
    pub accounts: Arc<dyn Accounts>,
    pub generation: Arc<dyn ImageGeneration>,
}

/// Bounds of the process-memory fallback caches.
#[derive(Debug, Clone, Copy)]
pub struct CacheBounds {
    pub capacity: NonZeroUsize,
    pub ttl: Duration,
}

impl HttpState {
    /// Build every driving port on top of one record store.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use mockable::DefaultClock;
    /// use pawprint::domain::TieredStore;
    /// use pawprint::domain::ports::{DisabledImageGenerator, FixtureAuthProvider};
    /// use pawprint::inbound::http::state::{CacheBounds, HttpState};
    /// use pawprint::outbound::store::InMemoryRecordStore;
    ///
    /// let store = TieredStore::escalating(Arc::new(InMemoryRecordStore::default()));
    /// let bounds = CacheBounds {
    ///     capacity: NonZeroUsize::new(64).unwrap(),
    ///     ttl: Duration::from_secs(300),
    /// };
    /// let state = HttpState::from_store(
    ///     store,
    ///     Arc::new(FixtureAuthProvider),
    ///     Arc::new(DisabledImageGenerator),
    ///     bounds,
    ///     Arc::new(DefaultClock),
    /// );
    /// let _designs = state.designs.clone();
    /// ```
    pub fn from_store(
        store: TieredStore,
        auth: Arc<dyn AuthProvider>,
        generator: Arc<dyn ImageGenerator>,
        bounds: CacheBounds,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let design_cache: DesignCache =
            Arc::new(TtlCache::new(bounds.capacity, bounds.ttl, clock.clone()));
        let favorite_ledger: FavoriteLedger =
            Arc::new(TtlCache::new(bounds.capacity, bounds.ttl, clock.clone()));
        Self {
            designs: Arc::new(DesignService::new(
                store.clone(),
                design_cache,
                clock.clone(),
            )),
            likes: Arc::new(LikeService::new(store.clone(), clock.clone())),
            favorites: Arc::new(FavoriteService::new(
                store.clone(),
                favorite_ledger,
                clock.clone(),
            )),
            follows: Arc::new(FollowService::new(store.clone(), clock.clone())),
            comments: Arc::new(CommentService::new(store.clone(), clock.clone())),
            tags: Arc::new(TagService::new(store.clone())),
            accounts: Arc::new(AccountService::new(auth, store, clock)),
            generation: Arc::new(GenerationService::new(generator)),
        }
    }
}
