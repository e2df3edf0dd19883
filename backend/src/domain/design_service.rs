//! Design catalogue service.
//!
//! Writes go through the [`TieredStore`]; the tier that accepted each write is
//! remembered in an injected [`FallbackCache`]. A listing read through a
//! different tier cannot be trusted to see that write yet, so cached designs
//! are merged over the remote rows. When the store is unreachable on every
//! tier the cache is served on its own.
//!
//! Creation is the one write that never degrades: if every tier rejects it
//! the caller receives a `persistence_failed` error with the store's reason.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::ports::{
    AccessTier, DesignCatalogue, FallbackCache, RecordStoreError, Relation, Row, StoreRequest,
    encode_row,
};
use super::reconcile::{merge, merge_by};
use super::{
    Caller, Design, DesignFilter, DesignId, DesignKind, DesignPatch, DesignValidationError,
    Error, ErrorCode, NewDesign, TieredStore, UserId,
};

/// A design remembered together with the tier that stored it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDesign {
    pub design: Design,
    pub write_tier: AccessTier,
}

/// Cache type owned by [`DesignService`].
pub type DesignCache = Arc<dyn FallbackCache<DesignId, CachedDesign>>;

/// Service implementing [`DesignCatalogue`].
#[derive(Clone)]
pub struct DesignService {
    store: TieredStore,
    cache: DesignCache,
    clock: Arc<dyn Clock>,
}

impl DesignService {
    pub fn new(store: TieredStore, cache: DesignCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            cache,
            clock,
        }
    }

    fn list_request(filter: &DesignFilter) -> StoreRequest {
        let mut request = StoreRequest::select(Relation::Designs).order_desc("created_at");
        if let Some(owner) = &filter.owner_id {
            request = request.eq("user_id", owner.as_str());
        }
        if let Some(visibility) = filter.visibility {
            request = request.eq("is_public", visibility.is_public());
        }
        request
    }

    fn decode_lenient(rows: Vec<Row>) -> Vec<Design> {
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<Design>(Value::Object(row)) {
                Ok(design) => Some(design),
                Err(err) => {
                    warn!(error = %err, "skipping undecodable design row");
                    None
                }
            })
            .collect()
    }

    fn persistence_failure(err: &RecordStoreError) -> Error {
        Error::persistence_failed("failed to save design").with_details(json!({
            "reason": err.to_string(),
            "code": err.kind(),
        }))
    }

    fn invalid_design(err: &DesignValidationError) -> Error {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": "invalid_design",
        }))
    }

    /// Columns an owner may change.
    fn changes(design: &Design) -> Result<Row, Error> {
        let mut row = encode_row(design).map_err(Error::from)?;
        row.retain(|column, _| {
            matches!(
                column.as_str(),
                "title" | "components" | "image_url" | "is_public" | "updated_at"
            )
        });
        Ok(row)
    }

    fn remember(&self, design: &Design, write_tier: AccessTier) {
        self.cache.insert(
            design.id.clone(),
            CachedDesign {
                design: design.clone(),
                write_tier,
            },
        );
    }

    fn ensure_owner(design: &Design, acting: &UserId) -> Result<(), Error> {
        if &design.owner_id != acting {
            return Err(Error::forbidden("only the owner can change this design"));
        }
        Ok(())
    }
}

#[async_trait]
impl DesignCatalogue for DesignService {
    async fn list(&self, caller: &Caller, filter: &DesignFilter) -> Vec<Design> {
        let cached: Vec<CachedDesign> = self
            .cache
            .snapshot()
            .into_iter()
            .filter(|entry| filter.matches(&entry.design))
            .collect();
        let request = Self::list_request(filter);
        let (remote, read_tier) = match self.store.select(caller, &request).await {
            Ok(rows) => (Self::decode_lenient(rows.value), rows.tier),
            Err(err) => {
                warn!(error = %err, cached = cached.len(), "design listing failed; serving fallback cache");
                let designs = cached.into_iter().map(|entry| entry.design).collect();
                return merge(Vec::new(), designs);
            }
        };
        let overrides: Vec<Design> = cached
            .into_iter()
            .filter(|entry| entry.write_tier != read_tier)
            .map(|entry| entry.design)
            .collect();
        if !overrides.is_empty() {
            debug!(count = overrides.len(), %read_tier, "merging cached designs over remote rows");
        }
        merge_by(remote, overrides, |remote, mut cached| {
            cached.likes_count = cached.likes_count.max(remote.likes_count);
            cached.comments_count = cached.comments_count.max(remote.comments_count);
            cached
        })
    }

    async fn get(&self, caller: &Caller, id: &DesignId) -> Result<Design, Error> {
        let cached = self.cache.get(id);
        let request = StoreRequest::select(Relation::Designs)
            .eq("id", id.as_str())
            .limit(1);
        match self.store.select(caller, &request).await {
            Ok(rows) => {
                let remote = Self::decode_lenient(rows.value).into_iter().next();
                match (remote, cached) {
                    (_, Some(entry)) if entry.write_tier != rows.tier => Ok(entry.design),
                    (Some(design), _) => Ok(design),
                    (None, Some(entry)) => Ok(entry.design),
                    (None, None) => Err(Error::not_found(format!("design {id} not found"))),
                }
            }
            Err(err) => match cached {
                Some(entry) => {
                    warn!(design_id = %id, error = %err, "design lookup failed; serving fallback cache");
                    Ok(entry.design)
                }
                None => Err(Error::from(err)),
            },
        }
    }

    async fn create(&self, caller: &Caller, design: NewDesign) -> Result<Design, Error> {
        if design.owner_id.is_transient() && design.content.kind() == DesignKind::AiImage {
            return Err(Error::forbidden("sign in to save AI-generated designs"));
        }
        let record = Design::from_new(DesignId::random(), design, self.clock.utc());
        let row = encode_row(&record).map_err(|err| Self::persistence_failure(&err))?;
        let request = StoreRequest::insert(Relation::Designs, vec![row]);
        match self.store.run(caller, &request).await {
            Ok(stored) => {
                let design = Self::decode_lenient(stored.value)
                    .into_iter()
                    .next()
                    .unwrap_or(record);
                self.remember(&design, stored.tier);
                info!(design_id = %design.id, tier = %stored.tier, "design created");
                Ok(design)
            }
            Err(err) => {
                error!(error = %err, owner = %record.owner_id, "design could not be stored on any tier");
                Err(Self::persistence_failure(&err))
            }
        }
    }

    async fn update(
        &self,
        caller: &Caller,
        id: &DesignId,
        acting: &UserId,
        patch: DesignPatch,
    ) -> Result<Design, Error> {
        let mut design = self.get(caller, id).await?;
        Self::ensure_owner(&design, acting)?;
        patch
            .apply(&mut design, self.clock.utc())
            .map_err(|err| Self::invalid_design(&err))?;
        let request = StoreRequest::update(Relation::Designs, Self::changes(&design)?)
            .eq("id", id.as_str());
        let stored = self.store.run(caller, &request).await.map_err(Error::from)?;
        self.remember(&design, stored.tier);
        info!(design_id = %id, tier = %stored.tier, "design updated");
        Ok(design)
    }

    async fn delete(&self, caller: &Caller, id: &DesignId, acting: &UserId) -> Result<(), Error> {
        let design = match self.get(caller, id).await {
            Ok(design) => design,
            Err(err) if err.code() == ErrorCode::NotFound => {
                debug!(design_id = %id, "design already absent");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        Self::ensure_owner(&design, acting)?;
        let request = StoreRequest::delete(Relation::Designs).eq("id", id.as_str());
        self.store.run(caller, &request).await.map_err(Error::from)?;
        self.cache.remove(id);
        info!(design_id = %id, "design deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Credential, MockRecordStore, Operation, RecordStore};
    use crate::outbound::cache::TtlCache;
    use crate::test_support::{MutableClock, fixture_timestamp, user, vector_design, vector_draft};
    use rstest::rstest;
    use std::num::NonZeroUsize;
    use std::time::Duration;

    fn service(store: impl RecordStore + 'static) -> DesignService {
        let clock = Arc::new(MutableClock::new(fixture_timestamp()));
        let cache: DesignCache = Arc::new(TtlCache::new(
            NonZeroUsize::new(16).expect("non-zero"),
            Duration::from_secs(300),
            clock.clone(),
        ));
        DesignService::new(TieredStore::escalating(Arc::new(store)), cache, clock)
    }

    fn echo_inserted(request: &StoreRequest) -> Vec<Row> {
        match &request.operation {
            Operation::Insert(rows) => rows.clone(),
            _ => Vec::new(),
        }
    }

    /// Anonymous writes are rejected by policy; privileged writes succeed but
    /// anonymous reads do not see them yet.
    fn lagging_store() -> MockRecordStore {
        let mut store = MockRecordStore::new();
        store.expect_execute().returning(|cred, request| {
            match (cred, request.operation.is_write()) {
                (Credential::Privileged, true) => Ok(echo_inserted(request)),
                (_, true) => Err(RecordStoreError::policy_violation("designs", "rls")),
                (_, false) => Ok(Vec::new()),
            }
        });
        store
    }

    #[rstest]
    #[tokio::test]
    async fn created_design_is_listed_despite_read_lag() {
        let service = service(lagging_store());
        let created = service
            .create(&Caller::anonymous(), vector_draft("temp-1", "A"))
            .await
            .expect("created through privileged tier");

        let filter = DesignFilter {
            owner_id: Some(user("temp-1")),
            ..DesignFilter::default()
        };
        let listed = service.list(&Caller::anonymous(), &filter).await;
        assert_eq!(listed.first().map(|d| &d.id), Some(&created.id));

        let fetched = service
            .get(&Caller::anonymous(), &created.id)
            .await
            .expect("served from cache");
        assert_eq!(fetched.id, created.id);
    }

    #[rstest]
    #[tokio::test]
    async fn creation_failure_is_loud() {
        let mut store = MockRecordStore::new();
        store
            .expect_execute()
            .returning(|_, _| Err(RecordStoreError::connection("refused")));
        let service = service(store);

        let err = service
            .create(&Caller::anonymous(), vector_draft("temp-1", "A"))
            .await
            .expect_err("no silent fallback");
        assert_eq!(err.code(), ErrorCode::PersistenceFailed);
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("connection"))
        );
        assert!(service.list(&Caller::anonymous(), &DesignFilter::default()).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn transient_users_cannot_create_ai_designs() {
        let service = service(MockRecordStore::new());
        let mut draft = vector_draft("temp-1", "A");
        draft.content = crate::domain::DesignContent::AiImage {
            image_url: "https://img.example/cat.png".into(),
        };
        let err = service
            .create(&Caller::anonymous(), draft)
            .await
            .expect_err("policy restriction");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_never_fails() {
        let mut store = MockRecordStore::new();
        store
            .expect_execute()
            .returning(|_, _| Err(RecordStoreError::timeout("slow")));
        let service = service(store);
        assert!(service.list(&Caller::anonymous(), &DesignFilter::default()).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_idempotent() {
        let mut store = MockRecordStore::new();
        store.expect_execute().returning(|_, _| Ok(Vec::new()));
        let service = service(store);
        let id = DesignId::new("missing").expect("id");

        for _ in 0..2 {
            service
                .delete(&Caller::anonymous(), &id, &user("temp-1"))
                .await
                .expect("absent design deletes successfully");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn only_owner_may_update() {
        let existing = vector_design("d1", "temp-1", 10);
        let row = encode_row(&existing).expect("row");
        let mut store = MockRecordStore::new();
        store
            .expect_execute()
            .returning(move |_, _| Ok(vec![row.clone()]));
        let service = service(store);

        let err = service
            .update(
                &Caller::anonymous(),
                &existing.id,
                &user("temp-2"),
                DesignPatch::default(),
            )
            .await
            .expect_err("not the owner");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
