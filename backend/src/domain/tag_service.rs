//! Tag association for designs.
//!
//! Replacing a design's tags deletes every existing association and inserts
//! the new set. The two steps are separate store calls, so concurrent
//! replacements on the same design can interleave and leave a partial set.
//!
//! `usage_count` on each tag whose associations changed is recomputed from
//! the join relation after the write.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{Relation, RecordStoreError, StoreRequest, TagCatalogue, decode_rows, encode_row};
use super::{Caller, DesignId, Error, Tag, TagName, TagSet, TieredStore};

/// Row of the `design_tags` join relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DesignTag {
    design_id: String,
    tag_id: String,
}

/// Service implementing [`TagCatalogue`].
#[derive(Clone)]
pub struct TagService {
    store: TieredStore,
}

impl TagService {
    pub fn new(store: TieredStore) -> Self {
        Self { store }
    }

    async fn tag_ids_for(
        &self,
        caller: &Caller,
        design_id: &DesignId,
    ) -> Result<Vec<String>, RecordStoreError> {
        let request = StoreRequest::select(Relation::DesignTags).eq("design_id", design_id.as_str());
        let links = self.store.select_as::<DesignTag>(caller, &request).await?;
        Ok(links.value.into_iter().map(|link| link.tag_id).collect())
    }

    async fn find(&self, caller: &Caller, name: &TagName) -> Result<Option<Tag>, RecordStoreError> {
        let request = StoreRequest::select(Relation::Tags)
            .eq("name", name.as_str())
            .limit(1);
        let tags = self.store.select_as::<Tag>(caller, &request).await?;
        Ok(tags.value.into_iter().next())
    }

    /// Existing tag named `name`, or a new one with `usage_count` zero.
    async fn find_or_create(&self, caller: &Caller, name: TagName) -> Result<Tag, RecordStoreError> {
        if let Some(tag) = self.find(caller, &name).await? {
            return Ok(tag);
        }
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name,
            usage_count: 0,
        };
        let request = StoreRequest::insert(Relation::Tags, vec![encode_row(&tag)?]);
        let stored = self.store.run(caller, &request).await?;
        Ok(decode_rows::<Tag>(stored.value)
            .ok()
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or(tag))
    }

    /// Recompute `usage_count` for each tag id, logging failures.
    async fn refresh_usage(&self, caller: &Caller, tag_ids: BTreeSet<String>) {
        for tag_id in tag_ids {
            let count_request =
                StoreRequest::select(Relation::DesignTags).eq("tag_id", tag_id.as_str());
            let usage = match self.store.select(caller, &count_request).await {
                Ok(rows) => rows.value.len(),
                Err(err) => {
                    warn!(%tag_id, error = %err, "failed to count tag usage");
                    continue;
                }
            };
            let mut changes = Map::new();
            changes.insert("usage_count".to_owned(), json!(usage));
            let update = StoreRequest::update(Relation::Tags, changes).eq("id", tag_id.as_str());
            if let Err(err) = self.store.run(caller, &update).await {
                warn!(%tag_id, error = %err, "failed to update tag usage");
            }
        }
    }
}

#[async_trait]
impl TagCatalogue for TagService {
    async fn tags_for(
        &self,
        caller: &Caller,
        design_id: &DesignId,
    ) -> Result<Vec<TagName>, Error> {
        let ids = self.tag_ids_for(caller, design_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = StoreRequest::select(Relation::Tags)
            .any_of("id", ids.into_iter().map(Value::from).collect());
        let tags = self.store.select_as::<Tag>(caller, &request).await?;
        let mut names: Vec<TagName> = tags.value.into_iter().map(|tag| tag.name).collect();
        names.sort();
        Ok(names)
    }

    async fn popular(&self, caller: &Caller, limit: usize) -> Result<Vec<Tag>, Error> {
        let request = StoreRequest::select(Relation::Tags)
            .order_desc("usage_count")
            .limit(limit);
        let tags = self.store.select_as::<Tag>(caller, &request).await?;
        Ok(tags.value)
    }

    async fn replace(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        tags: TagSet,
    ) -> Result<Vec<TagName>, Error> {
        let previous = self.tag_ids_for(caller, design_id).await?;
        let mut resolved = Vec::with_capacity(tags.len());
        for name in tags {
            resolved.push(self.find_or_create(caller, name).await?);
        }

        let clear = StoreRequest::delete(Relation::DesignTags).eq("design_id", design_id.as_str());
        self.store.run(caller, &clear).await?;
        if !resolved.is_empty() {
            let links = resolved
                .iter()
                .map(|tag| {
                    encode_row(&DesignTag {
                        design_id: design_id.as_str().to_owned(),
                        tag_id: tag.id.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.store
                .run(caller, &StoreRequest::insert(Relation::DesignTags, links))
                .await?;
        }

        let touched: BTreeSet<String> = previous
            .into_iter()
            .chain(resolved.iter().map(|tag| tag.id.clone()))
            .collect();
        self.refresh_usage(caller, touched).await;
        info!(%design_id, count = resolved.len(), "design tags replaced");
        Ok(resolved.into_iter().map(|tag| tag.name).collect())
    }

    async fn remove(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        tag: &TagName,
    ) -> Result<(), Error> {
        let Some(found) = self.find(caller, tag).await? else {
            return Ok(());
        };
        let request = StoreRequest::delete(Relation::DesignTags)
            .eq("design_id", design_id.as_str())
            .eq("tag_id", found.id.as_str());
        self.store.run(caller, &request).await?;
        self.refresh_usage(caller, BTreeSet::from([found.id])).await;
        Ok(())
    }
}
