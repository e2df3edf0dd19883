//! Driving port for design tags.

use async_trait::async_trait;

use crate::domain::{Caller, DesignId, Error, Tag, TagName, TagSet};

/// Tag lookup and association.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagCatalogue: Send + Sync {
    /// Tag names attached to a design.
    async fn tags_for(&self, caller: &Caller, design_id: &DesignId)
    -> Result<Vec<TagName>, Error>;

    /// Most used tags, highest `usage_count` first.
    async fn popular(&self, caller: &Caller, limit: usize) -> Result<Vec<Tag>, Error>;

    /// Replace the design's whole tag set.
    async fn replace(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        tags: TagSet,
    ) -> Result<Vec<TagName>, Error>;

    /// Detach one tag from a design. Detaching an absent tag succeeds.
    async fn remove(&self, caller: &Caller, design_id: &DesignId, tag: &TagName)
    -> Result<(), Error>;
}
