//! Denormalised design counters.
//!
//! `likes_count` and `comments_count` on a design are recomputed from their
//! relation after every change and written back on a best-effort basis. A
//! failed write-back only leaves the counter stale; reconciliation never
//! trusts it over the rows it summarises.

use serde_json::{Map, json};
use tracing::warn;

use super::ports::{Relation, RecordStoreError, StoreRequest};
use super::{Caller, DesignId, TieredStore};

/// Counter column on the designs relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignCounter {
    Likes,
    Comments,
}

impl DesignCounter {
    fn relation(self) -> Relation {
        match self {
            Self::Likes => Relation::Likes,
            Self::Comments => Relation::Comments,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Likes => "likes_count",
            Self::Comments => "comments_count",
        }
    }
}

/// Count rows behind `counter` for `design_id`.
pub async fn count(
    store: &TieredStore,
    caller: &Caller,
    counter: DesignCounter,
    design_id: &DesignId,
) -> Result<u64, RecordStoreError> {
    let request = StoreRequest::select(counter.relation()).eq("design_id", design_id.as_str());
    let rows = store.select(caller, &request).await?;
    Ok(u64::try_from(rows.value.len()).unwrap_or(u64::MAX))
}

/// Write `value` into the design's counter column, logging failures.
pub async fn publish(
    store: &TieredStore,
    caller: &Caller,
    counter: DesignCounter,
    design_id: &DesignId,
    value: u64,
) {
    let mut changes = Map::new();
    changes.insert(counter.column().to_owned(), json!(value));
    let request = StoreRequest::update(Relation::Designs, changes).eq("id", design_id.as_str());
    if let Err(err) = store.run(caller, &request).await {
        warn!(
            design_id = %design_id,
            column = counter.column(),
            error = %err,
            "failed to update design counter"
        );
    }
}
