//! Comment threads.
//!
//! Comments from transient authors are synthesised and returned with
//! `is_temp` set; they are never written to the store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use super::counters::{self, DesignCounter};
use super::ports::{CommentThread, Relation, StoreRequest, decode_rows, encode_row};
use super::{Caller, Comment, CommentContent, DesignId, Error, PostedComment, TieredStore, UserId};

/// Service implementing [`CommentThread`].
#[derive(Clone)]
pub struct CommentService {
    store: TieredStore,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(store: TieredStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl CommentThread for CommentService {
    async fn list(&self, caller: &Caller, design_id: &DesignId) -> Result<Vec<Comment>, Error> {
        let request = StoreRequest::select(Relation::Comments)
            .eq("design_id", design_id.as_str())
            .order_desc("created_at");
        let comments = self.store.select_as::<Comment>(caller, &request).await?;
        Ok(comments.value)
    }

    async fn post(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        author_id: &UserId,
        content: CommentContent,
    ) -> Result<PostedComment, Error> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            design_id: design_id.clone(),
            author_id: author_id.clone(),
            content,
            created_at: self.clock.utc(),
        };
        if author_id.is_transient() {
            debug!(%design_id, %author_id, "synthesising comment for transient author");
            return Ok(PostedComment {
                comment,
                is_temp: true,
            });
        }
        let request = StoreRequest::insert(Relation::Comments, vec![encode_row(&comment)?]);
        let stored = self.store.run(caller, &request).await?;
        let comment = decode_rows::<Comment>(stored.value)
            .ok()
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or(comment);
        match counters::count(&self.store, caller, DesignCounter::Comments, design_id).await {
            Ok(total) => {
                counters::publish(&self.store, caller, DesignCounter::Comments, design_id, total)
                    .await;
            }
            Err(err) => debug!(%design_id, error = %err, "skipping comment recount"),
        }
        info!(%design_id, comment_id = %comment.id, tier = %stored.tier, "comment posted");
        Ok(PostedComment {
            comment,
            is_temp: false,
        })
    }
}
