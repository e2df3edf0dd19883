//! Driving port for design comments.

use async_trait::async_trait;

use crate::domain::{Caller, Comment, CommentContent, DesignId, Error, PostedComment, UserId};

/// Append-only comment threads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentThread: Send + Sync {
    /// Comments on `design_id`, newest first.
    async fn list(&self, caller: &Caller, design_id: &DesignId) -> Result<Vec<Comment>, Error>;

    /// Post a comment.
    async fn post(
        &self,
        caller: &Caller,
        design_id: &DesignId,
        author_id: &UserId,
        content: CommentContent,
    ) -> Result<PostedComment, Error>;
}
