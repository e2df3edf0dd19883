//! Social interactions on designs: likes, favourites, follows and comments.
//!
//! Likes and favourites are presence relations keyed by `(user_id,
//! design_id)`. Follows relate two users and must not be reflexive. Comments
//! are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DesignId, UserId};

/// Maximum comment length after trimming.
pub const COMMENT_MAX: usize = 1000;

/// Validation errors for interaction payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionValidationError {
    /// A user tried to follow themselves.
    #[error("users cannot follow themselves")]
    SelfFollow,
    /// Comment body was blank.
    #[error("comment must not be empty")]
    EmptyComment,
    /// Comment body exceeded [`COMMENT_MAX`].
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
}

/// Presence of a like row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: UserId,
    pub design_id: DesignId,
    pub created_at: DateTime<Utc>,
}

/// Like status of one design as seen by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: u64,
}

/// Pair identifying a favourite, also used as the transient ledger key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteKey {
    pub user_id: UserId,
    pub design_id: DesignId,
}

/// A bookmarked design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub design_id: DesignId,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Key of the favourite.
    pub fn key(&self) -> FavoriteKey {
        FavoriteKey {
            user_id: self.user_id.clone(),
            design_id: self.design_id.clone(),
        }
    }
}

/// Outcome of adding a favourite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteOutcome {
    pub favorite: Favorite,
    /// The pair was already present; nothing was written.
    pub already_favorited: bool,
    /// The favourite belongs to a transient user and was not persisted.
    pub is_temp: bool,
}

/// Directed follow edge between two distinct users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FollowRow", into = "FollowRow")]
pub struct Follow {
    follower_id: UserId,
    followed_id: UserId,
    created_at: DateTime<Utc>,
}

impl Follow {
    /// Build a follow edge, rejecting self-follows.
    pub fn new(
        follower_id: UserId,
        followed_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InteractionValidationError> {
        if follower_id == followed_id {
            return Err(InteractionValidationError::SelfFollow);
        }
        Ok(Self {
            follower_id,
            followed_id,
            created_at,
        })
    }

    pub fn follower_id(&self) -> &UserId {
        &self.follower_id
    }

    pub fn followed_id(&self) -> &UserId {
        &self.followed_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FollowRow {
    follower_id: UserId,
    followed_id: UserId,
    created_at: DateTime<Utc>,
}

impl From<Follow> for FollowRow {
    fn from(value: Follow) -> Self {
        Self {
            follower_id: value.follower_id,
            followed_id: value.followed_id,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<FollowRow> for Follow {
    type Error = InteractionValidationError;

    fn try_from(row: FollowRow) -> Result<Self, Self::Error> {
        Self::new(row.follower_id, row.followed_id, row.created_at)
    }
}

/// Outcome of a follow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOutcome {
    pub follow: Follow,
    pub already_following: bool,
}

/// Follower and following id lists of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    pub followers: Vec<UserId>,
    pub following: Vec<UserId>,
}

/// Trimmed, length-checked comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentContent(String);

impl CommentContent {
    /// Validate raw comment text.
    pub fn new(raw: &str) -> Result<Self, InteractionValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InteractionValidationError::EmptyComment);
        }
        if trimmed.chars().count() > COMMENT_MAX {
            return Err(InteractionValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentContent> for String {
    fn from(value: CommentContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentContent {
    type Error = InteractionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// A comment on a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub design_id: DesignId,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    pub content: CommentContent,
    pub created_at: DateTime<Utc>,
}

/// Outcome of posting a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub comment: Comment,
    /// Synthesised for a transient author and not persisted.
    pub is_temp: bool,
}
