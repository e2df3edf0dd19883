//! Typed access to the local mirror.
//!
//! Each entity kind is stored as one JSON array under its [`MirrorKey`].
//! Unreadable or corrupt entries are logged and treated as empty so that a
//! damaged mirror never blocks the gallery.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::ports::{LocalMirror, LocalMirrorError, MirrorKey, ToggleState};
use super::{Comment, Design, DesignId, Favorite, Follow, Like, UserId};

/// Typed facade over a [`LocalMirror`].
#[derive(Clone)]
pub struct MirrorStore {
    backend: Arc<dyn LocalMirror>,
    clock: Arc<dyn Clock>,
}

impl MirrorStore {
    pub fn new(backend: Arc<dyn LocalMirror>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    fn load<T: DeserializeOwned>(&self, key: MirrorKey) -> Vec<T> {
        match self.backend.read(key) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                warn!(key = key.as_str(), error = %err, "ignoring corrupt mirror entry");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "mirror read failed");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: MirrorKey, items: &[T]) -> Result<(), LocalMirrorError> {
        let value = serde_json::to_value(items)
            .map_err(|err| LocalMirrorError::corrupt(key.as_str(), err.to_string()))?;
        self.backend.write(key, &value)
    }

    /// Mirrored designs.
    pub fn designs(&self) -> Vec<Design> {
        self.load(MirrorKey::Designs)
    }

    /// Insert or replace a design by id.
    pub fn upsert_design(&self, design: &Design) -> Result<(), LocalMirrorError> {
        let mut designs = self.designs();
        designs.retain(|existing| existing.id != design.id);
        designs.push(design.clone());
        self.save(MirrorKey::Designs, &designs)
    }

    pub fn remove_design(&self, id: &DesignId) -> Result<(), LocalMirrorError> {
        let mut designs = self.designs();
        designs.retain(|existing| &existing.id != id);
        self.save(MirrorKey::Designs, &designs)
    }

    pub fn likes(&self) -> Vec<Like> {
        self.load(MirrorKey::Likes)
    }

    /// Record or clear a like.
    pub fn set_like(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
        state: ToggleState,
    ) -> Result<(), LocalMirrorError> {
        let mut likes = self.likes();
        likes.retain(|like| !(&like.user_id == user_id && &like.design_id == design_id));
        if state.is_set() {
            likes.push(Like {
                user_id: user_id.clone(),
                design_id: design_id.clone(),
                created_at: self.clock.utc(),
            });
        }
        self.save(MirrorKey::Likes, &likes)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.load(MirrorKey::Comments)
    }

    /// Append a comment, replacing any with the same id.
    pub fn push_comment(&self, comment: &Comment) -> Result<(), LocalMirrorError> {
        let mut comments = self.comments();
        comments.retain(|existing| existing.id != comment.id);
        comments.push(comment.clone());
        self.save(MirrorKey::Comments, &comments)
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        self.load(MirrorKey::Favorites)
    }

    /// Record or clear a favourite.
    pub fn set_favorite(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
        state: ToggleState,
    ) -> Result<(), LocalMirrorError> {
        let mut favorites = self.favorites();
        favorites.retain(|fav| !(&fav.user_id == user_id && &fav.design_id == design_id));
        if state.is_set() {
            favorites.push(Favorite {
                user_id: user_id.clone(),
                design_id: design_id.clone(),
                created_at: self.clock.utc(),
            });
        }
        self.save(MirrorKey::Favorites, &favorites)
    }

    pub fn follows(&self) -> Vec<Follow> {
        self.load(MirrorKey::Follows)
    }

    /// Record or clear a follow edge. Self-follows are never recorded.
    pub fn set_follow(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
        state: ToggleState,
    ) -> Result<(), LocalMirrorError> {
        let mut follows = self.follows();
        follows.retain(|f| !(f.follower_id() == follower_id && f.followed_id() == followed_id));
        if state.is_set() {
            follows.extend(
                Follow::new(follower_id.clone(), followed_id.clone(), self.clock.utc()).ok(),
            );
        }
        self.save(MirrorKey::Follows, &follows)
    }

    /// The browser profile's transient identity, minted on first use.
    pub fn transient_user_id(&self) -> Result<UserId, LocalMirrorError> {
        let stored = self
            .backend
            .read(MirrorKey::TransientUserId)?
            .and_then(|value| value.as_str().map(str::to_owned))
            .and_then(|raw| UserId::new(raw).ok())
            .filter(UserId::is_transient);
        if let Some(id) = stored {
            return Ok(id);
        }
        let id = UserId::generate_transient(self.clock.utc(), &mut rand::thread_rng());
        self.backend
            .write(MirrorKey::TransientUserId, &Value::String(id.as_str().to_owned()))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLocalMirror;
    use crate::outbound::mirror::MemoryMirror;
    use crate::test_support::{MutableClock, design_id, fixture_timestamp, user, vector_design};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn mirror() -> MirrorStore {
        MirrorStore::new(
            Arc::new(MemoryMirror::default()),
            Arc::new(MutableClock::new(fixture_timestamp())),
        )
    }

    #[rstest]
    fn upsert_replaces_design_by_id(mirror: MirrorStore) {
        let mut design = vector_design("d1", "temp-1", 0);
        mirror.upsert_design(&design).expect("write");
        design.title = "Renamed".into();
        mirror.upsert_design(&design).expect("write");
        let stored = mirror.designs();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.first().map(|d| d.title.as_str()), Some("Renamed"));
    }

    #[rstest]
    fn like_toggles_presence(mirror: MirrorStore) {
        mirror
            .set_like(&user("u1"), &design_id("d1"), ToggleState::Set)
            .expect("write");
        mirror
            .set_like(&user("u1"), &design_id("d1"), ToggleState::Set)
            .expect("write");
        assert_eq!(mirror.likes().len(), 1);
        mirror
            .set_like(&user("u1"), &design_id("d1"), ToggleState::Unset)
            .expect("write");
        assert!(mirror.likes().is_empty());
    }

    #[rstest]
    fn transient_id_is_stable(mirror: MirrorStore) {
        let first = mirror.transient_user_id().expect("minted");
        let second = mirror.transient_user_id().expect("reused");
        assert!(first.is_transient());
        assert_eq!(first, second);
    }

    #[rstest]
    fn corrupt_entries_read_as_empty() {
        let mut backend = MockLocalMirror::new();
        backend
            .expect_read()
            .returning(|_| Ok(Some(json!({ "not": "a list" }))));
        let mirror = MirrorStore::new(
            Arc::new(backend),
            Arc::new(MutableClock::new(fixture_timestamp())),
        );
        assert!(mirror.designs().is_empty());
        assert!(mirror.comments().is_empty());
    }
}
