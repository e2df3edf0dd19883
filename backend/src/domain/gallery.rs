//! Client-side gallery view.
//!
//! Combines the remote design feed with the local mirror. Mirrored designs
//! override remote ones with the same id, and counters never drop below the
//! number of mirrored likes and comments for a design.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::ports::{DesignFeed, GatewayError};
use super::reconcile::reconcile_designs;
use super::{Design, DesignFilter, DesignId, MirrorStore, NewDesign};

/// Reads and saves designs on behalf of the gallery UI.
#[derive(Clone)]
pub struct GalleryService {
    feed: Arc<dyn DesignFeed>,
    mirror: MirrorStore,
    clock: Arc<dyn Clock>,
}

impl GalleryService {
    pub fn new(feed: Arc<dyn DesignFeed>, mirror: MirrorStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            feed,
            mirror,
            clock,
        }
    }

    /// Reconciled designs matching `filter`, newest first.
    ///
    /// A failing feed contributes nothing; the mirror alone is shown.
    pub async fn designs(&self, filter: &DesignFilter) -> Vec<Design> {
        let remote = self.feed.list_designs(filter).await.unwrap_or_else(|err| {
            warn!(error = %err, "design feed unavailable; showing mirrored designs");
            Vec::new()
        });
        let local: Vec<Design> = self
            .mirror
            .designs()
            .into_iter()
            .filter(|design| filter.matches(design))
            .collect();
        reconcile_designs(remote, local, &self.mirror.likes(), &self.mirror.comments())
    }

    /// Save a design remotely and mirror the stored record.
    ///
    /// When the save fails the draft is still mirrored under a `local-` id
    /// so the user keeps their work, and the failure is returned.
    pub async fn save(&self, draft: NewDesign) -> Result<Design, GatewayError> {
        match self.feed.save_design(&draft).await {
            Ok(design) => {
                if let Err(err) = self.mirror.upsert_design(&design) {
                    warn!(design_id = %design.id, error = %err, "failed to mirror saved design");
                }
                info!(design_id = %design.id, "design saved");
                Ok(design)
            }
            Err(err) => {
                let local = Design::from_new(DesignId::local(), draft, self.clock.utc());
                match self.mirror.upsert_design(&local) {
                    Ok(()) => warn!(design_id = %local.id, error = %err, "design save failed; draft kept locally"),
                    Err(mirror_err) => {
                        warn!(error = %err, mirror_error = %mirror_err, "design save failed and draft could not be kept");
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockDesignFeed, ToggleState};
    use crate::outbound::mirror::MemoryMirror;
    use crate::test_support::{
        MutableClock, design_id, fixture_timestamp, user, vector_design, vector_draft,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(fixture_timestamp()))
    }

    fn gallery(feed: MockDesignFeed, clock: Arc<MutableClock>) -> (GalleryService, MirrorStore) {
        let mirror = MirrorStore::new(Arc::new(MemoryMirror::default()), clock.clone());
        (GalleryService::new(Arc::new(feed), mirror.clone(), clock), mirror)
    }

    #[rstest]
    #[tokio::test]
    async fn local_copy_overrides_remote(clock: Arc<MutableClock>) {
        let mut remote = vector_design("d1", "u1", 10);
        remote.likes_count = 4;
        let mut feed = MockDesignFeed::new();
        feed.expect_list_designs()
            .returning(move |_| Ok(vec![remote.clone(), vector_design("d2", "u1", 5)]));
        let (gallery, mirror) = gallery(feed, clock);

        let mut local = vector_design("d1", "u1", 10);
        local.title = "Edited offline".into();
        mirror.upsert_design(&local).expect("mirror");

        let designs = gallery.designs(&DesignFilter::default()).await;
        let ids: Vec<&str> = designs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1"]);
        let d1 = designs.iter().find(|d| d.id.as_str() == "d1").expect("d1");
        assert_eq!(d1.title, "Edited offline");
        assert_eq!(d1.likes_count, 4);
    }

    #[rstest]
    #[tokio::test]
    async fn counters_take_max_of_remote_and_mirror(clock: Arc<MutableClock>) {
        let mut feed = MockDesignFeed::new();
        feed.expect_list_designs()
            .returning(|_| Ok(vec![vector_design("d1", "u1", 0)]));
        let (gallery, mirror) = gallery(feed, clock);
        for liker in ["u2", "u3"] {
            mirror
                .set_like(&user(liker), &design_id("d1"), ToggleState::Set)
                .expect("mirror");
        }
        let designs = gallery.designs(&DesignFilter::default()).await;
        assert_eq!(designs.first().map(|d| d.likes_count), Some(2));
    }

    #[rstest]
    #[tokio::test]
    async fn feed_failure_shows_mirror(clock: Arc<MutableClock>) {
        let mut feed = MockDesignFeed::new();
        feed.expect_list_designs()
            .returning(|_| Err(GatewayError::unavailable("offline")));
        let (gallery, mirror) = gallery(feed, clock);
        mirror
            .upsert_design(&vector_design("d9", "temp-1", 0))
            .expect("mirror");
        let designs = gallery.designs(&DesignFilter::default()).await;
        assert_eq!(designs.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_save_keeps_local_draft(clock: Arc<MutableClock>) {
        let mut feed = MockDesignFeed::new();
        feed.expect_save_design()
            .returning(|_| Err(GatewayError::unavailable("500")));
        let (gallery, mirror) = gallery(feed, clock);

        let err = gallery
            .save(vector_draft("temp-1", "Whiskers"))
            .await
            .expect_err("save fails loudly");
        assert!(err.is_persistent());
        let kept = mirror.designs();
        assert_eq!(kept.len(), 1);
        assert!(kept.first().is_some_and(|d| d.id.is_local()));
    }

    #[rstest]
    #[tokio::test]
    async fn successful_save_is_mirrored(clock: Arc<MutableClock>) {
        let mut feed = MockDesignFeed::new();
        feed.expect_save_design()
            .returning(|_| Ok(vector_design("d1", "temp-1", 0)));
        let (gallery, mirror) = gallery(feed, clock);
        let saved = gallery
            .save(vector_draft("temp-1", "Whiskers"))
            .await
            .expect("saved");
        assert_eq!(mirror.designs(), vec![saved]);
    }
}
