//! Optimistic interaction controllers for likes, favourites and follows.
//!
//! A controller owns the displayed state of one `(user, target)` pair. A
//! toggle publishes the optimistic value immediately on a `watch` channel,
//! then asks the [`InteractionGateway`] to confirm it.
//!
//! Likes roll back to the exact captured snapshot on any failure.
//! Favourites and follows roll back on refusals and timeouts but keep the
//! optimistic value (and record it in the local mirror) when the backend
//! reports that it cannot store the change at all.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use super::ports::{GatewayError, InteractionGateway, LocalMirrorError, ToggleState};
use super::{DesignId, MirrorStore, UserId};

/// Displayed like state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub state: ToggleState,
    pub count: u64,
}

/// `count` moved one step in `direction`, clamped at zero.
fn step(count: u64, direction: ToggleState) -> u64 {
    match direction {
        ToggleState::Set => count.saturating_add(1),
        ToggleState::Unset => count.saturating_sub(1),
    }
}

fn log_mirror_failure(result: Result<(), LocalMirrorError>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to update local mirror");
    }
}

/// Like button state machine.
pub struct LikeController {
    gateway: Arc<dyn InteractionGateway>,
    mirror: MirrorStore,
    user_id: UserId,
    design_id: DesignId,
    snapshot: watch::Sender<LikeSnapshot>,
    in_flight: Mutex<()>,
}

impl LikeController {
    pub fn new(
        gateway: Arc<dyn InteractionGateway>,
        mirror: MirrorStore,
        user_id: UserId,
        design_id: DesignId,
        initial: LikeSnapshot,
    ) -> Self {
        let (snapshot, _) = watch::channel(initial);
        Self {
            gateway,
            mirror,
            user_id,
            design_id,
            snapshot,
            in_flight: Mutex::new(()),
        }
    }

    /// Currently displayed state.
    pub fn snapshot(&self) -> LikeSnapshot {
        *self.snapshot.borrow()
    }

    /// Observe every displayed state, including optimistic ones.
    pub fn subscribe(&self) -> watch::Receiver<LikeSnapshot> {
        self.snapshot.subscribe()
    }

    fn display(&self, snapshot: LikeSnapshot) {
        self.snapshot.send_replace(snapshot);
        log_mirror_failure(self.mirror.set_like(&self.user_id, &self.design_id, snapshot.state));
    }

    /// Flip the like.
    ///
    /// On success the count is recomputed from the captured count in the
    /// direction the server reports. On failure the captured snapshot is
    /// restored exactly and the error returned; nothing is retried.
    pub async fn toggle(&self) -> Result<LikeSnapshot, GatewayError> {
        let _guard = self.in_flight.lock().await;
        let captured = self.snapshot();
        let optimistic_state = captured.state.flipped();
        self.display(LikeSnapshot {
            state: optimistic_state,
            count: step(captured.count, optimistic_state),
        });

        match self.gateway.toggle_like(&self.user_id, &self.design_id).await {
            Ok(server_state) => {
                let confirmed = LikeSnapshot {
                    state: server_state,
                    count: step(captured.count, server_state),
                };
                self.display(confirmed);
                info!(design_id = %self.design_id, liked = server_state.is_set(), "like confirmed");
                Ok(confirmed)
            }
            Err(err) => {
                self.display(captured);
                warn!(design_id = %self.design_id, error = %err, "like rolled back");
                Err(err)
            }
        }
    }
}

/// Target of a [`PreferenceController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceTarget {
    Favorite { user_id: UserId, design_id: DesignId },
    Follow { follower_id: UserId, followed_id: UserId },
}

/// Result of a preference toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The backend stored the change and reported this state.
    Confirmed(ToggleState),
    /// The backend could not store the change; the state is kept locally.
    KeptLocally(ToggleState),
}

impl Confirmation {
    pub fn state(self) -> ToggleState {
        match self {
            Self::Confirmed(state) | Self::KeptLocally(state) => state,
        }
    }
}

/// Favourite or follow state machine.
pub struct PreferenceController {
    gateway: Arc<dyn InteractionGateway>,
    mirror: MirrorStore,
    target: PreferenceTarget,
    state: watch::Sender<ToggleState>,
    in_flight: Mutex<()>,
}

impl PreferenceController {
    pub fn new(
        gateway: Arc<dyn InteractionGateway>,
        mirror: MirrorStore,
        target: PreferenceTarget,
        initial: ToggleState,
    ) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            gateway,
            mirror,
            target,
            state,
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> ToggleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ToggleState> {
        self.state.subscribe()
    }

    async fn confirm(&self, desired: ToggleState) -> Result<ToggleState, GatewayError> {
        match &self.target {
            PreferenceTarget::Favorite { user_id, design_id } => {
                self.gateway.set_favorite(user_id, design_id, desired).await
            }
            PreferenceTarget::Follow {
                follower_id,
                followed_id,
            } => self.gateway.set_follow(follower_id, followed_id, desired).await,
        }
    }

    fn remember(&self, state: ToggleState) {
        let result = match &self.target {
            PreferenceTarget::Favorite { user_id, design_id } => {
                self.mirror.set_favorite(user_id, design_id, state)
            }
            PreferenceTarget::Follow {
                follower_id,
                followed_id,
            } => self.mirror.set_follow(follower_id, followed_id, state),
        };
        log_mirror_failure(result);
    }

    /// Flip the preference.
    pub async fn toggle(&self) -> Result<Confirmation, GatewayError> {
        let _guard = self.in_flight.lock().await;
        let captured = self.state();
        let optimistic = captured.flipped();
        self.state.send_replace(optimistic);

        match self.confirm(optimistic).await {
            Ok(server_state) => {
                self.state.send_replace(server_state);
                self.remember(server_state);
                Ok(Confirmation::Confirmed(server_state))
            }
            Err(err) if err.is_persistent() => {
                warn!(target = ?self.target, error = %err, "backend unavailable; keeping preference locally");
                self.remember(optimistic);
                Ok(Confirmation::KeptLocally(optimistic))
            }
            Err(err) => {
                self.state.send_replace(captured);
                warn!(target = ?self.target, error = %err, "preference rolled back");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockInteractionGateway;
    use crate::outbound::mirror::MemoryMirror;
    use crate::test_support::{MutableClock, design_id, fixture_timestamp, user};
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[fixture]
    fn mirror() -> MirrorStore {
        MirrorStore::new(
            Arc::new(MemoryMirror::default()),
            Arc::new(MutableClock::new(fixture_timestamp())),
        )
    }

    /// Gateway that flips a server-side flag on every like toggle.
    fn flipping_gateway(initially_liked: bool) -> MockInteractionGateway {
        let liked = Arc::new(AtomicBool::new(initially_liked));
        let mut gateway = MockInteractionGateway::new();
        gateway.expect_toggle_like().returning(move |_, _| {
            let now = !liked.fetch_xor(true, Ordering::SeqCst);
            Ok(ToggleState::from_bool(now))
        });
        gateway
    }

    fn like_controller(
        gateway: MockInteractionGateway,
        mirror: MirrorStore,
        initial: LikeSnapshot,
    ) -> LikeController {
        LikeController::new(Arc::new(gateway), mirror, user("u1"), design_id("d1"), initial)
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    #[tokio::test]
    async fn toggles_track_parity(mirror: MirrorStore, #[case] n: usize) {
        let initial = LikeSnapshot {
            state: ToggleState::Unset,
            count: 4,
        };
        let controller = like_controller(flipping_gateway(false), mirror, initial);
        for _ in 0..n {
            controller.toggle().await.expect("confirmed");
        }
        let liked = n % 2 == 1;
        assert_eq!(controller.snapshot().state.is_set(), liked);
        assert_eq!(controller.snapshot().count, if liked { 5 } else { 4 });
    }

    #[rstest]
    #[tokio::test]
    async fn failure_restores_captured_snapshot(mirror: MirrorStore) {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_toggle_like()
            .returning(|_, _| Err(GatewayError::unavailable("down")));
        let initial = LikeSnapshot {
            state: ToggleState::Set,
            count: 3,
        };
        mirror
            .set_like(&user("u1"), &design_id("d1"), ToggleState::Set)
            .expect("seed mirror");
        let controller = like_controller(gateway, mirror.clone(), initial);

        assert!(controller.toggle().await.is_err());
        assert_eq!(controller.snapshot(), initial);
        assert_eq!(mirror.likes().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn server_direction_wins_over_optimistic_guess(mirror: MirrorStore) {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_toggle_like()
            .returning(|_, _| Ok(ToggleState::Set));
        let initial = LikeSnapshot {
            state: ToggleState::Set,
            count: 0,
        };
        let controller = like_controller(gateway, mirror, initial);
        let confirmed = controller.toggle().await.expect("confirmed");
        assert_eq!(confirmed, LikeSnapshot { state: ToggleState::Set, count: 1 });
    }

    /// Gateway that holds every like confirmation until released.
    struct GatedGateway {
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl InteractionGateway for GatedGateway {
        async fn toggle_like(&self, _: &UserId, _: &DesignId) -> Result<ToggleState, GatewayError> {
            self.release.notified().await;
            Ok(ToggleState::Set)
        }

        async fn set_favorite(
            &self,
            _: &UserId,
            _: &DesignId,
            desired: ToggleState,
        ) -> Result<ToggleState, GatewayError> {
            Ok(desired)
        }

        async fn set_follow(
            &self,
            _: &UserId,
            _: &UserId,
            desired: ToggleState,
        ) -> Result<ToggleState, GatewayError> {
            Ok(desired)
        }
    }

    #[rstest]
    #[tokio::test]
    async fn optimistic_value_is_observable_before_confirmation(mirror: MirrorStore) {
        let gateway = Arc::new(GatedGateway {
            release: tokio::sync::Notify::new(),
        });
        let controller = Arc::new(LikeController::new(
            gateway.clone(),
            mirror,
            user("u1"),
            design_id("d1"),
            LikeSnapshot {
                state: ToggleState::Unset,
                count: 0,
            },
        ));
        let mut updates = controller.subscribe();
        let task = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.toggle().await }
        });

        updates.changed().await.expect("optimistic update");
        assert_eq!(
            *updates.borrow_and_update(),
            LikeSnapshot {
                state: ToggleState::Set,
                count: 1
            }
        );
        gateway.release.notify_one();
        let confirmed = task.await.expect("join").expect("confirmed");
        assert_eq!(confirmed.count, 1);
    }

    fn favorite_target() -> PreferenceTarget {
        PreferenceTarget::Favorite {
            user_id: user("u1"),
            design_id: design_id("d1"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn persistent_failure_keeps_preference_locally(mirror: MirrorStore) {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_set_favorite()
            .returning(|_, _, _| Err(GatewayError::unavailable("relation missing")));
        let controller = PreferenceController::new(
            Arc::new(gateway),
            mirror.clone(),
            favorite_target(),
            ToggleState::Unset,
        );
        let outcome = controller.toggle().await.expect("kept locally");
        assert_eq!(outcome, Confirmation::KeptLocally(ToggleState::Set));
        assert_eq!(controller.state(), ToggleState::Set);
        assert_eq!(mirror.favorites().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_follow_rolls_back(mirror: MirrorStore) {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_set_follow()
            .returning(|_, _, _| Err(GatewayError::rejected(400_u16, "self follow")));
        let controller = PreferenceController::new(
            Arc::new(gateway),
            mirror.clone(),
            PreferenceTarget::Follow {
                follower_id: user("u1"),
                followed_id: user("u2"),
            },
            ToggleState::Unset,
        );
        assert!(controller.toggle().await.is_err());
        assert_eq!(controller.state(), ToggleState::Unset);
        assert!(mirror.follows().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn confirmed_favourite_syncs_mirror(mirror: MirrorStore) {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_set_favorite()
            .returning(|_, _, desired| Ok(desired));
        let controller = PreferenceController::new(
            Arc::new(gateway),
            mirror.clone(),
            favorite_target(),
            ToggleState::Unset,
        );
        assert_eq!(
            controller.toggle().await.expect("confirmed"),
            Confirmation::Confirmed(ToggleState::Set)
        );
        assert_eq!(mirror.favorites().len(), 1);
    }
}
