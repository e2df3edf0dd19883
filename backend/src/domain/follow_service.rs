//! Follow edges between designers.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::ports::{FollowInteractions, Relation, StoreRequest, encode_row};
use super::{Caller, Connections, Error, Follow, FollowOutcome, TieredStore, UserId};

/// Service implementing [`FollowInteractions`].
#[derive(Clone)]
pub struct FollowService {
    store: TieredStore,
    clock: Arc<dyn Clock>,
}

impl FollowService {
    pub fn new(store: TieredStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn edge(request: StoreRequest, follower_id: &UserId, followed_id: &UserId) -> StoreRequest {
        request
            .eq("follower_id", follower_id.as_str())
            .eq("followed_id", followed_id.as_str())
    }

    async fn ends(
        &self,
        caller: &Caller,
        column: &str,
        user_id: &UserId,
        pick: fn(&Follow) -> &UserId,
    ) -> Result<Vec<UserId>, Error> {
        let request = StoreRequest::select(Relation::Follows)
            .eq(column, user_id.as_str())
            .order_desc("created_at");
        let edges = self.store.select_as::<Follow>(caller, &request).await?;
        Ok(edges.value.iter().map(|edge| pick(edge).clone()).collect())
    }
}

#[async_trait]
impl FollowInteractions for FollowService {
    async fn connections(&self, caller: &Caller, user_id: &UserId) -> Result<Connections, Error> {
        Ok(Connections {
            followers: self
                .ends(caller, "followed_id", user_id, Follow::follower_id)
                .await?,
            following: self
                .ends(caller, "follower_id", user_id, Follow::followed_id)
                .await?,
        })
    }

    async fn follow(
        &self,
        caller: &Caller,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<FollowOutcome, Error> {
        let follow = Follow::new(follower_id.clone(), followed_id.clone(), self.clock.utc())
            .map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "followedId",
                    "code": "self_follow",
                }))
            })?;
        let existing = self
            .store
            .select_as::<Follow>(
                caller,
                &Self::edge(StoreRequest::select(Relation::Follows), follower_id, followed_id),
            )
            .await?;
        if let Some(edge) = existing.value.into_iter().next() {
            return Ok(FollowOutcome {
                follow: edge,
                already_following: true,
            });
        }
        let request = StoreRequest::insert(Relation::Follows, vec![encode_row(&follow)?]);
        let stored = self.store.run(caller, &request).await?;
        info!(%follower_id, %followed_id, tier = %stored.tier, "follow added");
        Ok(FollowOutcome {
            follow,
            already_following: false,
        })
    }

    async fn unfollow(
        &self,
        caller: &Caller,
        follower_id: &UserId,
        followed_id: &UserId,
    ) -> Result<(), Error> {
        let request = Self::edge(StoreRequest::delete(Relation::Follows), follower_id, followed_id);
        self.store.run(caller, &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockRecordStore, Operation};
    use crate::test_support::{MutableClock, fixture_timestamp, user};
    use rstest::rstest;

    fn service(store: MockRecordStore) -> FollowService {
        FollowService::new(
            TieredStore::escalating(Arc::new(store)),
            Arc::new(MutableClock::new(fixture_timestamp())),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn self_follow_is_rejected_before_any_write() {
        let mut store = MockRecordStore::new();
        store.expect_execute().never();
        let err = service(store)
            .follow(&Caller::anonymous(), &user("u1"), &user("u1"))
            .await
            .expect_err("self follow");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn new_follow_is_inserted() {
        let mut store = MockRecordStore::new();
        store
            .expect_execute()
            .withf(|_, request| matches!(request.operation, Operation::Select))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_execute()
            .withf(|_, request| matches!(request.operation, Operation::Insert(_)))
            .times(1)
            .returning(|_, request| match &request.operation {
                Operation::Insert(rows) => Ok(rows.clone()),
                _ => Ok(Vec::new()),
            });
        let outcome = service(store)
            .follow(&Caller::anonymous(), &user("u1"), &user("u2"))
            .await
            .expect("follow");
        assert!(!outcome.already_following);
        assert_eq!(outcome.follow.followed_id(), &user("u2"));
    }

    #[rstest]
    #[tokio::test]
    async fn connections_split_followers_and_following() {
        let mut store = MockRecordStore::new();
        store.expect_execute().returning(|_, request| {
            let edge = |from: &str, to: &str| {
                encode_row(&json!({
                    "follower_id": from,
                    "followed_id": to,
                    "created_at": "2026-01-01T00:00:00Z",
                }))
                .expect("row")
            };
            let followers_query = request
                .filters
                .iter()
                .any(|f| matches!(f, crate::domain::ports::Filter::Eq { column, .. } if column == "followed_id"));
            Ok(if followers_query {
                vec![edge("u2", "u1"), edge("u3", "u1")]
            } else {
                vec![edge("u1", "u4")]
            })
        });
        let connections = service(store)
            .connections(&Caller::anonymous(), &user("u1"))
            .await
            .expect("connections");
        assert_eq!(connections.followers, vec![user("u2"), user("u3")]);
        assert_eq!(connections.following, vec![user("u4")]);
    }
}
