//! Merging remote results with locally mirrored entities.
//!
//! Local entries win over remote entries with the same key; entries that only
//! exist on one side survive. Output is ordered newest first. Counters are
//! never summed across sources: the displayed value is the larger of the
//! remote counter and the number of matching local rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{Comment, Design, DesignId, Favorite, Follow, Like, UserId};

/// Entity that can be merged by key and ordered by creation time.
pub trait Reconcilable {
    /// Identity used to match remote and local copies.
    type Key: Ord + Clone;

    fn key(&self) -> Self::Key;

    fn created_at(&self) -> DateTime<Utc>;
}

/// Merge `remote` and `local`, letting local entries override.
///
/// # Examples
/// ```
/// use chrono::{DateTime, Utc};
/// use pawprint::domain::reconcile::{merge, Reconcilable};
///
/// #[derive(Debug, PartialEq)]
/// struct Item(u32, &'static str);
///
/// impl Reconcilable for Item {
///     type Key = u32;
///     fn key(&self) -> u32 { self.0 }
///     fn created_at(&self) -> DateTime<Utc> { DateTime::UNIX_EPOCH }
/// }
///
/// let merged = merge(vec![Item(1, "a")], vec![Item(1, "b")]);
/// assert_eq!(merged, vec![Item(1, "b")]);
/// ```
pub fn merge<T: Reconcilable>(remote: Vec<T>, local: Vec<T>) -> Vec<T> {
    merge_by(remote, local, |_, local| local)
}

/// Merge with a custom resolver for keys present on both sides.
///
/// `resolve` receives `(remote, local)` and returns the surviving entity.
pub fn merge_by<T, F>(remote: Vec<T>, local: Vec<T>, mut resolve: F) -> Vec<T>
where
    T: Reconcilable,
    F: FnMut(T, T) -> T,
{
    let mut merged: BTreeMap<T::Key, T> = BTreeMap::new();
    for entity in remote {
        merged.insert(entity.key(), entity);
    }
    for entity in local {
        let key = entity.key();
        let survivor = match merged.remove(&key) {
            Some(existing) => resolve(existing, entity),
            None => entity,
        };
        merged.insert(key, survivor);
    }
    let mut out: Vec<T> = merged.into_values().collect();
    out.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.key().cmp(&b.key()))
    });
    out
}

/// Counter shown to users: `max(remote, local_matches)`, never the sum.
pub fn displayed_count(remote: u64, local_matches: usize) -> u64 {
    remote.max(u64::try_from(local_matches).unwrap_or(u64::MAX))
}

/// Merge designs and reconcile their counters against mirrored likes and
/// comments.
pub fn reconcile_designs(
    remote: Vec<Design>,
    local: Vec<Design>,
    likes: &[Like],
    comments: &[Comment],
) -> Vec<Design> {
    let mut merged = merge_by(remote, local, |remote, mut local| {
        local.likes_count = local.likes_count.max(remote.likes_count);
        local.comments_count = local.comments_count.max(remote.comments_count);
        local
    });
    for design in &mut merged {
        let liked = likes.iter().filter(|l| l.design_id == design.id).count();
        let commented = comments.iter().filter(|c| c.design_id == design.id).count();
        design.likes_count = displayed_count(design.likes_count, liked);
        design.comments_count = displayed_count(design.comments_count, commented);
    }
    merged
}

impl Reconcilable for Design {
    type Key = DesignId;

    fn key(&self) -> DesignId {
        self.id.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Reconcilable for Comment {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Reconcilable for Like {
    type Key = (UserId, DesignId);

    fn key(&self) -> Self::Key {
        (self.user_id.clone(), self.design_id.clone())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Reconcilable for Favorite {
    type Key = (UserId, DesignId);

    fn key(&self) -> Self::Key {
        (self.user_id.clone(), self.design_id.clone())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Reconcilable for Follow {
    type Key = (UserId, UserId);

    fn key(&self) -> Self::Key {
        (self.follower_id().clone(), self.followed_id().clone())
    }

    fn created_at(&self) -> DateTime<Utc> {
        Follow::created_at(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DesignDraft, NewDesign};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Entity {
        id: u32,
        v: &'static str,
        at: i64,
    }

    impl Reconcilable for Entity {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.at, 0).single().unwrap_or_default()
        }
    }

    fn entity(id: u32, v: &'static str, at: i64) -> Entity {
        Entity { id, v, at }
    }

    fn design(id: &str, at: i64, likes: u64) -> Design {
        let draft = NewDesign::parse(DesignDraft {
            owner_id: Some("u1".into()),
            components: Some(json!({})),
            ..DesignDraft::default()
        })
        .expect("valid draft");
        let mut design = Design::from_new(
            DesignId::new(id).expect("id"),
            draft,
            Utc.timestamp_opt(at, 0).single().expect("timestamp"),
        );
        design.likes_count = likes;
        design
    }

    #[rstest]
    fn local_overrides_remote_with_same_key() {
        let merged = merge(vec![entity(1, "a", 0)], vec![entity(1, "b", 0)]);
        assert_eq!(merged, vec![entity(1, "b", 0)]);
    }

    #[rstest]
    fn disjoint_entities_both_survive() {
        let merged = merge(vec![entity(2, "r", 10)], vec![entity(3, "l", 20)]);
        let ids: Vec<u32> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[rstest]
    fn output_is_newest_first_with_key_tiebreak() {
        let merged = merge(
            vec![entity(5, "a", 1), entity(4, "b", 3)],
            vec![entity(6, "c", 3)],
        );
        let ids: Vec<u32> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 6, 5]);
    }

    #[rstest]
    #[case(1, 1, 1)]
    #[case(3, 1, 3)]
    #[case(0, 2, 2)]
    fn displayed_count_is_max(#[case] remote: u64, #[case] local: usize, #[case] expected: u64) {
        assert_eq!(displayed_count(remote, local), expected);
    }

    #[rstest]
    fn same_like_in_both_sources_is_not_double_counted() {
        let remote = vec![design("d1", 0, 1)];
        let likes = vec![Like {
            user_id: UserId::new("u1").expect("id"),
            design_id: DesignId::new("d1").expect("id"),
            created_at: Utc::now(),
        }];
        let merged = reconcile_designs(remote, Vec::new(), &likes, &[]);
        assert_eq!(merged.first().map(|d| d.likes_count), Some(1));
    }

    #[rstest]
    fn local_design_keeps_larger_remote_counter() {
        let mut local = design("d1", 0, 0);
        local.title = "Local".into();
        let merged = reconcile_designs(vec![design("d1", 0, 4)], vec![local], &[], &[]);
        let first = merged.first().expect("one design");
        assert_eq!(first.title, "Local");
        assert_eq!(first.likes_count, 4);
    }
}
