//! In-process record store.
//!
//! Used for local development and integration tests. It can imitate the
//! hosted store's row-level policy: anonymous writes are refused, and rows
//! written with the privileged key stay invisible to unprivileged readers.
//! Relations can be dropped and the whole store can be taken offline to
//! exercise degraded paths.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    AccessTier, Credential, Operation, Order, RecordStore, RecordStoreError, Relation, Row,
    StoreRequest,
};

/// Row-level policy imitated by [`InMemoryRecordStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPolicy {
    /// Refuse writes made with the anonymous credential.
    pub reject_anonymous_writes: bool,
    /// Hide privileged-written rows from anonymous and authenticated reads.
    pub hide_privileged_rows: bool,
}

impl RowPolicy {
    /// Every tier may read and write everything.
    pub const OPEN: Self = Self {
        reject_anonymous_writes: false,
        hide_privileged_rows: false,
    };

    /// Anonymous writes are refused and privileged rows are not readable
    /// below the privileged tier.
    pub const STRICT: Self = Self {
        reject_anonymous_writes: true,
        hide_privileged_rows: true,
    };
}

/// A request as observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub tier: AccessTier,
    pub relation: Relation,
    pub operation: &'static str,
}

#[derive(Debug, Clone)]
struct StoredRow {
    row: Row,
    writer: AccessTier,
}

struct State {
    tables: BTreeMap<Relation, Vec<StoredRow>>,
    missing: BTreeSet<Relation>,
    policy: RowPolicy,
    privileged_enabled: bool,
    unavailable: bool,
    calls: Vec<RecordedCall>,
}

/// [`RecordStore`] holding rows in memory.
pub struct InMemoryRecordStore {
    state: Mutex<State>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new(RowPolicy::OPEN)
    }
}

/// Columns that must be unique per relation.
fn unique_key(relation: Relation) -> &'static [&'static str] {
    match relation {
        Relation::Designs | Relation::Comments | Relation::Profiles => &["id"],
        Relation::Likes | Relation::Favorites => &["user_id", "design_id"],
        Relation::Follows => &["follower_id", "followed_id"],
        Relation::Tags => &["name"],
        Relation::DesignTags => &["design_id", "tag_id"],
    }
}

/// Relations whose rows reference a design and go with it on delete.
const DESIGN_CHILDREN: [Relation; 4] = [
    Relation::Likes,
    Relation::Comments,
    Relation::Favorites,
    Relation::DesignTags,
];

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Row], order: &Order) {
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(&order.column), b.get(&order.column));
        if order.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

impl InMemoryRecordStore {
    pub fn new(policy: RowPolicy) -> Self {
        Self {
            state: Mutex::new(State {
                tables: BTreeMap::new(),
                missing: BTreeSet::new(),
                policy,
                privileged_enabled: true,
                unavailable: false,
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove `relation` from the schema, discarding its rows.
    pub fn drop_relation(&self, relation: Relation) {
        let mut state = self.lock();
        state.missing.insert(relation);
        state.tables.remove(&relation);
    }

    /// Behave as if no service key were configured.
    pub fn disable_privileged(&self) {
        self.lock().privileged_enabled = false;
    }

    /// Fail every request with a connection error while `unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Requests seen so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Every stored row of `relation`, regardless of policy.
    pub fn rows(&self, relation: Relation) -> Vec<Row> {
        self.lock()
            .tables
            .get(&relation)
            .map(|rows| rows.iter().map(|stored| stored.row.clone()).collect())
            .unwrap_or_default()
    }

    /// Insert rows directly, as if written by `writer`.
    pub fn seed(&self, relation: Relation, writer: AccessTier, rows: impl IntoIterator<Item = Row>) {
        let mut state = self.lock();
        let table = state.tables.entry(relation).or_default();
        table.extend(rows.into_iter().map(|row| StoredRow { row, writer }));
    }
}

impl State {
    fn check_access(
        &self,
        credential: &Credential,
        request: &StoreRequest,
    ) -> Result<(), RecordStoreError> {
        let relation = request.relation;
        if self.unavailable {
            return Err(RecordStoreError::connection("store offline"));
        }
        if self.missing.contains(&relation) {
            return Err(RecordStoreError::relation_missing(relation));
        }
        match credential {
            Credential::Privileged if !self.privileged_enabled => {
                Err(RecordStoreError::privilege_unavailable(relation))
            }
            Credential::Anonymous
                if request.operation.is_write() && self.policy.reject_anonymous_writes =>
            {
                Err(RecordStoreError::policy_violation(
                    relation,
                    "new row violates row-level security policy",
                ))
            }
            _ => Ok(()),
        }
    }

    fn visible(&self, stored: &StoredRow, reader: AccessTier) -> bool {
        !(self.policy.hide_privileged_rows
            && stored.writer == AccessTier::Privileged
            && reader != AccessTier::Privileged)
    }

    fn select(&self, tier: AccessTier, request: &StoreRequest) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .tables
            .get(&request.relation)
            .into_iter()
            .flatten()
            .filter(|stored| self.visible(stored, tier) && request.matches(&stored.row))
            .map(|stored| stored.row.clone())
            .collect();
        if let Some(order) = &request.order {
            sort_rows(&mut rows, order);
        }
        if let Some(limit) = request.limit {
            rows.truncate(limit);
        }
        rows
    }

    fn insert(
        &mut self,
        tier: AccessTier,
        relation: Relation,
        rows: &[Row],
    ) -> Result<Vec<Row>, RecordStoreError> {
        let key = unique_key(relation);
        let table = self.tables.entry(relation).or_default();
        for row in rows {
            let clashes = |other: &Row| key.iter().all(|column| row.get(*column) == other.get(*column));
            if table.iter().any(|stored| clashes(&stored.row)) {
                return Err(RecordStoreError::rejected(format!(
                    "duplicate key value violates unique constraint on {relation}"
                )));
            }
        }
        table.extend(rows.iter().cloned().map(|row| StoredRow { row, writer: tier }));
        Ok(rows.to_vec())
    }

    fn update(&mut self, tier: AccessTier, request: &StoreRequest, changes: &Row) -> Vec<Row> {
        let policy = self.policy;
        let Some(table) = self.tables.get_mut(&request.relation) else {
            return Vec::new();
        };
        let mut updated = Vec::new();
        for stored in table.iter_mut() {
            let hidden = policy.hide_privileged_rows
                && stored.writer == AccessTier::Privileged
                && tier != AccessTier::Privileged;
            if !hidden && request.matches(&stored.row) {
                stored.row.extend(changes.clone());
                updated.push(stored.row.clone());
            }
        }
        updated
    }

    fn delete(&mut self, tier: AccessTier, request: &StoreRequest) -> Vec<Row> {
        let policy = self.policy;
        let Some(table) = self.tables.get_mut(&request.relation) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<StoredRow>, Vec<StoredRow>) =
            table.drain(..).partition(|stored| {
                let hidden = policy.hide_privileged_rows
                    && stored.writer == AccessTier::Privileged
                    && tier != AccessTier::Privileged;
                !hidden && request.matches(&stored.row)
            });
        *table = kept;
        let removed: Vec<Row> = removed.into_iter().map(|stored| stored.row).collect();
        if request.relation == Relation::Designs {
            self.cascade_design_delete(&removed);
        }
        removed
    }

    fn cascade_design_delete(&mut self, designs: &[Row]) {
        let ids: Vec<&Value> = designs.iter().filter_map(|row| row.get("id")).collect();
        if ids.is_empty() {
            return;
        }
        for child in DESIGN_CHILDREN {
            if let Some(rows) = self.tables.get_mut(&child) {
                rows.retain(|stored| {
                    stored
                        .row
                        .get("design_id")
                        .is_none_or(|design_id| !ids.contains(&design_id))
                });
            }
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn execute(
        &self,
        credential: &Credential,
        request: &StoreRequest,
    ) -> Result<Vec<Row>, RecordStoreError> {
        let mut state = self.lock();
        let tier = credential.tier();
        state.calls.push(RecordedCall {
            tier,
            relation: request.relation,
            operation: request.operation.name(),
        });
        state.check_access(credential, request)?;
        let rows = match &request.operation {
            Operation::Select => state.select(tier, request),
            Operation::Insert(rows) => state.insert(tier, request.relation, rows)?,
            Operation::Update(changes) => state.update(tier, request, changes),
            Operation::Delete => state.delete(tier, request),
        };
        debug!(
            relation = %request.relation,
            operation = request.operation.name(),
            %tier,
            rows = rows.len(),
            "in-memory store request"
        );
        Ok(rows)
    }
}
