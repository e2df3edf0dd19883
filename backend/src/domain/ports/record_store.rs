//! Port for the hosted relational record store.
//!
//! The store exposes every relation through one request shape: an operation
//! on a [`Relation`] narrowed by equality filters. Each request runs under a
//! single [`Credential`]; choosing and escalating credentials is the job of
//! [`crate::domain::TieredStore`], not of adapters.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::AccessToken;

use super::define_port_error;

/// One record as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Relations exposed by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Designs,
    Likes,
    Comments,
    Favorites,
    Follows,
    Tags,
    DesignTags,
    Profiles,
}

impl Relation {
    /// Every relation, in schema order.
    pub const ALL: [Relation; 8] = [
        Relation::Designs,
        Relation::Likes,
        Relation::Comments,
        Relation::Favorites,
        Relation::Follows,
        Relation::Tags,
        Relation::DesignTags,
        Relation::Profiles,
    ];

    /// Table name used by the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Designs => "designs",
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Favorites => "favorites",
            Self::Follows => "follows",
            Self::Tags => "tags",
            Self::DesignTags => "design_tags",
            Self::Profiles => "profiles",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Relation> for String {
    fn from(value: Relation) -> Self {
        value.as_str().to_owned()
    }
}

/// Row filter. Only the predicates the gallery needs are modelled.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: Value },
    /// `column IN (values)`
    In { column: String, values: Vec<Value> },
}

impl Filter {
    /// Evaluate the filter against a row.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Eq { column, value } => row.get(column) == Some(value),
            Self::In { column, values } => row
                .get(column)
                .is_some_and(|found| values.iter().any(|v| v == found)),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// What a request does.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    Insert(Vec<Row>),
    /// Set the given columns on every matching row.
    Update(Row),
    Delete,
}

impl Operation {
    /// Whether the operation mutates state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Select)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }
}

/// A single record-store request.
///
/// # Examples
/// ```
/// use pawprint::domain::ports::{Relation, StoreRequest};
///
/// let request = StoreRequest::select(Relation::Designs)
///     .eq("user_id", "temp-1")
///     .order_desc("created_at")
///     .limit(20);
/// assert_eq!(request.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    pub relation: Relation,
    pub operation: Operation,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl StoreRequest {
    fn new(relation: Relation, operation: Operation) -> Self {
        Self {
            relation,
            operation,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(relation: Relation) -> Self {
        Self::new(relation, Operation::Select)
    }

    pub fn insert(relation: Relation, rows: Vec<Row>) -> Self {
        Self::new(relation, Operation::Insert(rows))
    }

    pub fn update(relation: Relation, changes: Row) -> Self {
        Self::new(relation, Operation::Update(changes))
    }

    pub fn delete(relation: Relation) -> Self {
        Self::new(relation, Operation::Delete)
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Add a membership filter.
    pub fn any_of(mut self, column: &str, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In {
            column: column.to_owned(),
            values,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }
}

/// Privilege level a request actually ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    Anonymous,
    Authenticated,
    Privileged,
}

impl AccessTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Privileged => "privileged",
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential presented to the store for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Public API key only.
    Anonymous,
    /// Public API key plus the caller's bearer token.
    Bearer(AccessToken),
    /// Service-role key that bypasses row-level policy.
    Privileged,
}

impl Credential {
    pub fn tier(&self) -> AccessTier {
        match self {
            Self::Anonymous => AccessTier::Anonymous,
            Self::Bearer(_) => AccessTier::Authenticated,
            Self::Privileged => AccessTier::Privileged,
        }
    }
}

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "record store connection failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "record store request timed out: {message}",
        /// Row-level policy rejected the request.
        PolicyViolation { relation: String, message: String } =>
            "row-level policy rejected access to {relation}: {message}",
        /// The relation is not present in the schema.
        RelationMissing { relation: String } =>
            "relation {relation} does not exist",
        /// A privileged request was made but no service key is configured.
        PrivilegeUnavailable { relation: String } =>
            "privileged access to {relation} is not configured",
        /// The store refused the request for another reason.
        Rejected { message: String } =>
            "record store rejected the request: {message}",
        /// The response body did not have the expected shape.
        Decode { message: String } =>
            "record store response could not be decoded: {message}",
    }
}

impl RecordStoreError {
    /// Whether a privileged retry may succeed where this attempt failed.
    pub fn is_escalatable(&self) -> bool {
        matches!(
            self,
            Self::PolicyViolation { .. } | Self::RelationMissing { .. }
        )
    }
}

/// Port executing requests against the record store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run `request` under `credential`, returning affected or selected rows.
    async fn execute(
        &self,
        credential: &Credential,
        request: &StoreRequest,
    ) -> Result<Vec<Row>, RecordStoreError>;
}

/// Encode a serialisable value as a row.
pub fn encode_row<T: Serialize>(value: &T) -> Result<Row, RecordStoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(RecordStoreError::decode(format!(
            "expected an object, got {other}"
        ))),
        Err(err) => Err(RecordStoreError::decode(err.to_string())),
    }
}

/// Decode rows into typed records.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, RecordStoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row))
                .map_err(|err| RecordStoreError::decode(err.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[rstest]
    fn filters_match_equal_and_membership() {
        let request = StoreRequest::select(Relation::Likes)
            .eq("user_id", "u1")
            .any_of("design_id", vec![json!("d1"), json!("d2")]);
        assert!(request.matches(&row(json!({ "user_id": "u1", "design_id": "d2" }))));
        assert!(!request.matches(&row(json!({ "user_id": "u1", "design_id": "d3" }))));
        assert!(!request.matches(&row(json!({ "design_id": "d1" }))));
    }

    #[rstest]
    #[case(RecordStoreError::policy_violation("designs", "rls"), true)]
    #[case(RecordStoreError::relation_missing("tags"), true)]
    #[case(RecordStoreError::connection("refused"), false)]
    #[case(RecordStoreError::privilege_unavailable("designs"), false)]
    fn escalation_is_limited_to_access_rejections(
        #[case] err: RecordStoreError,
        #[case] expected: bool,
    ) {
        assert_eq!(err.is_escalatable(), expected);
    }

    #[rstest]
    fn credential_tiers() {
        let token = AccessToken::new("t").expect("token");
        assert_eq!(Credential::Anonymous.tier(), AccessTier::Anonymous);
        assert_eq!(Credential::Bearer(token).tier(), AccessTier::Authenticated);
        assert_eq!(Credential::Privileged.tier(), AccessTier::Privileged);
    }

    #[rstest]
    fn decode_rows_reports_shape_errors() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }
        let err = decode_rows::<Named>(vec![row(json!({ "other": 1 }))]).expect_err("missing");
        assert_eq!(err.kind(), "decode");
    }
}
