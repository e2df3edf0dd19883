//! Least-privilege record store access with single-step escalation.
//!
//! Every request first runs under the credential a [`CredentialPolicy`]
//! derives from the caller. When the store rejects it in a way the policy
//! considers recoverable, the request is retried exactly once under the
//! escalated credential. The tier that finally served the request is
//! reported back so callers can tell whether a follow-up read will see the
//! write.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::ports::{
    AccessTier, Credential, RecordStore, RecordStoreError, Row, StoreRequest, decode_rows,
};
use super::{Caller, Error};

/// Chooses the credential for a request and whether to escalate.
pub trait CredentialPolicy: Send + Sync {
    /// Credential for the first attempt.
    fn initial(&self, caller: &Caller) -> Credential;

    /// Credential for the single retry after `error`, if any.
    fn escalate(&self, attempted: &Credential, error: &RecordStoreError) -> Option<Credential>;
}

/// Try the caller's own token (or anonymous access), then the privileged
/// tier on policy rejection or a missing relation.
#[derive(Debug, Default, Clone, Copy)]
pub struct EscalateOnRejection;

impl CredentialPolicy for EscalateOnRejection {
    fn initial(&self, caller: &Caller) -> Credential {
        caller
            .access_token()
            .cloned()
            .map_or(Credential::Anonymous, Credential::Bearer)
    }

    fn escalate(&self, attempted: &Credential, error: &RecordStoreError) -> Option<Credential> {
        if matches!(attempted, Credential::Privileged) || !error.is_escalatable() {
            return None;
        }
        Some(Credential::Privileged)
    }
}

/// A result together with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiered<T> {
    pub value: T,
    pub tier: AccessTier,
}

/// Record store client applying a [`CredentialPolicy`] uniformly to every
/// relation.
#[derive(Clone)]
pub struct TieredStore {
    store: Arc<dyn RecordStore>,
    policy: Arc<dyn CredentialPolicy>,
}

impl TieredStore {
    pub fn new(store: Arc<dyn RecordStore>, policy: Arc<dyn CredentialPolicy>) -> Self {
        Self { store, policy }
    }

    /// Store client using [`EscalateOnRejection`].
    pub fn escalating(store: Arc<dyn RecordStore>) -> Self {
        Self::new(store, Arc::new(EscalateOnRejection))
    }

    /// Tier the first attempt for `caller` runs under.
    pub fn read_tier(&self, caller: &Caller) -> AccessTier {
        self.policy.initial(caller).tier()
    }

    /// Execute `request`, escalating once if the policy allows.
    ///
    /// A missing relation whose privileged retry cannot run reports the
    /// original `RelationMissing` rather than the configuration error.
    pub async fn run(
        &self,
        caller: &Caller,
        request: &StoreRequest,
    ) -> Result<Tiered<Vec<Row>>, RecordStoreError> {
        let credential = self.policy.initial(caller);
        let first = match self.store.execute(&credential, request).await {
            Ok(rows) => {
                return Ok(Tiered {
                    value: rows,
                    tier: credential.tier(),
                });
            }
            Err(err) => err,
        };
        let Some(escalated) = self.policy.escalate(&credential, &first) else {
            return Err(first);
        };
        warn!(
            relation = %request.relation,
            operation = request.operation.name(),
            from = %credential.tier(),
            to = %escalated.tier(),
            reason = first.kind(),
            "escalating record store request"
        );
        match self.store.execute(&escalated, request).await {
            Ok(rows) => Ok(Tiered {
                value: rows,
                tier: escalated.tier(),
            }),
            Err(RecordStoreError::PrivilegeUnavailable { .. })
                if matches!(first, RecordStoreError::RelationMissing { .. }) =>
            {
                Err(first)
            }
            Err(retry) => Err(retry),
        }
    }

    /// Read rows, treating a relation missing on every tier as empty.
    pub async fn select(
        &self,
        caller: &Caller,
        request: &StoreRequest,
    ) -> Result<Tiered<Vec<Row>>, RecordStoreError> {
        match self.run(caller, request).await {
            Err(RecordStoreError::RelationMissing { relation }) => {
                debug!(%relation, "relation missing; returning no rows");
                Ok(Tiered {
                    value: Vec::new(),
                    tier: self.read_tier(caller),
                })
            }
            other => other,
        }
    }

    /// [`Self::select`] followed by decoding into `T`.
    pub async fn select_as<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        request: &StoreRequest,
    ) -> Result<Tiered<Vec<T>>, RecordStoreError> {
        let rows = self.select(caller, request).await?;
        Ok(Tiered {
            value: decode_rows(rows.value)?,
            tier: rows.tier,
        })
    }
}

impl From<RecordStoreError> for Error {
    fn from(err: RecordStoreError) -> Self {
        match &err {
            RecordStoreError::Connection { .. } => {
                Error::service_unavailable("the gallery store is unreachable")
            }
            RecordStoreError::Timeout { .. } => Error::timeout("the gallery store timed out"),
            RecordStoreError::PolicyViolation { relation, .. } => {
                Error::forbidden(format!("access to {relation} was denied"))
            }
            RecordStoreError::RelationMissing { relation } => {
                Error::service_unavailable(format!("{relation} feature is unavailable"))
            }
            RecordStoreError::PrivilegeUnavailable { relation } => {
                Error::forbidden(format!("access to {relation} was denied")).with_details(json!({
                    "relation": relation,
                    "code": "privileged_access_unavailable",
                }))
            }
            RecordStoreError::Rejected { message } => Error::invalid_request(message.clone()),
            RecordStoreError::Decode { .. } => Error::internal(err.to_string()),
        }
    }
}
