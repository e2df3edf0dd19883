//! Account use-cases proxied to the hosted auth provider.
//!
//! The gallery keeps a `profiles` row per account. It is created the first
//! time an authenticated caller asks for their profile; if that insert
//! fails the derived profile is still returned.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{Accounts, AuthProvider, AuthProviderError, Relation, StoreRequest, encode_row};
use super::{
    AccessToken, AuthSession, Caller, Error, LoginCredentials, Profile, Registered, Registration,
    TieredStore,
};

/// Service implementing [`Accounts`].
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    store: TieredStore,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthProvider>, store: TieredStore, clock: Arc<dyn Clock>) -> Self {
        Self { auth, store, clock }
    }

    fn map_auth_error(error: AuthProviderError) -> Error {
        match error {
            AuthProviderError::InvalidCredentials => {
                Error::unauthorized("invalid email or password")
            }
            AuthProviderError::Unauthorized { message } => Error::unauthorized(message),
            AuthProviderError::Rejected { status, message } if status < 500 => {
                Error::invalid_request(message)
            }
            AuthProviderError::Rejected { message, .. }
            | AuthProviderError::Connection { message } => {
                Error::service_unavailable(format!("auth provider unavailable: {message}"))
            }
            AuthProviderError::Timeout { .. } => Error::timeout("auth provider timed out"),
            AuthProviderError::Decode { message } => {
                Error::internal(format!("auth provider response invalid: {message}"))
            }
        }
    }
}

#[async_trait]
impl Accounts for AccountService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let session = self
            .auth
            .sign_in(credentials)
            .await
            .map_err(Self::map_auth_error)?;
        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<Registered, Error> {
        let registered = self
            .auth
            .sign_up(registration)
            .await
            .map_err(Self::map_auth_error)?;
        info!(user_id = %registered.user.id, confirmed = registered.session.is_some(), "registered");
        Ok(registered)
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), Error> {
        self.auth.sign_out(token).await.map_err(Self::map_auth_error)
    }

    async fn profile(&self, token: &AccessToken) -> Result<Profile, Error> {
        let account = self.auth.user(token).await.map_err(Self::map_auth_error)?;
        let caller = Caller::with_token(token.clone());
        let lookup = StoreRequest::select(Relation::Profiles)
            .eq("id", account.id.as_str())
            .limit(1);
        let existing = self.store.select_as::<Profile>(&caller, &lookup).await?;
        if let Some(profile) = existing.value.into_iter().next() {
            return Ok(profile);
        }
        let profile = Profile::for_account(&account, self.clock.utc());
        let insert = StoreRequest::insert(Relation::Profiles, vec![encode_row(&profile)?]);
        match self.store.run(&caller, &insert).await {
            Ok(stored) => info!(user_id = %profile.id, tier = %stored.tier, "profile created"),
            Err(err) => warn!(user_id = %profile.id, error = %err, "profile row could not be created"),
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixtureAuthProvider, MockAuthProvider, MockRecordStore, Operation, RecordStoreError};
    use crate::test_support::{MutableClock, fixture_timestamp};
    use rstest::rstest;

    fn service(auth: impl AuthProvider + 'static, store: MockRecordStore) -> AccountService {
        AccountService::new(
            Arc::new(auth),
            TieredStore::escalating(Arc::new(store)),
            Arc::new(MutableClock::new(fixture_timestamp())),
        )
    }

    fn token() -> AccessToken {
        AccessToken::new(FixtureAuthProvider::TOKEN).expect("token")
    }

    #[rstest]
    #[tokio::test]
    async fn profile_is_created_lazily() {
        let mut store = MockRecordStore::new();
        store
            .expect_execute()
            .withf(|_, r| matches!(r.operation, Operation::Select))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_execute()
            .withf(|_, r| r.relation == Relation::Profiles && matches!(r.operation, Operation::Insert(_)))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let profile = service(FixtureAuthProvider, store)
            .profile(&token())
            .await
            .expect("profile");
        assert_eq!(profile.id.as_str(), FixtureAuthProvider::USER_ID);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_insert_failure_degrades() {
        let mut store = MockRecordStore::new();
        store.expect_execute().returning(|_, r| match r.operation {
            Operation::Select => Ok(Vec::new()),
            _ => Err(RecordStoreError::rejected("duplicate key")),
        });
        let profile = service(FixtureAuthProvider, store).profile(&token()).await;
        assert!(profile.is_ok());
    }

    #[rstest]
    #[case(AuthProviderError::invalid_credentials(), ErrorCode::Unauthorized)]
    #[case(AuthProviderError::rejected(422_u16, "weak password"), ErrorCode::InvalidRequest)]
    #[case(AuthProviderError::rejected(502_u16, "bad gateway"), ErrorCode::ServiceUnavailable)]
    #[case(AuthProviderError::timeout("slow"), ErrorCode::Timeout)]
    #[tokio::test]
    async fn provider_errors_are_mapped(#[case] failure: AuthProviderError, #[case] expected: ErrorCode) {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .returning(move |_| Err(failure.clone()));
        let creds = LoginCredentials::try_from_parts("ada@example.com", "pw").expect("creds");
        let err = service(auth, MockRecordStore::new())
            .login(&creds)
            .await
            .expect_err("mapped error");
        assert_eq!(err.code(), expected);
    }
}
