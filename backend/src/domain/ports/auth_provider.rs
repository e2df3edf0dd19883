//! Port for the hosted authentication provider.
//!
//! Account management is delegated entirely; the gallery only forwards
//! credentials and reads back the account behind a bearer token.

use async_trait::async_trait;

use crate::domain::{AccessToken, AuthSession, AuthUser, LoginCredentials, Registered, Registration, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth provider adapters.
    pub enum AuthProviderError {
        /// Email and password did not match an account.
        InvalidCredentials => "invalid email or password",
        /// The bearer token is missing, expired or revoked.
        Unauthorized { message: String } => "not authorised: {message}",
        /// The provider refused the request.
        Rejected { status: u16, message: String } =>
            "auth provider rejected the request with status {status}: {message}",
        /// The provider could not be reached.
        Connection { message: String } => "auth provider connection failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } => "auth provider request timed out: {message}",
        /// The provider answered with an unexpected payload.
        Decode { message: String } => "auth provider response could not be decoded: {message}",
    }
}

/// Hosted authentication operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in(&self, credentials: &LoginCredentials)
    -> Result<AuthSession, AuthProviderError>;

    /// Create an account.
    async fn sign_up(&self, registration: &Registration) -> Result<Registered, AuthProviderError>;

    /// Revoke the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError>;

    /// Account owning `token`.
    async fn user(&self, token: &AccessToken) -> Result<AuthUser, AuthProviderError>;
}

/// Development provider with a single account.
///
/// Any email signs in with the password `password`; the issued token is
/// [`FixtureAuthProvider::TOKEN`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

impl FixtureAuthProvider {
    pub const TOKEN: &'static str = "fixture-access-token";
    pub const USER_ID: &'static str = "123e4567-e89b-12d3-a456-426614174000";

    fn account(email: &str, username: Option<&str>) -> Result<AuthUser, AuthProviderError> {
        let id = UserId::new(Self::USER_ID)
            .map_err(|err| AuthProviderError::decode(format!("invalid fixture user id: {err}")))?;
        Ok(AuthUser {
            id,
            email: Some(email.to_owned()),
            username: username.map(str::to_owned),
        })
    }

    fn session(user: AuthUser) -> Result<AuthSession, AuthProviderError> {
        let access_token = AccessToken::new(Self::TOKEN)
            .ok_or_else(|| AuthProviderError::decode("fixture token is blank"))?;
        Ok(AuthSession {
            access_token,
            expires_in: Some(3600),
            user,
        })
    }
}

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        if credentials.password() != "password" {
            return Err(AuthProviderError::invalid_credentials());
        }
        Self::session(Self::account(credentials.email(), None)?)
    }

    async fn sign_up(&self, registration: &Registration) -> Result<Registered, AuthProviderError> {
        let user = Self::account(registration.credentials().email(), registration.username())?;
        let session = Self::session(user.clone())?;
        Ok(Registered {
            user,
            session: Some(session),
        })
    }

    async fn sign_out(&self, _token: &AccessToken) -> Result<(), AuthProviderError> {
        Ok(())
    }

    async fn user(&self, token: &AccessToken) -> Result<AuthUser, AuthProviderError> {
        if token.expose() != Self::TOKEN {
            return Err(AuthProviderError::unauthorized("unknown token"));
        }
        Self::account("fixture@pawprint.test", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("password", true)]
    #[case("wrong", false)]
    #[tokio::test]
    async fn fixture_sign_in(#[case] password: &str, #[case] should_succeed: bool) {
        let creds = LoginCredentials::try_from_parts("ada@example.com", password)
            .expect("credentials shape");
        let result = FixtureAuthProvider.sign_in(&creds).await;
        match (should_succeed, result) {
            (true, Ok(session)) => {
                assert_eq!(session.access_token.expose(), FixtureAuthProvider::TOKEN);
                assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
            }
            (false, Err(err)) => assert_eq!(err, AuthProviderError::InvalidCredentials),
            (_, other) => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fixture_rejects_unknown_tokens() {
        let token = AccessToken::new("other").expect("token");
        let err = FixtureAuthProvider.user(&token).await.expect_err("unknown");
        assert_eq!(err.kind(), "unauthorized");
    }
}
