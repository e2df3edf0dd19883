//! Driving port for account use-cases.

use async_trait::async_trait;

use crate::domain::{AccessToken, AuthSession, Error, LoginCredentials, Profile, Registered, Registration};

/// Sign-in, sign-up and the caller's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    async fn register(&self, registration: &Registration) -> Result<Registered, Error>;

    async fn logout(&self, token: &AccessToken) -> Result<(), Error>;

    /// Profile of the token's account, created on first request.
    async fn profile(&self, token: &AccessToken) -> Result<Profile, Error>;
}
