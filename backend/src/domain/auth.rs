//! Authentication primitives: credentials, access tokens, and the request
//! caller.
//!
//! The hosted auth provider owns accounts and sessions. The domain only
//! validates the shape of what is forwarded to it and carries the resulting
//! bearer token so the record store can try the caller's own privileges
//! before escalating.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Minimum password length accepted before forwarding a registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not look like an address.
    #[error("email must contain '@'")]
    MalformedEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Registration password was too short.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Validated login credentials forwarded to the auth provider.
///
/// ## Invariants
/// - `email` is trimmed, non-empty and contains `@`.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use pawprint::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = normalise_email(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    username: Option<String>,
}

impl Registration {
    /// Construct a registration, enforcing [`PASSWORD_MIN`].
    pub fn try_from_parts(
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        Ok(Self {
            credentials,
            username,
        })
    }

    /// Credentials to register.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Optional preferred username stored in the profile.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

fn normalise_email(raw: &str) -> Result<String, CredentialsValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialsValidationError::EmptyEmail);
    }
    if !trimmed.contains('@') {
        return Err(CredentialsValidationError::MalformedEmail);
    }
    Ok(trimmed.to_owned())
}

/// Bearer token issued by the hosted auth provider.
///
/// The token is zeroised on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token. Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Expose the raw token for transport headers.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Account details reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-assigned user id.
    pub id: UserId,
    /// Primary email, when the provider exposes one.
    pub email: Option<String>,
    /// Username chosen at registration, when recorded as metadata.
    pub username: Option<String>,
}

/// Session issued by the auth provider after login or sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub access_token: AccessToken,
    /// Lifetime of the access token in seconds, if reported.
    pub expires_in: Option<u64>,
    /// The signed-in account.
    pub user: AuthUser,
}

/// Result of a sign-up. Providers that require email confirmation return an
/// account without a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// The created account.
    pub user: AuthUser,
    /// Session, when the provider signs the user in immediately.
    pub session: Option<AuthSession>,
}

/// Who is calling, as far as the record store is concerned.
///
/// Only the bearer token matters for privilege selection; the acting user id
/// travels separately in request payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    access_token: Option<AccessToken>,
}

impl Caller {
    /// Caller without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Caller presenting a bearer token.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            access_token: Some(token),
        }
    }

    /// The bearer token, if any.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("   ", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("ada", "pw", CredentialsValidationError::MalformedEmail)]
    #[case("ada@example.com", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_enforces_password_length() {
        let err = Registration::try_from_parts("ada@example.com", "abc", None)
            .expect_err("short password");
        assert_eq!(
            err,
            CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN }
        );
    }

    #[rstest]
    fn registration_drops_blank_username() {
        let reg = Registration::try_from_parts("ada@example.com", "secret1", Some("  "))
            .expect("valid registration");
        assert!(reg.username().is_none());
    }

    #[rstest]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("abc.def").expect("token");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert!(AccessToken::new("  ").is_none());
    }
}
