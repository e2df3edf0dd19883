//! User identity primitives.
//!
//! Gallery owners are either users authenticated by the hosted provider or
//! transient identities minted on the client (`temp-<millis>-<random>`).
//! Both are carried as a [`UserId`]; the transient prefix decides which
//! write policies apply.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix marking a locally generated, unauthenticated identity.
pub const TRANSIENT_PREFIX: &str = "temp-";
/// Maximum accepted length of a user identifier.
pub const USER_ID_MAX: usize = 128;

const TRANSIENT_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier carried surrounding or embedded whitespace.
    #[error("user id must not contain whitespace")]
    ContainsWhitespace,
    /// The identifier exceeded [`USER_ID_MAX`].
    #[error("user id must be at most {max} characters")]
    TooLong { max: usize },
}

/// Identifier of a design owner or interacting user.
///
/// # Examples
/// ```
/// use pawprint::domain::UserId;
///
/// let transient = UserId::new("temp-1").unwrap();
/// assert!(transient.is_transient());
/// let member = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert!(!member.is_transient());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(UserIdValidationError::ContainsWhitespace);
        }
        if raw.chars().count() > USER_ID_MAX {
            return Err(UserIdValidationError::TooLong { max: USER_ID_MAX });
        }
        Ok(Self(raw))
    }

    /// Mint a transient identity of the form `temp-<unix-millis>-<random>`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use pawprint::domain::UserId;
    ///
    /// let id = UserId::generate_transient(Utc::now(), &mut rand::thread_rng());
    /// assert!(id.as_str().starts_with("temp-"));
    /// ```
    pub fn generate_transient(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..TRANSIENT_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..BASE36.len());
                char::from(BASE36.get(idx).copied().unwrap_or(b'0'))
            })
            .collect();
        Self(format!(
            "{TRANSIENT_PREFIX}{}-{suffix}",
            now.timestamp_millis()
        ))
    }

    /// Whether this identity was minted locally without authentication.
    pub fn is_transient(&self) -> bool {
        self.0.starts_with(TRANSIENT_PREFIX)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
