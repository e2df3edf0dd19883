//! Gallery profile rows created lazily for authenticated accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthUser, UserId};

/// Public profile of an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Profile for a newly seen account. The username falls back to the
    /// local part of the email.
    pub fn for_account(user: &AuthUser, now: DateTime<Utc>) -> Self {
        let username = user.username.clone().or_else(|| {
            user.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .filter(|local| !local.is_empty())
                .map(str::to_owned)
        });
        Self {
            id: user.id.clone(),
            username,
            email: user.email.clone(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_defaults_to_email_local_part() {
        let user = AuthUser {
            id: UserId::new("u1").expect("id"),
            email: Some("ada@example.com".into()),
            username: None,
        };
        let profile = Profile::for_account(&user, Utc::now());
        assert_eq!(profile.username.as_deref(), Some("ada"));
    }
}
