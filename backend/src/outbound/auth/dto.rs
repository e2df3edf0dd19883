//! Wire payloads of the hosted auth API.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ports::AuthProviderError;
use crate::domain::{AccessToken, AuthSession, AuthUser, Registered, UserId};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorDto {
    pub(super) fn is_invalid_grant(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
            || self.error_code.as_deref() == Some("invalid_credentials")
    }

    pub(super) fn message(&self) -> String {
        [&self.error_description, &self.msg, &self.message, &self.error]
            .into_iter()
            .find_map(|text| text.clone())
            .unwrap_or_else(|| "auth provider returned no message".to_owned())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Map<String, Value>,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<AuthUser, AuthProviderError> {
        let id = UserId::new(self.id)
            .map_err(|err| AuthProviderError::decode(format!("invalid user id: {err}")))?;
        let username = self
            .user_metadata
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(AuthUser {
            id,
            email: self.email,
            username,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SessionDto {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: UserDto,
}

impl SessionDto {
    pub(super) fn into_domain(self) -> Result<AuthSession, AuthProviderError> {
        let access_token = AccessToken::new(self.access_token)
            .ok_or_else(|| AuthProviderError::decode("blank access token"))?;
        Ok(AuthSession {
            access_token,
            expires_in: self.expires_in,
            user: self.user.into_domain()?,
        })
    }
}

/// Sign-up answers with a session, or with the bare account when email
/// confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpDto {
    Session(SessionDto),
    Account(UserDto),
}

impl SignUpDto {
    pub(super) fn into_domain(self) -> Result<Registered, AuthProviderError> {
        match self {
            Self::Session(session) => {
                let session = session.into_domain()?;
                Ok(Registered {
                    user: session.user.clone(),
                    session: Some(session),
                })
            }
            Self::Account(user) => Ok(Registered {
                user: user.into_domain()?,
                session: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const USER_ID: &str = "7f9c2d0e-2a52-4a4c-9a57-3f7c0c1f3d11";

    #[rstest]
    fn session_payload_decodes_username_metadata() {
        let body = format!(
            r#"{{"access_token":"jwt","token_type":"bearer","expires_in":3600,
               "user":{{"id":"{USER_ID}","email":"ada@example.com","user_metadata":{{"username":"ada"}}}}}}"#
        );
        let session: SessionDto = serde_json::from_str(&body).expect("session");
        let session = session.into_domain().expect("domain");
        assert_eq!(session.access_token.expose(), "jwt");
        assert_eq!(session.user.username.as_deref(), Some("ada"));
    }

    #[rstest]
    fn unconfirmed_sign_up_has_no_session() {
        let body = format!(r#"{{"id":"{USER_ID}","email":"ada@example.com"}}"#);
        let sign_up: SignUpDto = serde_json::from_str(&body).expect("sign up");
        let registered = sign_up.into_domain().expect("domain");
        assert!(registered.session.is_none());
        assert_eq!(registered.user.id.as_str(), USER_ID);
    }
}
