//! Reqwest-backed adapter for the hosted authentication provider.
//!
//! Speaks the GoTrue REST dialect: password grant, sign-up, logout and the
//! current-user endpoint. Payload decoding lives in the private `dto`
//! module; this file owns transport and status mapping.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{AccessToken, AuthSession, AuthUser, LoginCredentials, Registered, Registration};

use self::dto::{ErrorDto, SignUpDto, SessionDto, UserDto};

/// [`AuthProvider`] backed by the hosted auth REST API.
pub struct HostedAuthProvider {
    client: Client,
    base: Url,
    anon_key: Zeroizing<String>,
}

fn map_transport_error(error: reqwest::Error) -> AuthProviderError {
    if error.is_timeout() {
        AuthProviderError::timeout(error.to_string())
    } else {
        AuthProviderError::connection(error.to_string())
    }
}

/// Map a non-success response onto the port's error vocabulary.
fn classify_failure(status: StatusCode, body: &[u8]) -> AuthProviderError {
    let parsed: ErrorDto = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed.message();
    match status {
        StatusCode::BAD_REQUEST if parsed.is_invalid_grant() => {
            AuthProviderError::invalid_credentials()
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthProviderError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            AuthProviderError::timeout(message)
        }
        status => AuthProviderError::rejected(status.as_u16(), message),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AuthProviderError> {
    serde_json::from_slice(body).map_err(|err| AuthProviderError::decode(err.to_string()))
}

impl HostedAuthProvider {
    /// Build an adapter with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        anon_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            anon_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthProviderError> {
        self.base
            .join(path)
            .map_err(|err| AuthProviderError::connection(format!("invalid auth url: {err}")))
    }

    fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.anon_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send `builder` and return the body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, AuthProviderError> {
        let response = self
            .with_key(builder)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), "auth provider response");
        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(classify_failure(status, body.as_ref()))
        }
    }
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = self
            .send(self.client.post(url).json(&json!({
                "email": credentials.email(),
                "password": credentials.password(),
            })))
            .await?;
        decode::<SessionDto>(&body)?.into_domain()
    }

    async fn sign_up(&self, registration: &Registration) -> Result<Registered, AuthProviderError> {
        let credentials = registration.credentials();
        let url = self.endpoint("auth/v1/signup")?;
        let body = self
            .send(self.client.post(url).json(&json!({
                "email": credentials.email(),
                "password": credentials.password(),
                "data": { "username": registration.username() },
            })))
            .await?;
        decode::<SignUpDto>(&body)?.into_domain()
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send(self.client.post(url).bearer_auth(token.expose()))
            .await
            .map(|_| ())
    }

    async fn user(&self, token: &AccessToken) -> Result<AuthUser, AuthProviderError> {
        let url = self.endpoint("auth/v1/user")?;
        let body = self
            .send(self.client.get(url).bearer_auth(token.expose()))
            .await?;
        decode::<UserDto>(&body)?.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#, "invalid_credentials")]
    #[case(StatusCode::BAD_REQUEST, r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#, "invalid_credentials")]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, r#"{"msg":"Password should be at least 6 characters"}"#, "rejected")]
    #[case(StatusCode::UNAUTHORIZED, r#"{"msg":"invalid JWT"}"#, "unauthorized")]
    #[case(StatusCode::GATEWAY_TIMEOUT, "", "timeout")]
    #[case(StatusCode::SERVICE_UNAVAILABLE, "", "rejected")]
    fn failures_are_classified(#[case] status: StatusCode, #[case] body: &str, #[case] kind: &str) {
        assert_eq!(classify_failure(status, body.as_bytes()).kind(), kind);
    }

    #[rstest]
    fn rejected_status_is_preserved() {
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert_eq!(
            err,
            AuthProviderError::Rejected {
                status: 503,
                message: "auth provider returned no message".to_owned()
            }
        );
    }
}
