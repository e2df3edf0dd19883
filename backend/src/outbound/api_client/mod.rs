//! Reqwest client for the gallery's own HTTP API.
//!
//! Implements the client-side [`InteractionGateway`] and [`DesignFeed`]
//! ports. Failures are classified the way the interaction controllers need
//! them: connection failures and 5xx answers mean the backend cannot store
//! the change ([`GatewayError::Unavailable`]), 408/504 and client timeouts
//! are [`GatewayError::Timeout`], other 4xx answers are refusals. A 4xx whose
//! envelope reports a missing privileged client or an unavailable feature
//! also counts as unavailable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::ports::{DesignFeed, GatewayError, InteractionGateway, ToggleState};
use crate::domain::{Design, DesignContent, DesignFilter, DesignId, NewDesign, UserId};

/// HTTP client for `/api/v1`.
pub struct ApiClient {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct LikeToggleDto {
    liked: bool,
}

#[derive(Debug, Deserialize)]
struct DesignsDto {
    designs: Vec<Design>,
}

#[derive(Debug, Deserialize)]
struct DesignDto {
    design: Design,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelopeDto {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

/// Envelope codes meaning the backend could not store the change at all.
const STORAGE_UNAVAILABLE_CODES: [&str; 2] = ["privileged_access_unavailable", "service_unavailable"];

impl ErrorEnvelopeDto {
    fn reports_unavailable_storage(&self) -> bool {
        let detail_code = self
            .details
            .as_ref()
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str);
        [self.code.as_deref(), detail_code]
            .into_iter()
            .flatten()
            .any(|code| STORAGE_UNAVAILABLE_CODES.contains(&code))
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(error.to_string())
    } else {
        GatewayError::unavailable(error.to_string())
    }
}

/// Map a non-success response onto the gateway's error vocabulary.
fn classify_failure(status: StatusCode, body: &[u8]) -> GatewayError {
    let envelope: ErrorEnvelopeDto = serde_json::from_slice(body).unwrap_or_default();
    let storage_unavailable = envelope.reports_unavailable_storage();
    let message = envelope
        .message
        .unwrap_or_else(|| String::from_utf8_lossy(body).chars().take(200).collect());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::timeout(message),
        status if status.is_server_error() || storage_unavailable => {
            GatewayError::unavailable(format!("status {status}: {message}"))
        }
        status => GatewayError::rejected(status.as_u16(), message),
    }
}

/// Request body for `POST /designs`.
fn design_body(design: &NewDesign) -> Value {
    let mut body = json!({
        "title": design.title,
        "user_id": design.owner_id.as_str(),
        "design_type": design.content.kind().as_str(),
        "is_public": design.visibility.is_public(),
    });
    match &design.content {
        DesignContent::Vector { components } => {
            body["components"] = Value::Object(components.as_map().clone());
        }
        DesignContent::AiImage { image_url } => {
            body["image_url"] = Value::String(image_url.clone());
        }
    }
    body
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(&format!("api/v1/{path}"))
            .map_err(|err| GatewayError::unavailable(format!("invalid api url: {err}")))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), "gallery api response");
        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(classify_failure(status, body.as_ref()))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let body = self.send(builder).await?;
        serde_json::from_slice(&body).map_err(|err| GatewayError::decode(err.to_string()))
    }

    /// Create the pair with POST or remove it with DELETE.
    async fn set_pair(
        &self,
        path: &str,
        body: Value,
        query: [(&str, &str); 2],
        desired: ToggleState,
    ) -> Result<ToggleState, GatewayError> {
        let url = self.endpoint(path)?;
        let builder = match desired {
            ToggleState::Set => self.client.post(url).json(&body),
            ToggleState::Unset => self.client.delete(url).query(&query),
        };
        self.send(builder).await?;
        Ok(desired)
    }
}

#[async_trait]
impl InteractionGateway for ApiClient {
    async fn toggle_like(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
    ) -> Result<ToggleState, GatewayError> {
        let url = self.endpoint("likes")?;
        let toggled: LikeToggleDto = self
            .send_json(self.client.post(url).json(&json!({
                "userId": user_id.as_str(),
                "designId": design_id.as_str(),
            })))
            .await?;
        Ok(ToggleState::from_bool(toggled.liked))
    }

    async fn set_favorite(
        &self,
        user_id: &UserId,
        design_id: &DesignId,
        desired: ToggleState,
    ) -> Result<ToggleState, GatewayError> {
        self.set_pair(
            "favorites",
            json!({ "userId": user_id.as_str(), "designId": design_id.as_str() }),
            [("userId", user_id.as_str()), ("designId", design_id.as_str())],
            desired,
        )
        .await
    }

    async fn set_follow(
        &self,
        follower_id: &UserId,
        followed_id: &UserId,
        desired: ToggleState,
    ) -> Result<ToggleState, GatewayError> {
        self.set_pair(
            "follows",
            json!({ "followerId": follower_id.as_str(), "followedId": followed_id.as_str() }),
            [
                ("followerId", follower_id.as_str()),
                ("followedId", followed_id.as_str()),
            ],
            desired,
        )
        .await
    }
}

#[async_trait]
impl DesignFeed for ApiClient {
    async fn list_designs(&self, filter: &DesignFilter) -> Result<Vec<Design>, GatewayError> {
        let url = self.endpoint("designs")?;
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(owner) = &filter.owner_id {
            query.push(("userId", owner.as_str().to_owned()));
        }
        if let Some(visibility) = filter.visibility {
            query.push(("isPublic", visibility.is_public().to_string()));
        }
        let listed: DesignsDto = self.send_json(self.client.get(url).query(&query)).await?;
        Ok(listed.designs)
    }

    async fn save_design(&self, design: &NewDesign) -> Result<Design, GatewayError> {
        let url = self.endpoint("designs")?;
        let saved: DesignDto = self
            .send_json(self.client.post(url).json(&design_body(design)))
            .await?;
        Ok(saved.design)
    }
}
