//! Reqwest-backed adapter for the hosted PostgREST record store.
//!
//! This adapter owns transport details only: URL and header construction per
//! credential, status classification, and JSON decoding into rows. Choosing
//! the credential is left to [`crate::domain::TieredStore`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Request, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{
    Credential, Filter, Operation, RecordStore, RecordStoreError, Relation, Row, StoreRequest,
};

const BODY_PREVIEW_LIMIT: usize = 200;

/// Keys presented to the store.
pub struct StoreKeys {
    /// Public key sent on every request.
    pub anon_key: Zeroizing<String>,
    /// Service-role key for privileged requests, when configured.
    pub service_key: Option<Zeroizing<String>>,
}

/// Record store adapter speaking the PostgREST dialect over HTTPS.
pub struct RestRecordStore {
    client: Client,
    base: Url,
    keys: StoreKeys,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RestRecordStore {
    /// Build an adapter with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, keys: StoreKeys, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base, keys })
    }

    fn endpoint(&self, relation: Relation) -> Result<Url, RecordStoreError> {
        self.base
            .join(&format!("rest/v1/{relation}"))
            .map_err(|err| RecordStoreError::connection(format!("invalid store url: {err}")))
    }

    /// Credential headers as `(apikey, bearer)`.
    fn keys_for(
        &self,
        credential: &Credential,
        relation: Relation,
    ) -> Result<(&str, String), RecordStoreError> {
        let anon = self.keys.anon_key.as_str();
        match credential {
            Credential::Anonymous => Ok((anon, anon.to_owned())),
            Credential::Bearer(token) => Ok((anon, token.expose().to_owned())),
            Credential::Privileged => self
                .keys
                .service_key
                .as_deref()
                .map(|key| (key.as_str(), key.to_string()))
                .ok_or_else(|| RecordStoreError::privilege_unavailable(relation)),
        }
    }

    /// Translate a store request into an HTTP request.
    fn build_request(
        &self,
        credential: &Credential,
        request: &StoreRequest,
    ) -> Result<Request, RecordStoreError> {
        let (apikey, bearer) = self.keys_for(credential, request.relation)?;
        let mut url = self.endpoint(request.relation)?;
        {
            let mut query = url.query_pairs_mut();
            for filter in &request.filters {
                let (column, predicate) = filter_predicate(filter);
                query.append_pair(column, &predicate);
            }
            if let Some(order) = &request.order {
                let direction = if order.descending { "desc" } else { "asc" };
                query.append_pair("order", &format!("{}.{direction}", order.column));
            }
            if let Some(limit) = request.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        let method = match request.operation {
            Operation::Select => Method::GET,
            Operation::Insert(_) => Method::POST,
            Operation::Update(_) => Method::PATCH,
            Operation::Delete => Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, url)
            .header("apikey", apikey)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json");
        if request.operation.is_write() {
            builder = builder.header("Prefer", "return=representation");
        }
        builder = match &request.operation {
            Operation::Insert(rows) => builder.json(rows),
            Operation::Update(changes) => builder.json(changes),
            Operation::Select | Operation::Delete => builder,
        };
        builder
            .build()
            .map_err(|err| RecordStoreError::rejected(format!("invalid request: {err}")))
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn filter_predicate(filter: &Filter) -> (&str, String) {
    match filter {
        Filter::Eq { column, value } if value.is_null() => (column.as_str(), "is.null".to_owned()),
        Filter::Eq { column, value } => (column.as_str(), format!("eq.{}", literal(value))),
        Filter::In { column, values } => {
            let list: Vec<String> = values.iter().map(literal).collect();
            (column.as_str(), format!("in.({})", list.join(",")))
        }
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(BODY_PREVIEW_LIMIT).collect()
}

fn map_transport_error(error: reqwest::Error) -> RecordStoreError {
    if error.is_timeout() {
        RecordStoreError::timeout(error.to_string())
    } else {
        RecordStoreError::connection(error.to_string())
    }
}

/// Undefined-table codes, or an uncoded message naming a relation. Undefined
/// columns (`42703`) share the "does not exist" wording and are not missing
/// relations.
fn is_missing_relation(code: &str, message: &str) -> bool {
    match code {
        "42P01" | "PGRST205" => true,
        "" => message.contains("relation") && message.contains("does not exist"),
        _ => false,
    }
}

/// Map a non-success response onto the port's error vocabulary.
fn classify_failure(relation: Relation, status: StatusCode, body: &[u8]) -> RecordStoreError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let code = parsed.code.unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| body_preview(body));

    if is_missing_relation(&code, &message) {
        return RecordStoreError::relation_missing(relation);
    }
    if code == "42501"
        || message.contains("row-level security")
        || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    {
        return RecordStoreError::policy_violation(relation, message);
    }
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RecordStoreError::timeout(message)
        }
        status if status.is_client_error() => RecordStoreError::rejected(message),
        status => RecordStoreError::connection(format!("status {status}: {message}")),
    }
}

fn parse_rows(body: &[u8]) -> Result<Vec<Row>, RecordStoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body).map_err(|err| {
        RecordStoreError::decode(format!("{err}; body: {}", body_preview(body)))
    })
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn execute(
        &self,
        credential: &Credential,
        request: &StoreRequest,
    ) -> Result<Vec<Row>, RecordStoreError> {
        let http_request = self.build_request(credential, request)?;
        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            relation = %request.relation,
            operation = request.operation.name(),
            tier = %credential.tier(),
            status = status.as_u16(),
            "record store response"
        );
        if !status.is_success() {
            return Err(classify_failure(request.relation, status, body.as_ref()));
        }
        parse_rows(body.as_ref())
    }
}
