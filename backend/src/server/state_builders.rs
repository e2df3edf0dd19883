//! Builders selecting the outbound adapters behind the HTTP state.
//!
//! Each adapter falls back to its in-process or disabled counterpart when the
//! corresponding service is not configured, so a bare development build
//! still serves the whole API.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use pawprint::domain::TieredStore;
use pawprint::domain::ports::{
    AuthProvider, DisabledImageGenerator, FixtureAuthProvider, ImageGenerator, RecordStore,
};
use pawprint::inbound::http::state::HttpState;
use pawprint::outbound::ai::HttpImageGenerator;
use pawprint::outbound::auth::HostedAuthProvider;
use pawprint::outbound::store::{InMemoryRecordStore, RestRecordStore, StoreKeys};

use super::ServerConfig;

fn client_error(what: &str, err: &reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("failed to build {what} client: {err}"))
}

fn build_store_and_auth(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn RecordStore>, Arc<dyn AuthProvider>)> {
    let Some(hosted) = &config.hosted else {
        warn!("serving records from process memory with fixture accounts (dev only)");
        return Ok((
            Arc::new(InMemoryRecordStore::default()),
            Arc::new(FixtureAuthProvider),
        ));
    };
    let keys = StoreKeys {
        anon_key: hosted.anon_key.clone(),
        service_key: hosted.service_key.clone(),
    };
    let store = RestRecordStore::new(hosted.store_url.clone(), keys, hosted.timeout)
        .map_err(|err| client_error("record store", &err))?;
    let auth = HostedAuthProvider::new(
        hosted.auth_url.clone(),
        hosted.anon_key.clone(),
        hosted.timeout,
    )
    .map_err(|err| client_error("auth provider", &err))?;
    info!(store = %hosted.store_url, "using hosted record store");
    Ok((Arc::new(store), Arc::new(auth)))
}

fn build_generator(config: &ServerConfig) -> std::io::Result<Arc<dyn ImageGenerator>> {
    let Some(generation) = &config.generation else {
        info!("image generation disabled");
        return Ok(Arc::new(DisabledImageGenerator));
    };
    let generator =
        HttpImageGenerator::new(generation.endpoint.clone(), generation.api_key.clone())
            .map_err(|err| client_error("image generation", &err))?;
    Ok(Arc::new(generator))
}

/// Build the handler state for `config`.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an HTTP client cannot be constructed.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let (store, auth) = build_store_and_auth(config)?;
    let generator = build_generator(config)?;
    Ok(web::Data::new(HttpState::from_store(
        TieredStore::escalating(store),
        auth,
        generator,
        config.cache_bounds,
        Arc::new(DefaultClock),
    )))
}
