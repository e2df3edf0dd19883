//! Test helpers for inbound HTTP components.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, web};
use mockable::DefaultClock;

use crate::Trace;
use crate::domain::TieredStore;
use crate::domain::ports::{DisabledImageGenerator, FixtureAuthProvider};
use crate::inbound::http::configure;
use crate::inbound::http::state::{CacheBounds, HttpState};
use crate::outbound::store::InMemoryRecordStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state backed by `store`, the fixture auth provider and no image
/// generator.
pub fn memory_state(store: &Arc<InMemoryRecordStore>) -> HttpState {
    let bounds = CacheBounds {
        capacity: NonZeroUsize::MIN.saturating_add(63),
        ttl: Duration::from_secs(300),
    };
    HttpState::from_store(
        TieredStore::escalating(store.clone()),
        Arc::new(FixtureAuthProvider),
        Arc::new(DisabledImageGenerator),
        bounds,
        Arc::new(DefaultClock),
    )
}

/// Full `/api/v1` application over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
}
