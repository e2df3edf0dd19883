//! Shared world for gallery HTTP behaviour tests.
//!
//! Each step rebuilds the Actix test service over the same [`HttpState`], so
//! the fallback cache and favourite ledger survive between steps exactly as
//! they would between requests to a running server. Requests run on an
//! `actix_rt` system owned by the world because step functions are
//! synchronous.

use std::cell::{Ref, RefCell, RefMut};
use std::sync::Arc;

use actix_rt::{System, SystemRunner};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use pawprint::inbound::http::state::HttpState;
use pawprint::inbound::http::test_utils::{memory_state, test_app};
use pawprint::outbound::store::{InMemoryRecordStore, RowPolicy};
use serde_json::Value;

pub(crate) struct GalleryWorld {
    runner: SystemRunner,
    pub(crate) store: Arc<InMemoryRecordStore>,
    state: HttpState,
    pub(crate) last_status: Option<StatusCode>,
    pub(crate) last_body: Option<Value>,
}

impl GalleryWorld {
    pub(crate) fn with_policy(policy: RowPolicy) -> Self {
        let store = Arc::new(InMemoryRecordStore::new(policy));
        let state = memory_state(&store);
        Self {
            runner: System::new(),
            store,
            state,
            last_status: None,
            last_body: None,
        }
    }

    /// Dispatch `request` and remember the status and JSON body.
    pub(crate) fn send(&mut self, request: actix_test::TestRequest) {
        let state = self.state.clone();
        let (status, bytes) = self.runner.block_on(async move {
            let app = actix_test::init_service(test_app(state)).await;
            let res = actix_test::call_service(&app, request.to_request()).await;
            let status = res.status();
            (status, actix_test::read_body(res).await)
        });
        self.last_status = Some(status);
        self.last_body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).expect("JSON response body"))
        };
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.last_status.expect("a request has been sent")
    }

    pub(crate) fn body(&self) -> &Value {
        self.last_body.as_ref().expect("response body")
    }
}

/// Fixture wrapper handed to step functions.
pub(crate) struct WorldFixture(RefCell<GalleryWorld>);

impl WorldFixture {
    pub(crate) fn new(world: GalleryWorld) -> Self {
        Self(RefCell::new(world))
    }

    pub(crate) fn world(&self) -> Ref<'_, GalleryWorld> {
        self.0.borrow()
    }

    pub(crate) fn world_mut(&self) -> RefMut<'_, GalleryWorld> {
        self.0.borrow_mut()
    }

    /// Replace the world, discarding earlier state.
    pub(crate) fn reset(&self, world: GalleryWorld) {
        *self.0.borrow_mut() = world;
    }
}
