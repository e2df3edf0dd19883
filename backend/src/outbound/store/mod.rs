//! Record store adapters.
//!
//! `rest` talks to the hosted PostgREST endpoint; `memory` keeps rows in
//! process for development and tests.

mod memory;
mod rest;

pub use memory::{InMemoryRecordStore, RecordedCall, RowPolicy};
pub use rest::{RestRecordStore, StoreKeys};
