//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **store**: PostgREST-backed and in-memory record stores
//! - **cache**: bounded, expiring in-process fallback cache
//! - **mirror**: file-backed and in-memory local mirrors
//! - **auth**: hosted authentication provider client
//! - **ai**: image generation client
//! - **api_client**: client for this service's own HTTP API, used by the
//!   client-side controllers
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod ai;
pub mod api_client;
pub mod auth;
pub mod cache;
pub mod mirror;
pub mod store;
