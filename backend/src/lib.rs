//! Pawprint gallery backend.
//!
//! Hexagonal layout: [`domain`] holds the gallery entities, the driving and
//! driven ports and the services implementing them; [`inbound`] adapts HTTP
//! requests onto the driving ports; [`outbound`] implements the driven ports
//! over the hosted record store, auth provider, image service, in-process
//! cache and local mirror.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
