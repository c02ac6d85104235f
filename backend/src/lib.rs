//! Commission marketplace backend.
//!
//! Hexagonal layout: [`domain`] holds the lifecycle engine, entities and
//! services behind ports; [`inbound`] adapts HTTP onto the driving ports;
//! [`outbound`] implements the driven ports for PostgreSQL, the in-process
//! store and the checkout webhook.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
