// Module layout (Clean Architecture style)
// - bootstrap: configuration and service wiring
// - infrastructure: Postgres, blob storage and cache adapters
// - presentation: HTTP handlers and routing
// - application: ports, access policy and use cases
// - domain: documents, filters and credentials

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
