//! Service-call surface
//!
//! Services are registered under `(domain, name)` together with a schema.
//! A call is validated against the schema before its handler runs.

pub mod registry;
pub mod unstaffed_flights;

pub use registry::{ServiceHandler, ServiceRegistry, ServiceSchema};
pub use unstaffed_flights::{validate_unstaffed_flights, FindUnstaffedFlightsHandler};
