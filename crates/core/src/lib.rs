//! # CrewConnect Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for entry storage and the backend client
//! - Token persistence, throttled polling and the authorization flow
//! - The unstaffed-flight query, service registry and flight calendar
//! - Config entry setup and unload
//!
//! ## Architecture Principles
//! - Only depends on `crewconnect-domain`
//! - No file, HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth_flow;
pub mod calendar;
pub mod client;
pub mod entries;
pub mod flights;
pub mod integration;
pub mod polling;
pub mod services;
pub mod tokens;

// Re-export specific items to avoid ambiguity
pub use auth_flow::{AuthorizationFlow, FlowForm, FlowResult, FlowStep};
pub use calendar::FlightCalendar;
pub use client::ports::{AuthorizedSession, ClientAuth, ClientConnector, CrewConnectClient};
pub use entries::ports::EntryStorage;
pub use flights::{filter_unstaffed_flights, UnstaffedFlightsService};
pub use integration::{CrewConnectIntegration, EntryContext};
pub use polling::{PolledClient, RefreshOutcome, Throttle};
pub use services::{
    validate_unstaffed_flights, FindUnstaffedFlightsHandler, ServiceHandler, ServiceRegistry,
    ServiceSchema,
};
pub use tokens::{TokenCallback, TokenStore};
