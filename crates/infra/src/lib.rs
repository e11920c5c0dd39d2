//! # CrewConnect Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (environment, JSON, TOML)
//! - JSON-file config entry storage
//! - The HTTP CrewConnect client and connector (PKCE, token exchange)
//! - The background update scheduler
//!
//! ## Architecture
//! - Implements traits defined in `crewconnect-core`
//! - Depends on `crewconnect-domain` and `crewconnect-core`
//! - Contains all "impure" code (file and network I/O)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use integrations::crewconnect::{HttpClientConnector, HttpCrewConnectClient};
pub use scheduling::{SchedulerError, SchedulerResult, UpdateScheduler, UpdateSchedulerConfig};
pub use storage::JsonFileEntryStorage;
