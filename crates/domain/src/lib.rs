//! # CrewConnect Domain
//!
//! Business domain types and models for the CrewConnect integration.
//!
//! This crate contains:
//! - Flight schedule types (flights, crew positions, roles, aircraft types)
//! - Config entry and credential record types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other CrewConnect crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
