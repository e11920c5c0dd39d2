//! Shared test helpers for `crewconnect-core` integration tests.
//!
//! In-memory mocks for the storage and client ports plus flight fixtures, so
//! tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod client;
pub mod entries;
pub mod fixtures;

pub use client::{MockClient, MockConnector};
pub use entries::InMemoryEntryStorage;
