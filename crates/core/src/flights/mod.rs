//! Flight schedule queries

pub mod service;

pub use service::{filter_unstaffed_flights, UnstaffedFlightsService};
