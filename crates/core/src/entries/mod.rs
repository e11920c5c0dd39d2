//! Durable config entry storage boundary

pub mod ports;
