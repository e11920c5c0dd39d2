//! CrewConnect backend client boundary

pub mod ports;
