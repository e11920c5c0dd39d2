//! External service integrations

pub mod crewconnect;
