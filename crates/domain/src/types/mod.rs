//! Domain types and models

pub mod calendar;
pub mod entry;
pub mod flight;
pub mod query;

pub use calendar::CalendarEvent;
pub use entry::{is_present, ConfigEntry, CredentialRecord, EntryData, TokenMap};
pub use flight::{AircraftType, CrewPosition, CrewRole, Flight};
pub use query::{UnstaffedFlightsQuery, UnstaffedFlightsResponse};
