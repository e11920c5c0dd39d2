//! Calendar view of the flight schedule

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flight::Flight;

/// One flight rendered as a calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// `"<flight number> <departure>-<arrival>"`
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Vacant roles, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
}

impl CalendarEvent {
    /// Whether the event intersects the half-open window `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

impl From<&Flight> for CalendarEvent {
    fn from(flight: &Flight) -> Self {
        let missing = flight.missing_roles();
        let description = (!missing.is_empty()).then(|| {
            let roles: Vec<&str> = missing.iter().map(|role| role.code()).collect();
            format!("Vacant: {}", roles.join(", "))
        });

        Self {
            summary: format!(
                "{} {}-{}",
                flight.flight_number, flight.departure_airport, flight.arrival_airport
            ),
            start: flight.departure_time,
            end: flight.arrival_time,
            description,
            location: flight.departure_airport.clone(),
        }
    }
}
