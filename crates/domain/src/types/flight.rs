//! Flight schedule types
//!
//! Flights are read-only snapshots of the backend schedule. They are fetched
//! fresh for every query and never persisted.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_code_conversions;

/// Aircraft types operated by the airline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AircraftType {
    /// Boeing 737-800
    Boeing737_800,
    /// Airbus A320neo
    A320Neo,
}

impl_domain_code_conversions!(AircraftType {
    Boeing737_800 => "73H",
    A320Neo => "32N",
});

/// Crew positions known to the scheduling backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrewRole {
    /// Commandant de bord (captain)
    Captain,
    /// Officier pilote de ligne (first officer)
    FirstOfficer,
    /// Supernumerary technical crew
    SupernumeraryTechnical,
    /// Instructor
    Instructor,
    /// Chef de cabine (purser)
    Purser,
    /// Cabin attendant
    CabinAttendant,
    /// Supernumerary cabin crew
    SupernumeraryCabin,
    /// Cabin crew under supervision
    CabinTrainee,
}

impl_domain_code_conversions!(CrewRole {
    Captain => "CDB",
    FirstOfficer => "OPL",
    SupernumeraryTechnical => "SUPT",
    Instructor => "INS",
    Purser => "CC",
    CabinAttendant => "CA",
    SupernumeraryCabin => "SUPC",
    CabinTrainee => "SOL",
});

/// One seat of a flight's crew complement
///
/// A position with no crew member is vacant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewPosition {
    pub role: CrewRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_member: Option<String>,
}

impl CrewPosition {
    /// A position filled by the given crew member.
    pub fn filled(role: CrewRole, crew_member: impl Into<String>) -> Self {
        Self { role, crew_member: Some(crew_member.into()) }
    }

    /// A position nobody has been rostered on.
    pub const fn vacant(role: CrewRole) -> Self {
        Self { role, crew_member: None }
    }

    pub const fn is_vacant(&self) -> bool {
        self.crew_member.is_none()
    }
}

/// Scheduled flight with its crew complement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub aircraft_type: AircraftType,
    pub crew: Vec<CrewPosition>,
}

impl Flight {
    /// Roles with at least one vacant position.
    pub fn missing_roles(&self) -> BTreeSet<CrewRole> {
        self.crew.iter().filter(|position| position.is_vacant()).map(|p| p.role).collect()
    }

    /// Whether the flight is short of crew.
    ///
    /// With no role, any vacant position counts; with a role, only vacant
    /// positions of that role do.
    pub fn is_missing_crew_members(&self, role: Option<CrewRole>) -> bool {
        self.crew
            .iter()
            .filter(|position| position.is_vacant())
            .any(|position| role.map_or(true, |wanted| position.role == wanted))
    }
}
