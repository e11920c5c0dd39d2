//! Query and response types for the `find_unstaffed_flights` service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flight::{AircraftType, CrewRole, Flight};
use crate::constants::{ATTR_ACFT_TYPE, ATTR_END_DATE, ATTR_ROLE, ATTR_START_DATE};
use crate::errors::{CrewConnectError, Result};

const ACCEPTED_KEYS: [&str; 4] = [ATTR_START_DATE, ATTR_END_DATE, ATTR_ACFT_TYPE, ATTR_ROLE];

/// Validated parameters of an unstaffed-flight search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstaffedFlightsQuery {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub aircraft_type: Option<AircraftType>,
    pub role: Option<CrewRole>,
}

impl UnstaffedFlightsQuery {
    /// Query for a single day with no filters.
    pub const fn on(start_date: NaiveDate) -> Self {
        Self { start_date, end_date: None, aircraft_type: None, role: None }
    }

    /// Extend the query to a range ending on `end_date`
    #[must_use]
    pub const fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Only flights operated with `aircraft_type`
    #[must_use]
    pub const fn with_aircraft_type(mut self, aircraft_type: AircraftType) -> Self {
        self.aircraft_type = Some(aircraft_type);
        self
    }

    /// Only flights missing `role`
    #[must_use]
    pub const fn with_role(mut self, role: CrewRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Validate a raw service-call payload.
    ///
    /// # Errors
    /// Returns `CrewConnectError::Validation` if a key is unknown, the start
    /// date is missing, a date is not `YYYY-MM-DD`, the end date precedes the
    /// start date, or an aircraft type / role is outside its enumeration.
    pub fn from_service_data(data: &Map<String, Value>) -> Result<Self> {
        if let Some(unknown) = data.keys().find(|key| !ACCEPTED_KEYS.contains(&key.as_str())) {
            return Err(CrewConnectError::Validation(format!(
                "extra keys not allowed @ data['{unknown}']"
            )));
        }

        let start_date = data
            .get(ATTR_START_DATE)
            .ok_or_else(|| {
                CrewConnectError::Validation(format!(
                    "required key not provided @ data['{ATTR_START_DATE}']"
                ))
            })
            .and_then(|value| parse_date(ATTR_START_DATE, value))?;

        let end_date =
            data.get(ATTR_END_DATE).map(|value| parse_date(ATTR_END_DATE, value)).transpose()?;

        if let Some(end) = end_date {
            if end < start_date {
                return Err(CrewConnectError::Validation(format!(
                    "{ATTR_END_DATE} {end} is before {ATTR_START_DATE} {start_date}"
                )));
            }
        }

        let aircraft_type =
            data.get(ATTR_ACFT_TYPE).map(|value| parse_code(ATTR_ACFT_TYPE, value)).transpose()?;
        let role = data.get(ATTR_ROLE).map(|value| parse_code(ATTR_ROLE, value)).transpose()?;

        Ok(Self { start_date, end_date, aircraft_type, role })
    }
}

fn parse_date(key: &str, value: &Value) -> Result<NaiveDate> {
    let raw = value.as_str().ok_or_else(|| {
        CrewConnectError::Validation(format!("expected a date string @ data['{key}']"))
    })?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
        CrewConnectError::Validation(format!("invalid date '{raw}' @ data['{key}']: {err}"))
    })
}

fn parse_code<T>(key: &str, value: &Value) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw = value.as_str().ok_or_else(|| {
        CrewConnectError::Validation(format!("expected a string @ data['{key}']"))
    })?;
    raw.parse::<T>().map_err(|err| CrewConnectError::Validation(format!("{err} @ data['{key}']")))
}

/// Response payload of `find_unstaffed_flights`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstaffedFlightsResponse {
    pub count: usize,
    pub data: Vec<Flight>,
}

impl From<Vec<Flight>> for UnstaffedFlightsResponse {
    fn from(data: Vec<Flight>) -> Self {
        Self { count: data.len(), data }
    }
}
