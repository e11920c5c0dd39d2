use chrono::{TimeZone, Utc};
use crewconnect_domain::constants::{
    CONF_APM_TOKEN, CONF_HOST, CONF_OKTA_TOKEN, CONFIG_ENTRY_VERSION, DOMAIN,
};
use crewconnect_domain::{
    AircraftType, ConfigEntry, CrewPosition, CrewRole, EntryData, Flight,
};
use serde_json::json;

use super::client::HOST;

/// Flight departing at 06:00 UTC on `2024-01-<day>` with one filled captain
/// seat plus a vacant seat per role in `vacant`.
pub fn flight(number: &str, day: u32, aircraft_type: AircraftType, vacant: &[CrewRole]) -> Flight {
    let mut crew = vec![CrewPosition::filled(CrewRole::Captain, "DUPONT")];
    crew.extend(vacant.iter().copied().map(CrewPosition::vacant));

    Flight {
        flight_number: number.to_string(),
        departure_airport: "ORY".to_string(),
        arrival_airport: "AGA".to_string(),
        departure_time: Utc.with_ymd_and_hms(2024, 1, day, 6, 0, 0).unwrap(),
        arrival_time: Utc.with_ymd_and_hms(2024, 1, day, 9, 15, 0).unwrap(),
        aircraft_type,
        crew,
    }
}

/// The two flights of the reference filtering example, in reverse departure
/// order: a 73H on Jan 2 missing a cabin attendant, a fully staffed 32N on
/// Jan 1.
pub fn reference_flights() -> Vec<Flight> {
    vec![
        flight("TO4012", 2, AircraftType::Boeing737_800, &[CrewRole::CabinAttendant]),
        flight("TO3100", 1, AircraftType::A320Neo, &[]),
    ]
}

/// Stored entry for [`HOST`] carrying both tokens.
pub fn entry() -> ConfigEntry {
    let mut data = EntryData::new();
    data.insert(CONF_HOST, json!(HOST));
    data.insert(CONF_APM_TOKEN, json!({"access_token": "apm-stored"}));
    data.insert(CONF_OKTA_TOKEN, json!({"access_token": "okta-stored"}));

    ConfigEntry {
        entry_id: "entry-stored".to_string(),
        domain: DOMAIN.to_string(),
        title: "pilot-042".to_string(),
        version: CONFIG_ENTRY_VERSION,
        data,
    }
}
