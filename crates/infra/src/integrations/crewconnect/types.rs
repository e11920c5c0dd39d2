//! Wire types of the identity provider and the CrewConnect backend

use chrono::{DateTime, Duration, Utc};
use crewconnect_domain::{AircraftType, CrewPosition, CrewRole, Flight};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Access token with its refresh material, as persisted in a config entry
///
/// Used for both the identity provider ("okta") and backend ("apm") tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// OpenID Connect ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenSet {
    /// Whether the access token is expired or expires within
    /// `threshold_seconds`. Tokens without an expiry never expire.
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Utc::now() + Duration::seconds(threshold_seconds) >= expires_at)
    }

    /// Token the backend exchange accepts: the ID token when issued,
    /// otherwise the access token.
    pub fn identity_token(&self) -> &str {
        self.id_token.as_deref().unwrap_or(&self.access_token)
    }
}

/// Token endpoint / exchange response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "idToken")]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Token set with the expiry computed from `now`.
    ///
    /// A refresh response without a refresh token keeps `previous`'s.
    pub fn into_token_set(self, now: DateTime<Utc>, previous: Option<&TokenSet>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|token| token.refresh_token.clone())),
            id_token: self.id_token.or_else(|| previous.and_then(|token| token.id_token.clone())),
            token_type: self.token_type.unwrap_or_else(default_token_type),
            expires_at: self
                .expires_in
                .filter(|seconds| *seconds > 0)
                .map(|seconds| now + Duration::seconds(seconds)),
            scope: self.scope,
        }
    }
}

/// OAuth error body (`{"error": ..., "error_description": ...}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl std::fmt::Display for OAuthErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

/// Signed-in user as returned by the profile endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "userId", alias = "crewId")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Crew seat of a scheduled flight
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewPositionDto {
    pub role: String,
    #[serde(default)]
    pub crew_member: Option<String>,
}

/// Scheduled flight as returned by the schedule endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDto {
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub aircraft_type: String,
    #[serde(default)]
    pub crew: Vec<CrewPositionDto>,
}

impl FlightDto {
    /// Domain flight, or `None` for an aircraft type outside the fleet.
    ///
    /// Seats with an unknown role are dropped; blank crew names are vacant.
    pub fn into_flight(self) -> Option<Flight> {
        let aircraft_type = match self.aircraft_type.parse::<AircraftType>() {
            Ok(aircraft_type) => aircraft_type,
            Err(err) => {
                warn!(flight = %self.flight_number, error = %err, "Skipping flight");
                return None;
            }
        };

        let crew = self
            .crew
            .into_iter()
            .filter_map(|seat| match seat.role.parse::<CrewRole>() {
                Ok(role) => Some(CrewPosition {
                    role,
                    crew_member: seat.crew_member.filter(|name| !name.trim().is_empty()),
                }),
                Err(err) => {
                    warn!(flight = %self.flight_number, error = %err, "Dropping crew seat");
                    None
                }
            })
            .collect();

        Some(Flight {
            flight_number: self.flight_number,
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            aircraft_type,
            crew,
        })
    }
}
