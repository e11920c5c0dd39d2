//! Conversions from external infrastructure errors into domain errors.

use crewconnect_domain::CrewConnectError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CrewConnectError);

impl From<InfraError> for CrewConnectError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CrewConnectError> for InfraError {
    fn from(value: CrewConnectError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCrewConnectError {
    fn into_crewconnect(self) -> CrewConnectError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CrewConnectError */
/* -------------------------------------------------------------------------- */

impl IntoCrewConnectError for HttpError {
    fn into_crewconnect(self) -> CrewConnectError {
        if self.is_timeout() {
            return CrewConnectError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CrewConnectError::Connection(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return CrewConnectError::Network(format!("invalid response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CrewConnectError::Auth(message),
                404 => CrewConnectError::NotFound(message),
                400..=499 => CrewConnectError::Validation(message),
                _ => CrewConnectError::Network(message),
            };
        }

        CrewConnectError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_crewconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → CrewConnectError */
/* -------------------------------------------------------------------------- */

impl IntoCrewConnectError for IoError {
    fn into_crewconnect(self) -> CrewConnectError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => CrewConnectError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                CrewConnectError::Persistence(format!("permission denied: {self}"))
            }
            _ => CrewConnectError::Persistence(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_crewconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CrewConnectError */
/* -------------------------------------------------------------------------- */

impl IntoCrewConnectError for JsonError {
    fn into_crewconnect(self) -> CrewConnectError {
        if self.is_io() {
            CrewConnectError::Persistence(self.to_string())
        } else {
            CrewConnectError::Internal(format!("invalid JSON at line {}: {self}", self.line()))
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_crewconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → CrewConnectError */
/* -------------------------------------------------------------------------- */

impl IntoCrewConnectError for UrlError {
    fn into_crewconnect(self) -> CrewConnectError {
        CrewConnectError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_crewconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
