//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! integration.

// Integration identity
pub const DOMAIN: &str = "apm";
pub const CONFIG_ENTRY_VERSION: u32 = 1;

// Config entry data keys
pub const CONF_HOST: &str = "host";
pub const CONF_AUTH_REDIRECT: &str = "auth_redirect";
pub const CONF_APM_TOKEN: &str = "apm_token";
pub const CONF_OKTA_TOKEN: &str = "okta_token";

// Token names used by the client's token callback
pub const TOKEN_APM: &str = "apm";
pub const TOKEN_OKTA: &str = "okta";

/// Token names and the entry data key each one is persisted under.
pub const PERSISTED_TOKENS: [(&str, &str); 2] =
    [(TOKEN_APM, CONF_APM_TOKEN), (TOKEN_OKTA, CONF_OKTA_TOKEN)];

// Service attributes
pub const SERVICE_FIND_UNSTAFFED_FLIGHTS: &str = "find_unstaffed_flights";
pub const ATTR_START_DATE: &str = "start_date";
pub const ATTR_END_DATE: &str = "end_date";
pub const ATTR_ACFT_TYPE: &str = "aircraft_type";
pub const ATTR_ROLE: &str = "role";

// Setup flow
pub const STEP_USER: &str = "user";
pub const STEP_AUTHORIZE: &str = "authorize";
pub const FORM_ERROR_BASE: &str = "base";
pub const PLACEHOLDER_AUTH_URL: &str = "auth_url";

// Polling
pub const MIN_TIME_BETWEEN_UPDATES_SECS: u64 = 300;
