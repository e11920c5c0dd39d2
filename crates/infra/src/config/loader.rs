//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. With no file anywhere, uses the built-in defaults
//!
//! ## Environment Variables
//! Required for an environment-only configuration:
//! - `CREWCONNECT_CLIENT_ID`: Identity provider client id
//! - `CREWCONNECT_AUTHORIZATION_ENDPOINT`: Identity provider authorize URL
//! - `CREWCONNECT_TOKEN_ENDPOINT`: Identity provider token URL
//!
//! Optional:
//! - `CREWCONNECT_REDIRECT_URI`: Registered redirect URI
//! - `CREWCONNECT_SCOPES`: Space or comma separated scopes
//! - `CREWCONNECT_REQUEST_TIMEOUT`: HTTP timeout in seconds
//! - `CREWCONNECT_MIN_TIME_BETWEEN_UPDATES`: Refresh cool-down in seconds
//! - `CREWCONNECT_UPDATE_INTERVAL`: Scheduler interval in seconds
//! - `CREWCONNECT_JOB_TIMEOUT`: Scheduled refresh timeout in seconds
//! - `CREWCONNECT_ENTRIES_PATH`: Config entry file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./crewconnect.json` or `./crewconnect.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crewconnect_domain::{Config, CrewConnectError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to a probed config file, then to the
/// defaults.
///
/// # Errors
/// Returns `CrewConnectError::Config` if an environment value or a found
/// config file is invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No config file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// The identity provider variables must be present; everything else falls
/// back to its default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `CrewConnectError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.client.client_id = env_var("CREWCONNECT_CLIENT_ID")?;
    config.client.authorization_endpoint = env_var("CREWCONNECT_AUTHORIZATION_ENDPOINT")?;
    config.client.token_endpoint = env_var("CREWCONNECT_TOKEN_ENDPOINT")?;

    if let Some(redirect_uri) = env_opt("CREWCONNECT_REDIRECT_URI") {
        config.client.redirect_uri = redirect_uri;
    }
    if let Some(scopes) = env_opt("CREWCONNECT_SCOPES") {
        config.client.scopes = scopes
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|scope| !scope.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(timeout) = env_parse("CREWCONNECT_REQUEST_TIMEOUT", "request timeout")? {
        config.client.request_timeout_seconds = timeout;
    }
    if let Some(cooldown) =
        env_parse("CREWCONNECT_MIN_TIME_BETWEEN_UPDATES", "minimum time between updates")?
    {
        config.polling.min_time_between_updates_seconds = cooldown;
    }
    if let Some(interval) = env_parse("CREWCONNECT_UPDATE_INTERVAL", "update interval")? {
        config.polling.update_interval_seconds = interval;
    }
    if let Some(timeout) = env_parse("CREWCONNECT_JOB_TIMEOUT", "job timeout")? {
        config.polling.job_timeout_seconds = timeout;
    }
    if let Some(path) = env_opt("CREWCONNECT_ENTRIES_PATH") {
        config.storage.entries_path = path;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `CrewConnectError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CrewConnectError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CrewConnectError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CrewConnectError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `CrewConnectError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CrewConnectError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CrewConnectError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CrewConnectError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./crewconnect.{json,toml}`)
/// 2. Parent directory
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(config_candidates(&cwd));
        candidates.extend([cwd.join("../config.json"), cwd.join("../config.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(config_candidates(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn config_candidates(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("crewconnect.json"),
        dir.join("crewconnect.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `CrewConnectError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CrewConnectError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CrewConnectError::Config(format!("Invalid {what}: {e}")))
        })
        .transpose()
}
