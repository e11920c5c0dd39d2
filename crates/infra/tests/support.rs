#![allow(dead_code)]

//! Shared fixtures for infra integration tests: a wiremock-backed identity
//! provider and CrewConnect backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use crewconnect_core::{ClientAuth, TokenCallback};
use crewconnect_domain::constants::{TOKEN_APM, TOKEN_OKTA};
use crewconnect_domain::{ClientConfig, TokenMap};
use crewconnect_infra::http::HttpClient;
use crewconnect_infra::integrations::crewconnect::{
    HttpCrewConnectClient, MemoryTokens, TokenSet,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "pilot-042";
pub const AUTHORIZE_PATH: &str = "/oauth2/v1/authorize";
pub const TOKEN_PATH: &str = "/oauth2/v1/token";
pub const EXCHANGE_PATH: &str = "/api/auth/okta";
pub const PROFILE_PATH: &str = "/api/users/me";
pub const SCHEDULE_PATH: &str = "/api/flights";

/// Client config whose identity provider and backend both live on `server`.
pub fn client_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        authorization_endpoint: format!("{}{AUTHORIZE_PATH}", server.uri()),
        token_endpoint: format!("{}{TOKEN_PATH}", server.uri()),
        client_id: "crewconnect-test".into(),
        redirect_uri: "com.apm.crewconnect:/callback".into(),
        scopes: vec!["openid".into(), "offline_access".into()],
        token_exchange_path: EXCHANGE_PATH.into(),
        profile_path: PROFILE_PATH.into(),
        schedule_path: SCHEDULE_PATH.into(),
        request_timeout_seconds: 5,
        refresh_threshold_seconds: 60,
    }
}

/// HTTP client with fast retries.
pub fn http_client() -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .base_backoff(Duration::from_millis(5))
        .max_attempts(2)
        .build()
        .expect("http client")
}

pub fn manual_client(server: &MockServer) -> HttpCrewConnectClient {
    HttpCrewConnectClient::with_http_client(
        &server.uri(),
        ClientAuth::Manual,
        client_config(server),
        http_client(),
    )
    .expect("client")
}

/// Client reading and writing tokens through the returned callback.
pub fn managed_client(
    server: &MockServer,
    tokens: TokenMap,
) -> (HttpCrewConnectClient, Arc<MemoryTokens>) {
    let callback = Arc::new(MemoryTokens::new());
    callback.set_all(tokens).expect("seed tokens");
    let client = HttpCrewConnectClient::with_http_client(
        &server.uri(),
        ClientAuth::TokenManager(callback.clone()),
        client_config(server),
        http_client(),
    )
    .expect("client");
    (client, callback)
}

pub fn token(access_token: &str, refresh_token: Option<&str>, expires_in_secs: i64) -> TokenSet {
    TokenSet {
        access_token: access_token.into(),
        refresh_token: refresh_token.map(str::to_string),
        id_token: None,
        token_type: "Bearer".into(),
        expires_at: Some(Utc::now() + ChronoDuration::seconds(expires_in_secs)),
        scope: None,
    }
}

pub fn token_map(okta: &TokenSet, apm: &TokenSet) -> TokenMap {
    TokenMap::from([
        (TOKEN_OKTA.to_string(), serde_json::to_value(okta).unwrap()),
        (TOKEN_APM.to_string(), serde_json::to_value(apm).unwrap()),
    ])
}

pub fn stored_token(tokens: &MemoryTokens, name: &str) -> TokenSet {
    serde_json::from_value(tokens.get(name).expect("token stored")).expect("token set")
}

pub fn token_body(access_token: &str, refresh_token: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
    });
    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = json!(refresh_token);
    }
    body
}

/// Mount the backend token exchange and profile endpoints.
pub async fn mount_backend(server: &MockServer, apm_access_token: &str) {
    Mock::given(method("POST"))
        .and(path(EXCHANGE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": apm_access_token, "expiresIn": 3600})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": USER_ID, "name": "J. Pilot"})),
        )
        .mount(server)
        .await;
}

/// `state` query parameter of an authorization URL.
pub fn state_of(auth_url: &str) -> String {
    url::Url::parse(auth_url)
        .expect("auth url")
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state param")
}
