//! Integration tests for the HTTP CrewConnect client
//!
//! **Coverage:**
//! - Authorization URL: PKCE parameters and state
//! - Redirect exchange: code → identity token → backend token → profile
//! - Rejected redirects: state mismatch, provider error, 4xx from the token
//!   endpoint, no authorization in progress
//! - `update()`: refresh of an expired identity token, written back through
//!   the token callback
//! - Schedule fetch: bearer auth, malformed flights skipped
//! - Connector: unreachable host → `Connection`
//!
//! **Infrastructure:**
//! - WireMock server standing in for both the identity provider and the
//!   backend host

#[path = "support.rs"]
mod support;

use chrono::NaiveDate;
use crewconnect_core::{ClientAuth, ClientConnector, CrewConnectClient, TokenCallback};
use crewconnect_domain::constants::{TOKEN_APM, TOKEN_OKTA};
use crewconnect_domain::{AircraftType, CrewConnectError, CrewRole, TokenMap};
use crewconnect_infra::integrations::crewconnect::HttpClientConnector;
use serde_json::json;
use support::*;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn auth_url_carries_pkce_parameters() {
    let server = MockServer::start().await;
    let client = manual_client(&server);

    let auth_url = client.generate_auth_url().await.unwrap();
    let url = url::Url::parse(&auth_url).unwrap();
    let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

    assert_eq!(url.path(), AUTHORIZE_PATH);
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "crewconnect-test");
    assert_eq!(params["redirect_uri"], "com.apm.crewconnect:/callback");
    assert_eq!(params["scope"], "openid offline_access");
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["code_challenge"].len(), 43);
    assert!(!params["state"].is_empty());

    // Every call starts a new attempt
    let second = client.generate_auth_url().await.unwrap();
    assert_ne!(state_of(&auth_url), state_of(&second));
}

#[tokio::test]
async fn redirect_exchange_stores_both_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("code_verifier="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("okta-access", Some("okta-refresh"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_backend(&server, "apm-access").await;

    let client = manual_client(&server);
    let auth_url = client.generate_auth_url().await.unwrap();
    let redirect =
        format!("com.apm.crewconnect:/callback?code=auth-code-1&state={}", state_of(&auth_url));

    let session = client.authenticate_from_redirect(&redirect).await.unwrap();

    assert_eq!(session.user_id, USER_ID);
    assert_eq!(session.okta_token["access_token"], "okta-access");
    assert_eq!(session.okta_token["refresh_token"], "okta-refresh");
    assert_eq!(session.apm_token["access_token"], "apm-access");
    assert_eq!(client.user_id().as_deref(), Some(USER_ID));

    // Manual-mode tokens are kept by the client itself
    assert_eq!(client.tokens().get(TOKEN_OKTA), Some(session.okta_token.clone()));
    assert_eq!(client.tokens().get(TOKEN_APM), Some(session.apm_token));
}

#[tokio::test]
async fn state_mismatch_is_invalid_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("okta-access", None)))
        .expect(0)
        .mount(&server)
        .await;

    let client = manual_client(&server);
    client.generate_auth_url().await.unwrap();

    let err = client
        .authenticate_from_redirect("com.apm.crewconnect:/callback?code=c&state=forged")
        .await
        .unwrap_err();
    assert!(matches!(err, CrewConnectError::InvalidRedirect(msg) if msg.contains("state")));

    // The attempt is consumed; a retry needs a new URL
    let err = client.authenticate_from_redirect("c").await.unwrap_err();
    assert!(matches!(err, CrewConnectError::InvalidRedirect(_)));
}

#[tokio::test]
async fn provider_error_in_redirect_is_invalid_redirect() {
    let server = MockServer::start().await;
    let client = manual_client(&server);
    let auth_url = client.generate_auth_url().await.unwrap();

    let redirect = format!(
        "com.apm.crewconnect:/callback?error=access_denied&error_description=User+cancelled&state={}",
        state_of(&auth_url)
    );
    let err = client.authenticate_from_redirect(&redirect).await.unwrap_err();
    assert!(matches!(err, CrewConnectError::InvalidRedirect(msg) if msg.contains("access_denied")));
}

#[tokio::test]
async fn rejected_code_is_invalid_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "The authorization code is invalid or has expired."
        })))
        .mount(&server)
        .await;

    let client = manual_client(&server);
    let auth_url = client.generate_auth_url().await.unwrap();
    let redirect = format!("com.apm.crewconnect:/callback?code=expired&state={}", state_of(&auth_url));

    let err = client.authenticate_from_redirect(&redirect).await.unwrap_err();
    assert!(matches!(err, CrewConnectError::InvalidRedirect(msg) if msg.contains("invalid_grant")));
    assert!(client.tokens().get_all().is_none());
}

#[tokio::test]
async fn bare_code_without_authorization_in_progress_is_invalid() {
    let server = MockServer::start().await;
    let client = manual_client(&server);

    let err = client.authenticate_from_redirect("auth-code-1").await.unwrap_err();
    assert!(matches!(err, CrewConnectError::InvalidRedirect(_)));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_refreshes_expired_identity_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=okta-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("okta-new", None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_backend(&server, "apm-new").await;

    let expired_okta = token("okta-old", Some("okta-refresh"), -10);
    let apm = token("apm-old", None, 3600);
    let (client, tokens) = managed_client(&server, token_map(&expired_okta, &apm));

    client.update().await.unwrap();

    let okta = stored_token(&tokens, TOKEN_OKTA);
    assert_eq!(okta.access_token, "okta-new");
    assert_eq!(okta.refresh_token.as_deref(), Some("okta-refresh"));
    assert!(!okta.is_expired(0));
    assert_eq!(stored_token(&tokens, TOKEN_APM).access_token, "apm-new");
    assert_eq!(client.user_id().as_deref(), Some(USER_ID));
}

#[tokio::test]
async fn rotated_refresh_token_survives_failed_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=okta-refresh-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("okta-new", Some("okta-refresh-2"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(EXCHANGE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let expired_okta = token("okta-old", Some("okta-refresh-1"), -10);
    let apm = token("apm-old", None, 3600);
    let (client, tokens) = managed_client(&server, token_map(&expired_okta, &apm));

    let err = client.update().await.unwrap_err();
    assert!(matches!(err, CrewConnectError::Network(_)), "got {err:?}");

    let okta = stored_token(&tokens, TOKEN_OKTA);
    assert_eq!(okta.access_token, "okta-new");
    assert_eq!(okta.refresh_token.as_deref(), Some("okta-refresh-2"));
    assert_eq!(stored_token(&tokens, TOKEN_APM), apm);
    assert_eq!(client.user_id(), None);
}

#[tokio::test]
async fn update_with_valid_tokens_only_loads_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(header("authorization", "Bearer apm-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": USER_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let okta = token("okta-access", Some("okta-refresh"), 3600);
    let apm = token("apm-access", None, 3600);
    let (client, tokens) = managed_client(&server, token_map(&okta, &apm));

    client.update().await.unwrap();

    assert_eq!(stored_token(&tokens, TOKEN_APM), apm);
    assert_eq!(client.user_id().as_deref(), Some(USER_ID));
}

#[tokio::test]
async fn update_without_identity_token_is_auth_error() {
    let server = MockServer::start().await;
    let (client, _tokens) = managed_client(&server, TokenMap::new());

    let err = client.update().await.unwrap_err();
    assert!(matches!(err, CrewConnectError::Auth(_)));
    assert_eq!(client.user_id(), None);
}

#[tokio::test]
async fn rejected_refresh_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let expired_okta = token("okta-old", Some("revoked"), -10);
    let apm = token("apm-old", None, -10);
    let (client, tokens) = managed_client(&server, token_map(&expired_okta, &apm));

    let err = client.update().await.unwrap_err();
    assert!(matches!(err, CrewConnectError::Auth(msg) if msg.contains("invalid_grant")));
    assert_eq!(stored_token(&tokens, TOKEN_OKTA), expired_okta);
}

// ============================================================================
// Schedule
// ============================================================================

#[tokio::test]
async fn schedule_skips_malformed_flights() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SCHEDULE_PATH))
        .and(query_param("from", "2024-01-01"))
        .and(query_param("to", "2024-01-05"))
        .and(header("authorization", "Bearer apm-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "flightNumber": "TO3012",
                "departureAirport": "ORY",
                "arrivalAirport": "FAO",
                "departureTime": "2024-01-03T07:00:00Z",
                "arrivalTime": "2024-01-03T09:45:00Z",
                "aircraftType": "32N",
                "crew": [
                    {"role": "CDB", "crewMember": "DUPONT"},
                    {"role": "CA"}
                ]
            },
            {"flightNumber": "TO3014", "aircraftType": "73H"},
            {
                "flightNumber": "TO9999",
                "departureAirport": "ORY",
                "arrivalAirport": "JFK",
                "departureTime": "2024-01-04T07:00:00Z",
                "arrivalTime": "2024-01-04T15:00:00Z",
                "aircraftType": "359",
                "crew": []
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let okta = token("okta-access", None, 3600);
    let apm = token("apm-access", None, 3600);
    let (client, _tokens) = managed_client(&server, token_map(&okta, &apm));

    let flights = client
        .get_flight_schedule(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5),
        )
        .await
        .unwrap();

    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0].flight_number, "TO3012");
    assert_eq!(flights[0].aircraft_type, AircraftType::A320Neo);
    assert!(flights[0].is_missing_crew_members(Some(CrewRole::CabinAttendant)));
}

#[tokio::test]
async fn single_day_schedule_accepts_wrapped_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SCHEDULE_PATH))
        .and(query_param("from", "2024-01-02"))
        .and(query_param("to", "2024-01-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let okta = token("okta-access", None, 3600);
    let apm = token("apm-access", None, 3600);
    let (client, _tokens) = managed_client(&server, token_map(&okta, &apm));

    let flights =
        client.get_flight_schedule(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), None).await.unwrap();
    assert!(flights.is_empty());
}

// ============================================================================
// Connector
// ============================================================================

#[tokio::test]
async fn connector_accepts_any_http_response() {
    let server = MockServer::start().await;
    let connector = HttpClientConnector::with_http_client(client_config(&server), http_client());

    // No mock mounted: wiremock answers 404, which still proves reachability
    let client = connector.connect(&server.uri(), ClientAuth::Manual).await.unwrap();
    assert_eq!(client.host(), server.uri());
}

#[tokio::test]
async fn connector_maps_unreachable_host_to_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = MockServer::start().await;
    let connector = HttpClientConnector::with_http_client(client_config(&server), http_client());

    let err = connector.connect(&format!("http://{addr}"), ClientAuth::Manual).await.err().unwrap();
    assert!(matches!(err, CrewConnectError::Connection(_)), "got {err:?}");

    let err = connector.connect("not a host", ClientAuth::Manual).await.err().unwrap();
    assert!(matches!(err, CrewConnectError::Connection(_)), "got {err:?}");
}
