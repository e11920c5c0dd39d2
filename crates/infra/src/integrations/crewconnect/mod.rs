//! CrewConnect backend integration
//!
//! HTTP implementation of the core client port:
//! - PKCE authorization against the identity provider ("okta" token)
//! - Exchange of the identity token for a backend ("apm") token
//! - Token refresh written back through the token callback
//! - Profile and flight schedule fetches

pub mod client;
pub mod connector;
pub mod pkce;
pub mod tokens;
pub mod types;

pub use client::HttpCrewConnectClient;
pub use connector::HttpClientConnector;
pub use pkce::PkceChallenge;
pub use tokens::MemoryTokens;
pub use types::TokenSet;
