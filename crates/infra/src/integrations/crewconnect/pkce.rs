//! PKCE (Proof Key for Code Exchange) for the identity provider login
//!
//! Implements RFC 7636 with the S256 method; the app has no client secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Random URL-safe string of 32 bytes (43 characters)
fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Code challenge for `verifier`: `BASE64URL(SHA256(verifier))`
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// PKCE challenge pair plus the CSRF state of one authorization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Kept secret until the code exchange.
    pub code_verifier: String,
    /// Sent with the authorization request.
    pub code_challenge: String,
    /// Must come back unchanged in the redirect.
    pub state: String,
}

impl PkceChallenge {
    /// Fresh verifier, challenge and state
    pub fn generate() -> Self {
        let code_verifier = random_token();
        let code_challenge = code_challenge(&code_verifier);
        Self { code_verifier, code_challenge, state: random_token() }
    }

    /// Always `S256`
    pub const fn challenge_method(&self) -> &'static str {
        "S256"
    }

    pub fn matches_state(&self, state: &str) -> bool {
        self.state == state
    }
}
