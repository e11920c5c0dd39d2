//! Token callback capability consumed by the backend client

use crewconnect_domain::{Result, TokenMap};
use serde_json::Value;

/// Trait for reading and writing the client's named tokens
///
/// Any implementation is acceptable; the client never assumes where tokens
/// are kept.
pub trait TokenCallback: Send + Sync {
    /// Token stored under `name`
    fn get(&self, name: &str) -> Option<Value>;

    /// Every stored token, or `None` when nothing is stored
    fn get_all(&self) -> Option<TokenMap>;

    /// Store a single token
    fn set(&self, name: &str, value: Value) -> Result<()>;

    /// Replace every stored token
    fn set_all(&self, tokens: TokenMap) -> Result<()>;

    /// Whether a token is stored under `name`
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
