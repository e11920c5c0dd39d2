//! Token holder for manual-auth clients
//!
//! A client connected in manual mode keeps the tokens it minted here until
//! they are handed to a config entry.

use crewconnect_core::TokenCallback;
use crewconnect_domain::{is_present, Result, TokenMap};
use parking_lot::RwLock;
use serde_json::Value;

/// In-memory [`TokenCallback`]
#[derive(Debug, Default)]
pub struct MemoryTokens {
    tokens: RwLock<TokenMap>,
}

impl MemoryTokens {
    /// Empty holder
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenCallback for MemoryTokens {
    fn get(&self, name: &str) -> Option<Value> {
        self.tokens.read().get(name).cloned()
    }

    fn get_all(&self) -> Option<TokenMap> {
        let tokens = self.tokens.read();
        (!tokens.is_empty()).then(|| tokens.clone())
    }

    fn set(&self, name: &str, value: Value) -> Result<()> {
        let mut tokens = self.tokens.write();
        if is_present(&value) {
            tokens.insert(name.to_string(), value);
        } else {
            tokens.remove(name);
        }
        Ok(())
    }

    fn set_all(&self, mut tokens: TokenMap) -> Result<()> {
        tokens.retain(|_, value| is_present(value));
        *self.tokens.write() = tokens;
        Ok(())
    }
}
