//! Port interface for config entry storage
//!
//! Calls are synchronous: implementations keep entries in memory and write
//! them through to durable storage before returning.

use crewconnect_domain::{ConfigEntry, EntryData, Result};

/// Trait for persisting config entries
pub trait EntryStorage: Send + Sync {
    /// All stored entries
    fn entries(&self) -> Result<Vec<ConfigEntry>>;

    /// Entry with the given id
    fn entry(&self, entry_id: &str) -> Result<Option<ConfigEntry>>;

    /// Store a new entry and return it with its assigned id
    fn create_entry(&self, title: &str, data: EntryData) -> Result<ConfigEntry>;

    /// Replace the data of an existing entry
    fn update_entry_data(&self, entry_id: &str, data: EntryData) -> Result<()>;

    /// Remove an entry; `false` if it did not exist
    fn remove_entry(&self, entry_id: &str) -> Result<bool>;
}
