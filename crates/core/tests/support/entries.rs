use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crewconnect_core::EntryStorage;
use crewconnect_domain::constants::{CONFIG_ENTRY_VERSION, DOMAIN};
use crewconnect_domain::{ConfigEntry, CrewConnectError, EntryData, Result as DomainResult};

/// In-memory mock for `EntryStorage`.
///
/// Entry ids are assigned sequentially (`entry-1`, `entry-2`, ...). Writes
/// can be made to fail to exercise persistence error paths.
#[derive(Default)]
pub struct InMemoryEntryStorage {
    entries: Mutex<BTreeMap<String, ConfigEntry>>,
    next_id: AtomicUsize,
    fail_updates: AtomicBool,
    updates: AtomicUsize,
}

impl InMemoryEntryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry directly, bypassing `create_entry`.
    pub fn with_entry(self, entry: ConfigEntry) -> Self {
        self.entries.lock().unwrap().insert(entry.entry_id.clone(), entry);
        self
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `update_entry_data` calls.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn data(&self, entry_id: &str) -> EntryData {
        self.entries.lock().unwrap()[entry_id].data.clone()
    }
}

impl EntryStorage for InMemoryEntryStorage {
    fn entries(&self) -> DomainResult<Vec<ConfigEntry>> {
        Ok(self.entries.lock().unwrap().values().cloned().collect())
    }

    fn entry(&self, entry_id: &str) -> DomainResult<Option<ConfigEntry>> {
        Ok(self.entries.lock().unwrap().get(entry_id).cloned())
    }

    fn create_entry(&self, title: &str, data: EntryData) -> DomainResult<ConfigEntry> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = ConfigEntry {
            entry_id: format!("entry-{id}"),
            domain: DOMAIN.to_string(),
            title: title.to_string(),
            version: CONFIG_ENTRY_VERSION,
            data,
        };
        self.entries.lock().unwrap().insert(entry.entry_id.clone(), entry.clone());
        Ok(entry)
    }

    fn update_entry_data(&self, entry_id: &str, data: EntryData) -> DomainResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CrewConnectError::Persistence("storage unavailable".into()));
        }
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(entry_id)
            .ok_or_else(|| CrewConnectError::NotFound(entry_id.to_string()))?;
        entry.data = data;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_entry(&self, entry_id: &str) -> DomainResult<bool> {
        Ok(self.entries.lock().unwrap().remove(entry_id).is_some())
    }
}
