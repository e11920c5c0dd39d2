//! JSON-file config entry storage
//!
//! Entries are held in memory and every mutation rewrites the whole file:
//! the new document is written to a sibling temp file and renamed over the
//! original, so a crash never leaves a half-written file. The in-memory copy
//! only changes once the rename succeeded.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crewconnect_core::EntryStorage;
use crewconnect_domain::constants::{CONFIG_ENTRY_VERSION, DOMAIN};
use crewconnect_domain::{ConfigEntry, CrewConnectError, EntryData, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::InfraError;

/// Version of the on-disk document layout
const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    entries: Vec<ConfigEntry>,
}

/// Config entries persisted to one JSON file
pub struct JsonFileEntryStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, ConfigEntry>>,
}

impl JsonFileEntryStorage {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => {
                let document: StoreDocument =
                    serde_json::from_str(&contents).map_err(InfraError::from)?;
                if document.version > STORE_VERSION {
                    return Err(CrewConnectError::Config(format!(
                        "{} was written by a newer version (layout {})",
                        path.display(),
                        document.version
                    )));
                }
                document
                    .entries
                    .into_iter()
                    .map(|entry| (entry.entry_id.clone(), entry))
                    .collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No entry file yet, starting empty");
                BTreeMap::new()
            }
            Err(err) => return Err(InfraError::from(err).into()),
        };

        info!(path = %path.display(), count = entries.len(), "Config entries loaded");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    /// File the entries are written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the entries, write it, then commit it.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, ConfigEntry>) -> Result<T>,
    ) -> Result<T> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        let value = change(&mut next)?;

        write_document(&self.path, &next).map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "Failed to write config entries");
            match err {
                CrewConnectError::Persistence(_) => err,
                other => CrewConnectError::Persistence(other.to_string()),
            }
        })?;

        *entries = next;
        Ok(value)
    }
}

fn write_document(path: &Path, entries: &BTreeMap<String, ConfigEntry>) -> Result<()> {
    let document =
        StoreDocument { version: STORE_VERSION, entries: entries.values().cloned().collect() };
    let contents = serde_json::to_vec_pretty(&document).map_err(InfraError::from)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(InfraError::from)?;
    }

    let mut tmp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents).map_err(InfraError::from)?;
    fs::rename(&tmp_path, path).map_err(InfraError::from)?;
    Ok(())
}

impl EntryStorage for JsonFileEntryStorage {
    fn entries(&self) -> Result<Vec<ConfigEntry>> {
        Ok(self.entries.lock().values().cloned().collect())
    }

    fn entry(&self, entry_id: &str) -> Result<Option<ConfigEntry>> {
        Ok(self.entries.lock().get(entry_id).cloned())
    }

    fn create_entry(&self, title: &str, data: EntryData) -> Result<ConfigEntry> {
        let entry = ConfigEntry {
            entry_id: Uuid::now_v7().simple().to_string(),
            domain: DOMAIN.to_string(),
            title: title.to_string(),
            version: CONFIG_ENTRY_VERSION,
            data,
        };

        self.mutate(|entries| {
            entries.insert(entry.entry_id.clone(), entry.clone());
            Ok(())
        })?;

        info!(entry_id = %entry.entry_id, title = %entry.title, "Config entry stored");
        Ok(entry)
    }

    fn update_entry_data(&self, entry_id: &str, data: EntryData) -> Result<()> {
        self.mutate(|entries| {
            let entry = entries
                .get_mut(entry_id)
                .ok_or_else(|| CrewConnectError::NotFound(format!("config entry {entry_id}")))?;
            entry.data = data;
            Ok(())
        })?;

        debug!(entry_id, "Config entry data updated");
        Ok(())
    }

    fn remove_entry(&self, entry_id: &str) -> Result<bool> {
        if !self.entries.lock().contains_key(entry_id) {
            return Ok(false);
        }
        self.mutate(|entries| Ok(entries.remove(entry_id).is_some()))
    }
}
