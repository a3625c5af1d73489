//! The CRUD surface over one named collection.
//!
//! A [`RecordStore`] is a cheap handle. Every handle for the same name that
//! came from one [`StoreRegistry`](super::StoreRegistry) shares a single
//! in-memory sequence, so a mutation through one handle is visible through
//! all of them. The in-memory sequence and the backing file are reconciled
//! only by [`RecordStore::commit`] (explicitly or through auto-persist) and
//! [`RecordStore::reload`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::file;
use super::traits::BackupSink;
use super::types::{Predicate, Record, ReservedKeys, StoreOptions};
use crate::error::{DashError, Result};
use crate::{fingerprint, id};

/// Shared state behind every handle for one collection name.
pub(crate) struct Collection {
    name: String,
    path: PathBuf,
    state: Mutex<CollectionState>,
}

pub(crate) struct CollectionState {
    options: StoreOptions,
    keys: ReservedKeys,
    records: Vec<Record>,
}

impl Collection {
    pub(crate) fn new(
        name: String,
        path: PathBuf,
        options: StoreOptions,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name,
            path,
            state: Mutex::new(CollectionState::new(options, records)),
        }
    }

    /// Swap in freshly hydrated options and records for every handle.
    pub(crate) fn replace(&self, options: StoreOptions, records: Vec<Record>) -> Result<()> {
        *self.lock_state()? = CollectionState::new(options, records);
        Ok(())
    }

    /// Lock the collection state, returning an error if the mutex is poisoned.
    fn lock_state(&self) -> Result<MutexGuard<'_, CollectionState>> {
        self.state
            .lock()
            .map_err(|_| DashError::State(format!("Collection '{}' state poisoned", self.name)))
    }
}

impl CollectionState {
    fn new(options: StoreOptions, records: Vec<Record>) -> Self {
        let keys = options.reserved_keys();
        Self {
            options,
            keys,
            records,
        }
    }

    fn persist(&self, path: &Path) -> Result<()> {
        let objects: Vec<Map<String, Value>> = self
            .records
            .iter()
            .map(|record| record.to_object(&self.keys))
            .collect();
        file::save(path, &objects, self.options.owner.as_ref())?;
        tracing::debug!(path = %path.display(), records = objects.len(), "committed collection");
        Ok(())
    }

    fn auto_persist(&self, path: &Path) -> Result<()> {
        if self.options.auto_persist {
            self.persist(path)?;
        }
        Ok(())
    }

    fn matching_indices(&self, predicate: &Predicate) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate.matches(record, &self.keys))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Read the backing file and lift every line into a [`Record`].
///
/// Nothing is returned unless every line parses, so callers can replace
/// in-memory state only on full success.
pub(crate) fn hydrate(path: &Path, keys: &ReservedKeys) -> Result<Vec<Record>> {
    let records = file::load(path)?
        .into_iter()
        .enumerate()
        .map(|(index, object)| {
            Record::from_object(object, keys).map_err(|e| {
                DashError::Serialization(format!("{} record {}: {}", path.display(), index + 1, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(path = %path.display(), records = records.len(), "hydrated collection");
    Ok(records)
}

/// Current time as RFC 3339 UTC with microseconds, so string order is time order.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Handle to one named collection.
#[derive(Clone)]
pub struct RecordStore {
    collection: Arc<Collection>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("name", &self.collection.name)
            .field("path", &self.collection.path)
            .finish()
    }
}

impl RecordStore {
    pub(crate) fn from_collection(collection: Arc<Collection>) -> Self {
        Self { collection }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.collection.name
    }

    /// Backing file path.
    pub fn file_path(&self) -> &Path {
        &self.collection.path
    }

    /// Options the collection was last opened with.
    pub fn options(&self) -> Result<StoreOptions> {
        Ok(self.collection.lock_state()?.options.clone())
    }

    /// Reserved field names active for this collection.
    pub fn reserved_keys(&self) -> Result<ReservedKeys> {
        Ok(self.collection.lock_state()?.keys.clone())
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> Result<Vec<Record>> {
        Ok(self.collection.lock_state()?.records.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.collection.lock_state()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append new records built from raw field maps, in the order given.
    ///
    /// For each input: a primary key is generated if absent, the fingerprint
    /// is computed, `created` is set to now if absent, and `modified` is set
    /// equal to `created`. Nothing is appended unless every input is valid.
    ///
    /// # Returns
    ///
    /// The created records, in input order.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Serialization` if an input holds a non-string
    /// reserved field, or `DashError::Persistence` if auto-persist fails. In
    /// the latter case the records stay appended in memory.
    pub fn append<I>(&self, items: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut state = self.collection.lock_state()?;
        let now = timestamp();

        let created = items
            .into_iter()
            .map(|item| -> Result<Record> {
                let mut record = Record::from_object(item, &state.keys)?;
                if state.keys.primary_key.is_some() && record.id.is_none() {
                    record.id = Some(id::generate(state.options.key_length)?);
                }
                if state.keys.fingerprint.is_some() {
                    record.fingerprint = Some(fingerprint::of_fields(&record.fields));
                }
                if state.keys.created.is_some() && record.created.is_none() {
                    record.created = Some(now.clone());
                }
                if state.keys.modified.is_some() {
                    record.modified = Some(record.created.clone().unwrap_or_else(|| now.clone()));
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        state.records.extend(created.iter().cloned());
        state.auto_persist(&self.collection.path)?;
        Ok(created)
    }

    /// Alias of [`RecordStore::append`].
    pub fn add<I>(&self, items: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        self.append(items)
    }

    /// Alias of [`RecordStore::append`].
    pub fn create<I>(&self, items: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        self.append(items)
    }

    /// Merge `changes` into every record matching `predicate`.
    ///
    /// Matches are taken from the state before any change is applied. The
    /// fingerprint is recomputed and `modified` set to now on each updated
    /// record. Enabled reserved fields in `changes` are ignored: `id` and
    /// `created` never change after append.
    ///
    /// # Returns
    ///
    /// The number of records updated.
    pub fn update(&self, predicate: &Predicate, changes: &Map<String, Value>) -> Result<usize> {
        let mut state = self.collection.lock_state()?;
        let matches = state.matching_indices(predicate);
        let now = timestamp();

        let state = &mut *state;
        for &index in &matches {
            let record = &mut state.records[index];
            for (name, value) in changes {
                if !state.keys.is_reserved(name) {
                    record.fields.insert(name.clone(), value.clone());
                }
            }
            if state.keys.fingerprint.is_some() {
                record.fingerprint = Some(fingerprint::of_fields(&record.fields));
            }
            if state.keys.modified.is_some() {
                record.modified = Some(now.clone());
            }
        }

        state.auto_persist(&self.collection.path)?;
        Ok(matches.len())
    }

    /// Remove every record matching `predicate`, keeping the order of the rest.
    ///
    /// # Returns
    ///
    /// The number of records removed.
    pub fn delete(&self, predicate: &Predicate) -> Result<usize> {
        let mut state = self.collection.lock_state()?;
        let before = state.records.len();

        let state = &mut *state;
        let keys = &state.keys;
        state.records.retain(|record| !predicate.matches(record, keys));

        let removed = before - state.records.len();
        state.auto_persist(&self.collection.path)?;
        Ok(removed)
    }

    /// Every record matching `predicate`, in insertion order.
    #[doc(alias = "where")]
    pub fn filter(&self, predicate: &Predicate) -> Result<Vec<Record>> {
        let state = self.collection.lock_state()?;
        Ok(state
            .records
            .iter()
            .filter(|record| predicate.matches(record, &state.keys))
            .cloned()
            .collect())
    }

    /// Look a record up by primary key.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Configuration` if the primary key is disabled.
    pub fn find(&self, id: &str) -> Result<Option<Record>> {
        let state = self.collection.lock_state()?;
        if state.keys.primary_key.is_none() {
            return Err(DashError::Configuration(format!(
                "Collection '{}' has no primary key field",
                self.collection.name
            )));
        }
        Ok(state
            .records
            .iter()
            .find(|record| record.id.as_deref() == Some(id))
            .cloned())
    }

    /// Drop every record from memory.
    ///
    /// The backing file is not touched, even with auto-persist on; only an
    /// explicit [`RecordStore::commit`] makes the clear durable.
    #[doc(alias = "empty")]
    pub fn clear(&self) -> Result<()> {
        self.collection.lock_state()?.records.clear();
        Ok(())
    }

    /// Replace the in-memory records with the backing file's contents.
    ///
    /// Uncommitted changes are discarded. On a read or parse error the
    /// in-memory records are left as they were.
    pub fn reload(&self) -> Result<()> {
        let mut state = self.collection.lock_state()?;
        let records = hydrate(&self.collection.path, &state.keys)?;
        state.records = records;
        Ok(())
    }

    /// Write the in-memory records to the backing file atomically.
    ///
    /// A failed commit changes neither memory nor the previous file, so it
    /// can be retried.
    pub fn commit(&self) -> Result<()> {
        self.collection.lock_state()?.persist(&self.collection.path)
    }

    /// Alias of [`RecordStore::commit`].
    pub fn sync(&self) -> Result<()> {
        self.commit()
    }

    /// Bytes of the backing file as last committed.
    pub fn file_contents(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.collection.path).map_err(|e| {
            DashError::Persistence(format!(
                "Failed to read {}: {}",
                self.collection.path.display(),
                e
            ))
        })
    }

    /// Hand the persisted file to `sink` if backups are configured.
    ///
    /// # Returns
    ///
    /// `Ok(false)` without touching the file when the backup settings lack a
    /// bucket or credentials, `Ok(true)` once the sink accepted the file.
    pub fn backup(&self, sink: &dyn BackupSink) -> Result<bool> {
        let settings = self.options()?.backup;
        if !settings.is_configured() {
            tracing::debug!(collection = %self.collection.name, "backup skipped: not configured");
            return Ok(false);
        }
        let contents = self.file_contents()?;
        sink.ship(
            &self.collection.name,
            &self.collection.path,
            &contents,
            &settings,
        )?;
        Ok(true)
    }
}
