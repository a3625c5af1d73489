//! Process-wide mapping from collection name to shared collection state.
//!
//! The registry is an ordinary value owned by the application. Handles it
//! returns for the same name share one in-memory sequence; opening a name
//! again re-hydrates from disk and replaces that sequence for every handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::record_store::{hydrate, Collection, RecordStore};
use super::types::StoreOptions;
use crate::error::{DashError, Result};

/// Extension of every backing file.
pub const FILE_EXTENSION: &str = "json";

/// Registry of open collections under one data directory.
pub struct StoreRegistry {
    base_dir: PathBuf,
    collections: HashMap<String, Arc<Collection>>,
}

impl StoreRegistry {
    /// Create a registry storing backing files under `base_dir`.
    ///
    /// Nothing is touched on disk until a collection is opened.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            collections: HashMap::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Open collection `name`, creating its backing file if missing.
    ///
    /// If the name is already open, the shared state is re-hydrated from disk
    /// with the new options; every existing handle observes the result.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Configuration` for an invalid name or options,
    /// `DashError::Persistence` if the file cannot be created or read, or
    /// `DashError::Serialization` if it holds an unparseable line. The shared
    /// state is left as it was on any error.
    pub fn open(&mut self, name: &str, options: StoreOptions) -> Result<RecordStore> {
        validate_name(name)?;
        options.validate()?;

        let path = self.path_for(name);
        super::file::ensure(&path)?;
        let records = hydrate(&path, &options.reserved_keys())?;
        tracing::info!(collection = name, path = %path.display(), records = records.len(), "opened collection");

        let collection = match self.collections.get(name) {
            Some(existing) => {
                existing.replace(options, records)?;
                Arc::clone(existing)
            }
            None => {
                let collection = Arc::new(Collection::new(
                    name.to_string(),
                    path,
                    options,
                    records,
                ));
                self.collections
                    .insert(name.to_string(), Arc::clone(&collection));
                collection
            }
        };
        Ok(RecordStore::from_collection(collection))
    }

    /// Another handle to an open collection, without touching disk.
    pub fn get(&self, name: &str) -> Option<RecordStore> {
        self.collections
            .get(name)
            .map(|collection| RecordStore::from_collection(Arc::clone(collection)))
    }

    /// Names of the open collections, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Forget collection `name`.
    ///
    /// Existing handles keep working on their now-detached state; the next
    /// `open` hydrates a fresh one. Returns whether the name was open.
    pub fn close(&mut self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }

    /// Backing file path for `name`, whether or not it is open.
    pub fn current_file_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.path_for(name))
    }

    /// Persisted bytes of collection `name`, for an external backup collaborator.
    pub fn current_file_contents(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.current_file_path(name)?;
        std::fs::read(&path).map_err(|e| {
            DashError::Persistence(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, FILE_EXTENSION))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DashError::Configuration(
            "Collection name must not be empty".to_string(),
        ));
    }
    if name == "." || name.contains("..") || name.contains(['/', '\\', '\0']) {
        return Err(DashError::Configuration(format!(
            "Invalid collection name '{}'",
            name
        )));
    }
    Ok(())
}
