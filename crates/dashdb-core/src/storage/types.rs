//! Core data types for the storage layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DashError, Result};
use crate::id::{DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH};

/// Construction parameters for one collection.
///
/// Any reserved field name may be set to an empty string to disable the
/// behavior attached to it; a disabled name is then an ordinary user field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Primary key field name
    pub primary_key: String,

    /// Number of symbols in generated primary keys
    pub key_length: usize,

    /// Content fingerprint field name
    pub fingerprint_key: String,

    /// Creation timestamp field name
    pub created_key: String,

    /// Modification timestamp field name
    pub modified_key: String,

    /// Commit after every append, update, and delete
    pub auto_persist: bool,

    /// Owner applied to the backing file after each write
    pub owner: Option<Ownership>,

    /// Settings forwarded to an external backup collaborator
    pub backup: BackupSettings,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            key_length: DEFAULT_KEY_LENGTH,
            fingerprint_key: "hash".to_string(),
            created_key: "created".to_string(),
            modified_key: "modified".to_string(),
            auto_persist: true,
            owner: None,
            backup: BackupSettings::default(),
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub fn with_key_length(mut self, length: usize) -> Self {
        self.key_length = length;
        self
    }

    pub fn with_fingerprint_key(mut self, name: impl Into<String>) -> Self {
        self.fingerprint_key = name.into();
        self
    }

    pub fn with_created_key(mut self, name: impl Into<String>) -> Self {
        self.created_key = name.into();
        self
    }

    pub fn with_modified_key(mut self, name: impl Into<String>) -> Self {
        self.modified_key = name.into();
        self
    }

    pub fn without_primary_key(self) -> Self {
        self.with_primary_key("")
    }

    pub fn without_fingerprint(self) -> Self {
        self.with_fingerprint_key("")
    }

    pub fn without_timestamps(self) -> Self {
        self.with_created_key("").with_modified_key("")
    }

    pub fn auto_persist(mut self, enabled: bool) -> Self {
        self.auto_persist = enabled;
        self
    }

    pub fn with_owner(mut self, owner: Ownership) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_backup(mut self, backup: BackupSettings) -> Self {
        self.backup = backup;
        self
    }

    /// Resolve the active reserved field names.
    pub fn reserved_keys(&self) -> ReservedKeys {
        ReservedKeys {
            primary_key: enabled(&self.primary_key),
            fingerprint: enabled(&self.fingerprint_key),
            created: enabled(&self.created_key),
            modified: enabled(&self.modified_key),
        }
    }

    /// Check that the options describe a usable collection.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Configuration` if:
    /// - The primary key is enabled with a key length of zero or above
    ///   [`MAX_KEY_LENGTH`]
    /// - Two enabled reserved fields share a name
    pub fn validate(&self) -> Result<()> {
        let keys = self.reserved_keys();
        if keys.primary_key.is_some() && self.key_length == 0 {
            return Err(DashError::Configuration(
                "Primary key length must be at least 1".to_string(),
            ));
        }
        if keys.primary_key.is_some() && self.key_length > MAX_KEY_LENGTH {
            return Err(DashError::Configuration(format!(
                "Primary key length {} exceeds the maximum of {}",
                self.key_length, MAX_KEY_LENGTH
            )));
        }

        let names = keys.names();
        for (index, name) in names.iter().enumerate() {
            if names[index + 1..].contains(name) {
                return Err(DashError::Configuration(format!(
                    "Reserved field name '{}' is used more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn enabled(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// File owner and group applied after each write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl Ownership {
    pub fn is_empty(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

/// Remote backup settings.
///
/// The core never interprets these beyond [`BackupSettings::is_configured`];
/// they are handed to a [`BackupSink`](super::BackupSink) as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    /// Cron expression for the collaborator's scheduler
    pub schedule: String,

    /// Destination bucket
    pub bucket: String,

    /// Prefix inside the bucket
    pub bucket_path: String,

    pub access_key: String,

    pub secret_key: String,

    /// Object key template, expanded by the collaborator
    pub file_key: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            schedule: "* 0 * * *".to_string(),
            bucket: String::new(),
            bucket_path: "dashdb/".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            file_key: String::new(),
        }
    }
}

impl BackupSettings {
    /// True when a bucket and both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.bucket.is_empty() && !self.access_key.is_empty() && !self.secret_key.is_empty()
    }
}

/// The reserved field names active for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedKeys {
    pub primary_key: Option<String>,
    pub fingerprint: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl ReservedKeys {
    fn names(&self) -> Vec<&str> {
        [
            &self.primary_key,
            &self.fingerprint,
            &self.created,
            &self.modified,
        ]
        .into_iter()
        .filter_map(|name| name.as_deref())
        .collect()
    }

    /// Whether `name` is one of the enabled reserved fields.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

/// One stored record.
///
/// The four reserved fields are lifted out of the open field map; `fields`
/// holds only user content, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Primary key, assigned once at append
    pub id: Option<String>,

    /// Fingerprint of `fields` as of the last append or update
    pub fingerprint: Option<String>,

    /// Creation timestamp (write-once)
    pub created: Option<String>,

    /// Last modification timestamp
    pub modified: Option<String>,

    /// User fields
    pub fields: Map<String, Value>,
}

impl Record {
    /// Split a raw JSON object into reserved attributes and user fields.
    ///
    /// An empty primary key string is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Serialization` if an enabled reserved field holds
    /// anything other than a string.
    pub fn from_object(mut object: Map<String, Value>, keys: &ReservedKeys) -> Result<Self> {
        let id = take_reserved(&mut object, keys.primary_key.as_deref())?
            .filter(|id| !id.is_empty());
        let fingerprint = take_reserved(&mut object, keys.fingerprint.as_deref())?;
        let created = take_reserved(&mut object, keys.created.as_deref())?;
        let modified = take_reserved(&mut object, keys.modified.as_deref())?;

        Ok(Self {
            id,
            fingerprint,
            created,
            modified,
            fields: object,
        })
    }

    /// Rebuild the stored JSON object: primary key first, then user fields,
    /// then fingerprint and timestamps.
    pub fn to_object(&self, keys: &ReservedKeys) -> Map<String, Value> {
        let mut object = Map::with_capacity(self.fields.len() + 4);
        put_reserved(&mut object, keys.primary_key.as_deref(), &self.id);
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.clone());
        }
        put_reserved(&mut object, keys.fingerprint.as_deref(), &self.fingerprint);
        put_reserved(&mut object, keys.created.as_deref(), &self.created);
        put_reserved(&mut object, keys.modified.as_deref(), &self.modified);
        object
    }

    /// Value of a reserved attribute when `name` is an enabled reserved field.
    ///
    /// Returns `None` for user fields; `Some(None)` for a reserved field the
    /// record has not been assigned.
    pub fn reserved(&self, name: &str, keys: &ReservedKeys) -> Option<Option<&str>> {
        let slot = if keys.primary_key.as_deref() == Some(name) {
            &self.id
        } else if keys.fingerprint.as_deref() == Some(name) {
            &self.fingerprint
        } else if keys.created.as_deref() == Some(name) {
            &self.created
        } else if keys.modified.as_deref() == Some(name) {
            &self.modified
        } else {
            return None;
        };
        Some(slot.as_deref())
    }
}

fn take_reserved(object: &mut Map<String, Value>, name: Option<&str>) -> Result<Option<String>> {
    let Some(name) = name else {
        return Ok(None);
    };
    match object.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(DashError::Serialization(format!(
            "Reserved field '{}' must be a string, found {}",
            name, other
        ))),
    }
}

fn put_reserved(object: &mut Map<String, Value>, name: Option<&str>, value: &Option<String>) {
    if let (Some(name), Some(value)) = (name, value) {
        object.insert(name.to_string(), Value::String(value.clone()));
    }
}

/// Equality predicate: every listed field must equal the given value.
///
/// The empty predicate matches every record. A field absent from a record
/// never matches, not even an expected `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    fields: Map<String, Value>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, record: &Record, keys: &ReservedKeys) -> bool {
        self.fields
            .iter()
            .all(|(name, expected)| match record.reserved(name, keys) {
                Some(actual) => actual.is_some() && expected.as_str() == actual,
                None => record.fields.get(name) == Some(expected),
            })
    }
}

impl From<Map<String, Value>> for Predicate {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
