//! Storage layer: backing files, collections, and the registry.
//!
//! - [`file`]: newline-delimited JSON codec over atomic whole-file writes
//! - [`RecordStore`]: CRUD over one named collection
//! - [`StoreRegistry`]: shares collection state per name within a process

pub mod file;
mod record_store;
mod registry;
mod traits;
mod types;

pub use record_store::{timestamp, RecordStore};
pub use registry::{StoreRegistry, FILE_EXTENSION};
pub use traits::BackupSink;
pub use types::{BackupSettings, Ownership, Predicate, Record, ReservedKeys, StoreOptions};
