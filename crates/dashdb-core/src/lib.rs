//! # DashDB Core
//!
//! Core library for DashDB - an embeddable, process-local record store that keeps
//! named collections of JSON records in memory and mirrors each one to a
//! newline-delimited JSON file.
//!
//! ## Architecture
//!
//! - **id**: Primary key generation from a fixed 36-symbol alphabet
//! - **fingerprint**: Deterministic content hash of a record's user fields
//! - **fs**: Atomic file replacement and ownership helpers
//! - **storage**: Backing file codec, the `RecordStore` CRUD surface, and the
//!   `StoreRegistry` that shares collection state per name
//!
//! ## Example
//!
//! ```no_run
//! use dashdb_core::storage::{Predicate, StoreOptions, StoreRegistry};
//! use serde_json::json;
//!
//! # fn main() -> dashdb_core::Result<()> {
//! let mut registry = StoreRegistry::new("data");
//! let items = registry.open("items", StoreOptions::default())?;
//!
//! let object = json!({"name": "Foo"}).as_object().cloned().unwrap_or_default();
//! items.append(vec![object])?;
//!
//! let found = items.filter(&Predicate::new().eq("name", "Foo"))?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fingerprint;
pub mod fs;
pub mod id;
pub mod storage;

pub use error::{DashError, Result};
pub use storage::{Predicate, Record, RecordStore, StoreOptions, StoreRegistry};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
