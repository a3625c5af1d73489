//! Collaborator hooks.
//!
//! The core never talks to the network. A `BackupSink` is supplied by the
//! application to ship a collection's persisted file wherever it likes, on
//! whatever schedule it owns.

use std::path::Path;

use super::types::BackupSettings;
use crate::error::Result;

/// Destination for collection backups.
pub trait BackupSink {
    /// Ship the persisted contents of collection `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Collection name
    /// * `path` - Backing file the contents were read from
    /// * `contents` - Bytes of the backing file at the time of the call
    /// * `settings` - The collection's backup settings, uninterpreted
    fn ship(
        &self,
        name: &str,
        path: &Path,
        contents: &[u8],
        settings: &BackupSettings,
    ) -> Result<()>;
}
