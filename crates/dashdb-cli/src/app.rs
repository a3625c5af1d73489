//! Resolution of config, data directory, and collection handles.

use std::path::PathBuf;

use dashdb_core::{RecordStore, StoreRegistry};
use serde_json::{Map, Value};

use crate::cli::Cli;
use crate::config::{default_config_path, default_data_dir, read_config, DashConfig};

pub fn resolve_config(cli: &Cli) -> anyhow::Result<DashConfig> {
    if let Some(path) = cli.config.as_deref().filter(|value| !value.trim().is_empty()) {
        return read_config(&PathBuf::from(path));
    }
    let path = default_config_path()?;
    if path.exists() {
        read_config(&path)
    } else {
        Ok(DashConfig::default())
    }
}

pub fn resolve_data_dir(cli: &Cli, config: &DashConfig) -> anyhow::Result<PathBuf> {
    if let Some(dir) = cli.data_dir.as_deref().filter(|value| !value.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = config.store.data_dir.as_deref() {
        return Ok(PathBuf::from(dir));
    }
    default_data_dir()
}

/// Open collection `name` with the configured options.
pub fn open_collection(cli: &Cli, name: &str) -> anyhow::Result<RecordStore> {
    let config = resolve_config(cli)?;
    let data_dir = resolve_data_dir(cli, &config)?;
    tracing::debug!(data_dir = %data_dir.display(), collection = name, "resolved collection");

    let mut registry = StoreRegistry::new(data_dir);
    let store = registry.open(name, config.collection)?;
    Ok(store)
}

/// Commit unless the collection already persisted the mutation itself.
pub fn finish_mutation(store: &RecordStore) -> anyhow::Result<()> {
    if !store.options()?.auto_persist {
        store.commit()?;
    }
    Ok(())
}

/// Parse a command-line argument that must be a JSON object.
pub fn parse_object(label: &str, raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(anyhow::anyhow!("{} must be a JSON object", label)),
        Err(e) => Err(anyhow::anyhow!("Invalid JSON for {}: {}", label, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_accepts_objects_only() {
        assert_eq!(parse_object("record", "{\"a\":1}").unwrap().len(), 1);

        let err = parse_object("record", "[1]").unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));

        let err = parse_object("record", "{oops").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON for record"));
    }
}
