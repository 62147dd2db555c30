//! Persistent location slot.
//!
//! `JsonStore` is a small key-value store: one JSON file per key under a data
//! directory. Every failure is logged and reported to the caller as "absent",
//! so a broken or disabled store only means the location is re-resolved on
//! the next start.

use nimbus_core::{StorageConfig, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::types::LocationRecord;

/// Fixed key under which the resolved location is stored
pub const LOCATION_KEY: &str = "location";

#[derive(Debug, Clone)]
pub struct JsonStore {
    /// `None` when storage is disabled
    dir: Option<PathBuf>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A store that behaves as if storage were turned off
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        if config.enabled {
            Self::new(config.data_dir())
        } else {
            Self::disabled()
        }
    }

    /// Read and decode the value at `key`, or `None` on any failure
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(StorageError::Disabled) => {
                tracing::debug!("Storage disabled, treating '{}' as absent", key);
                None
            }
            Err(e) => {
                tracing::warn!("Error reading '{}' from local storage: {}", key, e);
                None
            }
        }
    }

    /// Encode and store `value` at `key`, logging any failure
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        match self.try_set(key, value) {
            Ok(()) => tracing::debug!("Stored '{}' in local storage", key),
            Err(StorageError::Disabled) => {
                tracing::debug!("Storage disabled, '{}' not persisted", key);
            }
            Err(e) => tracing::warn!("Error updating local storage for '{}': {}", key, e),
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key)?;

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Unavailable(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn try_set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let json = serde_json::to_string(value).map_err(|e| StorageError::Encode(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
        }

        // Write-then-rename so readers never observe a half-written value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| unavailable(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| unavailable(&path, e))?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let dir = self.dir.as_ref().ok_or(StorageError::Disabled)?;
        Ok(dir.join(format!("{key}.json")))
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Unavailable(format!("{}: {}", path.display(), e))
}

/// The single cached `LocationRecord`
#[derive(Debug, Clone)]
pub struct LocationCache {
    store: JsonStore,
}

impl LocationCache {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// The cached record, if present and well-formed
    pub fn read(&self) -> Option<LocationRecord> {
        let record: LocationRecord = self.store.get(LOCATION_KEY)?;
        if record.is_well_formed() {
            Some(record)
        } else {
            tracing::warn!("Ignoring malformed cached location: {:?}", record);
            None
        }
    }

    /// Replace the cached record wholesale
    pub fn write(&self, record: &LocationRecord) {
        if !record.is_well_formed() {
            tracing::warn!("Refusing to cache malformed location: {:?}", record);
            return;
        }
        self.store.set(LOCATION_KEY, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;

    fn paris() -> LocationRecord {
        LocationRecord::new("Paris", Coordinates::new(48.8566, 2.3522))
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));

        cache.write(&paris());

        assert_eq!(cache.read(), Some(paris()));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_write_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));
        let berlin = LocationRecord::new("Berlin", Coordinates::new(52.52, 13.405));

        cache.write(&paris());
        cache.write(&berlin);

        assert_eq!(cache.read(), Some(berlin));
        assert!(!dir.path().join("location.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_json_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("location.json"), "{\"city\": \"Par").unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_partial_record_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("location.json"), r#"{"city":"Paris","latitude":48.8}"#)
            .unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_malformed_record_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocationCache::new(JsonStore::new(dir.path()));

        cache.write(&LocationRecord::new("", Coordinates::new(1.0, 2.0)));

        assert!(!dir.path().join("location.json").exists());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_absent() {
        // A regular file where the data directory should be
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let cache = LocationCache::new(JsonStore::new(blocker.path()));

        cache.write(&paris());

        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_storage_failure_after_successful_write() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let cache = LocationCache::new(JsonStore::new(&data_dir));
        cache.write(&paris());
        assert_eq!(cache.read(), Some(paris()));

        // Make the stored value unreadable: a directory where the file was
        fs::remove_file(data_dir.join("location.json")).unwrap();
        fs::create_dir(data_dir.join("location.json")).unwrap();

        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_disabled_store_reads_absent_and_ignores_writes() {
        let cache = LocationCache::new(JsonStore::disabled());
        cache.write(&paris());
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_from_config_respects_enabled_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            enabled: false,
            data_dir: dir.path().to_string_lossy().into_owned(),
        };
        let cache = LocationCache::new(JsonStore::from_config(&config));
        cache.write(&paris());
        assert!(!dir.path().join("location.json").exists());
    }
}
