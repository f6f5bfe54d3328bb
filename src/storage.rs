use crate::dlog;
use crate::types::Workout;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("reading store {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("writing store {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("store {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("encoding workouts: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage, shaped like a browser's origin storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A single JSON file holding `{ key: "value", ... }`.
///
/// A missing file is an empty store. Writes replace the file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(body.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(err = %e, "discarding unreadable store contents");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Mirrors the workout list into a [`KeyValueStore`] under [`WORKOUTS_KEY`].
#[derive(Debug)]
pub struct WorkoutStore<S> {
    inner: S,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), StoreError> {
        let json = serde_json::to_string(workouts)?;
        dlog!("saving workouts count={} bytes={}", workouts.len(), json.len());
        self.inner.set(WORKOUTS_KEY, json)
    }

    /// Previously saved workouts, or `None` when nothing usable is stored.
    ///
    /// Unreadable or malformed data counts as "nothing stored".
    pub fn load(&self) -> Option<Vec<Workout>> {
        let raw = match self.inner.get(WORKOUTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                dlog!("no stored workouts");
                return None;
            }
            Err(e) => {
                tracing::warn!(err = %e, "store unreadable; starting empty");
                return None;
            }
        };

        let mut workouts: Vec<Workout> = match serde_json::from_str(&raw) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(err = %e, "stored workouts are malformed; starting empty");
                return None;
            }
        };
        for w in &mut workouts {
            w.refresh_metric();
        }
        tracing::info!(count = workouts.len(), "restored workouts");
        Some(workouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coords;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Workout> {
        let t = Utc.with_ymd_and_hms(2024, 6, 2, 9, 30, 0).unwrap();
        vec![
            Workout::running_at(t, Coords(51.5, -0.12), 5.2, 24.0, 178.0),
            Workout::cycling_at(
                t + chrono::Duration::milliseconds(1),
                Coords(51.6, -0.1),
                27.0,
                95.0,
                -120.0,
            ),
        ]
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let mut store = WorkoutStore::new(MemoryStore::new());
        let workouts = sample();
        store.save(&workouts).unwrap();
        assert_eq!(store.load(), Some(workouts));
    }

    #[test]
    fn missing_key_loads_nothing() {
        let store = WorkoutStore::new(MemoryStore::new());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn malformed_data_loads_nothing() {
        let mut kv = MemoryStore::new();
        kv.set(WORKOUTS_KEY, "[{\"type\":\"swimming\"}]".into()).unwrap();
        assert_eq!(WorkoutStore::new(kv.clone()).load(), None);

        kv.set(WORKOUTS_KEY, "not json".into()).unwrap();
        assert_eq!(WorkoutStore::new(kv).load(), None);
    }

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut kv = FileStore::new(&path);
        assert_eq!(kv.get(WORKOUTS_KEY).unwrap(), None);

        kv.set("theme", "dark".into()).unwrap();
        let mut store = WorkoutStore::new(kv);
        store.save(&sample()).unwrap();

        let reopened = WorkoutStore::new(FileStore::new(&path));
        assert_eq!(reopened.load(), Some(sample()));
        assert_eq!(reopened.inner().get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_no_data_and_gets_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ nope").unwrap();

        let mut store = WorkoutStore::new(FileStore::new(&path));
        assert_eq!(store.load(), None);

        store.save(&sample()).unwrap();
        assert_eq!(store.load().map(|w| w.len()), Some(2));
    }

    #[test]
    fn remove_drops_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut kv = FileStore::new(dir.path().join("s.json"));
        kv.set(WORKOUTS_KEY, "[]".into()).unwrap();
        kv.remove(WORKOUTS_KEY).unwrap();
        assert_eq!(kv.get(WORKOUTS_KEY).unwrap(), None);
    }
}
