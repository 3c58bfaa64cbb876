//! JSON file store. Keeps a whole array of records in one file and serializes every
//! load/modify/save cycle behind a mutex.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse json in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to marshal json: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("no matching record found")]
    NoMatch,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Store for a JSON array of `T` bound to one file.
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load all records. A file that does not exist yet reads as empty.
    pub fn load(&self) -> StorageResult<Vec<T>> {
        let _guard = self.guard();
        self.read_records()
    }

    /// Replace the file contents with `records`.
    pub fn save(&self, records: &[T]) -> StorageResult<()> {
        let _guard = self.guard();
        self.write_records(records)
    }

    pub fn add(&self, record: T) -> StorageResult<()> {
        let _guard = self.guard();
        let mut records = self.read_records()?;
        records.push(record);
        self.write_records(&records)
    }

    /// Apply `updater` to every record accepted by `matches`. Returns how many changed.
    pub fn update<M, U>(&self, matches: M, mut updater: U) -> StorageResult<usize>
    where
        M: Fn(&T) -> bool,
        U: FnMut(&mut T),
    {
        let _guard = self.guard();
        let mut records = self.read_records()?;

        let mut updated = 0;
        for record in records.iter_mut().filter(|r| matches(&**r)) {
            updater(record);
            updated += 1;
        }

        if updated == 0 {
            return Err(StorageError::NoMatch);
        }

        self.write_records(&records)?;
        Ok(updated)
    }

    /// Drop every record accepted by `matches`. Returns how many were removed.
    pub fn delete<M>(&self, matches: M) -> StorageResult<usize>
    where
        M: Fn(&T) -> bool,
    {
        let _guard = self.guard();
        let mut records = self.read_records()?;
        let before = records.len();
        records.retain(|r| !matches(r));
        let removed = before - records.len();

        if removed > 0 {
            self.write_records(&records)?;
        }
        Ok(removed)
    }

    fn read_records(&self) -> StorageResult<Vec<T>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&data).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_records(&self, records: &[T]) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(records)?;
        fs::write(&self.path, data).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    fn temp_store() -> (tempfile::TempDir, JsonStore<Note>) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("notes.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_add_then_load() {
        let (_dir, store) = temp_store();
        store.add(note(1, "first")).unwrap();
        store.add(note(2, "second")).unwrap();

        assert_eq!(store.load().unwrap(), vec![note(1, "first"), note(2, "second")]);
    }

    #[test]
    fn test_save_is_indented() {
        let (dir, store) = temp_store();
        store.save(&[note(1, "a")]).unwrap();

        let written = fs::read_to_string(dir.path().join("notes.json")).unwrap();
        assert!(written.contains("\n  {\n    \"id\": 1"));
    }

    #[test]
    fn test_update_matching() {
        let (_dir, store) = temp_store();
        store.save(&[note(1, "a"), note(2, "b"), note(3, "b")]).unwrap();

        let updated = store
            .update(|n| n.text == "b", |n| n.text = "c".to_string())
            .unwrap();

        assert_eq!(updated, 2);
        assert_eq!(
            store.load().unwrap(),
            vec![note(1, "a"), note(2, "c"), note(3, "c")]
        );
    }

    #[test]
    fn test_update_without_match_leaves_file() {
        let (_dir, store) = temp_store();
        store.save(&[note(1, "a")]).unwrap();

        let err = store.update(|n| n.id == 9, |n| n.id = 0).unwrap_err();
        assert!(matches!(err, StorageError::NoMatch));
        assert_eq!(store.load().unwrap(), vec![note(1, "a")]);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = temp_store();
        store.save(&[note(1, "a"), note(2, "b")]).unwrap();

        assert_eq!(store.delete(|n| n.id == 1).unwrap(), 1);
        assert_eq!(store.delete(|n| n.id == 1).unwrap(), 0);
        assert_eq!(store.load().unwrap(), vec![note(2, "b")]);
    }

    #[test]
    fn test_delete_without_match_does_not_create_file() {
        let (dir, store) = temp_store();
        assert_eq!(store.delete(|n| n.id == 1).unwrap(), 0);
        assert!(!dir.path().join("notes.json").exists());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("notes.json"), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(StorageError::Parse { .. })));
    }
}
