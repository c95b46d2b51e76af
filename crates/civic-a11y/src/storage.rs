//! Key-value storage
//!
//! localStorage-style string store. Session storage lives in memory; local
//! storage is mirrored to a file with one `key<TAB>value` pair per line.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::A11yError;

/// Storage handle shared by the panel and the coordinator
pub type SharedStorage = Rc<RefCell<Storage>>;

/// Storage backend
#[derive(Debug, Default)]
pub struct Storage {
    data: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    /// In-memory storage (sessionStorage)
    pub fn session() -> Self {
        Self::default()
    }

    /// File-backed storage (localStorage). A missing file starts empty.
    pub fn local(path: impl Into<PathBuf>) -> Result<Self, A11yError> {
        let path = path.into();
        let mut data = BTreeMap::new();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                for line in contents.lines().filter(|l| !l.is_empty()) {
                    match line.split_once('\t') {
                        Some((key, value)) => {
                            data.insert(key.to_string(), value.to_string());
                        }
                        None => tracing::debug!(line, "skipping malformed storage line"),
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self { data, path: Some(path) })
    }

    pub fn into_shared(self) -> SharedStorage {
        Rc::new(RefCell::new(self))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set an item. The in-memory value is updated even if persisting fails.
    /// Keys and values may not contain tabs or line breaks.
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<(), A11yError> {
        if [key, value].iter().any(|s| s.contains(['\t', '\n', '\r'])) {
            return Err(A11yError::InvalidStorageEntry { key: key.to_string() });
        }
        self.data.insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), A11yError> {
        if self.data.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), A11yError> {
        self.data.clear();
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    fn persist(&self) -> Result<(), A11yError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents: String = self
            .data
            .iter()
            .map(|(k, v)| format!("{k}\t{v}\n"))
            .collect();
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_storage() {
        let mut storage = Storage::session();
        storage.set_item("accessibility-font-size", "120").unwrap();
        storage.set_item("accessibility-color-theme", "dark").unwrap();
        assert_eq!(storage.get_item("accessibility-font-size"), Some("120"));
        assert_eq!(storage.len(), 2);

        storage.remove_item("accessibility-font-size").unwrap();
        assert_eq!(storage.get_item("accessibility-font-size"), None);

        storage.clear().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.tsv");

        let mut storage = Storage::local(&path).unwrap();
        assert!(storage.is_empty());
        storage.set_item("accessibility-screen-reader", "true").unwrap();
        storage.set_item("accessibility-high-contrast", "false").unwrap();

        let reloaded = Storage::local(&path).unwrap();
        assert_eq!(reloaded.get_item("accessibility-screen-reader"), Some("true"));
        assert_eq!(reloaded.keys().count(), 2);
    }

    #[test]
    fn test_local_storage_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.tsv");
        fs::write(&path, "garbage\naccessibility-font-size\t115\n").unwrap();

        let storage = Storage::local(&path).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get_item("accessibility-font-size"), Some("115"));
    }

    #[test]
    fn test_separators_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.tsv");
        let mut storage = Storage::local(&path).unwrap();
        storage.set_item("accessibility-font-size", "115").unwrap();

        for (key, value) in [("theme", "dark\tlight"), ("theme", "dark\nx\t1"), ("a\tb", "1"), ("k", "v\r")] {
            assert!(matches!(
                storage.set_item(key, value),
                Err(A11yError::InvalidStorageEntry { .. })
            ));
        }
        assert_eq!(storage.len(), 1);

        let reloaded = Storage::local(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get_item("accessibility-font-size"), Some("115"));
    }

    #[test]
    fn test_write_failure_keeps_memory_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("prefs.tsv");
        let mut storage = Storage::local(&path).unwrap();

        assert!(matches!(storage.set_item("k", "v"), Err(A11yError::Storage(_))));
        assert_eq!(storage.get_item("k"), Some("v"));
    }
}
