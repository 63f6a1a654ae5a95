//! Client-side persistence of the admin token.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Where the token survives between runs.
pub trait TokenStore: Send + Sync + 'static {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// A JSON object on disk; the token lives under a fixed key and any other
/// keys in the file are left alone.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        fs::write(&self.path, text)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        self.read_all().remove(&self.key).filter(|t| !t.is_empty())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        let mut entries = self.read_all();
        entries.insert(self.key.clone(), token.to_string());
        self.write_all(&entries)
    }

    fn clear(&self) -> io::Result<()> {
        let mut entries = self.read_all();
        if entries.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

/// Process-local store, for tests and embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path, "adminToken");
        assert_eq!(store.load(), None);

        store.save("t1").unwrap();
        assert_eq!(store.load().as_deref(), Some("t1"));
        assert_eq!(FileTokenStore::new(&path, "adminToken").load().as_deref(), Some("t1"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert!(fs::read_to_string(&path).unwrap().contains("theme"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"), "adminToken");
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }
}
