use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

// Key-value persistence boundary. Production uses the file-backed store;
// tests use the in-memory one so the core never needs a data directory.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened store");
        Ok(Self { data_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            debug!(file = %path.display(), "key not present");
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        Ok(Some(raw))
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.key_path(key);
        debug!(file = %path.display(), bytes = value.len(), "writing key atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;

        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemStore {
    entries: HashMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrip() {
        let temp = tempdir().expect("tempdir");
        let mut store = FileStore::open(temp.path()).expect("open store");

        assert_eq!(store.get("data").expect("get"), None);
        store.set("data", "[1,2,3]").expect("set");
        assert_eq!(store.get("data").expect("get").as_deref(), Some("[1,2,3]"));

        store.set("data", "[]").expect("overwrite");
        assert_eq!(store.get("data").expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn mem_store_roundtrip() {
        let mut store = MemStore::new();
        assert_eq!(store.get("theme").expect("get"), None);
        store.set("theme", "dark").expect("set");
        assert_eq!(store.get("theme").expect("get").as_deref(), Some("dark"));
    }
}
