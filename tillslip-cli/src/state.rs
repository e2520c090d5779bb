use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use tillslip_core::ReceiptBook;

/// Key holding the ordered receipt collection inside the store
pub const RECEIPTS_KEY: &str = "receipts";

pub fn tillslip_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TILLSLIP_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tillslip"))
}

pub fn ensure_tillslip_home() -> Result<PathBuf> {
    let dir = tillslip_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(ensure_tillslip_home()?.join("store.json"))
}

/// A flat JSON object of key -> value, rewritten whole on every save.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl KeyValueStore {
    /// Missing file reads as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: Map::new(),
            });
        }
        let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let entries = if s.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    pub fn load_book(&self) -> Result<ReceiptBook> {
        match self.get(RECEIPTS_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())
                .with_context(|| format!("decode {RECEIPTS_KEY:?} in {}", self.path.display()))?),
            None => Ok(ReceiptBook::new()),
        }
    }

    /// Replace the stored collection and write the file.
    pub fn save_book(&mut self, book: &ReceiptBook) -> Result<()> {
        let value = serde_json::to_value(book).context("encode receipts")?;
        self.set(RECEIPTS_KEY, value);
        self.save()
    }
}

pub fn open_store() -> Result<KeyValueStore> {
    KeyValueStore::open(store_path()?)
}
