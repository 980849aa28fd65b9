//! Key-value persistence for the settings model.
//!
//! The settings model only needs `get`/`set` of opaque strings under a fixed
//! key. [`FileStore`] keeps those entries in a small TOML file in the user's
//! configuration directory; [`MemoryStore`] keeps them in process.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::{CONFIG_DIR_NAME, STORE_FILE_NAME};
use crate::common::utils::private_path;

/// String key-value store collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, used when no persistent location is wanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// TOML-file backed store.
///
/// The file is read on every `get` and rewritten on every `set`, so edits
/// made by another process are picked up on the next load.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located in `config_dir`, or in the default configuration
    /// directory when none is given.
    pub fn in_config_dir(config_dir: Option<&Path>) -> Result<Self> {
        Ok(Self::new(resolve_config_dir(config_dir)?.join(STORE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store {}", private_path(&self.path)))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse store {}", private_path(&self.path)))
    }

    fn write_file(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory {}", private_path(parent))
            })?;
        }
        let content = toml::to_string_pretty(file).context("Failed to serialize store")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write store {}", private_path(&self.path)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_file()?.entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every future save
        let mut file = self.read_file().unwrap_or_default();
        file.entries.insert(key.to_string(), value.to_string());
        self.write_file(&file)
    }
}

/// Resolve the configuration directory: the custom one if given, otherwise
/// `<platform config dir>/nightlight`.
pub fn resolve_config_dir(custom: Option<&Path>) -> Result<PathBuf> {
    match custom {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR_NAME)),
    }
}
