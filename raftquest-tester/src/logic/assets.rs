//! Content and storage doubles for headless runs.
//!
//! The catalogue and config are the same files the web build embeds, so the
//! tester exercises shipped content rather than fixtures.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use raftquest_game::{
    ContentCatalog, ContentProvider, GameConfig, GameEngine, SnapshotStorage, constants,
};
use serde::de::DeserializeOwned;

const CATALOG_JSON: &str = include_str!("../../../raftquest-web/static/assets/data/catalog.json");
const GAME_CONFIG_JSON: &str = include_str!("../../../raftquest-web/static/assets/data/game.json");

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Content provider over the embedded catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedContent;

impl ContentProvider for EmbeddedContent {
    type Error = AssetError;

    fn load_catalog(&self) -> Result<ContentCatalog, Self::Error> {
        Ok(ContentCatalog::from_json(CATALOG_JSON)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        match config_name {
            constants::GAME_CONFIG_NAME => Ok(serde_json::from_str(GAME_CONFIG_JSON)?),
            _ => Err(AssetError::UnknownConfig(config_name.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryStorageError {
    #[error("storage offline")]
    Offline,
}

/// Shared in-memory snapshot storage. Clones see the same entries, so a
/// second session built from a clone behaves like a page reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    offline: Rc<Cell<bool>>,
}

impl MemoryStorage {
    /// Make every read and write fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn check_online(&self) -> Result<(), MemoryStorageError> {
        if self.offline.get() {
            Err(MemoryStorageError::Offline)
        } else {
            Ok(())
        }
    }
}

impl SnapshotStorage for MemoryStorage {
    type Error = MemoryStorageError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.check_online()?;
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check_online()?;
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.check_online()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Parsed content shared by every scenario iteration.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    pub catalog: ContentCatalog,
    pub config: GameConfig,
}

impl TesterAssets {
    /// Parse the embedded catalogue and config.
    ///
    /// # Errors
    ///
    /// Returns an error if either document fails to parse.
    pub fn load_default() -> Result<Self> {
        let content = EmbeddedContent;
        let catalog = content
            .load_catalog()
            .context("parsing embedded catalogue")?;
        let config = content
            .load_config(constants::GAME_CONFIG_NAME)
            .context("parsing embedded game config")?;
        Ok(Self { catalog, config })
    }

    /// Engine over fresh, empty storage.
    #[must_use]
    pub fn engine(&self) -> (GameEngine<EmbeddedContent, MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::default();
        (GameEngine::new(EmbeddedContent, storage.clone()), storage)
    }
}
