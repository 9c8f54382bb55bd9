//! Web-specific game engine implementation
//!
//! This module provides browser implementations of the raftquest-game traits
//! and re-exports the core game logic types.

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

// Re-export all types from raftquest-game
pub use raftquest_game::*;

use crate::dom;

const CATALOG_JSON: &str = include_str!("../static/assets/data/catalog.json");
const GAME_CONFIG_JSON: &str = include_str!("../static/assets/data/game.json");

static CATALOG: OnceCell<ContentCatalog> = OnceCell::new();

/// Content provider backed by the catalogue embedded at build time
#[derive(Debug, Clone, Copy, Default)]
pub struct WebContentLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Unknown config: {0}")]
    UnknownConfig(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentProvider for WebContentLoader {
    type Error = WebDataError;

    fn load_catalog(&self) -> Result<ContentCatalog, Self::Error> {
        CATALOG
            .get_or_try_init(|| ContentCatalog::from_json(CATALOG_JSON))
            .cloned()
            .map_err(WebDataError::Json)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match config_name {
            constants::GAME_CONFIG_NAME => GAME_CONFIG_JSON,
            _ => return Err(WebDataError::UnknownConfig(config_name.to_string())),
        };
        serde_json::from_str(json).map_err(WebDataError::Json)
    }
}

/// Snapshot storage using `localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSnapshotStorage;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebStorageError {
    fn from_js(value: &wasm_bindgen::JsValue) -> Self {
        Self::Storage(dom::js_error_message(value))
    }
}

impl SnapshotStorage for WebSnapshotStorage {
    type Error = WebStorageError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage.get_item(key).map_err(|e| WebStorageError::from_js(&e))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage
            .set_item(key, value)
            .map_err(|e| WebStorageError::from_js(&e))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| WebStorageError::from_js(&e))?;
        storage
            .remove_item(key)
            .map_err(|e| WebStorageError::from_js(&e))
    }
}

/// Create a web-compatible game engine with `WebContentLoader` and `WebSnapshotStorage`
#[must_use]
pub fn create_web_game_engine() -> GameEngine<WebContentLoader, WebSnapshotStorage> {
    GameEngine::new(WebContentLoader, WebSnapshotStorage)
}
