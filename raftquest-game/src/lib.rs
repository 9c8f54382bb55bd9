//! RaftQuest Game Engine
//!
//! Platform-agnostic progression core for the RaftQuest puzzle adventure:
//! step and mission progression, the raft piece inventory with fusion, and
//! pointer resolution under forced-landscape rotation. No UI or platform
//! dependencies.

pub mod config;
pub mod constants;
pub mod data;
pub mod drag;
pub mod events;
pub mod flags;
pub mod geometry;
pub mod id_set;
pub mod ids;
pub mod inventory;
pub mod numbers;
pub mod progression;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::GameConfig;
pub use data::{ContentCatalog, Mission, StepContent, StepKind};
pub use drag::{DragController, DragEvent, DragGestureState, KeyCommand};
pub use events::{EventLog, ProgressEvent};
pub use flags::{HintUsage, UiFlags};
pub use geometry::{
    Orientation, Point, Rect, Viewport, is_rotation_active, to_physical_point, to_physical_rect,
    to_visual_point, to_visual_rect,
};
pub use hit_test::{
    BackgroundImage, DropCandidate, Frame, HintZone, ImageFit, resolve_drop_target,
    resolve_hint_zone,
};
pub use id_set::IdSet;
pub use ids::{DragItemId, MissionId, RaftPieceId, StepId, TargetId};
pub use inventory::{FusionSlots, Inventory};
pub use progression::{
    ProgressionError, ProgressionState, assert_mission_completable, get_current_step_index,
    get_mission_progress, get_next_step, is_mission_completed,
};
pub use session::{
    DeferredNavigation, GameSession, MiniGameOutcome, NavigationTarget, ScreenHandle, StepReport,
};
pub use store::{GameStores, PersistedStore, SnapshotRecord, StoreError};

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mission catalogue
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogue cannot be loaded.
    fn load_catalog(&self) -> Result<ContentCatalog, Self::Error>;

    /// Load a named configuration document
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Key-value transport for store snapshots
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the snapshot stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a snapshot under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove the snapshot under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Main engine: binds a content provider to a snapshot storage backend
pub struct GameEngine<C, S>
where
    C: ContentProvider,
    S: SnapshotStorage + Clone,
{
    content: C,
    storage: S,
}

impl<C, S> GameEngine<C, S>
where
    C: ContentProvider,
    S: SnapshotStorage + Clone,
{
    /// Create a new engine with the provided content provider and storage
    pub const fn new(content: C, storage: S) -> Self {
        Self { content, storage }
    }

    /// Game tunables, or the defaults when the `game` document is unavailable.
    pub fn load_config(&self) -> GameConfig {
        self.content
            .load_config::<GameConfig>(constants::GAME_CONFIG_NAME)
            .unwrap_or_else(|err| {
                log::warn!("game config unavailable ({err}); using defaults");
                GameConfig::default()
            })
    }

    /// Restore (or start) the player's session.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogue cannot be loaded.
    pub fn create_session(&self) -> Result<GameSession<S>, C::Error> {
        let catalog = self.content.load_catalog()?;
        Ok(GameSession::new(
            catalog,
            self.load_config(),
            self.storage.clone(),
        ))
    }

    /// Export every persisted record as one JSON document, keyed by store.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or a snapshot is corrupt.
    pub fn export_snapshots(&self) -> Result<serde_json::Value, anyhow::Error> {
        let mut out = serde_json::Map::new();
        for key in constants::STORE_KEYS {
            let Some(raw) = self.storage.read(key)? else {
                continue;
            };
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|source| anyhow::anyhow!("snapshot {key} is corrupt: {source}"))?;
            out.insert(key.to_string(), value);
        }
        Ok(serde_json::Value::Object(out))
    }
}
