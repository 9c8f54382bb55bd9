//! Game-wide tunables loaded alongside content.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DRAG_ACTIVATION_DISTANCE, DEFAULT_EVENT_LOG_LIMIT, DEFAULT_KEYBOARD_STEP,
    DEFAULT_MAX_FUSED, DEFAULT_NAVIGATION_DELAY_MS, DEFAULT_TOTAL_PIECES,
};

const fn default_max_fused() -> u32 {
    DEFAULT_MAX_FUSED
}

const fn default_total_pieces() -> u32 {
    DEFAULT_TOTAL_PIECES
}

const fn default_drag_activation_distance() -> f64 {
    DEFAULT_DRAG_ACTIVATION_DISTANCE
}

const fn default_keyboard_step() -> f64 {
    DEFAULT_KEYBOARD_STEP
}

const fn default_navigation_delay_ms() -> u32 {
    DEFAULT_NAVIGATION_DELAY_MS
}

const fn default_event_log_limit() -> usize {
    DEFAULT_EVENT_LOG_LIMIT
}

/// Tunables shared by the stores, the drag controller and the session.
/// Every field falls back to its default when missing from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Maximum number of composite pieces a player can fuse.
    #[serde(default = "default_max_fused")]
    pub max_fused: u32,
    /// Atomic pieces needed for a complete raft.
    #[serde(default = "default_total_pieces")]
    pub total_pieces: u32,
    #[serde(default = "default_drag_activation_distance")]
    pub drag_activation_distance: f64,
    #[serde(default = "default_keyboard_step")]
    pub keyboard_step: f64,
    #[serde(default = "default_navigation_delay_ms")]
    pub navigation_delay_ms: u32,
    /// Number of recent progress events retained by a session.
    #[serde(default = "default_event_log_limit")]
    pub event_log_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_fused: DEFAULT_MAX_FUSED,
            total_pieces: DEFAULT_TOTAL_PIECES,
            drag_activation_distance: DEFAULT_DRAG_ACTIVATION_DISTANCE,
            keyboard_step: DEFAULT_KEYBOARD_STEP,
            navigation_delay_ms: DEFAULT_NAVIGATION_DELAY_MS,
            event_log_limit: DEFAULT_EVENT_LOG_LIMIT,
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
