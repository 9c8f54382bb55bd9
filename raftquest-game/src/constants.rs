//! Centralized tuning constants and storage keys for the RaftQuest core.
//!
//! Defaults for [`crate::config::GameConfig`] live here so content JSON can
//! override them while code review still sees the baseline values.

// Fusion -----------------------------------------------------------------
/// Number of atomic pieces consumed by one fusion.
pub const PIECES_PER_FUSION: usize = 3;
/// Default cap on composite pieces (one per mission in the stock catalogue).
pub const DEFAULT_MAX_FUSED: u32 = 4;
/// Default number of atomic pieces the full raft requires.
pub const DEFAULT_TOTAL_PIECES: u32 = 12;

// Input ------------------------------------------------------------------
/// Pointer travel, in device-independent pixels, before a press becomes a drag.
pub const DEFAULT_DRAG_ACTIVATION_DISTANCE: f64 = 8.0;
/// Distance a keyboard-carried item moves per arrow key press.
pub const DEFAULT_KEYBOARD_STEP: f64 = 16.0;

// Timing -----------------------------------------------------------------
/// Display delay before automatically navigating away from a finished step.
pub const DEFAULT_NAVIGATION_DELAY_MS: u32 = 1_500;

// Events -----------------------------------------------------------------
pub const DEFAULT_EVENT_LOG_LIMIT: usize = 64;

// Geometry ---------------------------------------------------------------
/// Tolerance used when comparing transformed coordinates.
pub const GEOMETRY_EPSILON: f64 = 1e-6;

// Persistence keys -------------------------------------------------------
pub const STORE_KEY_PROGRESSION: &str = "raftquest.progression";
pub const STORE_KEY_INVENTORY: &str = "raftquest.inventory";
pub const STORE_KEY_HINTS: &str = "raftquest.hints";
pub const STORE_KEY_UI_FLAGS: &str = "raftquest.ui-flags";
/// Every persisted store key, in export order.
pub const STORE_KEYS: [&str; 4] = [
    STORE_KEY_PROGRESSION,
    STORE_KEY_INVENTORY,
    STORE_KEY_HINTS,
    STORE_KEY_UI_FLAGS,
];

// Content ----------------------------------------------------------------
/// Config document name requested from the content provider.
pub const GAME_CONFIG_NAME: &str = "game";
