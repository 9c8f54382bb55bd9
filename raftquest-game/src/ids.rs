//! Opaque identifiers for steps, missions and raft pieces.
//!
//! Identifiers follow a structural naming convention (`mission-<n>`,
//! `<mission>-step-<n>`, `piece-<mission>-<n>`, `fused-<k>`) but are never
//! parsed beyond prefix checks.
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const FUSED_PREFIX: &str = "fused-";
const PIECE_PREFIX: &str = "piece-";
const MISSION_PREFIX: &str = "mission-";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a single step, e.g. `mission-1-step-2`.
    StepId
);
string_id!(
    /// Identifier of a mission, e.g. `mission-3`.
    MissionId
);
string_id!(
    /// Identifier of an atomic (`piece-…`) or composite (`fused-…`) raft piece.
    RaftPieceId
);
string_id!(
    /// Identifier of a draggable element.
    DragItemId
);
string_id!(
    /// Identifier of a drop target such as a fusion slot.
    TargetId
);

impl MissionId {
    /// Whether the id follows the `mission-<n>` convention.
    #[must_use]
    pub fn is_conventional(&self) -> bool {
        self.0.starts_with(MISSION_PREFIX)
    }
}

impl StepId {
    /// Whether this step id is namespaced under the given mission.
    #[must_use]
    pub fn belongs_to(&self, mission: &MissionId) -> bool {
        self.0
            .strip_prefix(mission.as_str())
            .is_some_and(|rest| rest.starts_with("-step-"))
    }
}

impl RaftPieceId {
    /// Mint the composite id for the `k`-th fusion (1-based).
    #[must_use]
    pub fn fused(k: u32) -> Self {
        Self(format!("{FUSED_PREFIX}{k}"))
    }

    /// Composite piece produced by a fusion.
    #[must_use]
    pub fn is_fused(&self) -> bool {
        self.0.starts_with(FUSED_PREFIX)
    }

    /// Atomic piece rewarded by a step.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        self.0.starts_with(PIECE_PREFIX)
    }
}
