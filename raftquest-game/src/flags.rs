//! One-shot UI state: hints already used and "new" badge suppression.
use serde::{Deserialize, Serialize};

use crate::id_set::IdSet;
use crate::ids::{MissionId, StepId};

/// Steps whose hint has been revealed. Entries only disappear on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintUsage {
    #[serde(default)]
    pub used_hints: IdSet<StepId>,
}

impl HintUsage {
    pub fn mark_hint_as_used(&mut self, step: StepId) -> bool {
        self.used_hints.insert(step)
    }

    #[must_use]
    pub fn is_hint_used(&self, step: &str) -> bool {
        self.used_hints.contains(step)
    }

    pub fn reset(&mut self) {
        self.used_hints.clear();
    }
}

/// Cosmetic flags; nothing in the game logic depends on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFlags {
    #[serde(default)]
    pub viewed_missions: IdSet<MissionId>,
    #[serde(default)]
    pub raft_viewed: bool,
    #[serde(default)]
    pub journal_viewed: bool,
    #[serde(default)]
    pub last_viewed_completed_mission: Option<MissionId>,
}

impl UiFlags {
    pub fn mark_mission_as_viewed(&mut self, mission: MissionId) -> bool {
        self.viewed_missions.insert(mission)
    }

    pub fn mark_raft_as_viewed(&mut self) {
        self.raft_viewed = true;
    }

    pub fn mark_journal_as_viewed(&mut self) {
        self.journal_viewed = true;
    }

    pub fn set_last_viewed_completed_mission(&mut self, mission: Option<MissionId>) {
        self.last_viewed_completed_mission = mission;
    }

    #[must_use]
    pub fn is_mission_viewed(&self, mission: &str) -> bool {
        self.viewed_missions.contains(mission)
    }

    /// Badge query: a completed mission exists that the player has not seen
    /// celebrated yet.
    #[must_use]
    pub fn has_unseen_completion(&self, latest_completed: Option<&MissionId>) -> bool {
        latest_completed
            .is_some_and(|latest| self.last_viewed_completed_mission.as_ref() != Some(latest))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
