//! Mission and step content supplied by the content provider.
use serde::{Deserialize, Serialize};

use crate::hit_test::{BackgroundImage, HintZone};
use crate::id_set::IdSet;
use crate::ids::{MissionId, RaftPieceId, StepId};

/// An ordered sequence of steps. Step order defines progression and numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    #[serde(default)]
    pub steps: Vec<StepId>,
}

impl Mission {
    #[must_use]
    pub fn new(id: impl Into<MissionId>, steps: impl IntoIterator<Item = StepId>) -> Self {
        Self {
            id: id.into(),
            steps: steps.into_iter().collect(),
        }
    }
}

/// Which mini-game widget hosts a step. The core only reacts to its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Quiz,
    Ordering,
    HintSearch,
    Fusion,
    #[default]
    #[serde(other)]
    Other,
}

/// Per-step content the core needs: the reward and the hint geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepContent {
    pub id: StepId,
    #[serde(default)]
    pub kind: StepKind,
    #[serde(default)]
    pub reward_piece: Option<RaftPieceId>,
    #[serde(default)]
    pub background: Option<BackgroundImage>,
    #[serde(default)]
    pub hint_zones: Vec<HintZone>,
}

/// Container for all mission content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentCatalog {
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub steps: Vec<StepContent>,
}

impl ContentCatalog {
    /// Create an empty catalogue (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalogue from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a catalogue.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn find_mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id.as_str() == id)
    }

    #[must_use]
    pub fn find_step(&self, id: &str) -> Option<&StepContent> {
        self.steps.iter().find(|s| s.id.as_str() == id)
    }

    /// The mission whose step list contains `step`.
    #[must_use]
    pub fn mission_for_step(&self, step: &str) -> Option<&Mission> {
        self.missions
            .iter()
            .find(|m| m.steps.iter().any(|s| s.as_str() == step))
    }

    /// Reward piece for a step; unknown steps and steps without rewards yield `None`.
    #[must_use]
    pub fn raft_piece_for_step(&self, step: &str) -> Option<RaftPieceId> {
        self.find_step(step).and_then(|s| s.reward_piece.clone())
    }

    /// Number of distinct atomic rewards the catalogue hands out.
    #[must_use]
    pub fn total_reward_pieces(&self) -> usize {
        self.steps
            .iter()
            .filter_map(|s| s.reward_piece.as_ref())
            .collect::<IdSet<_>>()
            .len()
    }

    /// Missions unlock in catalogue order: the first is always open, later ones
    /// open once their predecessor is completed.
    #[must_use]
    pub fn is_mission_unlocked(&self, id: &str, completed: &IdSet<MissionId>) -> bool {
        let Some(position) = self.missions.iter().position(|m| m.id.as_str() == id) else {
            return false;
        };
        position == 0 || completed.contains(self.missions[position - 1].id.as_str())
    }

    /// The mission following `id` in catalogue order.
    #[must_use]
    pub fn next_mission(&self, id: &str) -> Option<&Mission> {
        let position = self.missions.iter().position(|m| m.id.as_str() == id)?;
        self.missions.get(position + 1)
    }
}
