//! Step and mission progression: the persisted record and the pure queries
//! derived from it.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Mission;
use crate::id_set::IdSet;
use crate::ids::{MissionId, StepId};
use crate::numbers::percentage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("mission {mission} still has {} incomplete step(s): {}", .missing.len(), join_ids(.missing))]
    MissionIncomplete {
        mission: MissionId,
        missing: Vec<StepId>,
    },
    #[error("mission {0} is locked until the previous mission is completed")]
    MissionLocked(MissionId),
    #[error("unknown mission {0}")]
    UnknownMission(MissionId),
    #[error("unknown step {0}")]
    UnknownStep(StepId),
}

fn join_ids(ids: &[StepId]) -> String {
    ids.iter()
        .map(StepId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether every step of `mission` has been completed. Empty missions are
/// vacuously complete.
#[must_use]
pub fn is_mission_completed(mission: &Mission, completed_steps: &IdSet<StepId>) -> bool {
    mission.steps.iter().all(|s| completed_steps.contains(s))
}

/// First step in authoring order that is not completed yet.
/// Completed ids belonging to other missions are irrelevant.
#[must_use]
pub fn get_next_step<'a>(
    mission: &'a Mission,
    completed_steps: &IdSet<StepId>,
) -> Option<&'a StepId> {
    mission.steps.iter().find(|s| !completed_steps.contains(*s))
}

/// Position of `step` within the mission, used for "step 2 of 5" numbering.
#[must_use]
pub fn get_current_step_index(mission: &Mission, step: &str) -> Option<usize> {
    mission.steps.iter().position(|s| s.as_str() == step)
}

/// Share of the mission's steps that are completed, `0..=100`.
#[must_use]
pub fn get_mission_progress(mission: &Mission, completed_steps: &IdSet<StepId>) -> f64 {
    let done = mission
        .steps
        .iter()
        .filter(|s| completed_steps.contains(*s))
        .count();
    percentage(done, mission.steps.len())
}

/// Check that `mission` may be marked complete.
///
/// # Errors
///
/// Returns [`ProgressionError::MissionIncomplete`] listing the missing steps.
pub fn assert_mission_completable(
    mission: &Mission,
    completed_steps: &IdSet<StepId>,
) -> Result<(), ProgressionError> {
    let missing: Vec<StepId> = mission
        .steps
        .iter()
        .filter(|s| !completed_steps.contains(*s))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProgressionError::MissionIncomplete {
            mission: mission.id.clone(),
            missing,
        })
    }
}

/// Persisted progression record.
///
/// Mutators are idempotent. `complete_mission` trusts its caller; use
/// [`assert_mission_completable`] first (the session does).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    #[serde(default)]
    pub current_mission_id: Option<MissionId>,
    #[serde(default)]
    pub current_step_id: Option<StepId>,
    #[serde(default)]
    pub completed_steps: IdSet<StepId>,
    #[serde(default)]
    pub completed_missions: IdSet<MissionId>,
    #[serde(default)]
    pub initialized: bool,
}

impl ProgressionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the step was newly completed.
    pub fn complete_step(&mut self, id: StepId) -> bool {
        self.completed_steps.insert(id)
    }

    /// Returns `true` when the mission was newly completed.
    pub fn complete_mission(&mut self, id: MissionId) -> bool {
        self.completed_missions.insert(id)
    }

    #[must_use]
    pub fn is_step_completed(&self, id: &str) -> bool {
        self.completed_steps.contains(id)
    }

    #[must_use]
    pub fn is_mission_completed(&self, id: &str) -> bool {
        self.completed_missions.contains(id)
    }

    pub fn set_current_mission(&mut self, id: Option<MissionId>) {
        self.current_mission_id = id;
    }

    pub fn set_current_step(&mut self, id: Option<StepId>) {
        self.current_step_id = id;
    }

    /// Forget exactly these steps so a finished mission can be replayed.
    /// Other missions' progress and the completed-missions set are untouched.
    pub fn reset_mission_steps<'a>(&mut self, steps: impl IntoIterator<Item = &'a StepId>) {
        for step in steps {
            self.completed_steps.remove(step);
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            initialized: true,
            ..Self::default()
        };
    }
}
