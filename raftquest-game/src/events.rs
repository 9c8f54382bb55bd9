//! Tagged progress transitions. Each variant is reducible on its own, which
//! keeps the transition set small and replayable.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::PIECES_PER_FUSION;
use crate::ids::{MissionId, RaftPieceId, StepId};
use crate::inventory::Inventory;
use crate::progression::ProgressionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StepCompleted {
        step: StepId,
    },
    MissionCompleted {
        mission: MissionId,
    },
    PieceAdded {
        piece: RaftPieceId,
    },
    PiecesFused {
        consumed: [RaftPieceId; PIECES_PER_FUSION],
        fused: RaftPieceId,
    },
}

impl ProgressEvent {
    /// Reduce this event into the stores. Returns whether anything changed.
    ///
    /// A `PiecesFused` event only applies when the fusion would mint the same
    /// composite id it recorded.
    pub fn apply(
        &self,
        progression: &mut ProgressionState,
        inventory: &mut Inventory,
        max_fused: u32,
    ) -> bool {
        match self {
            Self::StepCompleted { step } => progression.complete_step(step.clone()),
            Self::MissionCompleted { mission } => progression.complete_mission(mission.clone()),
            Self::PieceAdded { piece } => inventory.add_piece(piece.clone()),
            Self::PiecesFused { consumed, fused } => {
                if RaftPieceId::fused(inventory.fused_count + 1) != *fused {
                    return false;
                }
                inventory
                    .consume_pieces_for_fusion(consumed, max_fused)
                    .is_some()
            }
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StepCompleted { .. } => "step_completed",
            Self::MissionCompleted { .. } => "mission_completed",
            Self::PieceAdded { .. } => "piece_added",
            Self::PiecesFused { .. } => "pieces_fused",
        }
    }
}

/// Bounded log of the most recent events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<ProgressEvent>,
    limit: usize,
}

impl EventLog {
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(256)),
            limit,
        }
    }

    pub fn push(&mut self, event: ProgressEvent) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgressEvent> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ProgressEvent> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Replay events from empty stores.
#[must_use]
pub fn replay<'a>(
    events: impl IntoIterator<Item = &'a ProgressEvent>,
    max_fused: u32,
) -> (ProgressionState, Inventory) {
    let mut progression = ProgressionState::default();
    let mut inventory = Inventory::default();
    for event in events {
        event.apply(&mut progression, &mut inventory, max_fused);
    }
    (progression, inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: &str) -> RaftPieceId {
        RaftPieceId::from(id)
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ProgressEvent::StepCompleted {
            step: StepId::from("mission-1-step-1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "step_completed");
        assert_eq!(json["step"], "mission-1-step-1");
        let back: ProgressEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn replay_rebuilds_state() {
        let events = vec![
            ProgressEvent::StepCompleted {
                step: StepId::from("s1"),
            },
            ProgressEvent::PieceAdded { piece: piece("p1") },
            ProgressEvent::PieceAdded { piece: piece("p2") },
            ProgressEvent::PieceAdded { piece: piece("p3") },
            ProgressEvent::PiecesFused {
                consumed: [piece("p1"), piece("p2"), piece("p3")],
                fused: piece("fused-1"),
            },
            ProgressEvent::MissionCompleted {
                mission: MissionId::from("mission-1"),
            },
        ];
        let (progression, inventory) = replay(&events, 4);
        assert!(progression.is_step_completed("s1"));
        assert!(progression.is_mission_completed("mission-1"));
        assert!(inventory.collected_pieces.is_empty());
        assert_eq!(inventory.fused_pieces, vec![piece("fused-1")]);
    }

    #[test]
    fn mismatched_fusion_id_is_not_applied() {
        let mut progression = ProgressionState::default();
        let mut inventory = Inventory::default();
        for id in ["p1", "p2", "p3"] {
            inventory.add_piece(piece(id));
        }
        let event = ProgressEvent::PiecesFused {
            consumed: [piece("p1"), piece("p2"), piece("p3")],
            fused: piece("fused-2"),
        };
        assert!(!event.apply(&mut progression, &mut inventory, 4));
        assert_eq!(inventory.collected_pieces.len(), 3);
    }

    #[test]
    fn log_keeps_most_recent_entries() {
        let mut log = EventLog::with_limit(2);
        for id in ["a", "b", "c"] {
            log.push(ProgressEvent::PieceAdded { piece: piece(id) });
        }
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.iter().next(),
            Some(&ProgressEvent::PieceAdded { piece: piece("b") })
        );
        assert_eq!(log.last().map(ProgressEvent::label), Some("piece_added"));
    }
}
