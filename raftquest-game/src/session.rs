//! Session orchestration: binds the content catalogue, the config and the
//! persisted stores, and turns mini-game outcomes into progress events.
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};

use crate::SnapshotStorage;
use crate::config::GameConfig;
use crate::data::{ContentCatalog, Mission};
use crate::events::{EventLog, ProgressEvent};
use crate::flags::{HintUsage, UiFlags};
use crate::ids::{MissionId, RaftPieceId, StepId};
use crate::inventory::{FusionSlots, Inventory};
use crate::progression::{
    ProgressionError, ProgressionState, assert_mission_completable, get_current_step_index,
    get_mission_progress, get_next_step,
};
use crate::store::GameStores;

/// Signal emitted by a mini-game widget. The payload is opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum MiniGameOutcome {
    Succeeded(Option<serde_json::Value>),
    Failed,
}

impl MiniGameOutcome {
    #[must_use]
    pub const fn succeeded() -> Self {
        Self::Succeeded(None)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// What a recorded outcome changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: StepId,
    pub succeeded: bool,
    /// Whether this outcome completed the step for the first time.
    pub newly_completed: bool,
    pub next_step: Option<StepId>,
    /// Every step of the owning mission is now complete.
    pub mission_complete_ready: bool,
    /// Reward piece added by this outcome.
    pub piece: Option<RaftPieceId>,
}

impl StepReport {
    #[must_use]
    pub const fn failed(step: StepId) -> Self {
        Self {
            step,
            succeeded: false,
            newly_completed: false,
            next_step: None,
            mission_complete_ready: false,
            piece: None,
        }
    }
}

/// Where the UI should go once a display delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "id", rename_all = "snake_case")]
pub enum NavigationTarget {
    Step(StepId),
    MissionComplete(MissionId),
    Map,
}

/// Liveness handle for a mounted screen. Dropping or tearing it down
/// invalidates every [`DeferredNavigation`] scheduled from it.
#[derive(Debug, Default)]
pub struct ScreenHandle {
    alive: Rc<()>,
}

impl ScreenHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teardown(self) {}

    /// Schedule `target` to fire after `delay_ms`.
    #[must_use]
    pub fn defer(&self, target: NavigationTarget, delay_ms: u32) -> DeferredNavigation {
        DeferredNavigation {
            screen: Rc::downgrade(&self.alive),
            target,
            delay_ms,
        }
    }
}

/// One-shot navigation token. Firing it after its screen is gone yields nothing.
#[derive(Debug, Clone)]
pub struct DeferredNavigation {
    screen: Weak<()>,
    target: NavigationTarget,
    delay_ms: u32,
}

impl DeferredNavigation {
    #[must_use]
    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.screen.strong_count() > 0
    }

    #[must_use]
    pub fn fire(self) -> Option<NavigationTarget> {
        if self.is_live() {
            Some(self.target)
        } else {
            log::debug!("dropping navigation to {:?}: screen torn down", self.target);
            None
        }
    }
}

/// A player's running game.
pub struct GameSession<S: SnapshotStorage> {
    catalog: ContentCatalog,
    config: GameConfig,
    storage: S,
    stores: GameStores,
    log: EventLog,
}

impl<S: SnapshotStorage> GameSession<S> {
    /// Restore the stores from `storage` and initialize a first-run record.
    pub fn new(catalog: ContentCatalog, config: GameConfig, storage: S) -> Self {
        let mut stores = GameStores::load(&storage);
        if stores.inventory.get().fused_count > config.max_fused {
            log::warn!(
                "restored inventory exceeds the fusion cap ({} > {}); starting from a fresh record",
                stores.inventory.get().fused_count,
                config.max_fused
            );
            stores.inventory.clear(&storage);
        }
        let log = EventLog::with_limit(config.event_log_limit);
        let mut session = Self {
            catalog,
            config,
            storage,
            stores,
            log,
        };
        if !session.progression().initialized {
            session.initialize();
        }
        session
    }

    fn initialize(&mut self) {
        let first = self.catalog.missions.first().map(|m| {
            let step = m.steps.first().cloned();
            (m.id.clone(), step)
        });
        self.stores.progression.update(&self.storage, |p| {
            p.initialized = true;
            if let Some((mission, step)) = first {
                p.set_current_mission(Some(mission));
                p.set_current_step(step);
            }
        });
    }

    #[must_use]
    pub const fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn progression(&self) -> &ProgressionState {
        self.stores.progression.get()
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        self.stores.inventory.get()
    }

    #[must_use]
    pub const fn hints(&self) -> &HintUsage {
        self.stores.hints.get()
    }

    #[must_use]
    pub const fn ui_flags(&self) -> &UiFlags {
        self.stores.ui_flags.get()
    }

    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn mission(&self, id: &str) -> Result<&Mission, ProgressionError> {
        self.catalog
            .find_mission(id)
            .ok_or_else(|| ProgressionError::UnknownMission(MissionId::from(id)))
    }

    fn ensure_unlocked(&self, mission: &Mission) -> Result<(), ProgressionError> {
        if self.is_mission_unlocked(mission.id.as_str()) {
            Ok(())
        } else {
            Err(ProgressionError::MissionLocked(mission.id.clone()))
        }
    }

    /// Reduce one event into the stores, persist whichever record changed,
    /// and log it.
    fn apply(&mut self, event: ProgressEvent) -> bool {
        let mut progression = self.stores.progression.get().clone();
        let mut inventory = self.stores.inventory.get().clone();
        if !event.apply(&mut progression, &mut inventory, self.config.max_fused) {
            return false;
        }
        log::debug!("applied {event:?}");
        self.stores.progression.replace(&self.storage, progression);
        self.stores.inventory.replace(&self.storage, inventory);
        self.log.push(event);
        true
    }

    /// Make `id` the current mission and point at its first unfinished step.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::UnknownMission`] for ids not in the catalogue
    /// and [`ProgressionError::MissionLocked`] while its predecessor is unfinished.
    pub fn start_mission(&mut self, id: &str) -> Result<Option<StepId>, ProgressionError> {
        let mission = self.mission(id)?;
        self.ensure_unlocked(mission)?;
        let mission_id = mission.id.clone();
        let next = get_next_step(mission, &self.progression().completed_steps).cloned();
        let step = next.clone();
        self.stores.progression.update(&self.storage, |p| {
            p.set_current_mission(Some(mission_id));
            p.set_current_step(step);
        });
        Ok(next)
    }

    /// Apply a mini-game outcome for `step`.
    ///
    /// Success completes the step and advances the current step. The reward
    /// piece is granted only the first time a step of an unfinished mission
    /// is completed, so repeats never hand it out again, even after the
    /// piece was fused. Failure changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::UnknownStep`] when no mission owns `step`
    /// and [`ProgressionError::MissionLocked`] when its mission is locked.
    pub fn record_outcome(
        &mut self,
        step: &StepId,
        outcome: &MiniGameOutcome,
    ) -> Result<StepReport, ProgressionError> {
        let mission = self
            .catalog
            .mission_for_step(step.as_str())
            .cloned()
            .ok_or_else(|| ProgressionError::UnknownStep(step.clone()))?;
        self.ensure_unlocked(&mission)?;
        if !outcome.is_success() {
            log::debug!("{step} failed; nothing recorded");
            return Ok(StepReport::failed(step.clone()));
        }

        let mission_done = self.progression().is_mission_completed(mission.id.as_str());
        let newly_completed = self.apply(ProgressEvent::StepCompleted { step: step.clone() });
        let piece = if newly_completed && !mission_done {
            self.catalog
                .raft_piece_for_step(step.as_str())
                .filter(|piece| {
                    self.apply(ProgressEvent::PieceAdded {
                        piece: piece.clone(),
                    })
                })
        } else {
            None
        };

        let completed = &self.progression().completed_steps;
        let next_step = get_next_step(&mission, completed).cloned();
        let mission_complete_ready = next_step.is_none();
        let current = next_step.clone();
        self.stores.progression.update(&self.storage, |p| {
            p.set_current_mission(Some(mission.id.clone()));
            p.set_current_step(current);
        });

        Ok(StepReport {
            step: step.clone(),
            succeeded: true,
            newly_completed,
            next_step,
            mission_complete_ready,
            piece,
        })
    }

    /// Mark a mission complete once all its steps are done.
    ///
    /// Returns whether the mission was newly completed.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::UnknownMission`] or
    /// [`ProgressionError::MissionIncomplete`].
    pub fn complete_mission(&mut self, id: &str) -> Result<bool, ProgressionError> {
        let mission = self.mission(id)?;
        assert_mission_completable(mission, &self.progression().completed_steps)?;
        let mission = mission.id.clone();
        let newly = self.apply(ProgressEvent::MissionCompleted {
            mission: mission.clone(),
        });
        if newly {
            log::info!("mission {mission} completed");
        }
        Ok(newly)
    }

    /// Fuse whatever is staged in `slots`. Slots empty only on success.
    pub fn commit_fusion(&mut self, slots: &mut FusionSlots) -> Option<RaftPieceId> {
        let consumed = slots.pieces()?;
        if !self.inventory().can_fuse(&consumed, self.config.max_fused) {
            log::debug!("staged fusion {consumed:?} rejected");
            return None;
        }
        let fused = RaftPieceId::fused(self.inventory().fused_count + 1);
        let event = ProgressEvent::PiecesFused {
            consumed,
            fused: fused.clone(),
        };
        if !self.apply(event) {
            return None;
        }
        slots.clear_all();
        Some(fused)
    }

    /// Forget a completed mission's steps so it can be played again.
    /// The mission stays completed and earned pieces are kept. A mission still
    /// in progress is resumed instead, since its rewards may already be fused.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::UnknownMission`] for ids not in the catalogue
    /// and [`ProgressionError::MissionLocked`] for locked missions.
    pub fn replay_mission(&mut self, id: &str) -> Result<Option<StepId>, ProgressionError> {
        let mission = self.mission(id)?.clone();
        if !self.progression().is_mission_completed(mission.id.as_str()) {
            return self.start_mission(id);
        }
        let first = mission.steps.first().cloned();
        let current = first.clone();
        self.stores.progression.update(&self.storage, |p| {
            p.reset_mission_steps(&mission.steps);
            p.set_current_mission(Some(mission.id.clone()));
            p.set_current_step(current);
        });
        Ok(first)
    }

    /// Wipe every store and start over.
    pub fn reset_all(&mut self) {
        let storage = &self.storage;
        self.stores.progression.update(storage, ProgressionState::reset);
        self.stores.inventory.clear(storage);
        self.stores.hints.clear(storage);
        self.stores.ui_flags.clear(storage);
        self.log.clear();
        self.initialize();
        log::info!("all progress reset");
    }

    pub fn mark_hint_as_used(&mut self, step: &StepId) -> bool {
        let step = step.clone();
        self.stores
            .hints
            .update(&self.storage, |h| h.mark_hint_as_used(step))
    }

    pub fn mark_mission_as_viewed(&mut self, mission: &MissionId) -> bool {
        let mission = mission.clone();
        self.stores
            .ui_flags
            .update(&self.storage, |f| f.mark_mission_as_viewed(mission))
    }

    pub fn mark_raft_as_viewed(&mut self) {
        self.stores
            .ui_flags
            .update(&self.storage, UiFlags::mark_raft_as_viewed);
    }

    pub fn mark_journal_as_viewed(&mut self) {
        self.stores
            .ui_flags
            .update(&self.storage, UiFlags::mark_journal_as_viewed);
    }

    /// Record that the completion celebration for the newest finished mission was shown.
    pub fn acknowledge_latest_completion(&mut self) {
        let latest = self.latest_completed_mission();
        self.stores
            .ui_flags
            .update(&self.storage, |f| f.set_last_viewed_completed_mission(latest));
    }

    /// Last mission in catalogue order that is completed.
    #[must_use]
    pub fn latest_completed_mission(&self) -> Option<MissionId> {
        self.catalog
            .missions
            .iter()
            .rev()
            .find(|m| self.progression().is_mission_completed(m.id.as_str()))
            .map(|m| m.id.clone())
    }

    #[must_use]
    pub fn has_unseen_completion(&self) -> bool {
        self.ui_flags()
            .has_unseen_completion(self.latest_completed_mission().as_ref())
    }

    #[must_use]
    pub fn is_mission_unlocked(&self, id: &str) -> bool {
        self.catalog
            .is_mission_unlocked(id, &self.progression().completed_missions)
    }

    #[must_use]
    pub fn mission_progress(&self, id: &str) -> Option<f64> {
        let mission = self.catalog.find_mission(id)?;
        Some(get_mission_progress(
            mission,
            &self.progression().completed_steps,
        ))
    }

    /// Zero-based position of the current step in the current mission.
    #[must_use]
    pub fn current_step_index(&self) -> Option<usize> {
        let progression = self.progression();
        let mission = self
            .catalog
            .find_mission(progression.current_mission_id.as_ref()?.as_str())?;
        get_current_step_index(mission, progression.current_step_id.as_ref()?.as_str())
    }

    #[must_use]
    pub fn get_raft_piece_for_step(&self, step: &str) -> Option<RaftPieceId> {
        self.catalog.raft_piece_for_step(step)
    }

    #[must_use]
    pub fn raft_progress(&self) -> f64 {
        self.inventory().get_progress(self.config.total_pieces)
    }

    #[must_use]
    pub fn is_raft_complete(&self) -> bool {
        self.inventory().is_raft_complete(self.config.total_pieces)
    }

    /// Navigation to show after a step report, delayed so the result can be read.
    #[must_use]
    pub fn navigation_after(
        &self,
        screen: &ScreenHandle,
        report: &StepReport,
    ) -> DeferredNavigation {
        let target = match (&report.next_step, report.mission_complete_ready) {
            (_, true) => self
                .catalog
                .mission_for_step(report.step.as_str())
                .map_or(NavigationTarget::Map, |m| {
                    NavigationTarget::MissionComplete(m.id.clone())
                }),
            (Some(next), false) => NavigationTarget::Step(next.clone()),
            (None, false) => NavigationTarget::Map,
        };
        screen.defer(target, self.config.navigation_delay_ms)
    }
}
