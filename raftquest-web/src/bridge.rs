//! JavaScript-facing handle over a game session.
//!
//! Widgets call in with plain values; results come back as serde-serialized
//! objects so the page never mirrors Rust types by hand.
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::game::{
    DragController, DragEvent, DragItemId, DropCandidate, FusionSlots, GameSession, KeyCommand,
    MiniGameOutcome, MissionId, Point, RaftPieceId, ScreenHandle, StepId, TargetId, Viewport,
    WebSnapshotStorage, create_web_game_engine, is_rotation_active, resolve_hint_zone,
};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from(js_sys::Error::new(&err.to_string()))
}

/// Current viewport and whether the forced-landscape rotation applies.
fn rotation_context() -> (Viewport, bool) {
    let viewport = dom::viewport().unwrap_or_default();
    let rotated = dom::orientation().is_some_and(is_rotation_active);
    (viewport, rotated)
}

#[wasm_bindgen]
pub struct RaftQuest {
    session: GameSession<WebSnapshotStorage>,
    slots: FusionSlots,
    screen: Option<ScreenHandle>,
}

#[wasm_bindgen]
impl RaftQuest {
    /// Restore the saved game from `localStorage`.
    ///
    /// # Errors
    /// Returns an error if the embedded catalogue does not parse.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        let session = create_web_game_engine().create_session().map_err(js_err)?;
        Ok(Self {
            session,
            slots: FusionSlots::new(),
            screen: None,
        })
    }

    /// Snapshot of progression, inventory and flags for rendering.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&serde_json::json!({
            "progression": self.session.progression(),
            "inventory": self.session.inventory(),
            "hints": self.session.hints(),
            "ui_flags": self.session.ui_flags(),
            "raft_progress": self.session.raft_progress(),
            "raft_complete": self.session.is_raft_complete(),
            "unseen_completion": self.session.has_unseen_completion(),
        }))
    }

    /// Mark a screen as mounted; navigation scheduled from an earlier screen
    /// is invalidated.
    #[wasm_bindgen(js_name = enterScreen)]
    pub fn enter_screen(&mut self) {
        self.screen = Some(ScreenHandle::new());
    }

    #[wasm_bindgen(js_name = leaveScreen)]
    pub fn leave_screen(&mut self) {
        if let Some(screen) = self.screen.take() {
            screen.teardown();
        }
    }

    #[wasm_bindgen(js_name = startMission)]
    pub fn start_mission(&mut self, mission: &str) -> Result<Option<String>, JsValue> {
        let step = self.session.start_mission(mission).map_err(js_err)?;
        Ok(step.map(String::from))
    }

    /// Feed a mini-game result. `on_navigate` receives the follow-up
    /// navigation target after the configured display delay.
    ///
    /// # Errors
    /// Returns an error for unknown steps or when the timer cannot be scheduled.
    #[wasm_bindgen(js_name = recordOutcome)]
    pub fn record_outcome(
        &mut self,
        step: &str,
        succeeded: bool,
        payload: JsValue,
        on_navigate: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let outcome = if succeeded {
            let payload = serde_wasm_bindgen::from_value(payload).ok();
            MiniGameOutcome::Succeeded(payload)
        } else {
            MiniGameOutcome::Failed
        };
        let report = self
            .session
            .record_outcome(&StepId::from(step), &outcome)
            .map_err(js_err)?;
        let screen = self.screen.as_ref().filter(|_| report.succeeded);
        if let (Some(callback), Some(screen)) = (on_navigate, screen) {
            let navigation = self.session.navigation_after(screen, &report);
            dom::schedule_navigation(navigation, move |target| {
                let Ok(value) = serde_wasm_bindgen::to_value(&target) else {
                    return;
                };
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    dom::console_error(&format!(
                        "navigation callback failed: {}",
                        dom::js_error_message(&err)
                    ));
                }
            })?;
        }
        to_js(&report)
    }

    #[wasm_bindgen(js_name = completeMission)]
    pub fn complete_mission(&mut self, mission: &str) -> Result<bool, JsValue> {
        self.session.complete_mission(mission).map_err(js_err)
    }

    #[wasm_bindgen(js_name = replayMission)]
    pub fn replay_mission(&mut self, mission: &str) -> Result<Option<String>, JsValue> {
        let step = self.session.replay_mission(mission).map_err(js_err)?;
        Ok(step.map(String::from))
    }

    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&mut self) {
        self.slots.clear_all();
        self.session.reset_all();
    }

    #[wasm_bindgen(js_name = placeInSlot)]
    pub fn place_in_slot(&mut self, slot: usize, piece: &str) -> bool {
        self.session.inventory().has_piece(piece)
            && self.slots.place(slot, RaftPieceId::from(piece))
    }

    #[wasm_bindgen(js_name = clearSlot)]
    pub fn clear_slot(&mut self, slot: usize) -> Option<String> {
        self.slots.clear(slot).map(String::from)
    }

    /// Fuse the staged pieces, returning the new composite id.
    #[wasm_bindgen(js_name = commitFusion)]
    pub fn commit_fusion(&mut self) -> Option<String> {
        self.session.commit_fusion(&mut self.slots).map(String::from)
    }

    #[wasm_bindgen(js_name = markHintUsed)]
    pub fn mark_hint_used(&mut self, step: &str) -> bool {
        self.session.mark_hint_as_used(&StepId::from(step))
    }

    #[wasm_bindgen(js_name = markMissionViewed)]
    pub fn mark_mission_viewed(&mut self, mission: &str) -> bool {
        self.session.mark_mission_as_viewed(&MissionId::from(mission))
    }

    #[wasm_bindgen(js_name = markRaftViewed)]
    pub fn mark_raft_viewed(&mut self) {
        self.session.mark_raft_as_viewed();
    }

    #[wasm_bindgen(js_name = markJournalViewed)]
    pub fn mark_journal_viewed(&mut self) {
        self.session.mark_journal_as_viewed();
    }

    #[wasm_bindgen(js_name = acknowledgeCompletion)]
    pub fn acknowledge_completion(&mut self) {
        self.session.acknowledge_latest_completion();
    }

    /// Hint zone under a click on a step's background container.
    /// `click_x`/`click_y` are relative to the container's top-left corner.
    #[wasm_bindgen(js_name = hintZoneAt)]
    pub fn hint_zone_at(
        &self,
        step: &str,
        container: &web_sys::Element,
        click_x: f64,
        click_y: f64,
    ) -> Option<String> {
        let content = self.session.catalog().find_step(step)?;
        let image = content.background.as_ref()?;
        let (_, rotated) = rotation_context();
        resolve_hint_zone(
            Point::new(click_x, click_y),
            dom::element_rect(container),
            image,
            &content.hint_zones,
            rotated,
        )
        .map(|zone| zone.id.clone())
    }
}

fn drag_event_to_js(event: Option<DragEvent>) -> Result<JsValue, JsValue> {
    event.map_or(Ok(JsValue::NULL), |event| to_js(&event))
}

/// Drag handle for one screen.
///
/// The page forwards raw pointer coordinates (`clientX`/`clientY`) and
/// `KeyboardEvent.key` values; every method returns the resulting drag event
/// as a `{ type, ... }` object, or `null` when nothing happened.
#[wasm_bindgen]
pub struct RaftDrag {
    controller: DragController,
    elements: Vec<(TargetId, web_sys::Element)>,
}

#[wasm_bindgen]
impl RaftDrag {
    #[wasm_bindgen(constructor)]
    pub fn new(game: &RaftQuest) -> Self {
        let (viewport, rotated) = rotation_context();
        Self {
            controller: DragController::new(game.session.config(), viewport, rotated),
            elements: Vec::new(),
        }
    }

    /// Register a DOM drop target. Its rect is re-measured whenever a
    /// gesture starts.
    #[wasm_bindgen(js_name = registerTarget)]
    pub fn register_target(&mut self, id: &str, element: &web_sys::Element, disabled: bool) {
        let candidate = DropCandidate::new(id, dom::element_rect(element)).disabled(disabled);
        self.controller.register_target(candidate);
        self.elements.retain(|(existing, _)| existing.as_str() != id);
        self.elements.push((TargetId::from(id), element.clone()));
    }

    /// Register a target from a `{ id, rect, frame?, disabled? }` object, for
    /// zones authored in the visual frame rather than measured from the DOM.
    ///
    /// # Errors
    /// Returns an error if `candidate` does not deserialize.
    #[wasm_bindgen(js_name = registerZone)]
    pub fn register_zone(&mut self, candidate: JsValue) -> Result<(), JsValue> {
        let candidate: DropCandidate =
            serde_wasm_bindgen::from_value(candidate).map_err(js_err)?;
        self.elements.retain(|(existing, _)| *existing != candidate.id);
        self.controller.register_target(candidate);
        Ok(())
    }

    #[wasm_bindgen(js_name = unregisterTarget)]
    pub fn unregister_target(&mut self, id: &str) -> bool {
        self.elements.retain(|(existing, _)| existing.as_str() != id);
        self.controller.unregister_target(id)
    }

    #[wasm_bindgen(js_name = setTargetDisabled)]
    pub fn set_target_disabled(&mut self, id: &str, disabled: bool) -> bool {
        self.controller.set_target_disabled(id, disabled)
    }

    /// Id of the item being dragged, if a drag is active.
    #[wasm_bindgen(js_name = activeItem)]
    pub fn active_item(&self) -> Option<String> {
        self.controller.active_item().map(ToString::to_string)
    }

    /// # Errors
    /// Returns an error if the replaced gesture's event cannot be serialized.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        item: &str,
        element: &web_sys::Element,
        x: f64,
        y: f64,
    ) -> Result<JsValue, JsValue> {
        self.refresh_layout();
        let event = self.controller.pointer_down(
            DragItemId::from(item),
            Point::new(x, y),
            dom::element_rect(element),
        );
        drag_event_to_js(event)
    }

    /// # Errors
    /// Returns an error if the event cannot be serialized.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        drag_event_to_js(self.controller.pointer_move(Point::new(x, y)))
    }

    /// # Errors
    /// Returns an error if the event cannot be serialized.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        drag_event_to_js(self.controller.pointer_up(Point::new(x, y)))
    }

    /// Keyboard fallback for the focused `element`. Unmapped keys return `null`.
    ///
    /// # Errors
    /// Returns an error if the event cannot be serialized.
    #[wasm_bindgen(js_name = keyCommand)]
    pub fn key_command(
        &mut self,
        item: &str,
        element: &web_sys::Element,
        key: &str,
    ) -> Result<JsValue, JsValue> {
        let Some(command) = KeyCommand::from_key(key) else {
            return Ok(JsValue::NULL);
        };
        if self.controller.active_item().is_none() {
            self.refresh_layout();
        }
        let event = self.controller.key_command(
            &DragItemId::from(item),
            dom::element_rect(element),
            command,
        );
        drag_event_to_js(event)
    }

    /// Abort the current gesture (pointercancel, screen left).
    ///
    /// # Errors
    /// Returns an error if the event cannot be serialized.
    pub fn cancel(&mut self) -> Result<JsValue, JsValue> {
        drag_event_to_js(self.controller.cancel())
    }
}

impl RaftDrag {
    /// Pick up resizes, orientation changes and layout shifts before a
    /// gesture starts.
    fn refresh_layout(&mut self) {
        let (viewport, rotated) = rotation_context();
        self.controller.set_viewport(viewport, rotated);
        for (id, element) in &self.elements {
            self.controller
                .update_target_rect(id.as_str(), dom::element_rect(element));
        }
    }
}
