//! Drag gesture controller: tap/drag disambiguation, keyboard fallback and
//! drop resolution.
//!
//! The controller only reports what happened ("item X landed on target Y").
//! Applying the result to fusion slots or stores is the caller's job.
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::geometry::{Point, Rect, Viewport, to_visual_rect};
use crate::hit_test::{DropCandidate, resolve_drop_target};
use crate::ids::{DragItemId, TargetId};

/// Lifecycle notifications emitted by [`DragController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    /// Pointer travel crossed the activation distance, or a keyboard pick-up.
    Started { item: DragItemId },
    /// `rect` is physical, `visual_rect` is what the renderer should draw.
    Moved {
        item: DragItemId,
        rect: Rect,
        visual_rect: Rect,
    },
    Dropped {
        item: DragItemId,
        target: Option<TargetId>,
    },
    Cancelled { item: DragItemId },
    /// Released below the activation distance; treat as an ordinary click.
    Tap { item: DragItemId },
}

/// Transient drag state. Only populated once a drag has actually started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragGestureState {
    pub active_item_id: Option<DragItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in the visual frame.
    const fn visual_delta(self) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// Discrete keyboard input for moving items without a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Pick up when idle, drop when carrying.
    Activate,
    Move(Direction),
    Cancel,
}

impl KeyCommand {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" | " " | "Spacebar" => Some(Self::Activate),
            "Escape" | "Esc" => Some(Self::Cancel),
            "ArrowUp" | "Up" => Some(Self::Move(Direction::Up)),
            "ArrowDown" | "Down" => Some(Self::Move(Direction::Down)),
            "ArrowLeft" | "Left" => Some(Self::Move(Direction::Left)),
            "ArrowRight" | "Right" => Some(Self::Move(Direction::Right)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone)]
struct Press {
    item: DragItemId,
    source: Source,
    origin: Point,
    start_rect: Rect,
    rect: Rect,
    active: bool,
}

/// Turns pointer and keyboard input into drag lifecycle events.
#[derive(Debug, Clone)]
pub struct DragController {
    activation_distance: f64,
    keyboard_step: f64,
    viewport: Viewport,
    rotated: bool,
    targets: Vec<DropCandidate>,
    press: Option<Press>,
}

impl DragController {
    #[must_use]
    pub fn new(config: &GameConfig, viewport: Viewport, rotated: bool) -> Self {
        Self {
            activation_distance: config.drag_activation_distance.max(0.0),
            keyboard_step: config.keyboard_step,
            viewport,
            rotated,
            targets: Vec::new(),
            press: None,
        }
    }

    /// Update the viewport after a resize or orientation change.
    pub fn set_viewport(&mut self, viewport: Viewport, rotated: bool) {
        self.viewport = viewport;
        self.rotated = rotated;
    }

    /// Register a drop target, replacing any existing target with the same id.
    pub fn register_target(&mut self, candidate: DropCandidate) {
        if let Some(existing) = self.targets.iter_mut().find(|t| t.id == candidate.id) {
            *existing = candidate;
        } else {
            self.targets.push(candidate);
        }
    }

    pub fn unregister_target(&mut self, id: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id.as_str() != id);
        self.targets.len() != before
    }

    /// Enable or disable a target, e.g. when a fusion slot fills up.
    pub fn set_target_disabled(&mut self, id: &str, disabled: bool) -> bool {
        let Some(target) = self.target_mut(id) else {
            return false;
        };
        target.disabled = disabled;
        true
    }

    pub fn update_target_rect(&mut self, id: &str, rect: Rect) -> bool {
        let Some(target) = self.target_mut(id) else {
            return false;
        };
        target.rect = rect;
        true
    }

    #[must_use]
    pub fn targets(&self) -> &[DropCandidate] {
        &self.targets
    }

    fn target_mut(&mut self, id: &str) -> Option<&mut DropCandidate> {
        self.targets.iter_mut().find(|t| t.id.as_str() == id)
    }

    #[must_use]
    pub fn state(&self) -> DragGestureState {
        DragGestureState {
            active_item_id: self.active_item().cloned(),
        }
    }

    /// Item currently being dragged (not merely pressed).
    #[must_use]
    pub fn active_item(&self) -> Option<&DragItemId> {
        self.press.as_ref().filter(|p| p.active).map(|p| &p.item)
    }

    /// Last known physical rectangle of the pressed item.
    #[must_use]
    pub fn current_rect(&self) -> Option<Rect> {
        self.press.as_ref().map(|p| p.rect)
    }

    /// Begin tracking a press. Nothing is emitted for the new press until the
    /// pointer travels past the activation distance; a drag or keyboard carry
    /// it replaces is reported as cancelled.
    pub fn pointer_down(
        &mut self,
        item: DragItemId,
        point: Point,
        item_rect: Rect,
    ) -> Option<DragEvent> {
        let replaced = self.cancel();
        self.press = Some(Press {
            item,
            source: Source::Pointer,
            origin: point,
            start_rect: item_rect,
            rect: item_rect,
            active: false,
        });
        replaced
    }

    pub fn pointer_move(&mut self, point: Point) -> Option<DragEvent> {
        let press = self.press.as_mut().filter(|p| p.source == Source::Pointer)?;
        press.rect = press
            .start_rect
            .translated(point.x - press.origin.x, point.y - press.origin.y);
        if !press.active {
            if press.origin.distance_to(point) <= self.activation_distance {
                return None;
            }
            press.active = true;
            log::debug!("drag started for {}", press.item);
            return Some(DragEvent::Started {
                item: press.item.clone(),
            });
        }
        Some(DragEvent::Moved {
            item: press.item.clone(),
            rect: press.rect,
            visual_rect: to_visual_rect(press.rect, self.viewport, self.rotated),
        })
    }

    /// Finish the gesture: a tap below the threshold, otherwise a drop
    /// resolved once against the registered targets.
    pub fn pointer_up(&mut self, point: Point) -> Option<DragEvent> {
        let mut press = self.press.take()?;
        if press.source != Source::Pointer {
            self.press = Some(press);
            return None;
        }
        if !press.active {
            return Some(DragEvent::Tap { item: press.item });
        }
        press.rect = press
            .start_rect
            .translated(point.x - press.origin.x, point.y - press.origin.y);
        Some(self.drop_press(press))
    }

    /// Abort any press (pointercancel, modal closed, screen left).
    pub fn cancel(&mut self) -> Option<DragEvent> {
        let press = self.press.take()?;
        press.active.then(|| DragEvent::Cancelled { item: press.item })
    }

    /// Keyboard fallback. `item_rect` is used when picking up.
    pub fn key_command(
        &mut self,
        item: &DragItemId,
        item_rect: Rect,
        command: KeyCommand,
    ) -> Option<DragEvent> {
        let carrying = self
            .press
            .as_ref()
            .is_some_and(|p| p.source == Source::Keyboard && p.item == *item);
        match (command, carrying) {
            (KeyCommand::Activate, false) => {
                if self.press.as_ref().is_some_and(|p| p.active) {
                    return None;
                }
                self.press = Some(Press {
                    item: item.clone(),
                    source: Source::Keyboard,
                    origin: item_rect.center(),
                    start_rect: item_rect,
                    rect: item_rect,
                    active: true,
                });
                Some(DragEvent::Started { item: item.clone() })
            }
            (KeyCommand::Activate, true) => {
                let press = self.press.take()?;
                Some(self.drop_press(press))
            }
            (KeyCommand::Move(direction), true) => {
                let (dx, dy) = self.physical_step(direction);
                let press = self.press.as_mut()?;
                press.rect = press.rect.translated(dx, dy);
                Some(DragEvent::Moved {
                    item: press.item.clone(),
                    rect: press.rect,
                    visual_rect: to_visual_rect(press.rect, self.viewport, self.rotated),
                })
            }
            (KeyCommand::Cancel, true) => self.cancel(),
            (KeyCommand::Move(_) | KeyCommand::Cancel, false) => None,
        }
    }

    /// Arrow keys move in the direction the player sees; under rotation a
    /// visual step `(dx, dy)` is the physical step `(dy, -dx)`.
    fn physical_step(&self, direction: Direction) -> (f64, f64) {
        let (dx, dy) = direction.visual_delta();
        let (dx, dy) = (dx * self.keyboard_step, dy * self.keyboard_step);
        if self.rotated && !self.viewport.is_degenerate() {
            (dy, -dx)
        } else {
            (dx, dy)
        }
    }

    fn drop_press(&self, press: Press) -> DragEvent {
        let target = resolve_drop_target(press.rect, &self.targets, self.viewport, self.rotated)
            .cloned();
        log::debug!(
            "drop of {} resolved to {}",
            press.item,
            target.as_ref().map_or("nothing", TargetId::as_str)
        );
        DragEvent::Dropped {
            item: press.item,
            target,
        }
    }
}
