//! Pointer-drag handling for desk items.
//!
//! One gesture at a time: the controller owns a single active-gesture slot shared
//! by every item, so a second pointer-down while a drag is live is ignored rather
//! than raising a second item. Positions are clamped to the container on every
//! move, and the post-release glide obeys the same clamp.

use crate::constants::{GLIDE_DECAY_PER_FRAME, GLIDE_MAX_SPEED, GLIDE_MIN_SPEED, GLIDE_REFERENCE_DT};
use crate::item::CanvasItem;
use crate::registry::{Displacement, ItemRegistry};
use eframe::egui::{pos2, Pos2, Rect, Vec2};

/// The live part of a drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub item_id: String,
    /// Item position when the gesture began.
    pub origin_x: f32,
    pub origin_y: f32,
    /// The displacement committed by the most recent move.
    pub last_dx: f32,
    pub last_dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone)]
struct Glide {
    item_id: String,
    velocity: Vec2,
}

pub struct DragController {
    bounds: Rect,
    active: Option<DragState>,
    release_velocity: Vec2,
    glide: Option<Glide>,
    next_stamp: u64,
}

impl DragController {
    /// `container` is the container size; item positions are relative to its top-left.
    pub fn new(container: Vec2) -> Self {
        Self {
            bounds: Rect::from_min_size(Pos2::ZERO, container),
            active: None,
            release_velocity: Vec2::ZERO,
            glide: None,
            next_stamp: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn active(&self) -> Option<&DragState> {
        self.active.as_ref()
    }

    pub fn state_of(&self, item_id: &str) -> GestureState {
        match &self.active {
            Some(drag) if drag.item_id == item_id => GestureState::Dragging,
            _ => GestureState::Idle,
        }
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gesture Events
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a gesture on `item_id`. Returns false when another gesture already
    /// holds the slot or the item is unknown.
    pub fn pointer_down(&mut self, registry: &mut ItemRegistry, item_id: &str) -> bool {
        if let Some(active) = &self.active {
            log::debug!(
                "Ignoring drag on {item_id}: {} is already being dragged",
                active.item_id
            );
            return false;
        }
        let Some(item) = registry.get(item_id) else {
            return false;
        };
        let origin = item.position;

        self.glide = None;
        if let Err(err) = registry.set_dragging(item_id, true) {
            log::warn!("{err}");
            return false;
        }

        self.release_velocity = Vec2::ZERO;
        self.active = Some(DragState {
            item_id: item_id.to_string(),
            origin_x: origin.x,
            origin_y: origin.y,
            last_dx: 0.0,
            last_dy: 0.0,
        });
        true
    }

    /// Applies the pointer movement since the previous move event. `dt` is the time
    /// since that event and only feeds the release velocity.
    ///
    /// Returns the committed position, or `None` when no gesture is active.
    pub fn pointer_move(
        &mut self,
        registry: &mut ItemRegistry,
        delta: Vec2,
        dt: f32,
    ) -> Option<Pos2> {
        let item_id = self.active.as_ref()?.item_id.clone();
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return registry.get(&item_id).map(|item| item.position);
        }

        let Some(current) = registry.get(&item_id).map(|item| item.position) else {
            log::debug!("Dragged item {item_id} vanished; cancelling gesture");
            self.active = None;
            return None;
        };

        let target = self.clamp(current + delta);
        let applied = target - current;
        let stamp = self.stamp();
        let committed = match registry.update_position(&item_id, Displacement { stamp, delta: applied }) {
            Ok(position) => position,
            Err(err) => {
                log::warn!("{err}");
                self.active = None;
                return None;
            }
        };

        if let Some(drag) = self.active.as_mut() {
            drag.last_dx = applied.x;
            drag.last_dy = applied.y;
        }
        if dt > 0.0 {
            self.release_velocity = applied / dt;
        }
        Some(committed)
    }

    /// Ends the gesture and lets the item coast from its release velocity.
    pub fn pointer_up(&mut self, registry: &mut ItemRegistry) {
        self.finish(registry, true);
    }

    /// Ends the gesture without any further movement.
    pub fn pointer_cancel(&mut self, registry: &mut ItemRegistry) {
        self.finish(registry, false);
    }

    fn finish(&mut self, registry: &mut ItemRegistry, coast: bool) {
        let Some(drag) = self.active.take() else {
            return;
        };
        if let Err(err) = registry.set_dragging(&drag.item_id, false) {
            log::debug!("{err}");
            return;
        }

        let velocity = std::mem::take(&mut self.release_velocity);
        let speed = velocity.length();
        if coast && speed >= GLIDE_MIN_SPEED {
            let velocity = if speed > GLIDE_MAX_SPEED {
                velocity * (GLIDE_MAX_SPEED / speed)
            } else {
                velocity
            };
            self.glide = Some(Glide {
                item_id: drag.item_id,
                velocity,
            });
        }
    }

    /// Forgets every gesture and glide, e.g. after the desk was repopulated.
    pub fn reset(&mut self) {
        self.active = None;
        self.glide = None;
        self.release_velocity = Vec2::ZERO;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Inertia
    // ─────────────────────────────────────────────────────────────────────────────

    /// Advances the post-release glide by `dt` seconds. Returns true while the
    /// glide is still running.
    pub fn tick(&mut self, registry: &mut ItemRegistry, dt: f32) -> bool {
        if self.active.is_some() || dt <= 0.0 {
            return self.glide.is_some();
        }
        let Some(mut glide) = self.glide.take() else {
            return false;
        };
        let Some(current) = registry.get(&glide.item_id).map(|item| item.position) else {
            return false;
        };

        let target = self.clamp(current + glide.velocity * dt);
        let applied = target - current;
        let stamp = self.stamp();
        if let Err(err) = registry.update_position(&glide.item_id, Displacement { stamp, delta: applied }) {
            log::debug!("{err}");
            return false;
        }

        // Hitting a wall kills motion along that axis.
        let free = current + glide.velocity * dt;
        if free.x != target.x {
            glide.velocity.x = 0.0;
        }
        if free.y != target.y {
            glide.velocity.y = 0.0;
        }
        glide.velocity *= GLIDE_DECAY_PER_FRAME.powf(dt / GLIDE_REFERENCE_DT);

        if glide.velocity.length() >= GLIDE_MIN_SPEED {
            self.glide = Some(glide);
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    fn stamp(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }

    /// Keeps an item's whole rectangle inside the container.
    fn clamp(&self, position: Pos2) -> Pos2 {
        let size = CanvasItem::size();
        let max_x = (self.bounds.max.x - size.x).max(self.bounds.min.x);
        let max_y = (self.bounds.max.y - size.y).max(self.bounds.min.y);
        pos2(
            position.x.clamp(self.bounds.min.x, max_x),
            position.y.clamp(self.bounds.min.y, max_y),
        )
    }
}
