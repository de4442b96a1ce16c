use glam::Vec2;

use crate::defs::InputEvents;

/// One tick of controller input for a soldier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlData {
    pub movement: Vec2,   // x: strafe right +, y: thrust forward +, each –1 … +1
    pub view_delta: Vec2, // degrees this tick, x: yaw (right +), y: pitch
    pub events: InputEvents,
}

impl ControlData {
    pub fn new(movement: Vec2, view_delta: Vec2, events: InputEvents) -> Self {
        Self {
            movement,
            view_delta,
            events,
        }
    }

    /// Edges are valid for one tick only; levels carry over.
    #[inline]
    pub fn consume_edges(&mut self) {
        self.events.clear_edges();
    }
}
