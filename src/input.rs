//! Input state fed by the host each frame.
//!
//! The driver layer owns the actual keyboard/mouse capture and the
//! screen-to-world cursor transform; the simulation only sees which named
//! keys are currently held and where the cursor is in world space.

use crate::math::Vec2;
use bevy_ecs::prelude::*;
use std::collections::HashSet;

/// Key/button names the simulation reads: `"w" "a" "s" "d" "p" "mouse0"`.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    /// Cursor position in world space.
    pub cursor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is the named key/button currently held?
    pub fn down(&self, name: &str) -> bool {
        self.held.contains(name)
    }

    pub fn set_down(&mut self, name: &str, down: bool) {
        if down {
            self.held.insert(name.to_string());
        } else {
            self.held.remove(name);
        }
    }

    pub fn set_cursor(&mut self, pos: Vec2) {
        self.cursor = pos;
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_tracks_press_and_release() {
        let mut input = InputState::new();
        assert!(!input.down("w"));
        input.set_down("w", true);
        input.set_down("mouse0", true);
        assert!(input.down("w"));
        assert!(input.down("mouse0"));
        input.set_down("w", false);
        assert!(!input.down("w"));
        input.release_all();
        assert!(!input.down("mouse0"));
    }
}
