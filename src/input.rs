//! Plain input records and the per-tick control snapshot.
//!
//! Whatever windowing layer sits on top feeds [`InputEvent`]s in; the core
//! never sees a toolkit type.

use crate::game_logic::PhysicsInput;
use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        meta: false,
        shift: false,
        alt: false,
    };

    /// Ctrl or Cmd: the segment-placing modifier.
    pub fn segment(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Canvas-local input, one record per DOM-style event.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    MouseDown { pos: Vec2, modifiers: Modifiers },
    MouseUp { pos: Vec2, modifiers: Modifiers },
    MouseMove { pos: Vec2, modifiers: Modifiers },
    Click { pos: Vec2, modifiers: Modifiers },
    ContextMenu { pos: Vec2, modifiers: Modifiers },
}

impl InputEvent {
    pub fn key_down(key: &str) -> Self {
        InputEvent::KeyDown {
            key: key.to_string(),
        }
    }

    pub fn key_up(key: &str) -> Self {
        InputEvent::KeyUp {
            key: key.to_string(),
        }
    }
}

pub fn is_segment_modifier_key(key: &str) -> bool {
    key == "Control" || key == "Meta"
}

/// Which keys are currently held. Updated on every key event, read once per
/// tick.
#[derive(Resource, Clone, Debug, Default)]
pub struct InputState {
    pressed: HashSet<String>,
}

impl InputState {
    /// Key events update the held set; every other event is ignored.
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { key } => {
                self.pressed.insert(key.clone());
            }
            InputEvent::KeyUp { key } => {
                self.pressed.remove(key);
            }
            _ => {}
        }
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    fn any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.is_pressed(k))
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// Pilot car controls: arrows or WASD, space also brakes.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pilot: PhysicsInput {
                forward: self.any(&["ArrowUp", "w"]),
                backward: self.any(&["ArrowDown", "s", " "]),
                left: self.any(&["ArrowLeft", "a"]),
                right: self.any(&["ArrowRight", "d"]),
            },
        }
    }
}

/// Controls sampled once at the start of a tick.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub pilot: PhysicsInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let mut state = InputState::default();
        state.apply(&InputEvent::key_down("w"));
        state.apply(&InputEvent::key_down("ArrowLeft"));
        state.apply(&InputEvent::key_down(" "));

        let snap = state.snapshot();
        assert!(snap.pilot.forward);
        assert!(snap.pilot.left);
        assert!(snap.pilot.backward);
        assert!(!snap.pilot.right);
        assert!(snap.pilot.drifting());
    }

    #[test]
    fn test_key_release() {
        let mut state = InputState::default();
        state.apply(&InputEvent::key_down("d"));
        state.apply(&InputEvent::key_up("d"));
        state.apply(&InputEvent::Click {
            pos: Vec2::ZERO,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(state.snapshot(), InputSnapshot::default());
    }

    #[test]
    fn test_modifiers() {
        assert!(Modifiers::CTRL.segment());
        assert!(!Modifiers::NONE.segment());
        assert!(is_segment_modifier_key("Meta"));
        assert!(!is_segment_modifier_key("Shift"));
    }
}
