//! Named controls bound to raw key codes.
//!
//! The host feeds key presses and releases in between frames; tasks read the
//! state of named controls through their context.

use std::collections::{HashMap, HashSet};

/// Platform key code, as delivered by whatever window layer hosts the engine.
pub type KeyCode = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// No key is bound to the control.
    Unbound,
    Released,
    Pressed,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: HashMap<String, KeyCode>,
    pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `control` to `key`, replacing any earlier binding of that control.
    pub fn bind(&mut self, control: impl Into<String>, key: KeyCode) {
        self.bindings.insert(control.into(), key);
    }

    pub fn unbind(&mut self, control: &str) -> Option<KeyCode> {
        self.bindings.remove(control)
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn state(&self, control: &str) -> ControlState {
        match self.bindings.get(control) {
            None => ControlState::Unbound,
            Some(key) if self.pressed.contains(key) => ControlState::Pressed,
            Some(_) => ControlState::Released,
        }
    }

    pub fn is_pressed(&self, control: &str) -> bool {
        self.state(control) == ControlState::Pressed
    }
}
