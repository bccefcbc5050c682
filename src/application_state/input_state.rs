//! # Input State
//!
//! This module defines the input types handed from the input manager to the engine once
//! per frame.

use std::collections::{HashMap, VecDeque};

use cgmath::Point2;
use winit::keyboard::KeyCode;

/// Represents the state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key is not pressed
    #[default]
    NotPressed,
    /// Key was just pressed this frame
    Pressed,
    /// Key has been held down for multiple frames
    Held,
    /// Key was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the state from the previous and current raw pressed flags
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// The two pointer actions the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// Mine (left button)
    Primary,
    /// Place (right button)
    Secondary,
}

/// One discrete pointer press, with the screen position at the moment of the press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub screen: Point2<f32>,
}

/// Everything the engine needs to know about input for one frame.
///
/// `pointer_events` is a queue: the interaction controller drains it, so an event is
/// dispatched exactly once.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// State of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,
    /// Current pointer position in screen pixels, if the pointer is over the window
    pub pointer: Option<Point2<f32>>,
    /// Presses since the last frame, oldest first
    pub pointer_events: VecDeque<PointerEvent>,
    /// Scroll since the last frame in lines; positive is away from the user
    pub scroll_lines: f32,
}

impl InputFrame {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Appends a pointer press.
    pub fn push_pointer_event(&mut self, action: PointerAction, screen: Point2<f32>) {
        self.pointer_events.push_back(PointerEvent { action, screen });
    }
}
