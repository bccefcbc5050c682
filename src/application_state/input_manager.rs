//! # Input Manager
//!
//! This module turns window events into per-frame [`InputFrame`] snapshots:
//! - Keyboard state tracking with pressed / held / released transitions
//! - Pointer position tracking
//! - Edge-triggered pointer presses, queued with the position they happened at
//! - Scroll accumulation for zoom
//!
//! The window event path (`intake_input`) and the direct setters (`set_key`,
//! `press_button`, ...) update the same state, so scripted hosts and tests drive the
//! engine exactly like a real window does.

use std::collections::{HashMap, HashSet, VecDeque};

use cgmath::Point2;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{InputFrame, PointerAction, PointerEvent, RawInputState};

const KEY_CODES: [KeyCode; 10] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::KeyF,
    KeyCode::KeyG,
];

/// Pixels treated as one scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Maps a mouse button to the engine action it triggers.
pub fn pointer_action(button: MouseButton) -> Option<PointerAction> {
    match button {
        MouseButton::Left => Some(PointerAction::Primary),
        MouseButton::Right => Some(PointerAction::Secondary),
        _ => None,
    }
}

/// Manages the state of all input devices and processes input events.
pub struct InputManager {
    /// State of all tracked keyboard keys at the end of the previous frame
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Pointer position in screen pixels
    pointer: Option<Point2<f32>>,
    /// Pointer actions whose button is physically down
    buttons_down: HashSet<PointerAction>,
    /// Presses not yet handed to the engine
    pointer_events: VecDeque<PointerEvent>,
    /// Accumulated scroll since the last frame, in lines
    scroll_lines: f32,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key released.
    pub fn new() -> Self {
        let keyboard_inputs_old = KEY_CODES.iter().map(|key| (*key, false)).collect();
        let keyboard_inputs_new = KEY_CODES.iter().map(|key| (*key, false)).collect();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            pointer: None,
            buttons_down: HashSet::new(),
            pointer_events: VecDeque::new(),
            scroll_lines: 0.0,
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => {
                self.set_key(*key, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_pointer(Some(Point2::new(position.x as f32, position.y as f32)));
            }
            WindowEvent::CursorLeft { .. } => {
                self.set_pointer(None);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.add_scroll(lines);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(action) = pointer_action(*button) {
                    match state {
                        ElementState::Pressed => self.press_button(action),
                        ElementState::Released => self.release_button(action),
                    }
                }
            }
            _ => {}
        }
    }

    /// Sets the pressed state of a tracked key. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    pub fn set_pointer(&mut self, pointer: Option<Point2<f32>>) {
        self.pointer = pointer.filter(|p| p.x.is_finite() && p.y.is_finite());
    }

    /// Registers a button going down.
    ///
    /// Queues one event per press. Repeated press reports while the button is still down
    /// are ignored, and a press with no known pointer position is dropped.
    pub fn press_button(&mut self, action: PointerAction) {
        if !self.buttons_down.insert(action) {
            return;
        }
        if let Some(screen) = self.pointer {
            self.pointer_events.push_back(PointerEvent { action, screen });
        }
    }

    pub fn release_button(&mut self, action: PointerAction) {
        self.buttons_down.remove(&action);
    }

    pub fn add_scroll(&mut self, lines: f32) {
        if lines.is_finite() {
            self.scroll_lines += lines;
        }
    }

    /// Builds the snapshot for this frame and starts the next one.
    ///
    /// Key transitions are computed against the previous frame, queued presses and scroll
    /// are handed over and cleared.
    pub fn take_frame(&mut self) -> InputFrame {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let frame = InputFrame {
            keyboard_states,
            pointer: self.pointer,
            pointer_events: std::mem::take(&mut self.pointer_events),
            scroll_lines: std::mem::replace(&mut self.scroll_lines, 0.0),
        };
        self.move_old_states();
        frame
    }

    /// Copies the current key states into the previous-frame states.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }
    }

    /// Releases everything. Called when the window loses focus to prevent stuck keys.
    pub fn reset_inputs(&mut self) {
        for state in self.keyboard_inputs_new.values_mut() {
            *state = false;
        }
        self.buttons_down.clear();
        self.pointer_events.clear();
        self.scroll_lines = 0.0;
    }
}
