//! Translates raylib input into core input events.
//!
//! Exposes:
//! - `pick_mode`: mode selection on the title screen
//! - `poll_desktop`: keys, click-to-capture, Escape-to-release, mouse motion
//! - `TouchTracker`: diffs raylib touch points into start/move/end events
use std::collections::HashMap;

use fragment_maze::core::input::{InputEvent, InputMode, KeyCode, TouchRegion};
use glam::Vec2;
use raylib::prelude::*;

const KEYMAP: [(KeyboardKey, KeyCode); 8] = [
    (KeyboardKey::KEY_W, KeyCode::W),
    (KeyboardKey::KEY_A, KeyCode::A),
    (KeyboardKey::KEY_S, KeyCode::S),
    (KeyboardKey::KEY_D, KeyCode::D),
    (KeyboardKey::KEY_UP, KeyCode::ArrowUp),
    (KeyboardKey::KEY_DOWN, KeyCode::ArrowDown),
    (KeyboardKey::KEY_LEFT, KeyCode::ArrowLeft),
    (KeyboardKey::KEY_RIGHT, KeyCode::ArrowRight),
];

pub fn pick_mode(rl: &RaylibHandle) -> Option<InputMode> {
    if rl.is_key_pressed(KeyboardKey::KEY_ONE) {
        Some(InputMode::Desktop)
    } else if rl.is_key_pressed(KeyboardKey::KEY_TWO) {
        Some(InputMode::Touch)
    } else {
        None
    }
}

/// True on a click or Enter, used to dismiss the win banner.
pub fn acknowledged(rl: &RaylibHandle) -> bool {
    rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT)
        || rl.is_key_pressed(KeyboardKey::KEY_ENTER)
}

pub fn poll_desktop(rl: &mut RaylibHandle, captured: bool, out: &mut Vec<InputEvent>) {
    for (rk, key) in KEYMAP {
        if rl.is_key_pressed(rk) {
            out.push(InputEvent::KeyDown(key));
        }
        if rl.is_key_released(rk) {
            out.push(InputEvent::KeyUp(key));
        }
    }

    if captured {
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            rl.enable_cursor();
            out.push(InputEvent::PointerUnlocked);
            return;
        }
        let delta = rl.get_mouse_delta();
        if delta.x != 0.0 || delta.y != 0.0 {
            out.push(InputEvent::PointerMotion { dx: delta.x, dy: delta.y });
        }
    } else if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
        rl.disable_cursor();
        out.push(InputEvent::PointerLocked);
    }
}

/// Live touch points by id, each pinned to the region it started in.
#[derive(Default)]
pub struct TouchTracker {
    active: HashMap<u64, Vec2>,
}

impl TouchTracker {
    /// Left half of the screen drives the joystick, right half looks around.
    pub fn poll(&mut self, rl: &RaylibHandle, out: &mut Vec<InputEvent>) {
        let split = rl.get_screen_width() as f32 / 2.0;
        let mut seen = HashMap::new();
        for i in 0..rl.get_touch_point_count() {
            let id = rl.get_touch_point_id(i) as u64;
            let p = rl.get_touch_position(i);
            seen.insert(id, Vec2::new(p.x, p.y));
        }

        for (&id, &position) in &seen {
            match self.active.get(&id) {
                None => {
                    let region =
                        if position.x < split { TouchRegion::Joystick } else { TouchRegion::Look };
                    out.push(InputEvent::TouchStart { region, id, position });
                }
                Some(&last) if last != position => {
                    out.push(InputEvent::TouchMove { id, position });
                }
                Some(_) => {}
            }
        }
        for &id in self.active.keys() {
            if !seen.contains_key(&id) {
                out.push(InputEvent::TouchEnd { id });
            }
        }
        self.active = seen;
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
