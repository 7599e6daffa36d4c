//! Input sources folded into one per-tick movement intent.
//!
//! Front-ends never touch movement flags directly: they translate their
//! window or touch callbacks into [`InputEvent`] messages, the session feeds
//! those to the active [`InputSource`], and the tick polls exactly one
//! [`MovementIntent`] per frame. Directional flags are level-triggered and
//! persist until released; look deltas are consumed by the poll.
use glam::Vec2;

use crate::config::GameConfig;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub look_delta: Vec2,
}

impl MovementIntent {
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl KeyCode {
    fn direction(self) -> Option<Direction> {
        match self {
            KeyCode::W | KeyCode::ArrowUp => Some(Direction::Forward),
            KeyCode::S | KeyCode::ArrowDown => Some(Direction::Backward),
            KeyCode::A | KeyCode::ArrowLeft => Some(Direction::Left),
            KeyCode::D | KeyCode::ArrowRight => Some(Direction::Right),
            KeyCode::Other => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchRegion {
    Joystick,
    Look,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    PointerLocked,
    PointerUnlocked,
    /// Raw captured mouse motion in pixels.
    PointerMotion { dx: f32, dy: f32 },
    TouchStart { region: TouchRegion, id: u64, position: Vec2 },
    TouchMove { id: u64, position: Vec2 },
    /// Touch end or cancel.
    TouchEnd { id: u64 },
}

impl InputEvent {
    /// Events that only ever let go of input.
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyUp(_) | InputEvent::PointerUnlocked | InputEvent::TouchEnd { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaptureChange {
    Acquired,
    Released,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Desktop,
    Touch,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Directions {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl Directions {
    fn set(&mut self, dir: Direction, pressed: bool) {
        match dir {
            Direction::Forward => self.forward = pressed,
            Direction::Backward => self.backward = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    fn intent(self, look_delta: Vec2) -> MovementIntent {
        MovementIntent {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            look_delta,
        }
    }
}

/// Keyboard plus pointer capture.
#[derive(Clone, Debug, Default)]
pub struct DesktopInput {
    dirs: Directions,
    captured: bool,
    look: Vec2,
}

impl DesktopInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    fn handle(&mut self, event: &InputEvent) -> Option<CaptureChange> {
        match *event {
            InputEvent::KeyDown(key) => {
                if let Some(dir) = key.direction() {
                    self.dirs.set(dir, true);
                }
                None
            }
            InputEvent::KeyUp(key) => {
                if let Some(dir) = key.direction() {
                    self.dirs.set(dir, false);
                }
                None
            }
            InputEvent::PointerLocked if !self.captured => {
                self.captured = true;
                Some(CaptureChange::Acquired)
            }
            InputEvent::PointerUnlocked if self.captured => {
                self.captured = false;
                self.look = Vec2::ZERO;
                Some(CaptureChange::Released)
            }
            InputEvent::PointerMotion { dx, dy } if self.captured => {
                self.look += Vec2::new(dx, dy);
                None
            }
            _ => None,
        }
    }

    fn poll_intent(&mut self) -> MovementIntent {
        self.dirs.intent(std::mem::take(&mut self.look))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Virtual joystick on one screen region, drag-to-look on another.
#[derive(Clone, Debug)]
pub struct TouchInput {
    joystick_center: Vec2,
    radius: f32,
    deadzone: f32,
    joystick_touch: Option<u64>,
    joystick_offset: Vec2,
    look_touch: Option<(u64, Vec2)>,
    dirs: Directions,
    look: Vec2,
}

impl TouchInput {
    pub fn new(joystick_center: Vec2, config: &GameConfig) -> Self {
        Self {
            joystick_center,
            radius: config.joystick_radius,
            deadzone: config.joystick_deadzone,
            joystick_touch: None,
            joystick_offset: Vec2::ZERO,
            look_touch: None,
            dirs: Directions::default(),
            look: Vec2::ZERO,
        }
    }

    /// Moves the joystick, e.g. after a window resize. A held thumb is
    /// re-measured from the new centre on its next move.
    pub fn set_joystick_center(&mut self, center: Vec2) {
        self.joystick_center = center;
    }

    pub fn joystick_center(&self) -> Vec2 {
        self.joystick_center
    }

    /// Thumb displacement from the joystick centre, clamped to the radius.
    pub fn thumb_offset(&self) -> Vec2 {
        self.joystick_offset.clamp_length_max(self.radius)
    }

    pub fn joystick_active(&self) -> bool {
        self.joystick_touch.is_some()
    }

    fn steer(&mut self, position: Vec2) {
        self.joystick_offset = position - self.joystick_center;
        let n = self.joystick_offset / self.radius;
        self.dirs = Directions {
            forward: n.y < -self.deadzone,
            backward: n.y > self.deadzone,
            left: n.x < -self.deadzone,
            right: n.x > self.deadzone,
        };
    }

    fn handle(&mut self, event: &InputEvent) -> Option<CaptureChange> {
        match *event {
            InputEvent::TouchStart { region: TouchRegion::Joystick, id, position } => {
                if self.joystick_touch.is_some() {
                    return None;
                }
                self.joystick_touch = Some(id);
                self.steer(position);
                Some(CaptureChange::Acquired)
            }
            InputEvent::TouchStart { region: TouchRegion::Look, id, position } => {
                if self.look_touch.is_some() {
                    return None;
                }
                self.look_touch = Some((id, position));
                Some(CaptureChange::Acquired)
            }
            InputEvent::TouchMove { id, position } => {
                if self.joystick_touch == Some(id) {
                    self.steer(position);
                } else if let Some((look_id, last)) = self.look_touch {
                    if look_id == id {
                        self.look += position - last;
                        self.look_touch = Some((id, position));
                    }
                }
                None
            }
            InputEvent::TouchEnd { id } => {
                if self.joystick_touch == Some(id) {
                    self.joystick_touch = None;
                    self.joystick_offset = Vec2::ZERO;
                    self.dirs = Directions::default();
                } else if matches!(self.look_touch, Some((look_id, _)) if look_id == id) {
                    self.look_touch = None;
                    self.look = Vec2::ZERO;
                }
                None
            }
            _ => None,
        }
    }

    fn poll_intent(&mut self) -> MovementIntent {
        self.dirs.intent(std::mem::take(&mut self.look))
    }

    fn reset(&mut self) {
        self.joystick_touch = None;
        self.joystick_offset = Vec2::ZERO;
        self.look_touch = None;
        self.dirs = Directions::default();
        self.look = Vec2::ZERO;
    }
}

/// The input source chosen at session start.
#[derive(Clone, Debug)]
pub enum InputSource {
    Desktop(DesktopInput),
    Touch(TouchInput),
}

impl InputSource {
    pub fn desktop() -> Self {
        InputSource::Desktop(DesktopInput::new())
    }

    pub fn touch(joystick_center: Vec2, config: &GameConfig) -> Self {
        InputSource::Touch(TouchInput::new(joystick_center, config))
    }

    pub fn mode(&self) -> InputMode {
        match self {
            InputSource::Desktop(_) => InputMode::Desktop,
            InputSource::Touch(_) => InputMode::Touch,
        }
    }

    /// Whether the simulation may run. Touch input is always live; desktop
    /// input only while the pointer is captured.
    pub fn is_active(&self) -> bool {
        match self {
            InputSource::Desktop(d) => d.is_captured(),
            InputSource::Touch(_) => true,
        }
    }

    pub fn handle(&mut self, event: &InputEvent) -> Option<CaptureChange> {
        match self {
            InputSource::Desktop(d) => d.handle(event),
            InputSource::Touch(t) => t.handle(event),
        }
    }

    /// The intent for this tick. Look deltas are zeroed by the call.
    pub fn poll_intent(&mut self) -> MovementIntent {
        match self {
            InputSource::Desktop(d) => d.poll_intent(),
            InputSource::Touch(t) => t.poll_intent(),
        }
    }

    /// Re-anchors the virtual joystick. Desktop input has none.
    pub fn set_joystick_center(&mut self, center: Vec2) {
        if let InputSource::Touch(t) = self {
            t.set_joystick_center(center);
        }
    }

    /// Drops held directions, pending look and any capture.
    pub fn reset(&mut self) {
        match self {
            InputSource::Desktop(d) => d.reset(),
            InputSource::Touch(t) => t.reset(),
        }
    }
}
