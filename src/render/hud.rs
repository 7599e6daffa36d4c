//! Text overlays and the virtual joystick.
use fragment_maze::core::input::{InputSource, TouchInput};
use fragment_maze::core::session::{GameState, Session};
use glam::Vec2;
use raylib::prelude::*;

const TEXT: Color = Color::new(230, 230, 230, 255);
const DIM: Color = Color::new(0, 0, 0, 170);

pub fn draw_title(d: &mut RaylibDrawHandle, screen: Vec2) {
    let x = (screen.x * 0.25) as i32;
    let y = (screen.y * 0.35) as i32;
    d.draw_text("FRAGMENT MAZE", x, y, 40, TEXT);
    d.draw_text("1  Desktop: mouse look + WASD / arrows", x, y + 70, 20, TEXT);
    d.draw_text("2  Touch: left half joystick, right half look", x, y + 100, 20, TEXT);
}

fn draw_lines(d: &mut RaylibDrawHandle, text: &str, x: i32, mut y: i32, size: i32, color: Color) {
    for line in text.lines() {
        d.draw_text(line, x, y, size, color);
        y += size + 4;
    }
}

pub fn draw_status(d: &mut RaylibDrawHandle, session: &Session, screen: Vec2) {
    d.draw_text(&session.timer_text(), 10, 10, 20, TEXT);
    d.draw_text(&session.keys_text(), 10, 36, 20, TEXT);

    let narrative = session.narrative_text();
    if !narrative.is_empty() {
        let top = screen.y as i32 - 24 * (session.narrative().len() as i32 + 1);
        d.draw_text("Collected story:", 10, top, 18, TEXT);
        draw_lines(d, &narrative, 10, top + 22, 18, TEXT);
    }

    let captured = match session.input() {
        InputSource::Desktop(input) => input.is_captured(),
        InputSource::Touch(_) => true,
    };
    if session.state() != GameState::Won && !captured {
        let msg = if session.state() == GameState::Idle { "Click to start" } else { "Paused: click to resume" };
        d.draw_text(msg, (screen.x / 2.0) as i32 - 120, (screen.y / 2.0) as i32, 24, TEXT);
    }
}

pub fn draw_win_banner(d: &mut RaylibDrawHandle, session: &Session, screen: Vec2) {
    let Some(text) = session.win_text() else {
        return;
    };
    let (w, h) = (420, 150);
    let x = (screen.x as i32 - w) / 2;
    let y = (screen.y as i32 - h) / 2;
    d.draw_rectangle(x, y, w, h, DIM);
    draw_lines(d, &text, x + 20, y + 20, 24, TEXT);
}

pub fn draw_joystick(d: &mut RaylibDrawHandle, touch: &TouchInput, center: Vec2, radius: f32) {
    let c = Vector2::new(center.x, center.y);
    d.draw_circle_lines(c.x as i32, c.y as i32, radius, TEXT);
    let thumb = center + touch.thumb_offset();
    let color = if touch.joystick_active() { Color::YELLOW } else { TEXT };
    d.draw_circle_v(Vector2::new(thumb.x, thumb.y), radius * 0.35, color);
}
