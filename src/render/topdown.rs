//! Overhead view: walls, pickups, exit marker and the player, fitted to the window.
use fragment_maze::core::player::Player;
use fragment_maze::core::scene::{MaterialRole, SceneObject, SizeCategory};
use glam::Vec2;
use raylib::prelude::*;

const FLOOR: Color = Color::new(26, 28, 30, 255);
const WALL: Color = Color::new(150, 156, 170, 255);
const FRAGMENT: Color = Color::new(120, 200, 255, 255);
const KEY: Color = Color::new(255, 210, 60, 255);
const EXIT_LOCKED: Color = Color::new(200, 50, 50, 255);
const EXIT_OPEN: Color = Color::new(60, 220, 110, 255);

fn role_color(role: MaterialRole) -> Option<Color> {
    match role {
        MaterialRole::Wall => Some(WALL),
        MaterialRole::Floor => Some(FLOOR),
        MaterialRole::Collectible => Some(FRAGMENT),
        MaterialRole::Key => Some(KEY),
        MaterialRole::ExitLocked => Some(EXIT_LOCKED),
        MaterialRole::ExitUnlocked => Some(EXIT_OPEN),
        MaterialRole::Ceiling => None,
    }
}

/// World floor plane to screen pixels.
pub struct View {
    scale: f32,
    offset: Vec2,
}

impl View {
    /// Fits the floor object (if any) into the window with a margin.
    pub fn fit(objects: &[SceneObject], screen: Vec2) -> Self {
        let floor = objects.iter().find_map(|o| match (o.role, o.size) {
            (MaterialRole::Floor, SizeCategory::Plane(extent)) => Some((o.planar(), extent)),
            _ => None,
        });
        let (center, extent) = floor.unwrap_or((Vec2::ZERO, Vec2::ONE));
        let scale = 0.9 * (screen.x / extent.x).min(screen.y / extent.y);
        Self { scale, offset: screen / 2.0 - center * scale }
    }

    pub fn to_screen(&self, world: Vec2) -> Vector2 {
        let p = self.offset + world * self.scale;
        Vector2::new(p.x, p.y)
    }
}

pub fn draw_scene(d: &mut RaylibDrawHandle, view: &View, objects: &[SceneObject]) {
    for obj in objects {
        let Some(color) = role_color(obj.role) else {
            continue;
        };
        match obj.size {
            SizeCategory::Box(size) => {
                let half = Vec2::new(size.x, size.z) / 2.0;
                let corner = view.to_screen(obj.planar() - half);
                let extent = Vector2::new(size.x * view.scale, size.z * view.scale);
                d.draw_rectangle_v(corner, extent, color);
            }
            SizeCategory::Plane(extent) => {
                let corner = view.to_screen(obj.planar() - extent / 2.0);
                d.draw_rectangle_v(
                    corner,
                    Vector2::new(extent.x * view.scale, extent.y * view.scale),
                    color,
                );
            }
            SizeCategory::Sphere(radius) => {
                d.draw_circle_v(view.to_screen(obj.planar()), radius * view.scale, color);
            }
        }
    }
}

pub fn draw_player(d: &mut RaylibDrawHandle, view: &View, player: &Player) {
    let at = player.planar();
    let facing = player.forward();
    let tip = at + Vec2::new(facing.x, facing.z) * player.radius * 2.5;
    d.draw_circle_v(view.to_screen(at), player.radius * view.scale, Color::WHITE);
    d.draw_line_v(view.to_screen(at), view.to_screen(tip), Color::YELLOW);
}
