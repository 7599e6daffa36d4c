use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};

use crate::config::GameConfig;
use crate::core::maze::CellPos;

pub struct Player {
    pub position: Vec3,
    pub yaw: f32,   // 0 looks down -Z
    pub pitch: f32, // clamped to ±π/2
    pub speed: f32,
    pub radius: f32,
    pub height: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            position: Vec3::new(0.0, config.player_height, 0.0),
            yaw: PI,
            pitch: 0.0,
            speed: config.player_speed,
            radius: config.player_radius,
            height: config.player_height,
        }
    }

    /// Stands on `cell`, facing +Z into the maze.
    pub fn spawn_at(&mut self, cell: CellPos, cell_size: f32) {
        let planar = cell.to_world(cell_size);
        self.position = Vec3::new(planar.x, self.height, planar.y);
        self.yaw = PI;
        self.pitch = 0.0;
    }

    #[inline]
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    pub fn set_planar(&mut self, p: Vec2) {
        self.position.x = p.x;
        self.position.z = p.y;
    }

    pub fn look(&mut self, delta: Vec2, sensitivity: f32) {
        if delta == Vec2::ZERO {
            return;
        }
        self.yaw -= delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Heading projected onto the floor.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }
}
