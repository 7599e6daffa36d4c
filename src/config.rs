//! Game tunables.
//!
//! Every constant the simulation uses lives here so a level can be tuned from a
//! `maze.toml` next to the binary. Missing keys fall back to the defaults.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// World units per grid cell.
    pub cell_size: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub player_height: f32,
    /// World units per second.
    pub player_speed: f32,
    pub player_radius: f32,
    pub collision_epsilon: f32,
    pub collectible_radius: f32,
    pub key_radius: f32,
    pub pickup_margin: f32,
    pub collectibles_per_level: usize,
    /// Minimum distance between pickups of one pass, in cells.
    pub min_pickup_spacing_cells: f32,
    /// Pickups must be strictly farther than this from the start cell, in cells.
    pub start_clearance_cells: f32,
    /// Pickups must be strictly farther than this from the exit, in cells.
    pub exit_clearance_cells: f32,
    pub start_maze_size: usize,
    pub maze_size_step: usize,
    pub footstep_distance: f32,
    /// Upper bound for a single tick's delta time, in seconds.
    pub max_frame_delta: f32,
    /// Radians of rotation per unit of look delta.
    pub look_sensitivity: f32,
    /// Virtual joystick radius in screen pixels.
    pub joystick_radius: f32,
    /// Normalized joystick displacement an axis must exceed to register.
    pub joystick_deadzone: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            wall_height: 2.5,
            wall_thickness: 0.1,
            player_height: 1.6,
            player_speed: 5.0,
            player_radius: 0.3,
            collision_epsilon: 0.05,
            collectible_radius: 0.2,
            key_radius: 0.25,
            pickup_margin: 0.1,
            collectibles_per_level: 3,
            min_pickup_spacing_cells: 5.0,
            start_clearance_cells: 2.0,
            exit_clearance_cells: 1.5,
            start_maze_size: 10,
            maze_size_step: 2,
            footstep_distance: 0.8,
            max_frame_delta: 0.1,
            look_sensitivity: 0.002,
            joystick_radius: 60.0,
            joystick_deadzone: 0.2,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cell_size", self.cell_size),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("player_radius", self.player_radius),
            ("collectible_radius", self.collectible_radius),
            ("key_radius", self.key_radius),
            ("footstep_distance", self.footstep_distance),
            ("max_frame_delta", self.max_frame_delta),
            ("joystick_radius", self.joystick_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.start_maze_size < 3 {
            return Err(ConfigError::Invalid {
                field: "start_maze_size",
                reason: format!("must be at least 3, got {}", self.start_maze_size),
            });
        }
        if !(self.joystick_deadzone > 0.0 && self.joystick_deadzone < 1.0) {
            return Err(ConfigError::Invalid {
                field: "joystick_deadzone",
                reason: format!("must lie in (0, 1), got {}", self.joystick_deadzone),
            });
        }
        if self.wall_thickness >= self.cell_size {
            return Err(ConfigError::Invalid {
                field: "wall_thickness",
                reason: "must be thinner than a cell".to_string(),
            });
        }
        Ok(())
    }

    /// Clearance a wall ray must leave beyond the attempted step.
    pub fn collision_distance(&self) -> f32 {
        self.player_radius + self.wall_thickness / 2.0 + self.collision_epsilon
    }

    pub fn min_pickup_spacing(&self) -> f32 {
        self.min_pickup_spacing_cells * self.cell_size
    }

    pub fn win_distance(&self) -> f32 {
        self.cell_size / 1.5
    }
}
