//! Simulation core of a first-person maze game: perfect-maze carving, pickup
//! placement, unified desktop/touch input, wall collision and the
//! explore/win/next-level state machine.

pub mod config;
pub mod core;

pub use crate::config::{ConfigError, GameConfig};
pub use crate::core::input::{InputEvent, InputSource, KeyCode, MovementIntent, TouchRegion};
pub use crate::core::maze::{Cell, CellPos, Grid, GridError};
pub use crate::core::session::{GameEvent, GameState, Level, Session};
