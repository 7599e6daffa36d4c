//! Raylib drawing for the desktop front-end.
//!
//! Re-exports:
//! - `topdown`: Overhead view of the scene objects and the player
//! - `hud`: Timer, keys, narrative, title screen and win banner

pub mod hud;
pub mod topdown;
