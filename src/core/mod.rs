//! Core game types and logic (maze, pickups, input, collision, session).
//!
//! Re-exports:
//! - `maze`: Maze carving, exit selection and grid queries
//! - `placement`: Collectible and key scattering with fallback tiers
//! - `input`: Desktop and touch input folded into one movement intent
//! - `collision`: Wall raycasts, bounds clamping, pickup and exit proximity
//! - `player`: Player pose and heading
//! - `audio`: Sound cue names and footstep pacing
//! - `scene`: Typed objects for the renderer
//! - `session`: Game state machine and the per-frame tick

pub mod audio;
pub mod collision;
pub mod input;
pub mod maze;
pub mod placement;
pub mod player;
pub mod scene;
pub mod session;
