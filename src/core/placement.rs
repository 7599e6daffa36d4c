//! Scattering narrative fragments and keys through a carved maze.
//!
//! Collectibles are placed in a single spaced pass and may come up short in
//! small mazes. Keys gate the exit, so they fall back through three tiers
//! until the requested count is reached or the maze has no cell left:
//! ideal (spaced), relaxed (any free cell), emergency (fixed cells near the
//! start).
use glam::{Vec2, Vec3};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, error, warn};

use crate::config::GameConfig;
use crate::core::maze::{Cell, CellPos, Grid, START};

pub const FRAGMENTS: [&str; 10] = [
    "Fragment 1: ...the signal got weak around here...",
    "Fragment 2: ...this looks like an ancient structure...",
    "Fragment 3: ...strange energy seeping from the walls...",
    "Fragment 4: ...I am not alone...",
    "Fragment 5: ...the way out must be close...",
    "Fragment 6: ...I need to find the key...",
    "Fragment 7: ...corrupted records...",
    "Fragment 8: ...something is watching me...",
    "Fragment 9: ...time is running out...",
    "Fragment 10: ...will I ever get out?",
];

/// Payload used once the fragment pool is exhausted.
pub const LOST_FRAGMENT: &str = "Lost fragment...";

/// Last-resort key cells, tried in this order.
const EMERGENCY_CELLS: [CellPos; 7] = [
    CellPos::new(1, 3),
    CellPos::new(3, 1),
    CellPos::new(3, 3),
    CellPos::new(2, 1),
    CellPos::new(1, 2),
    CellPos::new(3, 2),
    CellPos::new(2, 3),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickupKind {
    Collectible,
    Key,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub cell: CellPos,
    pub position: Vec3,
    /// Narrative text; `None` for keys.
    pub text: Option<String>,
}

impl Pickup {
    #[inline]
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Keys needed to open the exit of a maze requested at `maze_size`.
pub fn keys_required(maze_size: usize) -> usize {
    (maze_size / 10).max(1)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub requested: usize,
    pub ideal: usize,
    pub relaxed: usize,
    pub emergency: usize,
}

impl PlacementReport {
    pub fn placed(&self) -> usize {
        self.ideal + self.relaxed + self.emergency
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed())
    }

    /// True when the maze was too tight for normal placement.
    pub fn used_emergency(&self) -> bool {
        self.emergency > 0
    }
}

#[derive(Clone, Debug)]
pub struct KeyPlacement {
    pub keys: Vec<Pickup>,
    pub report: PlacementReport,
}

#[derive(Clone, Debug)]
pub struct Placer {
    cell_size: f32,
    pickup_height: f32,
    min_spacing: f32,
    start_clearance_cells: f32,
    exit_clearance: f32,
}

impl Placer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            pickup_height: config.player_height / 2.0,
            min_spacing: config.min_pickup_spacing(),
            start_clearance_cells: config.start_clearance_cells,
            exit_clearance: config.exit_clearance_cells * config.cell_size,
        }
    }

    pub fn pickup_at(&self, kind: PickupKind, cell: CellPos, text: Option<String>) -> Pickup {
        let planar = cell.to_world(self.cell_size);
        Pickup {
            kind,
            cell,
            position: Vec3::new(planar.x, self.pickup_height, planar.y),
            text,
        }
    }

    /// Far enough from both the start and the exit.
    fn clear_of_endpoints(&self, cell: CellPos, exit: CellPos) -> bool {
        let exit_world = exit.to_world(self.cell_size);
        cell.cell_distance(START) > self.start_clearance_cells
            && cell.to_world(self.cell_size).distance(exit_world) > self.exit_clearance
    }

    fn spaced_from(&self, cell: CellPos, placed: &[Pickup]) -> bool {
        let here = cell.to_world(self.cell_size);
        placed.iter().all(|p| here.distance(p.planar()) >= self.min_spacing)
    }

    pub fn place_collectibles<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        count: usize,
        exit: CellPos,
        rng: &mut R,
    ) -> Vec<Pickup> {
        let mut candidates: Vec<CellPos> = grid
            .interior_open_cells()
            .filter(|&c| self.clear_of_endpoints(c, exit))
            .collect();
        candidates.shuffle(rng);

        let mut texts = FRAGMENTS;
        texts.shuffle(rng);

        let mut placed: Vec<Pickup> = Vec::with_capacity(count);
        for cell in candidates {
            if placed.len() >= count {
                break;
            }
            if !self.spaced_from(cell, &placed) {
                continue;
            }
            let text = texts.get(placed.len()).copied().unwrap_or(LOST_FRAGMENT);
            placed.push(self.pickup_at(PickupKind::Collectible, cell, Some(text.to_string())));
        }
        debug!(requested = count, placed = placed.len(), "placed collectibles");
        placed
    }

    pub fn place_keys<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        count: usize,
        exit: CellPos,
        collectibles: &[Pickup],
        rng: &mut R,
    ) -> KeyPlacement {
        let mut report = PlacementReport { requested: count, ..Default::default() };
        let mut keys: Vec<Pickup> = Vec::with_capacity(count);
        let occupied = |cell: CellPos, keys: &[Pickup]| {
            keys.iter().chain(collectibles).any(|p| p.cell == cell)
        };

        let mut ideal: Vec<CellPos> = grid
            .interior_open_cells()
            .filter(|&c| self.clear_of_endpoints(c, exit) && self.spaced_from(c, collectibles))
            .collect();
        let mut relaxed: Vec<CellPos> = grid.interior_open_cells().collect();
        ideal.shuffle(rng);
        relaxed.shuffle(rng);

        for cell in ideal {
            if keys.len() >= count {
                break;
            }
            if self.spaced_from(cell, &keys) {
                keys.push(self.pickup_at(PickupKind::Key, cell, None));
                report.ideal += 1;
            }
        }
        debug!(placed = report.ideal, requested = count, "ideal key tier");

        if keys.len() < count {
            warn!(placed = keys.len(), requested = count, "ideal key placement fell short, relaxing spacing");
            for cell in relaxed {
                if keys.len() >= count {
                    break;
                }
                if cell == START || cell == exit || occupied(cell, keys.as_slice()) {
                    continue;
                }
                keys.push(self.pickup_at(PickupKind::Key, cell, None));
                report.relaxed += 1;
            }
        }

        if keys.len() < count {
            error!(
                placed = keys.len(),
                requested = count,
                width = grid.width(),
                height = grid.height(),
                "maze too tight for keys, using emergency cells near start"
            );
            for cell in EMERGENCY_CELLS {
                if keys.len() >= count {
                    break;
                }
                let open = grid.is_interior(cell) && grid.at(cell) == Cell::Open;
                if open && keys.iter().all(|k| k.cell != cell) {
                    keys.push(self.pickup_at(PickupKind::Key, cell, None));
                    report.emergency += 1;
                }
            }
        }

        if report.shortfall() > 0 {
            error!(
                placed = report.placed(),
                requested = count,
                "could not place every key, maze has no free cell left"
            );
        }
        KeyPlacement { keys, report }
    }
}
