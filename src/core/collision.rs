//! Wall and pickup collision.
//!
//! Walls are the thin boxes the renderer draws: one on every boundary between
//! a wall cell and a passable cell, plus the four outer walls. Movement is
//! tested by casting a ray per attempted direction against that set; pickups
//! and the exit use planar proximity.
use glam::{Vec2, Vec3};

use crate::config::GameConfig;
use crate::core::maze::{Cell, Grid};
use crate::core::placement::Pickup;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WallBox {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl WallBox {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, half_extents: size * 0.5 }
    }

    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    /// Slab test. A ray starting inside the box hits at distance 0.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let min = self.center - self.half_extents;
        let max = self.center + self.half_extents;
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            if d.abs() < 1e-8 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - o) / d;
            let t2 = (max[axis] - o) / d;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_near > t_far {
                return None;
            }
        }
        (t_far >= 0.0).then(|| t_near.max(0.0))
    }
}

/// Nearest-intersection query against some object set.
pub trait Raycast {
    fn nearest_hit(&self, origin: Vec3, direction: Vec3) -> Option<f32>;
}

#[derive(Clone, Debug, Default)]
pub struct WallSet {
    boxes: Vec<WallBox>,
}

impl WallSet {
    pub fn from_grid(grid: &Grid, config: &GameConfig) -> Self {
        let cs = config.cell_size;
        let t = config.wall_thickness;
        let h = config.wall_height;
        let is_wall = |x: usize, y: usize| grid.cell(x, y) == Cell::Wall;
        let mut boxes = Vec::new();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if x + 1 < grid.width() && is_wall(x, y) != is_wall(x + 1, y) {
                    boxes.push(WallBox::new(
                        Vec3::new((x as f32 + 0.5) * cs, h / 2.0, y as f32 * cs),
                        Vec3::new(t, h, cs + t),
                    ));
                }
                if y + 1 < grid.height() && is_wall(x, y) != is_wall(x, y + 1) {
                    boxes.push(WallBox::new(
                        Vec3::new(x as f32 * cs, h / 2.0, (y as f32 + 0.5) * cs),
                        Vec3::new(cs + t, h, t),
                    ));
                }
            }
        }

        let width = grid.width() as f32 * cs;
        let depth = grid.height() as f32 * cs;
        let mid_x = width / 2.0 - cs / 2.0;
        let mid_z = depth / 2.0 - cs / 2.0;
        boxes.extend([
            WallBox::new(Vec3::new(mid_x, h / 2.0, -t / 2.0), Vec3::new(width, h, t)),
            WallBox::new(Vec3::new(mid_x, h / 2.0, depth - cs + t / 2.0), Vec3::new(width, h, t)),
            WallBox::new(Vec3::new(-t / 2.0, h / 2.0, mid_z), Vec3::new(t, h, depth)),
            WallBox::new(Vec3::new(width - cs + t / 2.0, h / 2.0, mid_z), Vec3::new(t, h, depth)),
        ]);
        Self { boxes }
    }

    pub fn boxes(&self) -> &[WallBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl Raycast for WallSet {
    fn nearest_hit(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        self.boxes
            .iter()
            .filter_map(|b| b.ray_distance(origin, direction))
            .min_by(f32::total_cmp)
    }
}

/// True when a wall lies closer than `step + clearance` along `direction`.
pub fn is_blocked(
    walls: &impl Raycast,
    origin: Vec3,
    direction: Vec3,
    step: f32,
    clearance: f32,
) -> bool {
    walls
        .nearest_hit(origin, direction)
        .is_some_and(|d| d < step + clearance)
}

/// Outer playable rectangle on the floor plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn for_grid(grid: &Grid, config: &GameConfig) -> Self {
        let cs = config.cell_size;
        let inset = config.wall_thickness / 2.0;
        let r = config.player_radius;
        Self {
            min: Vec2::splat(inset + r),
            max: Vec2::new(
                grid.width() as f32 * cs - cs + inset - r,
                grid.height() as f32 * cs - cs + inset - r,
            ),
        }
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Removes and returns the first pickup within `reach`, scanning from the back.
pub fn collect_first(player: Vec2, pickups: &mut Vec<Pickup>, reach: f32) -> Option<Pickup> {
    let reach_sq = reach * reach;
    let index = (0..pickups.len())
        .rev()
        .find(|&i| pickups[i].planar().distance_squared(player) < reach_sq)?;
    Some(pickups.remove(index))
}

pub fn within_exit(player: Vec2, exit: Vec2, threshold: f32) -> bool {
    player.distance_squared(exit) < threshold * threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maze::CellPos;
    use crate::core::placement::{PickupKind, Placer};

    fn boxed_room() -> (Grid, WallSet, GameConfig) {
        let config = GameConfig::default();
        let grid = Grid::parse("###\n# #\n#E#\n").unwrap();
        let walls = WallSet::from_grid(&grid, &config);
        (grid, walls, config)
    }

    #[test]
    fn ray_hits_box_face() {
        let b = WallBox::new(Vec3::new(5.0, 1.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(b.ray_distance(Vec3::new(0.0, 1.0, 0.0), Vec3::X), Some(4.5));
        assert_eq!(b.ray_distance(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_X), None);
        assert_eq!(b.ray_distance(Vec3::new(0.0, 1.0, 3.0), Vec3::X), None);
        assert_eq!(b.ray_distance(Vec3::new(5.0, 1.0, 0.0), Vec3::X), Some(0.0));
    }

    #[test]
    fn single_room_blocks_all_but_the_exit_side() {
        let (_, walls, config) = boxed_room();
        // 3 walls around the room: 2 vertical + 1 horizontal, 2 beside the exit, 4 outer.
        assert_eq!(walls.len(), 9);

        let origin = Vec3::new(2.0, config.player_height * 0.5, 2.0);
        let clearance = config.collision_distance();
        let step = 0.7;
        assert!(is_blocked(&walls, origin, Vec3::NEG_Z, step, clearance));
        assert!(is_blocked(&walls, origin, Vec3::X, step, clearance));
        assert!(is_blocked(&walls, origin, Vec3::NEG_X, step, clearance));
        assert!(!is_blocked(&walls, origin, Vec3::Z, step, clearance));

        // Walls sit 0.95 away; a short step stays clear of them.
        assert!(!is_blocked(&walls, origin, Vec3::NEG_Z, 0.1, clearance));
        assert!(!is_blocked(&walls, origin, Vec3::X, 0.5, clearance));
        assert!(is_blocked(&walls, origin, Vec3::X, 0.56, clearance));
    }

    #[test]
    fn bounds_follow_outer_walls() {
        let (grid, _, config) = boxed_room();
        let bounds = Bounds::for_grid(&grid, &config);
        assert!(bounds.min.abs_diff_eq(Vec2::splat(0.35), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec2::splat(3.75), 1e-5));
        assert_eq!(bounds.clamp(Vec2::new(-3.0, 9.0)), Vec2::new(bounds.min.x, bounds.max.y));
        assert_eq!(bounds.clamp(Vec2::new(2.0, 2.0)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn collect_first_takes_one_at_a_time() {
        let placer = Placer::new(&GameConfig::default());
        let mut pickups = vec![
            placer.pickup_at(PickupKind::Key, CellPos::new(3, 3), None),
            placer.pickup_at(PickupKind::Key, CellPos::new(3, 3), None),
            placer.pickup_at(PickupKind::Key, CellPos::new(7, 7), None),
        ];
        let player = Vec2::new(6.1, 6.0);
        assert!(collect_first(player, &mut pickups, 0.65).is_some());
        assert_eq!(pickups.len(), 2);
        assert!(collect_first(player, &mut pickups, 0.65).is_some());
        assert_eq!(pickups.len(), 1);
        assert!(collect_first(player, &mut pickups, 0.65).is_none());
        assert_eq!(pickups[0].cell, CellPos::new(7, 7));
    }

    #[test]
    fn exit_proximity_is_strict() {
        let exit = Vec2::new(2.0, 4.0);
        assert!(within_exit(Vec2::new(2.0, 3.0), exit, 2.0 / 1.5));
        assert!(!within_exit(Vec2::new(2.0, 2.5), exit, 2.0 / 1.5));
    }
}
