//! Typed scene objects handed to the renderer.
//!
//! The core never touches materials; it only says what an object *is*. The
//! exit marker switches between [`MaterialRole::ExitLocked`] and
//! [`MaterialRole::ExitUnlocked`] based on a single flag.
use glam::{Vec2, Vec3};

use crate::config::GameConfig;
use crate::core::collision::WallSet;
use crate::core::maze::Grid;
use crate::core::placement::{Pickup, PickupKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaterialRole {
    Wall,
    Floor,
    Ceiling,
    Collectible,
    Key,
    ExitLocked,
    ExitUnlocked,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SizeCategory {
    Box(Vec3),
    /// Horizontal plane, x by z.
    Plane(Vec2),
    Sphere(f32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub position: Vec3,
    pub size: SizeCategory,
    pub role: MaterialRole,
}

impl SceneObject {
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

pub fn wall_objects(walls: &WallSet) -> impl Iterator<Item = SceneObject> + '_ {
    walls.boxes().iter().map(|b| SceneObject {
        position: b.center,
        size: SizeCategory::Box(b.size()),
        role: MaterialRole::Wall,
    })
}

/// Floor at y = 0 and ceiling at wall height, both centred over the grid.
pub fn floor_and_ceiling(grid: &Grid, config: &GameConfig) -> [SceneObject; 2] {
    let cs = config.cell_size;
    let extent = Vec2::new(grid.width() as f32 * cs, grid.height() as f32 * cs);
    let center = extent / 2.0 - Vec2::splat(cs / 2.0);
    [
        SceneObject {
            position: Vec3::new(center.x, 0.0, center.y),
            size: SizeCategory::Plane(extent),
            role: MaterialRole::Floor,
        },
        SceneObject {
            position: Vec3::new(center.x, config.wall_height, center.y),
            size: SizeCategory::Plane(extent),
            role: MaterialRole::Ceiling,
        },
    ]
}

pub fn pickup_object(pickup: &Pickup, config: &GameConfig) -> SceneObject {
    let (radius, role) = match pickup.kind {
        PickupKind::Collectible => (config.collectible_radius, MaterialRole::Collectible),
        PickupKind::Key => (config.key_radius, MaterialRole::Key),
    };
    SceneObject { position: pickup.position, size: SizeCategory::Sphere(radius), role }
}

pub fn exit_marker(position: Vec3, unlocked: bool, config: &GameConfig) -> SceneObject {
    SceneObject {
        position,
        size: SizeCategory::Sphere(config.cell_size / 3.0),
        role: if unlocked { MaterialRole::ExitUnlocked } else { MaterialRole::ExitLocked },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maze::CellPos;
    use crate::core::placement::Placer;

    #[test]
    fn exit_marker_role_follows_flag() {
        let config = GameConfig::default();
        let at = Vec3::new(2.0, 0.8, 4.0);
        assert_eq!(exit_marker(at, false, &config).role, MaterialRole::ExitLocked);
        assert_eq!(exit_marker(at, true, &config).role, MaterialRole::ExitUnlocked);
    }

    #[test]
    fn pickups_and_walls_keep_their_geometry() {
        let config = GameConfig::default();
        let grid = Grid::parse("###\n# #\n#E#\n").unwrap();
        let walls = WallSet::from_grid(&grid, &config);
        let objects: Vec<_> = wall_objects(&walls).collect();
        assert_eq!(objects.len(), walls.len());
        assert!(objects.iter().all(|o| o.role == MaterialRole::Wall));

        let key = Placer::new(&config).pickup_at(PickupKind::Key, CellPos::new(1, 1), None);
        let obj = pickup_object(&key, &config);
        assert_eq!(obj.size, SizeCategory::Sphere(0.25));
        assert_eq!(obj.planar(), Vec2::new(2.0, 2.0));

        let [floor, ceiling] = floor_and_ceiling(&grid, &config);
        assert_eq!(floor.size, SizeCategory::Plane(Vec2::splat(6.0)));
        assert_eq!(floor.position, Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(ceiling.position.y, 2.5);
    }
}
