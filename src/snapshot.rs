//! Render-ready views of the simulation state.
//!
//! The `Snapshot` struct provides a serializable view of every moving object
//! plus the camera, and `TerrainView` extracts the solid cells covering a
//! pixel rect. Both consume the one-frame damage flashes they report: taking
//! a view clears the flash, so each flash is rendered at most once.

use crate::components::*;
use crate::grid::Grid;
use crate::math::Rect;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// The player avatar's state for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub aim_x: f32,
    pub aim_y: f32,
    pub radius: f32,
    pub weapon: String,
}

/// One enemy's state for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub aim_x: f32,
    pub aim_y: f32,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// One-frame damage flash; cleared by the snapshot that reports it.
    pub flash: bool,
}

/// One projectile's state for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub kind: String,
    /// `"player"` or `"enemy"`.
    pub owner: String,
    pub x: f32,
    pub y: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    /// Laser segment length; zero for point shots.
    pub length: f32,
    pub stuck: bool,
}

/// Complete serializable view of one simulation frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    pub camera_x: f32,
    pub camera_y: f32,
    /// Absent between a player death and the restart respawn.
    pub player: Option<PlayerSnapshot>,
    pub enemies: Vec<EnemySnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let camera = world
            .get_resource::<CameraState>()
            .copied()
            .unwrap_or_default();

        let mut player = None;
        {
            let mut query = world.query::<(&Player, &Position, &Aim, &Radius, &Weapon)>();
            if let Ok((_, pos, aim, radius, weapon)) = query.get_single(world) {
                player = Some(PlayerSnapshot {
                    x: pos.0.x,
                    y: pos.0.y,
                    aim_x: aim.0.x,
                    aim_y: aim.0.y,
                    radius: radius.value,
                    weapon: match weapon.kind {
                        WeaponKind::Standard => "standard".to_string(),
                        WeaponKind::Lasers => "lasers".to_string(),
                    },
                });
            }
        }

        let mut enemies = Vec::new();
        {
            let mut query = world.query::<(
                &EnemyKind,
                &Position,
                &Aim,
                &Radius,
                &Health,
                &mut DamageFlash,
            )>();
            for (kind, pos, aim, radius, health, mut flash) in query.iter_mut(world) {
                let kind_str = match kind {
                    EnemyKind::Grunt => "grunt",
                    EnemyKind::Soldier => "soldier",
                    EnemyKind::Kamikaze => "kamikaze",
                };
                enemies.push(EnemySnapshot {
                    kind: kind_str.to_string(),
                    x: pos.0.x,
                    y: pos.0.y,
                    aim_x: aim.0.x,
                    aim_y: aim.0.y,
                    radius: radius.value,
                    health: health.current,
                    max_health: health.max,
                    flash: flash.0,
                });
                flash.0 = false;
            }
        }

        let mut projectiles = Vec::new();
        {
            let mut query =
                world.query::<(&Projectile, &Position, &Velocity, Option<&PlayerShot>)>();
            for (projectile, pos, vel, player_shot) in query.iter(world) {
                let kind_str = match projectile.kind {
                    ProjectileKind::Standard => "standard",
                    ProjectileKind::Laser => "laser",
                    ProjectileKind::GruntShot => "grunt_shot",
                    ProjectileKind::SoldierShot => "soldier_shot",
                };
                let dir = vel.0.normalized();
                projectiles.push(ProjectileSnapshot {
                    kind: kind_str.to_string(),
                    owner: if player_shot.is_some() {
                        "player".to_string()
                    } else {
                        "enemy".to_string()
                    },
                    x: pos.0.x,
                    y: pos.0.y,
                    dir_x: dir.x,
                    dir_y: dir.y,
                    length: projectile.length,
                    stuck: projectile.stuck,
                });
            }
        }

        Self {
            tick,
            time,
            camera_x: camera.pos.x,
            camera_y: camera.pos.y,
            player,
            enemies,
            projectiles,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One solid cell inside a viewed rect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellView {
    pub cx: i32,
    pub cy: i32,
    pub density: f32,
    /// One-frame damage flash; cleared by the view that reports it.
    pub flash: bool,
}

/// The solid cells covering a pixel rect, for terrain rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainView {
    pub cells: Vec<CellView>,
}

impl TerrainView {
    /// Extract every solid cell the rect covers, consuming damage flashes on
    /// all visited cells.
    pub fn extract(grid: &mut Grid, rect: Rect) -> Self {
        let mut cells = Vec::new();
        grid.for_each_in_pixel_rect_mut(rect, |cx, cy, cell| {
            if cell.solid() {
                cells.push(CellView {
                    cx,
                    cy,
                    density: cell.density,
                    flash: cell.damaged_flash,
                });
            }
            cell.damaged_flash = false;
        });
        Self { cells }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_snapshot_reports_and_clears_enemy_flash() {
        let mut world = World::new();
        world.insert_resource(CameraState::default());
        let soldier = world
            .spawn(EnemyBundle::soldier(Vec2::new(10.0, 20.0), Vec2::ZERO))
            .id();
        world.get_mut::<DamageFlash>(soldier).unwrap().0 = true;

        let first = Snapshot::from_world(&mut world, 1, 0.1);
        assert_eq!(first.enemies.len(), 1);
        assert_eq!(first.enemies[0].kind, "soldier");
        assert!(first.enemies[0].flash);

        let second = Snapshot::from_world(&mut world, 2, 0.2);
        assert!(!second.enemies[0].flash);
    }

    #[test]
    fn test_snapshot_distinguishes_shot_owners() {
        let mut world = World::new();
        world.insert_resource(CameraState::default());
        world.spawn((
            ProjectileBundle::new(
                ProjectileKind::Standard,
                Vec2::ZERO,
                Vec2::new(1.0, 0.0),
                0.0,
            ),
            PlayerShot,
        ));
        world.spawn((
            ProjectileBundle::new(
                ProjectileKind::GruntShot,
                Vec2::ZERO,
                Vec2::new(0.0, 1.0),
                0.0,
            ),
            EnemyShot,
        ));
        let snapshot = Snapshot::from_world(&mut world, 0, 0.0);
        let owners: Vec<&str> = snapshot
            .projectiles
            .iter()
            .map(|p| p.owner.as_str())
            .collect();
        assert!(owners.contains(&"player"));
        assert!(owners.contains(&"enemy"));
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut world = World::new();
        world.insert_resource(CameraState::default());
        world.spawn(PlayerBundle::new(Vec2::new(5.0, 6.0)));
        let snapshot = Snapshot::from_world(&mut world, 3, 1.5);
        let json = snapshot.to_json();
        assert!(json.contains("\"tick\":3"));
        assert!(json.contains("\"standard\""));
    }

    #[test]
    fn test_terrain_view_reports_and_clears_cell_flash() {
        let mut grid = Grid::new(10, 10, 25.0, 25.0);
        grid.set_density(2, 2, 1.0);
        grid.damage_cell(2, 2, 0.25);
        let rect = Rect::new(0.0, 0.0, 250.0, 250.0);

        let first = TerrainView::extract(&mut grid, rect);
        assert_eq!(first.cells.len(), 1);
        assert_eq!((first.cells[0].cx, first.cells[0].cy), (2, 2));
        assert!((first.cells[0].density - 0.75).abs() < 1e-6);
        assert!(first.cells[0].flash);

        let second = TerrainView::extract(&mut grid, rect);
        assert!(!second.cells[0].flash);
    }
}
