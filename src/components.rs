//! ECS components, bundles and core resources.
//!
//! Components are pure data; all behavior lives in the systems. Archetype
//! constants (speeds, ranges, damage amounts) sit next to the component that
//! uses them.

use crate::math::Vec2;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE RESOURCES
// ============================================================================

/// Static simulation configuration.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Global speed multiplier applied to every frame's dt.
    pub speed: f32,
    /// Target frame rate; the very first frame uses `1 / target_fps` as dt.
    pub target_fps: f32,
    /// Grid side length in cells.
    pub grid_cells: usize,
    /// Room side length in cells.
    pub room_cells: usize,
    /// Pixel footprint of a cell (square).
    pub cell_size: f32,
    /// Base per-frame enemy spawn probability.
    pub spawn_freq: f32,
    /// Radius of the spawn ring around the player.
    pub spawn_ring_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed: 0.8,
            target_fps: 60.0,
            grid_cells: 1000,
            room_cells: 25,
            cell_size: 25.0,
            spawn_freq: 1.0 / 40.0,
            spawn_ring_radius: 1000.0,
        }
    }
}

/// Frame clock: absolute simulation time and the current frame's dt, both
/// already scaled by the configured speed multiplier.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Clock {
    pub time: f32,
    pub dt: f32,
}

/// Frame-level control flags raised by systems and consumed by `SimWorld`.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameFlow {
    /// The player took damage this frame; the world restarts after updates.
    pub restart_requested: bool,
    /// The quit key was pressed; the host should stop scheduling ticks.
    pub exit_requested: bool,
}

/// Camera framing state, smoothed by the player system. Pure output for the
/// host; never read back by collision or AI.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CameraState {
    pub pos: Vec2,
}

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World-space position in pixels.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Velocity in pixels per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Current facing/fire direction, unit length or zero.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Aim(pub Vec2);

/// Circular broad-phase bound. The squared radius is precomputed because
/// every overlap test is a squared-distance comparison.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Radius {
    pub value: f32,
    pub squared: f32,
}

impl Radius {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            squared: value * value,
        }
    }
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Health pool. Enemies are marked destroyed when it reaches zero.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

/// Marker for objects scheduled for removal. Inserted by the systems that
/// kill things, consumed by the prune pass at the end of the frame.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Destroyed;

/// One-frame white flash raised by damage, consumed by the next snapshot.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DamageFlash(pub bool);

// ============================================================================
// PLAYER
// ============================================================================

/// The player avatar. Holds the display-smoothed camera anchor, which trails
/// a point ahead of the velocity and drives camera framing only.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player {
    pub camera_anchor: Vec2,
}

impl Player {
    pub const RADIUS: f32 = 10.0;
    pub const MAX_SPEED: f32 = 150.0;
    pub const WALL_DAMAGE: f32 = 0.05;
    /// How far ahead of the velocity the camera anchor aims.
    pub const CAMERA_LOOKAHEAD: f32 = 400.0;
    /// Camera anchor lerp rate, scaled by dt.
    pub const CAMERA_LERP_RATE: f32 = 1.5;
    /// Blend factor between the anchor and the cursor.
    pub const CAMERA_CURSOR_BLEND: f32 = 0.3;
    /// Camera only re-centers once drift exceeds this many units.
    pub const CAMERA_SNAP_THRESHOLD: f32 = 10.0;
}

/// Active weapon selection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Standard,
    Lasers,
}

/// Weapon cadence state.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Weapon {
    pub kind: WeaponKind,
    /// Absolute time the weapon may fire again.
    pub fire_time: f32,
    /// Shot counter; the laser volley triggers every 5th shot.
    pub sequence: u32,
}

impl Weapon {
    pub const FIRE_INTERVAL: f32 = 0.025;
    pub const VOLLEY_SIZE: usize = 5;
    pub const VOLLEY_RANGE_SQ: f32 = 90_000.0;
    pub const VOLLEY_JITTER: f32 = 30.0;
}

// ============================================================================
// ENEMIES
// ============================================================================

/// Enemy archetype tag; also serves as the "is an enemy" query filter.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Soldier,
    Kamikaze,
}

/// Grunt AI state: fast wanderer that fires slow shots in close range and
/// clones itself if left alive after its first volley.
#[derive(Component, Debug, Clone)]
pub struct Grunt {
    /// Absolute time of the next wander re-target.
    pub timeout: f32,
    /// Absolute time firing becomes allowed.
    pub warmup: f32,
    /// Absolute time of the next permitted shot.
    pub fire_time: f32,
    pub fire_sequence: u32,
    /// Armed on a successful shot; expiry spawns a clone.
    pub mitosis_at: Option<f32>,
}

impl Grunt {
    pub const MAX_HEALTH: f32 = 1.0;
    pub const RADIUS: f32 = 12.0;
    pub const MAX_SPEED: f32 = 60.0;
    pub const FIRE_INTERVAL: f32 = 0.1;
    pub const DETECT_RANGE_SQ: f32 = 90_000.0;
    pub const WARMUP: f32 = 2.0;
    pub const MITOSIS_DELAY: f32 = 5.0;
    pub const TIMEOUT_MIN: f32 = 0.5;
    pub const TIMEOUT_MAX: f32 = 2.5;
}

/// Soldier AI state: tougher wanderer with a leading-target aim.
#[derive(Component, Debug, Clone)]
pub struct Soldier {
    pub timeout: f32,
    pub warmup: f32,
    pub fire_time: f32,
}

impl Soldier {
    pub const MAX_HEALTH: f32 = 10.0;
    pub const RADIUS: f32 = 15.0;
    pub const MAX_SPEED: f32 = 60.0;
    pub const FIRE_INTERVAL: f32 = 0.7;
    pub const DETECT_RANGE_SQ: f32 = 250_000.0;
    pub const WARMUP: f32 = 2.0;
    pub const TIMEOUT_MIN: f32 = 0.8;
    pub const TIMEOUT_MAX: f32 = 3.8;
}

/// Kamikaze AI state: wanders until the player comes close, then chases
/// forever. `chasing` is a one-way transition.
#[derive(Component, Debug, Clone)]
pub struct Kamikaze {
    pub timeout: f32,
    pub warmup: f32,
    pub chasing: bool,
}

impl Kamikaze {
    pub const MAX_HEALTH: f32 = 25.0;
    pub const RADIUS: f32 = 15.0;
    pub const WANDER_SPEED: f32 = 60.0;
    pub const CHASE_SPEED: f32 = 125.0;
    pub const CHASE_RANGE_SQ: f32 = 150_000.0;
    pub const CONTACT_RANGE_SQ: f32 = 100.0;
    pub const WALL_DAMAGE: f32 = 0.035;
    pub const BOUNCE_LEN: f32 = 5.0;
    pub const RECOIL_FACTOR: f32 = -0.3;
    pub const WARMUP: f32 = 2.0;
    pub const TIMEOUT_MIN: f32 = 0.8;
    pub const TIMEOUT_MAX: f32 = 3.8;
}

/// Wander re-target bias toward the player, shared by all archetypes.
pub const WANDER_PLAYER_BIAS: f32 = 0.2;

// ============================================================================
// PROJECTILES
// ============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Standard,
    Laser,
    GruntShot,
    SoldierShot,
}

impl ProjectileKind {
    pub fn max_speed(&self) -> f32 {
        match self {
            ProjectileKind::Standard | ProjectileKind::Laser => 950.0,
            ProjectileKind::GruntShot => 150.0,
            ProjectileKind::SoldierShot => 250.0,
        }
    }

    pub fn lifetime(&self) -> f32 {
        match self {
            ProjectileKind::Standard => 1.0,
            ProjectileKind::Laser => 3.0,
            ProjectileKind::GruntShot | ProjectileKind::SoldierShot => 5.0,
        }
    }

    pub fn wall_damage(&self) -> f32 {
        match self {
            ProjectileKind::Standard => 0.1,
            ProjectileKind::Laser | ProjectileKind::GruntShot => 0.025,
            ProjectileKind::SoldierShot => 1.0,
        }
    }

    pub fn enemy_damage(&self) -> f32 {
        match self {
            ProjectileKind::Laser => 2.0,
            _ => 1.0,
        }
    }
}

/// A projectile in flight. `expires_at` is absolute: spawn time + lifetime.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub expires_at: f32,
    /// Laser only: frozen in a wall, no longer moving or colliding.
    pub stuck: bool,
    /// Laser only: rendered segment half-length.
    pub length: f32,
}

impl Projectile {
    /// Projectiles spawn this far ahead of the shooter along the fire dir.
    pub const MUZZLE_OFFSET: f32 = 10.0;
    /// Half-extent of the point-collision AABB around the tip.
    pub const TIP_HALF: f32 = 1.0;
    /// Chance for a laser wall hit to stick instead of destruct.
    pub const LASER_STICK_CHANCE: f32 = 0.05;
    /// Maximum lifetime bonus granted when a laser sticks.
    pub const LASER_STICK_BONUS: f32 = 3.0;

    pub fn new(kind: ProjectileKind, now: f32) -> Self {
        Self {
            kind,
            expires_at: now + kind.lifetime(),
            stuck: false,
            length: 0.0,
        }
    }
}

/// Marker: fired by the player, collides with enemies.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerShot;

/// Marker: fired by an enemy, collides with the player.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct EnemyShot;

/// Back-reference to the enemy that fired this shot. Present on grunt shots
/// only; the owner's death cascades to them.
#[derive(Component, Debug, Clone, Copy)]
pub struct FiredBy(pub Entity);

// ============================================================================
// BUNDLES
// ============================================================================

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub position: Position,
    pub velocity: Velocity,
    pub aim: Aim,
    pub radius: Radius,
    pub weapon: Weapon,
}

impl PlayerBundle {
    pub fn new(pos: Vec2) -> Self {
        Self {
            player: Player { camera_anchor: pos },
            position: Position(pos),
            velocity: Velocity::default(),
            aim: Aim::default(),
            radius: Radius::new(Player::RADIUS),
            weapon: Weapon::default(),
        }
    }
}

#[derive(Bundle)]
pub struct EnemyBundle {
    pub kind: EnemyKind,
    pub position: Position,
    pub velocity: Velocity,
    pub aim: Aim,
    pub health: Health,
    pub radius: Radius,
    pub flash: DamageFlash,
}

impl EnemyBundle {
    fn new(kind: EnemyKind, pos: Vec2, vel: Vec2, max_health: f32, radius: f32) -> Self {
        Self {
            kind,
            position: Position(pos),
            velocity: Velocity(vel),
            aim: Aim(vel.normalized()),
            health: Health::new(max_health),
            radius: Radius::new(radius),
            flash: DamageFlash(false),
        }
    }

    pub fn grunt(pos: Vec2, vel: Vec2) -> Self {
        Self::new(EnemyKind::Grunt, pos, vel, Grunt::MAX_HEALTH, Grunt::RADIUS)
    }

    pub fn soldier(pos: Vec2, vel: Vec2) -> Self {
        Self::new(
            EnemyKind::Soldier,
            pos,
            vel,
            Soldier::MAX_HEALTH,
            Soldier::RADIUS,
        )
    }

    pub fn kamikaze(pos: Vec2, vel: Vec2) -> Self {
        Self::new(
            EnemyKind::Kamikaze,
            pos,
            vel,
            Kamikaze::MAX_HEALTH,
            Kamikaze::RADIUS,
        )
    }
}

#[derive(Bundle)]
pub struct ProjectileBundle {
    pub projectile: Projectile,
    pub position: Position,
    pub velocity: Velocity,
}

impl ProjectileBundle {
    /// Build a shot leaving `origin` along the unit direction `dir`.
    pub fn new(kind: ProjectileKind, origin: Vec2, dir: Vec2, now: f32) -> Self {
        Self {
            projectile: Projectile::new(kind, now),
            position: Position(origin.add_scaled(dir, Projectile::MUZZLE_OFFSET)),
            velocity: Velocity(dir.with_len(kind.max_speed())),
        }
    }
}
