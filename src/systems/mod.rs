//! Per-frame simulation systems.
//!
//! The whole frame is one sequential chain; no system runs concurrently with
//! another and every entity reads a consistent mid-frame world. Order per
//! frame:
//!
//! 1. `enemy_spawn_system` - probabilistic archetype spawn on the ring
//! 2. `player_system` - input, motion, collision, aim, firing, camera
//! 3. `grunt_system` / `soldier_system` / `kamikaze_system` - enemy AI
//! 4. `projectile_motion_system` - integration, expiry, wall impact
//! 5. `player_shot_hit_system` - player shots vs enemy bounds
//! 6. `enemy_shot_hit_system` - enemy shots vs the player bound
//! 7. `shot_cascade_system` - a dead grunt takes its shots with it
//! 8. `prune_enemies_system`, `prune_projectiles_system` - remove destroyed
//!
//! Restart handling (player death) lives above the schedule, in `SimWorld`.

pub mod cleanup;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod spawning;
pub mod weapon;

pub use cleanup::*;
pub use enemy::*;
pub use player::*;
pub use projectile::*;
pub use spawning::*;
pub use weapon::*;
