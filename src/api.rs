//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer (or any other
//! host) to interact with the simulation.
//!
//! ## Variable Timestep
//!
//! `step(dt)` runs exactly one frame with the host-supplied delta, scaled by
//! the configured speed multiplier. The very first frame substitutes the
//! nominal `1 / target_fps` delta since the host has no previous frame to
//! measure against.
//!
//! ## Restart and Exit
//!
//! Systems never tear the world down mid-frame; they raise flags on
//! `GameFlow` instead. After the frame, `step` consumes the flags: an exit
//! stops the world (`is_running()` turns false and further steps no-op), a
//! restart regenerates the terrain and respawns the player while simulation
//! time keeps counting.

use crate::components::*;
use crate::input::InputState;
use crate::math::{Rect, Vec2};
use crate::rng::SimRng;
use crate::snapshot::{Snapshot, TerrainView};
use crate::systems::*;
use crate::worldgen::Arena;
use bevy_ecs::prelude::*;

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the simulation
/// - Feeding input and stepping the simulation forward
/// - Extracting render snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    running: bool,
    first_frame: bool,
    restarts: u32,
    last_frame_restarted: bool,
}

impl SimWorld {
    /// Create a new simulation world with an entropy-seeded random stream.
    pub fn new() -> Self {
        Self::build(SimConfig::default(), SimRng::new())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        Self::build(config, SimRng::new())
    }

    /// Create a reproducible simulation world from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::build(SimConfig::default(), SimRng::seeded(seed))
    }

    /// Reproducible world with custom configuration.
    pub fn seeded_with_config(seed: u64, config: SimConfig) -> Self {
        Self::build(config, SimRng::seeded(seed))
    }

    fn build(config: SimConfig, mut rng: SimRng) -> Self {
        let mut world = World::new();

        let mut arena = Arena::new(config.grid_cells, config.room_cells, config.cell_size);
        arena.generate(&mut rng);
        let spawn = Vec2::new(arena.grid.total_w() / 2.0, arena.grid.total_h() / 2.0);

        world.insert_resource(Clock::default());
        world.insert_resource(GameFlow::default());
        world.insert_resource(CameraState { pos: spawn });
        world.insert_resource(InputState::new());
        world.insert_resource(SpawnDirector::new(config.spawn_freq));
        world.insert_resource(rng);
        world.insert_resource(arena);
        world.insert_resource(config);
        world.spawn(PlayerBundle::new(spawn));

        // One sequential chain: every system sees the previous one's writes,
        // including deferred spawns and despawns.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                enemy_spawn_system,
                player_system,
                grunt_system,
                soldier_system,
                kamikaze_system,
                projectile_motion_system,
                player_shot_hit_system,
                enemy_shot_hit_system,
                shot_cascade_system,
                prune_enemies_system,
                prune_projectiles_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            running: true,
            first_frame: true,
            restarts: 0,
            last_frame_restarted: false,
        }
    }

    /// Step the simulation forward by `dt` seconds of host time.
    ///
    /// No-ops once the world has stopped running.
    pub fn step(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        let (speed, nominal_dt) = {
            let config = self.world.resource::<SimConfig>();
            (config.speed, 1.0 / config.target_fps)
        };
        let dt = if self.first_frame {
            self.first_frame = false;
            nominal_dt
        } else {
            dt
        } * speed;

        self.time += dt;
        {
            let mut clock = self.world.resource_mut::<Clock>();
            clock.time = self.time;
            clock.dt = dt;
        }
        *self.world.resource_mut::<GameFlow>() = GameFlow::default();

        self.schedule.run(&mut self.world);
        self.tick += 1;

        let flow = *self.world.resource::<GameFlow>();
        self.last_frame_restarted = flow.restart_requested;
        if flow.exit_requested {
            self.running = false;
        } else if flow.restart_requested {
            self.restart();
        }
    }

    /// Tear down the run: despawn everything, regenerate the terrain and
    /// respawn the player at the world center. Simulation time and the
    /// random stream carry across.
    fn restart(&mut self) {
        let entities: Vec<Entity> = self.world.iter_entities().map(|e| e.id()).collect();
        for entity in entities {
            self.world.despawn(entity);
        }

        self.world.resource_scope(|world, mut arena: Mut<Arena>| {
            let mut rng = world.resource_mut::<SimRng>();
            arena.generate(&mut rng);
        });

        let (spawn, spawn_freq) = {
            let arena = self.world.resource::<Arena>();
            let config = self.world.resource::<SimConfig>();
            (
                Vec2::new(arena.grid.total_w() / 2.0, arena.grid.total_h() / 2.0),
                config.spawn_freq,
            )
        };
        self.world.resource_mut::<CameraState>().pos = spawn;
        *self.world.resource_mut::<SpawnDirector>() = SpawnDirector::new(spawn_freq);
        self.world.spawn(PlayerBundle::new(spawn));
        self.restarts += 1;
    }

    /// Whether the world is still running; false after the quit key.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Did the last completed step end in a player death?
    pub fn must_restart(&self) -> bool {
        self.last_frame_restarted
    }

    /// How many times the world has restarted.
    pub fn restart_count(&self) -> u32 {
        self.restarts
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Press or release a named key/button (`"w" "a" "s" "d" "p" "mouse0"`).
    pub fn set_key(&mut self, name: &str, down: bool) {
        self.world.resource_mut::<InputState>().set_down(name, down);
    }

    /// Move the world-space cursor.
    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.world
            .resource_mut::<InputState>()
            .set_cursor(Vec2::new(x, y));
    }

    /// Swap the player's weapon. Cadence state resets with it.
    pub fn set_weapon(&mut self, kind: WeaponKind) {
        let mut query = self.world.query_filtered::<&mut Weapon, With<Player>>();
        if let Ok(mut weapon) = query.get_single_mut(&mut self.world) {
            *weapon = Weapon {
                kind,
                ..Weapon::default()
            };
        }
    }

    /// Teleport the player, re-centering its camera anchor and the camera.
    pub fn set_player_pos(&mut self, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        let mut query =
            self.world
                .query_filtered::<(&mut Player, &mut Position), With<Player>>();
        if let Ok((mut player, mut position)) = query.get_single_mut(&mut self.world) {
            position.0 = pos;
            player.camera_anchor = pos;
        }
        self.world.resource_mut::<CameraState>().pos = pos;
    }

    /// Spawn one enemy of the given archetype at a position, with spawn-time
    /// timers and a random initial heading.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, x: f32, y: f32) {
        let now = self.world.resource::<Clock>().time;
        let pos = Vec2::new(x, y);
        self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            match kind {
                EnemyKind::Grunt => {
                    let vel = rng.unit_dir() * Grunt::MAX_SPEED;
                    world.spawn((EnemyBundle::grunt(pos, vel), grunt_state(now, &mut rng)));
                }
                EnemyKind::Soldier => {
                    let vel = rng.unit_dir() * Soldier::MAX_SPEED;
                    world.spawn((EnemyBundle::soldier(pos, vel), soldier_state(now, &mut rng)));
                }
                EnemyKind::Kamikaze => {
                    let vel = rng.unit_dir() * Kamikaze::WANDER_SPEED;
                    world.spawn((
                        EnemyBundle::kamikaze(pos, vel),
                        kamikaze_state(now, &mut rng),
                    ));
                }
            };
        });
    }

    /// Get the number of live enemies.
    pub fn enemy_count(&mut self) -> usize {
        let mut query = self.world.query::<&EnemyKind>();
        query.iter(&self.world).count()
    }

    /// Get a snapshot of the current simulation state. Consumes the
    /// one-frame damage flashes it reports.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json()
    }

    /// Get the solid terrain cells covering a pixel rect, consuming their
    /// damage flashes.
    pub fn terrain_view(&mut self, rect: Rect) -> TerrainView {
        let mut arena = self.world.resource_mut::<Arena>();
        TerrainView::extract(&mut arena.grid, rect)
    }

    /// Get the arena reference.
    pub fn arena(&self) -> &Arena {
        self.world.resource::<Arena>()
    }

    /// Get mutable arena access (for scenario setup in tests and demos).
    pub fn arena_mut(&mut self) -> Mut<'_, Arena> {
        self.world.resource_mut::<Arena>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
