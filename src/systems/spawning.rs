//! Probabilistic enemy spawning on a ring around the player.

use crate::components::*;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;

/// Spawn pacing: the per-frame roll probability plus the total spawn count
/// that slowly escalates it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnDirector {
    /// Per-frame spawn probability.
    pub freq: f32,
    /// Enemies spawned since the last restart.
    pub count: u32,
}

impl SpawnDirector {
    pub fn new(freq: f32) -> Self {
        Self { freq, count: 0 }
    }
}

/// Fresh grunt AI state with spawn-time timers.
pub fn grunt_state(now: f32, rng: &mut SimRng) -> Grunt {
    Grunt {
        timeout: now + rng.range(Grunt::TIMEOUT_MIN, Grunt::TIMEOUT_MAX),
        warmup: now + Grunt::WARMUP,
        fire_time: 0.0,
        fire_sequence: 0,
        mitosis_at: None,
    }
}

/// Fresh soldier AI state with spawn-time timers.
pub fn soldier_state(now: f32, rng: &mut SimRng) -> Soldier {
    Soldier {
        timeout: now + rng.range(Soldier::TIMEOUT_MIN, Soldier::TIMEOUT_MAX),
        warmup: now + Soldier::WARMUP,
        fire_time: 0.0,
    }
}

/// Fresh kamikaze AI state with spawn-time timers.
pub fn kamikaze_state(now: f32, rng: &mut SimRng) -> Kamikaze {
    Kamikaze {
        timeout: now + rng.range(Kamikaze::TIMEOUT_MIN, Kamikaze::TIMEOUT_MAX),
        warmup: now + Kamikaze::WARMUP,
        chasing: false,
    }
}

/// Rolls the spawn chance once per frame. On success an archetype is drawn
/// (10% soldier, 18% grunt, 72% kamikaze) and placed on the spawn ring around
/// the player with a random initial heading. Every 10th spawn nudges the
/// probability up, scaled down by how many enemies have already appeared.
pub fn enemy_spawn_system(
    config: Res<SimConfig>,
    clock: Res<Clock>,
    mut director: ResMut<SpawnDirector>,
    mut rng: ResMut<SimRng>,
    player: Query<&Position, With<Player>>,
    mut commands: Commands,
) {
    let Ok(player_pos) = player.get_single() else {
        return;
    };
    if !rng.chance(director.freq) {
        return;
    }

    let now = clock.time;
    let pos = player_pos.0.add_scaled(rng.unit_dir(), config.spawn_ring_radius);

    if rng.chance(0.1) {
        let vel = rng.unit_dir() * Soldier::MAX_SPEED;
        commands.spawn((EnemyBundle::soldier(pos, vel), soldier_state(now, &mut rng)));
    } else if rng.chance(0.2) {
        let vel = rng.unit_dir() * Grunt::MAX_SPEED;
        commands.spawn((EnemyBundle::grunt(pos, vel), grunt_state(now, &mut rng)));
    } else {
        let vel = rng.unit_dir() * Kamikaze::WANDER_SPEED;
        commands.spawn((EnemyBundle::kamikaze(pos, vel), kamikaze_state(now, &mut rng)));
    }

    director.count += 1;
    if director.count % 10 == 0 {
        director.freq += 0.1 / director.count as f32;
    }
}
