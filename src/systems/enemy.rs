//! Enemy AI systems.
//!
//! All three archetypes share the wander model: drift on a fixed heading
//! until a terrain collision or a timeout forces a re-target, drawn as a
//! random disc point biased slightly toward the player.

use crate::components::*;
use crate::math::{Rect, Vec2};
use crate::rng::SimRng;
use crate::systems::spawning::grunt_state;
use crate::worldgen::Arena;
use bevy_ecs::prelude::*;

/// New wander heading: random disc point plus a small pull toward the
/// player, scaled to the archetype's speed.
fn wander_heading(rng: &mut SimRng, pos: Vec2, player_pos: Vec2, speed: f32) -> Vec2 {
    let bias = (player_pos - pos).with_len(WANDER_PLAYER_BIAS);
    (rng.in_unit_disc() + bias).with_len(speed)
}

/// Grunts wander, fire slow shots while the player is in detection range,
/// and arm a mitosis timer on their first shot: survive long enough and a
/// clone appears.
pub fn grunt_system(
    clock: Res<Clock>,
    arena: Res<Arena>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
    mut grunts: Query<
        (Entity, &mut Grunt, &mut Position, &mut Velocity, &mut Aim),
        Without<Player>,
    >,
    players: Query<&Position, With<Player>>,
) {
    let Ok(player_pos) = players.get_single() else {
        return;
    };
    let ppos = player_pos.0;
    let now = clock.time;
    let dt = clock.dt;

    for (entity, mut grunt, mut pos, mut vel, mut aim) in grunts.iter_mut() {
        if let Some(at) = grunt.mitosis_at {
            if at < now {
                let clone_vel = rng.unit_dir() * Grunt::MAX_SPEED;
                commands.spawn((
                    EnemyBundle::grunt(pos.0, clone_vel),
                    grunt_state(now, &mut rng),
                ));
                grunt.mitosis_at = None;
            }
        }

        pos.0 = pos.0.add_scaled(vel.0, dt);
        let collision = arena
            .grid
            .collision_vector(Rect::around(pos.0, Grunt::RADIUS));
        if let Some(push) = collision {
            pos.0 = pos.0 + push;
        }
        if collision.is_some() || grunt.timeout < now {
            vel.0 = wander_heading(&mut rng, pos.0, ppos, Grunt::MAX_SPEED);
            aim.0 = vel.0.normalized();
            grunt.timeout = now + rng.range(Grunt::TIMEOUT_MIN, Grunt::TIMEOUT_MAX);
        }

        if pos.0.dist_sq(ppos) < Grunt::DETECT_RANGE_SQ {
            aim.0 = (ppos - pos.0).normalized();
            if grunt.warmup < now && grunt.fire_time < now {
                if grunt.mitosis_at.is_none() {
                    grunt.mitosis_at = Some(now + Grunt::MITOSIS_DELAY);
                }
                commands.spawn((
                    ProjectileBundle::new(ProjectileKind::GruntShot, pos.0, aim.0, now),
                    EnemyShot,
                    FiredBy(entity),
                ));
                grunt.fire_time = now + Grunt::FIRE_INTERVAL;
                grunt.fire_sequence += 1;
                // Every 5th shot pauses for three extra intervals.
                if grunt.fire_sequence % 5 == 0 {
                    grunt.fire_time += 3.0 * Grunt::FIRE_INTERVAL;
                }
            }
        }
    }
}

/// Soldiers wander and, in their larger detection range, fire leading shots:
/// the aim point extends the player position along its velocity by a noisy
/// distance-scaled factor.
pub fn soldier_system(
    clock: Res<Clock>,
    arena: Res<Arena>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
    mut soldiers: Query<
        (&mut Soldier, &mut Position, &mut Velocity, &mut Aim),
        Without<Player>,
    >,
    players: Query<(&Position, &Velocity), With<Player>>,
) {
    let Ok((player_pos, player_vel)) = players.get_single() else {
        return;
    };
    let ppos = player_pos.0;
    let pvel = player_vel.0;
    let now = clock.time;
    let dt = clock.dt;

    for (mut soldier, mut pos, mut vel, mut aim) in soldiers.iter_mut() {
        pos.0 = pos.0.add_scaled(vel.0, dt);
        let collision = arena
            .grid
            .collision_vector(Rect::around(pos.0, Soldier::RADIUS));
        if let Some(push) = collision {
            pos.0 = pos.0 + push;
        }
        if collision.is_some() || soldier.timeout < now {
            vel.0 = wander_heading(&mut rng, pos.0, ppos, Soldier::MAX_SPEED);
            aim.0 = vel.0.normalized();
            soldier.timeout = now + rng.range(Soldier::TIMEOUT_MIN, Soldier::TIMEOUT_MAX);
        }

        if pos.0.dist_sq(ppos) < Soldier::DETECT_RANGE_SQ {
            let dist = pos.0.dist(ppos);
            let lead = dist / ProjectileKind::SoldierShot.max_speed()
                * (0.5 + rng.f32() * 0.25);
            let predicted = ppos
                .add_scaled(pvel, lead)
                .add_scaled(rng.in_unit_disc(), 20.0);
            aim.0 = (predicted - pos.0).normalized();
            if soldier.warmup < now && soldier.fire_time < now {
                commands.spawn((
                    ProjectileBundle::new(ProjectileKind::SoldierShot, pos.0, aim.0, now),
                    EnemyShot,
                ));
                soldier.fire_time = now + Soldier::FIRE_INTERVAL;
            }
        }
    }
}

/// Kamikazes wander until the player comes close enough after warmup, then
/// chase forever. Wall impacts damage every covered cell and bounce the
/// kamikaze back; reaching the player ends the run.
pub fn kamikaze_system(
    clock: Res<Clock>,
    mut arena: ResMut<Arena>,
    mut rng: ResMut<SimRng>,
    mut flow: ResMut<GameFlow>,
    mut kamikazes: Query<(&mut Kamikaze, &mut Position, &mut Velocity), Without<Player>>,
    players: Query<&Position, With<Player>>,
) {
    let Ok(player_pos) = players.get_single() else {
        return;
    };
    let ppos = player_pos.0;
    let now = clock.time;
    let dt = clock.dt;

    for (mut kamikaze, mut pos, mut vel) in kamikazes.iter_mut() {
        pos.0 = pos.0.add_scaled(vel.0, dt);
        let bound = Rect::around(pos.0, Kamikaze::RADIUS);
        let collision = arena.grid.collision_vector(bound);
        if let Some(push) = collision {
            arena.grid.damage_pixel_rect(bound, Kamikaze::WALL_DAMAGE);
            pos.0 = pos.0 + push.with_len(Kamikaze::BOUNCE_LEN);
        }

        if !kamikaze.chasing {
            if collision.is_some() || kamikaze.timeout < now {
                vel.0 = wander_heading(&mut rng, pos.0, ppos, Kamikaze::WANDER_SPEED);
                kamikaze.timeout = now + rng.range(Kamikaze::TIMEOUT_MIN, Kamikaze::TIMEOUT_MAX);
            }
            if kamikaze.warmup < now && pos.0.dist_sq(ppos) < Kamikaze::CHASE_RANGE_SQ {
                kamikaze.chasing = true;
            }
        }
        if kamikaze.chasing {
            vel.0 = (ppos - pos.0).with_len(Kamikaze::CHASE_SPEED);
        }

        if pos.0.dist_sq(ppos) < Kamikaze::CONTACT_RANGE_SQ {
            flow.restart_requested = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::spawning::{kamikaze_state, soldier_state};

    fn ai_world(player_at: Vec2) -> (World, Schedule) {
        let mut world = World::new();
        let mut arena = Arena::new(100, 25, 25.0);
        arena.grid.fill(0.0);
        world.insert_resource(Clock {
            time: 10.0,
            dt: 0.02,
        });
        world.insert_resource(GameFlow::default());
        world.insert_resource(arena);
        world.insert_resource(SimRng::seeded(21));
        world.spawn(PlayerBundle::new(player_at));
        let mut schedule = Schedule::default();
        schedule.add_systems((grunt_system, soldier_system, kamikaze_system).chain());
        (world, schedule)
    }

    #[test]
    fn test_grunt_fires_only_in_detection_range() {
        // Far grunt: player over 300 units away, never a shot.
        let (mut world, mut schedule) = ai_world(Vec2::new(2000.0, 2000.0));
        world.spawn((
            EnemyBundle::grunt(Vec2::new(100.0, 100.0), Vec2::ZERO),
            Grunt {
                timeout: f32::INFINITY,
                warmup: 0.0,
                fire_time: 0.0,
                fire_sequence: 0,
                mitosis_at: None,
            },
        ));
        for _ in 0..50 {
            schedule.run(&mut world);
        }
        let mut shots = world.query_filtered::<(), With<EnemyShot>>();
        assert_eq!(shots.iter(&world).count(), 0);
    }

    #[test]
    fn test_grunt_in_range_fires_and_arms_mitosis() {
        let (mut world, mut schedule) = ai_world(Vec2::new(1250.0, 1250.0));
        let grunt = world
            .spawn((
                EnemyBundle::grunt(Vec2::new(1400.0, 1250.0), Vec2::ZERO),
                Grunt {
                    timeout: f32::INFINITY,
                    warmup: 0.0,
                    fire_time: 0.0,
                    fire_sequence: 0,
                    mitosis_at: None,
                },
            ))
            .id();
        schedule.run(&mut world);
        let mut shots = world.query::<(&FiredBy, &Velocity)>();
        let fired: Vec<_> = shots.iter(&world).collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0 .0, grunt);
        // Shot heads toward the player.
        assert!(fired[0].1 .0.x < 0.0);
        let state = world.get::<Grunt>(grunt).unwrap();
        assert!(state.mitosis_at.is_some());
        assert!((state.mitosis_at.unwrap() - (10.0 + Grunt::MITOSIS_DELAY)).abs() < 1e-4);
    }

    #[test]
    fn test_grunt_mitosis_spawns_clone_and_disarms() {
        let (mut world, mut schedule) = ai_world(Vec2::new(2000.0, 2000.0));
        let grunt = world
            .spawn((
                EnemyBundle::grunt(Vec2::new(100.0, 100.0), Vec2::ZERO),
                Grunt {
                    timeout: f32::INFINITY,
                    warmup: f32::INFINITY,
                    fire_time: 0.0,
                    fire_sequence: 0,
                    mitosis_at: Some(5.0),
                },
            ))
            .id();
        schedule.run(&mut world);
        let mut grunts = world.query::<&Grunt>();
        assert_eq!(grunts.iter(&world).count(), 2);
        assert!(world.get::<Grunt>(grunt).unwrap().mitosis_at.is_none());
    }

    #[test]
    fn test_soldier_fires_leading_shot_in_range() {
        let (mut world, mut schedule) = ai_world(Vec2::new(1250.0, 1250.0));
        world.spawn((
            EnemyBundle::soldier(Vec2::new(1600.0, 1250.0), Vec2::ZERO),
            Soldier {
                timeout: f32::INFINITY,
                warmup: 0.0,
                fire_time: 0.0,
            },
        ));
        schedule.run(&mut world);
        let mut shots = world.query_filtered::<&Velocity, With<EnemyShot>>();
        let fired: Vec<_> = shots.iter(&world).collect();
        assert_eq!(fired.len(), 1);
        assert!(
            (fired[0].0.len() - ProjectileKind::SoldierShot.max_speed()).abs() < 1e-2
        );
        assert!(fired[0].0.x < 0.0);
    }

    #[test]
    fn test_kamikaze_chase_is_one_way() {
        let (mut world, mut schedule) = ai_world(Vec2::new(1250.0, 1250.0));
        let kamikaze = world
            .spawn((
                EnemyBundle::kamikaze(Vec2::new(1500.0, 1250.0), Vec2::ZERO),
                Kamikaze {
                    timeout: f32::INFINITY,
                    warmup: 0.0,
                    chasing: false,
                },
            ))
            .id();
        schedule.run(&mut world);
        assert!(world.get::<Kamikaze>(kamikaze).unwrap().chasing);
        let vel = world.get::<Velocity>(kamikaze).unwrap().0;
        assert!(vel.x < 0.0);
        assert!((vel.len() - Kamikaze::CHASE_SPEED).abs() < 1e-2);

        // Move the player far out of range: the chase keeps going.
        {
            let mut players = world.query_filtered::<&mut Position, With<Player>>();
            players.single_mut(&mut world).0 = Vec2::new(50_000.0, 50_000.0);
        }
        schedule.run(&mut world);
        assert!(world.get::<Kamikaze>(kamikaze).unwrap().chasing);
    }

    #[test]
    fn test_kamikaze_contact_requests_restart() {
        let (mut world, mut schedule) = ai_world(Vec2::new(1250.0, 1250.0));
        world.spawn((
            EnemyBundle::kamikaze(Vec2::new(1254.0, 1250.0), Vec2::ZERO),
            kamikaze_state(10.0, &mut SimRng::seeded(1)),
        ));
        schedule.run(&mut world);
        assert!(world.resource::<GameFlow>().restart_requested);
    }

    #[test]
    fn test_kamikaze_wall_impact_damages_and_bounces() {
        let (mut world, mut schedule) = ai_world(Vec2::new(2000.0, 2000.0));
        {
            let mut arena = world.resource_mut::<Arena>();
            // Wall column right of the kamikaze.
            for cy in 0..100 {
                arena.grid.set_density(20, cy, 1.0);
            }
        }
        let kamikaze = world
            .spawn((
                EnemyBundle::kamikaze(Vec2::new(490.0, 500.0), Vec2::new(200.0, 0.0)),
                Kamikaze {
                    timeout: f32::INFINITY,
                    warmup: f32::INFINITY,
                    chasing: false,
                },
            ))
            .id();
        schedule.run(&mut world);
        let arena = world.resource::<Arena>();
        let damaged = arena
            .grid
            .cells()
            .iter()
            .filter(|c| c.solid() && c.density < 1.0)
            .count();
        assert!(damaged > 0);
        // Bounced back out of the wall overlap it created.
        let pos = world.get::<Position>(kamikaze).unwrap().0;
        assert!(pos.x < 494.0);
    }

    #[test]
    fn test_soldier_state_timers_are_relative_to_now() {
        let mut rng = SimRng::seeded(9);
        let soldier = soldier_state(100.0, &mut rng);
        assert!(soldier.timeout >= 100.0 + Soldier::TIMEOUT_MIN);
        assert!(soldier.timeout <= 100.0 + Soldier::TIMEOUT_MAX);
        assert!((soldier.warmup - 102.0).abs() < 1e-6);
    }
}
