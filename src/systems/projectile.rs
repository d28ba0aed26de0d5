//! Projectile motion, terrain impact and hit resolution.

use crate::components::*;
use crate::math::Rect;
use crate::rng::SimRng;
use crate::worldgen::Arena;
use bevy_ecs::prelude::*;

/// Integrates every live projectile, expires the old ones and resolves wall
/// impacts. An impact damages the cell under the tip and destroys the shot,
/// except for the rare laser that sticks in the wall and lingers.
pub fn projectile_motion_system(
    clock: Res<Clock>,
    mut arena: ResMut<Arena>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
    mut shots: Query<(Entity, &mut Projectile, &mut Position, &Velocity), Without<Destroyed>>,
) {
    for (entity, mut projectile, mut pos, vel) in shots.iter_mut() {
        if clock.time > projectile.expires_at {
            commands.entity(entity).insert(Destroyed);
            continue;
        }
        if projectile.stuck {
            continue;
        }

        pos.0 = pos.0.add_scaled(vel.0, clock.dt);

        let tip = Rect::around(pos.0, Projectile::TIP_HALF);
        if arena.grid.collision_vector(tip).is_some() {
            if let Some((cx, cy)) = arena.grid.pixel_to_cell(pos.0.x, pos.0.y) {
                arena
                    .grid
                    .damage_cell(cx, cy, projectile.kind.wall_damage());
            }
            if projectile.kind == ProjectileKind::Laser
                && rng.chance(Projectile::LASER_STICK_CHANCE)
            {
                projectile.stuck = true;
                projectile.expires_at += rng.range(0.0, Projectile::LASER_STICK_BONUS);
            } else {
                commands.entity(entity).insert(Destroyed);
            }
        }
    }
}

/// Player shots against enemy bounds. Each shot hits at most one enemy (the
/// first overlapping one in iteration order) and is destroyed by the hit.
/// Grunts die to any hit; soldiers and kamikazes take the shot's damage and
/// flash, and kamikazes additionally recoil against their own velocity.
pub fn player_shot_hit_system(
    clock: Res<Clock>,
    mut commands: Commands,
    shots: Query<(Entity, &Projectile, &Position), (With<PlayerShot>, Without<Destroyed>)>,
    mut enemies: Query<
        (
            Entity,
            &EnemyKind,
            &mut Position,
            &Velocity,
            &Radius,
            &mut Health,
            &mut DamageFlash,
        ),
        (Without<PlayerShot>, Without<Destroyed>),
    >,
) {
    for (shot_entity, projectile, shot_pos) in shots.iter() {
        for (enemy_entity, kind, mut pos, vel, radius, mut health, mut flash) in
            enemies.iter_mut()
        {
            if !health.is_alive() {
                continue;
            }
            if shot_pos.0.dist_sq(pos.0) > radius.squared {
                continue;
            }

            match kind {
                EnemyKind::Grunt => {
                    // One hit kills, whatever the shot.
                    health.current = 0.0;
                    commands.entity(enemy_entity).insert(Destroyed);
                }
                EnemyKind::Soldier => {
                    health.damage(projectile.kind.enemy_damage());
                    flash.0 = true;
                    if !health.is_alive() {
                        commands.entity(enemy_entity).insert(Destroyed);
                    }
                }
                EnemyKind::Kamikaze => {
                    health.damage(projectile.kind.enemy_damage());
                    flash.0 = true;
                    pos.0 = pos
                        .0
                        .add_scaled(vel.0, clock.dt * Kamikaze::RECOIL_FACTOR);
                    if !health.is_alive() {
                        commands.entity(enemy_entity).insert(Destroyed);
                    }
                }
            }

            commands.entity(shot_entity).insert(Destroyed);
            break;
        }
    }
}

/// Enemy shots against the player bound. Any overlap requests a restart.
pub fn enemy_shot_hit_system(
    mut flow: ResMut<GameFlow>,
    mut commands: Commands,
    shots: Query<(Entity, &Position), (With<EnemyShot>, Without<Destroyed>)>,
    players: Query<(&Position, &Radius), (With<Player>, Without<EnemyShot>)>,
) {
    let Ok((player_pos, radius)) = players.get_single() else {
        return;
    };
    for (shot_entity, pos) in shots.iter() {
        if pos.0.dist_sq(player_pos.0) <= radius.squared {
            flow.restart_requested = true;
            commands.entity(shot_entity).insert(Destroyed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn shot_world() -> (World, Schedule) {
        let mut world = World::new();
        let mut arena = Arena::new(100, 25, 25.0);
        arena.grid.fill(0.0);
        world.insert_resource(Clock {
            time: 0.1,
            dt: 0.02,
        });
        world.insert_resource(GameFlow::default());
        world.insert_resource(arena);
        world.insert_resource(SimRng::seeded(3));
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                projectile_motion_system,
                player_shot_hit_system,
                enemy_shot_hit_system,
            )
                .chain(),
        );
        (world, schedule)
    }

    fn spawn_shot(world: &mut World, kind: ProjectileKind, pos: Vec2, dir: Vec2) -> Entity {
        world
            .spawn((ProjectileBundle::new(kind, pos, dir, 0.0), PlayerShot))
            .id()
    }

    #[test]
    fn test_expired_shot_is_destroyed_without_moving() {
        let (mut world, mut schedule) = shot_world();
        let shot = world
            .spawn((
                Projectile {
                    kind: ProjectileKind::Standard,
                    expires_at: 0.05,
                    stuck: false,
                    length: 0.0,
                },
                Position(Vec2::new(500.0, 500.0)),
                Velocity(Vec2::new(950.0, 0.0)),
                PlayerShot,
            ))
            .id();
        schedule.run(&mut world);
        assert!(world.get::<Destroyed>(shot).is_some());
        assert!((world.get::<Position>(shot).unwrap().0.x - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_wall_impact_damages_cell_and_destroys_shot() {
        let (mut world, mut schedule) = shot_world();
        world
            .resource_mut::<Arena>()
            .grid
            .set_density(30, 20, 1.0);
        // Flying right into the cell spanning x 750..775, y 500..525.
        let shot = spawn_shot(
            &mut world,
            ProjectileKind::Standard,
            Vec2::new(735.0, 510.0),
            Vec2::new(1.0, 0.0),
        );
        schedule.run(&mut world);
        // 950 * 0.02 = 19 units forward from the muzzle at 745.
        assert!(world.get::<Destroyed>(shot).is_some());
        let arena = world.resource::<Arena>();
        let cell = arena.grid.cell_at(30, 20).unwrap();
        assert!((cell.density - 0.9).abs() < 1e-6);
        assert!(cell.damaged_flash);
    }

    #[test]
    fn test_stuck_laser_holds_position() {
        let (mut world, mut schedule) = shot_world();
        let shot = world
            .spawn((
                Projectile {
                    kind: ProjectileKind::Laser,
                    expires_at: 100.0,
                    stuck: true,
                    length: 20.0,
                },
                Position(Vec2::new(500.0, 500.0)),
                Velocity(Vec2::new(950.0, 0.0)),
                PlayerShot,
            ))
            .id();
        schedule.run(&mut world);
        assert!(world.get::<Destroyed>(shot).is_none());
        assert!((world.get::<Position>(shot).unwrap().0.x - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_hit_at_exact_radius_counts() {
        let (mut world, mut schedule) = shot_world();
        let soldier = world
            .spawn(EnemyBundle::soldier(Vec2::new(500.0, 500.0), Vec2::ZERO))
            .id();
        // Exactly on the bound: distance equals the soldier radius.
        let shot = world
            .spawn((
                Projectile::new(ProjectileKind::Standard, 0.1),
                Position(Vec2::new(500.0 + Soldier::RADIUS, 500.0)),
                Velocity(Vec2::ZERO),
                PlayerShot,
            ))
            .id();
        schedule.run(&mut world);
        assert!(world.get::<Destroyed>(shot).is_some());
        let health = world.get::<Health>(soldier).unwrap();
        assert!((health.current - 9.0).abs() < 1e-6);
        assert!(world.get::<DamageFlash>(soldier).unwrap().0);
        assert!(world.get::<Destroyed>(soldier).is_none());
    }

    #[test]
    fn test_shot_hits_only_one_enemy() {
        let (mut world, mut schedule) = shot_world();
        let a = world
            .spawn(EnemyBundle::soldier(Vec2::new(500.0, 500.0), Vec2::ZERO))
            .id();
        let b = world
            .spawn(EnemyBundle::soldier(Vec2::new(505.0, 500.0), Vec2::ZERO))
            .id();
        world.spawn((
            Projectile::new(ProjectileKind::Standard, 0.1),
            Position(Vec2::new(502.0, 500.0)),
            Velocity(Vec2::ZERO),
            PlayerShot,
        ));
        schedule.run(&mut world);
        let hits = [a, b]
            .iter()
            .filter(|&&e| world.get::<Health>(e).unwrap().current < Soldier::MAX_HEALTH)
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_laser_hit_deals_double_damage() {
        let (mut world, mut schedule) = shot_world();
        let soldier = world
            .spawn(EnemyBundle::soldier(Vec2::new(500.0, 500.0), Vec2::ZERO))
            .id();
        world.spawn((
            Projectile::new(ProjectileKind::Laser, 0.1),
            Position(Vec2::new(505.0, 500.0)),
            Velocity(Vec2::ZERO),
            PlayerShot,
        ));
        schedule.run(&mut world);
        assert!((world.get::<Health>(soldier).unwrap().current - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_kamikaze_hit_recoils_against_velocity() {
        let (mut world, mut schedule) = shot_world();
        let kamikaze = world
            .spawn(EnemyBundle::kamikaze(
                Vec2::new(500.0, 500.0),
                Vec2::new(100.0, 0.0),
            ))
            .id();
        world.spawn((
            Projectile::new(ProjectileKind::Standard, 0.1),
            Position(Vec2::new(505.0, 500.0)),
            Velocity(Vec2::ZERO),
            PlayerShot,
        ));
        schedule.run(&mut world);
        let pos = world.get::<Position>(kamikaze).unwrap().0;
        // Knocked back by -0.3 * vel * dt.
        assert!((pos.x - (500.0 - 100.0 * 0.02 * 0.3)).abs() < 1e-4);
        let health = world.get::<Health>(kamikaze).unwrap();
        assert!((health.current - 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_enemy_shot_reaching_player_requests_restart() {
        let (mut world, mut schedule) = shot_world();
        world.spawn(PlayerBundle::new(Vec2::new(500.0, 500.0)));
        let shot = world
            .spawn((
                ProjectileBundle::new(
                    ProjectileKind::GruntShot,
                    Vec2::new(495.0, 500.0),
                    Vec2::new(1.0, 0.0),
                    0.0,
                ),
                EnemyShot,
            ))
            .id();
        schedule.run(&mut world);
        assert!(world.resource::<GameFlow>().restart_requested);
        assert!(world.get::<Destroyed>(shot).is_some());
    }
}
