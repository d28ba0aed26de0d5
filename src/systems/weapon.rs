//! Player weapon firing.
//!
//! Both weapons share the cadence and spread model; the laser additionally
//! fires a homing volley every 5th shot.

use crate::components::*;
use crate::math::Vec2;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;

/// Enemy positions visible to the laser volley targeter.
pub type VolleyTargets<'w, 's> =
    Query<'w, 's, &'static Position, (With<EnemyKind>, Without<Player>)>;

/// Aim spread in radians-ish disc units: tight at long cursor distance, wide
/// point blank, clamped to `[0.02, 0.5]`.
pub fn spread_for(cursor_dist: f32) -> f32 {
    (0.5 / (1.0 + (-0.4 + 0.025 * cursor_dist).max(0.0))).clamp(0.02, 0.5)
}

/// Fire the active weapon if its cooldown has elapsed. `origin` is the
/// player position, `aim` the unit fire direction, `cursor` the world-space
/// cursor used for spread.
pub fn fire(
    weapon: &mut Weapon,
    clock: &Clock,
    origin: Vec2,
    aim: Vec2,
    cursor: Vec2,
    targets: &VolleyTargets,
    rng: &mut SimRng,
    commands: &mut Commands,
) {
    if clock.time <= weapon.fire_time {
        return;
    }

    let spread = spread_for(cursor.dist(origin));
    let dir = (aim + rng.in_unit_disc() * spread).normalized();
    let kind = match weapon.kind {
        WeaponKind::Standard => ProjectileKind::Standard,
        WeaponKind::Lasers => ProjectileKind::Laser,
    };
    spawn_player_shot(commands, kind, origin, dir, clock.time, rng);
    weapon.fire_time = clock.time + Weapon::FIRE_INTERVAL;

    if weapon.kind == WeaponKind::Lasers {
        weapon.sequence += 1;
        if weapon.sequence % Weapon::VOLLEY_SIZE as u32 == 0 {
            volley(origin, targets, clock.time, rng, commands);
        }
    }
}

/// Five extra lasers: one per random in-range enemy (no repeats), the rest in
/// random directions.
fn volley(
    origin: Vec2,
    targets: &VolleyTargets,
    now: f32,
    rng: &mut SimRng,
    commands: &mut Commands,
) {
    let mut in_range: Vec<Vec2> = targets
        .iter()
        .map(|p| p.0)
        .filter(|p| p.dist_sq(origin) < Weapon::VOLLEY_RANGE_SQ)
        .collect();

    let aimed = in_range.len().min(Weapon::VOLLEY_SIZE);
    for _ in 0..aimed {
        let i = rng.range_i32(0, in_range.len() as i32 - 1) as usize;
        let target = in_range.swap_remove(i);
        let dir = (target - origin)
            .add_scaled(rng.in_unit_disc(), Weapon::VOLLEY_JITTER)
            .normalized();
        spawn_player_shot(commands, ProjectileKind::Laser, origin, dir, now, rng);
    }
    for _ in 0..Weapon::VOLLEY_SIZE - aimed {
        let dir = rng.unit_dir();
        spawn_player_shot(commands, ProjectileKind::Laser, origin, dir, now, rng);
    }
}

fn spawn_player_shot(
    commands: &mut Commands,
    kind: ProjectileKind,
    origin: Vec2,
    dir: Vec2,
    now: f32,
    rng: &mut SimRng,
) {
    let mut bundle = ProjectileBundle::new(kind, origin, dir, now);
    if kind == ProjectileKind::Laser {
        bundle.projectile.length = 15.0 + rng.f32() * 20.0;
    }
    commands.spawn((bundle, PlayerShot));
}
