//! Player movement, aiming, firing and camera framing.

use crate::components::*;
use crate::grid::Grid;
use crate::input::InputState;
use crate::math::{Rect, Vec2};
use crate::rng::SimRng;
use crate::systems::weapon::{self, VolleyTargets};
use crate::worldgen::Arena;
use bevy_ecs::prelude::*;

/// One player frame, in order: input to velocity, integration, camera anchor
/// tracking, quit key, aiming, firing plus wall smear while the trigger is
/// held, terrain push-out, camera smoothing.
pub fn player_system(
    clock: Res<Clock>,
    input: Res<InputState>,
    mut flow: ResMut<GameFlow>,
    mut camera: ResMut<CameraState>,
    mut arena: ResMut<Arena>,
    mut rng: ResMut<SimRng>,
    mut commands: Commands,
    mut players: Query<
        (
            &mut Player,
            &mut Position,
            &mut Velocity,
            &mut Aim,
            &mut Weapon,
        ),
        With<Player>,
    >,
    targets: VolleyTargets,
) {
    let Ok((mut player, mut pos, mut vel, mut aim, mut weapon)) = players.get_single_mut() else {
        return;
    };
    let dt = clock.dt;

    // Axis speeds are independent; opposing keys cancel and diagonals are
    // not normalized.
    vel.0.x = axis(input.down("d"), input.down("a"));
    vel.0.y = axis(input.down("s"), input.down("w"));

    pos.0 = pos.0.add_scaled(vel.0, dt);

    if vel.0.len_sq() > 0.0 {
        let ahead = pos.0 + vel.0.with_len(Player::CAMERA_LOOKAHEAD);
        player.camera_anchor = player
            .camera_anchor
            .lerp(ahead, dt * Player::CAMERA_LERP_RATE);
    }

    let collision = arena
        .grid
        .collision_vector(Rect::around(pos.0, Player::RADIUS));

    if input.down("p") {
        flow.exit_requested = true;
    }

    aim.0 = (input.cursor - pos.0).normalized();

    if input.down("mouse0") {
        weapon::fire(
            &mut weapon,
            &clock,
            pos.0,
            aim.0,
            input.cursor,
            &targets,
            &mut rng,
            &mut commands,
        );
        smear_wall_damage(&mut arena.grid, pos.0, vel.0);
    }

    if let Some(push) = collision {
        pos.0 = pos.0 + push;
    }

    // Camera: blend the anchor toward the cursor, then chase that center with
    // dt-scaled decay. Inside the snap threshold the camera holds still.
    let center = player
        .camera_anchor
        .lerp(input.cursor, Player::CAMERA_CURSOR_BLEND);
    let drift = camera.pos - center;
    if drift.len() > Player::CAMERA_SNAP_THRESHOLD {
        let drift = drift.lerp(drift * 0.1, dt);
        camera.pos = center + drift;
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => Player::MAX_SPEED,
        (false, true) => -Player::MAX_SPEED,
        _ => 0.0,
    }
}

/// While firing on the move, the player chews through the wall cells ahead of
/// the travel direction. Straight movement damages the one cell ahead;
/// diagonal movement spreads reduced damage over the three cells around the
/// corner.
fn smear_wall_damage(grid: &mut Grid, pos: Vec2, vel: Vec2) {
    let inc_x: i32 = if vel.x > 0.0 {
        1
    } else if vel.x < 0.0 {
        -1
    } else {
        0
    };
    let inc_y: i32 = if vel.y > 0.0 {
        1
    } else if vel.y < 0.0 {
        -1
    } else {
        0
    };
    let Some((cx, cy)) = grid.pixel_to_cell(pos.x, pos.y) else {
        return;
    };

    match inc_x.abs() + inc_y.abs() {
        1 => {
            grid.damage_cell(cx + inc_x, cy + inc_y, Player::WALL_DAMAGE);
        }
        2 => {
            grid.damage_cell(cx + inc_x, cy, Player::WALL_DAMAGE / 2.0);
            grid.damage_cell(cx, cy + inc_y, Player::WALL_DAMAGE / 2.0);
            grid.damage_cell(cx + inc_x, cy + inc_y, Player::WALL_DAMAGE / 3.0);
        }
        _ => {}
    }
}
