//! End-of-frame removal.

use crate::components::*;
use bevy_ecs::prelude::*;
use std::collections::HashSet;

/// A grunt destroyed this frame takes its in-flight shots with it, in the
/// same frame, before the prune pass despawns either.
pub fn shot_cascade_system(
    mut commands: Commands,
    dead_grunts: Query<Entity, (With<Grunt>, With<Destroyed>)>,
    shots: Query<(Entity, &FiredBy), Without<Destroyed>>,
) {
    if dead_grunts.is_empty() {
        return;
    }
    let dead: HashSet<Entity> = dead_grunts.iter().collect();
    for (entity, fired_by) in shots.iter() {
        if dead.contains(&fired_by.0) {
            commands.entity(entity).insert(Destroyed);
        }
    }
}

pub fn prune_enemies_system(
    mut commands: Commands,
    destroyed: Query<Entity, (With<EnemyKind>, With<Destroyed>)>,
) {
    for entity in destroyed.iter() {
        commands.entity(entity).despawn();
    }
}

pub fn prune_projectiles_system(
    mut commands: Commands,
    destroyed: Query<Entity, (With<Projectile>, With<Destroyed>)>,
) {
    for entity in destroyed.iter() {
        commands.entity(entity).despawn();
    }
}
