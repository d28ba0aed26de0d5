//! Basic demonstration of the arena simulation.
//!
//! Run with: cargo run --example basic_demo

use arena_sim::{EnemyKind, SimWorld, WeaponKind};

fn main() {
    println!("=== Arena Simulation Demo ===\n");

    let mut sim = SimWorld::seeded(42);

    // Place some enemies around the player and pick the laser weapon.
    let (px, py) = {
        let snapshot = sim.snapshot();
        let player = snapshot.player.expect("fresh world has a player");
        (player.x, player.y)
    };
    sim.spawn_enemy(EnemyKind::Grunt, px + 250.0, py);
    sim.spawn_enemy(EnemyKind::Soldier, px - 400.0, py + 100.0);
    sim.spawn_enemy(EnemyKind::Kamikaze, px, py + 350.0);
    sim.set_weapon(WeaponKind::Lasers);

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Hold fire toward a point east of the player and drift north.
    sim.set_cursor(px + 600.0, py);
    sim.set_key("mouse0", true);
    sim.set_key("w", true);

    println!("\nRunning simulation for 300 frames (~5 seconds at 60 fps)...\n");
    for frame in 0..300 {
        sim.step(1.0 / 60.0);

        if (frame + 1) % 60 == 0 {
            println!(
                "--- Frame {} (t={:.2}s) ---",
                sim.current_tick(),
                sim.current_time()
            );
            print_snapshot(&mut sim);
        }
        if sim.must_restart() {
            println!("  !! player down, world restarted");
        }
        if !sim.is_running() {
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    if let Some(player) = &snapshot.player {
        println!(
            "  Player: pos=({:.1}, {:.1}) weapon={} camera=({:.1}, {:.1})",
            player.x, player.y, player.weapon, snapshot.camera_x, snapshot.camera_y
        );
    }
    println!("  Enemies:");
    for enemy in &snapshot.enemies {
        println!(
            "    {}: pos=({:.1}, {:.1}) hp={:.0}/{:.0}{}",
            enemy.kind,
            enemy.x,
            enemy.y,
            enemy.health,
            enemy.max_health,
            if enemy.flash { " [hit]" } else { "" }
        );
    }
    println!("  Projectiles in flight: {}", snapshot.projectiles.len());
}
