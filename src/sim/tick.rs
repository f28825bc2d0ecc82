//! Simulation step
//!
//! Advances a run by one frame. Stage order is fixed; collision resolution
//! sees the world after movement and cleanup.

use super::collision::resolve_collisions;
use super::effects::age;
use super::spawn::run_spawner;
use super::state::{Bounds, GameState};
use crate::clamp_frame_dt;
use crate::consts::*;

/// Advance the run by `dt` seconds inside `bounds`
pub fn tick(state: &mut GameState, dt: f32, bounds: Bounds) {
    // Nothing moves after the run ends
    if state.game_over {
        return;
    }
    let dt = clamp_frame_dt(dt);

    // 1. Player physics
    state.player.update(dt);

    // 2. Scroll speed, distance, run clock
    state.speed += SCROLL_ACCEL * dt;
    state.distance += state.speed * dt / DISTANCE_DIVISOR;
    state.elapsed += dt;

    // 3. Ammo regen and ram cooldown
    let perks = state.stats.perks;
    state.ammo_timer += dt;
    if state.ammo_timer >= perks.ammo_regen_interval {
        state.ammo_timer = 0.0;
        state.add_ammo(1);
    }
    state.ram_cooldown = (state.ram_cooldown - dt).max(0.0);

    // 4. Shield generator
    if state.stats.regen_rate > 0.0 {
        state.heal(state.stats.regen_rate * dt);
    }

    // 5. Spawns
    run_spawner(state, bounds);

    // 6. World scroll at effective speed
    let speed = state.speed * state.effects().time_scale;
    for o in &mut state.obstacles {
        o.update(dt, speed);
    }
    for c in &mut state.collectibles {
        c.update(dt, speed);
    }
    for f in &mut state.fuels {
        f.update(dt, speed);
    }
    for p in &mut state.power_ups {
        p.update(dt, speed);
    }

    // 7. Boss AI and its due shots
    if let Some(boss) = state.boss.as_mut() {
        let shots = boss.update(
            dt,
            state.player.pos.y,
            &state.player_projectiles,
            bounds,
            &mut state.rng,
        );
        state.projectiles.extend(shots);
    }
    state.remove_finished_boss();

    // 8. Projectiles
    let target = state.player.center();
    for p in &mut state.projectiles {
        p.update(dt, target, bounds);
    }
    for p in &mut state.player_projectiles {
        p.update(dt, bounds);
    }

    // 9. Floating texts
    for t in &mut state.floating_texts {
        t.pos.y -= FLOATING_TEXT_RISE * dt;
        t.life -= dt;
    }
    state.floating_texts.retain(|t| t.life > 0.0);

    // 10. Cleanup
    state.prune();

    // 11. Power-up timers
    for kind in age(&mut state.active_power_ups, dt) {
        log::debug!("Power-up {:?} expired", kind);
    }

    // 12. Collisions
    resolve_collisions(state, bounds);

    // 13. Boost drain
    if state.player.boosting {
        state.energy -= ENERGY_DRAIN * dt;
        if state.energy <= 0.0 {
            state.energy = 0.0;
            state.player.boosting = false;
        }
    }
}
