//! Per-tick spawn rolls
//!
//! Every entity type gets an independent Bernoulli trial each tick. Nothing is
//! queued; a missed roll is simply gone.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::boss::{Boss, BossKind};
use super::effects::PowerUpKind;
use super::state::{Bounds, Collectible, Fuel, FuelKind, GameEvent, GameState, Obstacle, PowerUp};
use crate::consts::*;

/// Per-tick spawn probabilities
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    pub obstacle_chance: f32,
    pub collectible_chance: f32,
    pub fuel_chance: f32,
    /// Chance a spawned fuel canister is the large kind
    pub large_fuel_chance: f32,
    pub power_up_chance: f32,
    pub boss_chance: f32,
    /// Distance that must be covered before any boss appears
    pub boss_min_distance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            obstacle_chance: 0.02,
            collectible_chance: 0.05,
            fuel_chance: 0.02,
            large_fuel_chance: 0.1,
            power_up_chance: 0.003,
            boss_chance: 0.005,
            boss_min_distance: 500.0,
        }
    }
}

impl SpawnConfig {
    /// All chances zero (scripted tests)
    pub fn disabled() -> Self {
        Self {
            obstacle_chance: 0.0,
            collectible_chance: 0.0,
            fuel_chance: 0.0,
            large_fuel_chance: 0.0,
            power_up_chance: 0.0,
            boss_chance: 0.0,
            ..Self::default()
        }
    }
}

/// Bernoulli trial that tolerates p outside [0, 1]
fn roll(rng: &mut impl Rng, p: f32) -> bool {
    rng.random::<f32>() < p
}

/// Random y inside the pickup band [50, height - 50]
fn band_y(rng: &mut impl Rng, bounds: Bounds) -> f32 {
    let lo = 50.0;
    let hi = bounds.height - 50.0;
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Roll every spawn table once
pub fn run_spawner(state: &mut GameState, bounds: Bounds) {
    let cfg = state.spawn.clone();
    let perks = state.stats.perks;
    let x = bounds.width;
    let rng = &mut state.rng;

    if roll(rng, cfg.obstacle_chance) {
        let height = rng.random_range(OBSTACLE_MIN_HEIGHT..OBSTACLE_MAX_HEIGHT);
        let y = if rng.random::<bool>() { 0.0 } else { bounds.height - height };
        state.obstacles.push(Obstacle::new(x, y, OBSTACLE_WIDTH, height));
    }

    if roll(rng, cfg.collectible_chance * perks.collectible_rate) {
        let y = band_y(rng, bounds);
        let phase = rng.random::<f32>() * TAU;
        state.collectibles.push(Collectible::new(Vec2::new(x, y), phase));
    }

    if roll(rng, cfg.fuel_chance) {
        let y = band_y(rng, bounds);
        let kind = if roll(rng, cfg.large_fuel_chance) {
            FuelKind::Large
        } else {
            FuelKind::Small
        };
        let phase = rng.random::<f32>() * TAU;
        state.fuels.push(Fuel::new(Vec2::new(x, y), kind, phase));
    }

    if roll(rng, cfg.power_up_chance * perks.power_up_rate) {
        let y = band_y(rng, bounds);
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let phase = rng.random::<f32>() * TAU;
        state.power_ups.push(PowerUp::new(kind, Vec2::new(x, y), phase));
    }

    // Single-boss gate
    if state.boss.is_none()
        && state.distance > cfg.boss_min_distance
        && roll(rng, cfg.boss_chance)
    {
        let kind = BossKind::pick(rng);
        log::info!("Boss {:?} spawned at {:.0}m", kind, state.distance);
        state.boss = Some(Boss::new(kind, bounds));
        state.emit(GameEvent::BossMusicStart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::Loadout;

    fn always() -> SpawnConfig {
        SpawnConfig {
            obstacle_chance: 1.0,
            collectible_chance: 1.0,
            fuel_chance: 1.0,
            large_fuel_chance: 0.0,
            power_up_chance: 1.0,
            boss_chance: 1.0,
            ..SpawnConfig::default()
        }
    }

    #[test]
    fn test_disabled_spawns_nothing() {
        let mut state = GameState::new(1, Loadout::default());
        state.spawn = SpawnConfig::disabled();
        state.distance = 10_000.0;
        for _ in 0..500 {
            run_spawner(&mut state, Bounds::default());
        }
        assert!(state.obstacles.is_empty());
        assert!(state.collectibles.is_empty());
        assert!(state.boss.is_none());
    }

    #[test]
    fn test_spawns_enter_at_right_edge() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut state = GameState::new(2, Loadout::default());
        state.spawn = always();
        run_spawner(&mut state, bounds);

        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].pos.x, 800.0);
        let obs = &state.obstacles[0];
        assert!(obs.pos.y == 0.0 || (obs.pos.y + obs.size.y - 600.0).abs() < 1e-3);
        assert_eq!(state.collectibles[0].pos.x, 800.0);
        assert_eq!(state.fuels[0].kind, FuelKind::Small);
        assert_eq!(state.power_ups.len(), 1);
    }

    #[test]
    fn test_boss_needs_distance() {
        let mut state = GameState::new(3, Loadout::default());
        state.spawn = always();
        state.distance = 400.0;
        run_spawner(&mut state, Bounds::default());
        assert!(state.boss.is_none());

        state.distance = 501.0;
        run_spawner(&mut state, Bounds::default());
        assert!(state.boss.is_some());
        assert!(state.events().contains(&GameEvent::BossMusicStart));
    }

    #[test]
    fn test_single_boss_invariant() {
        let mut state = GameState::new(4, Loadout::default());
        state.spawn = always();
        state.distance = 1000.0;
        run_spawner(&mut state, Bounds::default());
        let first = state.boss.as_ref().map(|b| b.kind);
        state.drain_events();

        for _ in 0..100 {
            run_spawner(&mut state, Bounds::default());
        }
        assert_eq!(state.boss.as_ref().map(|b| b.kind), first);
        assert!(!state.events().contains(&GameEvent::BossMusicStart));
    }
}
