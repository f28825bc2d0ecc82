//! Collision detection and response
//!
//! Everything is axis-aligned boxes except enemy shots, which are circles
//! tested against the player's box. Checks run in a fixed order and stop as
//! soon as the run ends.

use glam::Vec2;

use super::effects::apply_power_up;
use super::state::{Bounds, CurrencySource, GameEvent, GameState};
use crate::consts::*;

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Circle vs box via the closest point on the box
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.x, self.x + self.w),
            center.y.clamp(self.y, self.y + self.h),
        );
        center.distance_squared(closest) < radius * radius
    }
}

const PICKUP_TEXT_COLOR: &str = "#00ff99";
const BOSS_TEXT_COLOR: &str = "#ff0000";

/// Resolve every player/world interaction for this tick
pub fn resolve_collisions(state: &mut GameState, bounds: Bounds) {
    if state.game_over {
        return;
    }

    player_vs_obstacles(state);
    if state.game_over {
        return;
    }

    let y = state.player.pos.y;
    if y < -50.0 || y > bounds.height {
        log::debug!("Player left the field at y={:.0}", y);
        state.trigger_game_over();
        return;
    }

    player_vs_collectibles(state);
    player_vs_fuel(state);
    player_vs_power_ups(state, bounds);

    player_vs_projectiles(state);
    if state.game_over {
        return;
    }

    shots_vs_boss(state);
}

fn player_vs_obstacles(state: &mut GameState) {
    let effects = state.effects();
    let perks = state.stats.perks;
    let player = state.player.rect();

    for i in 0..state.obstacles.len() {
        let obstacle = &state.obstacles[i];
        if obstacle.marked_for_deletion || !player.overlaps(&obstacle.rect()) {
            continue;
        }

        let small = obstacle.size.y < SMALL_OBSTACLE_HEIGHT;
        if effects.phase_through || (perks.phase_small_obstacles && small) {
            continue;
        }

        let center = obstacle.rect().center();
        state.obstacles[i].marked_for_deletion = true;

        let ram_ready = state.ram_cooldown <= 0.0;
        if let Some(cooldown) = perks.ram_cooldown.filter(|_| ram_ready) {
            state.ram_cooldown = cooldown;
            state.emit(GameEvent::Explosion);
            state.add_floating_text(center, "RAM!", "#ff00ff", 1.0);
            continue;
        }

        if effects.shield || effects.invincible {
            continue;
        }

        if state.damage_player() {
            return;
        }
    }
}

fn player_vs_collectibles(state: &mut GameState) {
    let effects = state.effects();
    let radius = if effects.magnet {
        MAGNET_POWERUP_RADIUS
    } else {
        state.stats.magnet_range
    };
    let target = state.player.center();
    let amount = state.stats.currency_multiplier * effects.currency_multiplier;

    let mut picked = Vec::new();
    for c in state.collectibles.iter_mut().filter(|c| !c.marked_for_deletion) {
        let dist = target.distance(c.pos);
        if dist < radius {
            c.pos += (target - c.pos) * MAGNET_PULL;
        }
        if dist < PICKUP_RADIUS {
            c.marked_for_deletion = true;
            picked.push(c.pos);
        }
    }

    for pos in picked {
        state.award_currency(amount, CurrencySource::Pickup);
        state.emit(GameEvent::Collect);
        state.add_floating_text(pos, format!("+${}", amount), PICKUP_TEXT_COLOR, 1.0);
    }
}

fn player_vs_fuel(state: &mut GameState) {
    let player = state.player.rect();

    let mut picked = Vec::new();
    for fuel in state.fuels.iter_mut().filter(|f| !f.marked_for_deletion) {
        if player.overlaps(&fuel.rect()) {
            fuel.marked_for_deletion = true;
            picked.push((fuel.kind, fuel.pos));
        }
    }

    for (kind, pos) in picked {
        let max = state.max_energy();
        state.restore_energy(max * kind.value() / 100.0);
        state.emit(GameEvent::Collect);
        state.add_floating_text(pos, kind.label(), kind.color(), 1.0);
    }
}

fn player_vs_power_ups(state: &mut GameState, bounds: Bounds) {
    let player = state.player.rect();

    let mut picked = Vec::new();
    for p in state.power_ups.iter_mut().filter(|p| !p.marked_for_deletion) {
        if player.overlaps(&p.rect()) {
            p.marked_for_deletion = true;
            picked.push((p.kind, p.pos));
        }
    }

    for (kind, pos) in picked {
        apply_power_up(state, kind, bounds);
        state.add_floating_text(pos, kind.label(), kind.color(), 1.5);
    }
}

fn player_vs_projectiles(state: &mut GameState) {
    // Re-derived: a pickup this tick may have raised a shield
    let effects = state.effects();
    if effects.phase_through {
        return;
    }
    let player = state.player.rect();

    for i in 0..state.projectiles.len() {
        let shot = &state.projectiles[i];
        if shot.marked_for_deletion || !player.intersects_circle(shot.pos, shot.radius) {
            continue;
        }
        state.projectiles[i].marked_for_deletion = true;

        if effects.shield || effects.invincible {
            continue;
        }
        if state.damage_player() {
            return;
        }
    }
}

fn shots_vs_boss(state: &mut GameState) {
    let Some(boss) = state.boss.as_mut().filter(|b| b.is_alive()) else {
        return;
    };

    let boss_rect = boss.rect();
    let mut hits = 0;
    let mut killed = false;
    for shot in state.player_projectiles.iter_mut() {
        if shot.marked_for_deletion || !shot.rect().overlaps(&boss_rect) {
            continue;
        }
        shot.marked_for_deletion = true;
        if boss.take_damage(shot.damage) {
            killed = true;
            break;
        }
        hits += 1;
    }
    let (kind, center) = (boss.kind, boss.center());

    for _ in 0..hits {
        state.emit(GameEvent::Shoot);
    }
    if killed {
        log::info!("Boss {:?} defeated at {:.0}m", kind, state.distance);
        state.emit(GameEvent::Explosion);
        state.award_currency(BOSS_KILL_REWARD, CurrencySource::BossKill);
        state.add_floating_text(center, "BOSS DEFEATED!", BOSS_TEXT_COLOR, 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::{Loadout, ShipKind, Upgrades, WeaponKind};
    use crate::sim::boss::{Boss, BossKind};
    use crate::sim::effects::{PowerUpKind, activate};
    use crate::sim::state::{
        Collectible, Fuel, FuelKind, Obstacle, PlayerProjectile, PowerUp, Projectile,
    };

    fn state_with(loadout: Loadout) -> GameState {
        let mut state = GameState::new(11, loadout);
        state.drain_events();
        state
    }

    fn fresh() -> GameState {
        state_with(Loadout::default())
    }

    /// Obstacle squarely over the player's box (y 290..310)
    fn blocking_obstacle(height: f32) -> Obstacle {
        Obstacle::new(90.0, 250.0, OBSTACLE_WIDTH, height)
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_circle_vs_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.intersects_circle(Vec2::new(14.0, 5.0), 5.0));
        assert!(!r.intersects_circle(Vec2::new(16.0, 16.0), 5.0));
    }

    #[test]
    fn test_obstacle_hit_ends_base_run() {
        let mut state = fresh();
        state.obstacles.push(blocking_obstacle(150.0));
        resolve_collisions(&mut state, Bounds::default());

        assert_eq!(state.health, 0.0);
        assert!(state.is_game_over());
        assert!(state.obstacles[0].marked_for_deletion);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Explosion));
        assert!(events.contains(&GameEvent::MusicStop));
        assert!(events.contains(&GameEvent::GameOver { currency_collected: 0 }));
    }

    #[test]
    fn test_obstacle_hit_with_hull_survives() {
        let mut state = state_with(Loadout {
            upgrades: Upgrades {
                hull: 1,
                ..Upgrades::default()
            },
            ..Loadout::default()
        });
        state.obstacles.push(blocking_obstacle(150.0));
        resolve_collisions(&mut state, Bounds::default());

        assert_eq!(state.health, 1.0);
        assert!(!state.is_game_over());
        assert_eq!(state.currency_earned, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::Explosion]);
    }

    #[test]
    fn test_shield_absorbs_obstacle() {
        let mut state = fresh();
        activate(&mut state.active_power_ups, PowerUpKind::Shield);
        state.obstacles.push(blocking_obstacle(150.0));
        resolve_collisions(&mut state, Bounds::default());
        assert_eq!(state.health, 1.0);
        assert!(state.obstacles[0].marked_for_deletion);
    }

    #[test]
    fn test_ghost_phases_through_everything() {
        let mut state = fresh();
        activate(&mut state.active_power_ups, PowerUpKind::GhostMode);
        state.obstacles.push(blocking_obstacle(150.0));
        state
            .projectiles
            .push(Projectile::new(state.player.center(), Vec2::new(-500.0, 0.0), 8.0, 5.0));
        resolve_collisions(&mut state, Bounds::default());

        assert_eq!(state.health, 1.0);
        assert!(!state.obstacles[0].marked_for_deletion);
        assert!(!state.projectiles[0].marked_for_deletion);
    }

    #[test]
    fn test_stealth_only_phases_small_obstacles() {
        let mut state = state_with(Loadout {
            ship: ShipKind::Stealth,
            ..Loadout::default()
        });
        state.obstacles.push(blocking_obstacle(70.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(!state.is_game_over());

        state.obstacles.push(blocking_obstacle(120.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.is_game_over());
    }

    #[test]
    fn test_plasma_ram_has_cooldown() {
        let mut state = state_with(Loadout {
            ship: ShipKind::PlasmaBreaker,
            ..Loadout::default()
        });
        state.obstacles.push(blocking_obstacle(150.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(!state.is_game_over());
        assert_eq!(state.ram_cooldown, 8.0);

        state.prune();
        state.obstacles.push(blocking_obstacle(150.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.is_game_over());
    }

    #[test]
    fn test_out_of_bounds_ends_run() {
        let mut state = fresh();
        state.player.pos.y = 721.0;
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.is_game_over());
    }

    #[test]
    fn test_magnet_monotonic_approach() {
        let mut state = fresh();
        let target = state.player.center();
        state
            .collectibles
            .push(Collectible::new(target + Vec2::new(60.0, 0.0), 0.0));

        let mut last = target.distance(state.collectibles[0].pos);
        while !state.collectibles[0].marked_for_deletion {
            resolve_collisions(&mut state, Bounds::default());
            let dist = target.distance(state.collectibles[0].pos);
            assert!(dist < last);
            last = dist;
        }
        assert_eq!(state.currency_earned, 1);
    }

    #[test]
    fn test_collectible_outside_range_stays_put() {
        let mut state = fresh();
        let start = state.player.center() + Vec2::new(200.0, 0.0);
        state.collectibles.push(Collectible::new(start, 0.0));
        resolve_collisions(&mut state, Bounds::default());
        assert_eq!(state.collectibles[0].pos, start);

        activate(&mut state.active_power_ups, PowerUpKind::Magnet);
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.collectibles[0].pos.x < start.x);
    }

    #[test]
    fn test_pickup_currency_multipliers_stack() {
        let mut state = state_with(Loadout {
            upgrades: Upgrades {
                multiplier: 1,
                ..Upgrades::default()
            },
            ..Loadout::default()
        });
        activate(&mut state.active_power_ups, PowerUpKind::DoubleCoins);
        state.collectibles.push(Collectible::new(state.player.center(), 0.0));
        resolve_collisions(&mut state, Bounds::default());

        assert_eq!(state.currency_earned, 4);
        assert!(state.events().contains(&GameEvent::CurrencyAwarded {
            amount: 4,
            source: CurrencySource::Pickup
        }));
    }

    #[test]
    fn test_fuel_pickup_restores_quarter() {
        let mut state = fresh();
        state.energy = 50.0;
        state
            .fuels
            .push(Fuel::new(Vec2::new(105.0, 290.0), FuelKind::Small, 0.0));
        resolve_collisions(&mut state, Bounds::default());

        assert_eq!(state.energy, 75.0);
        assert!(state.fuels[0].marked_for_deletion);
        assert_eq!(state.floating_texts[0].text, "+FUEL");
        assert!(state.events().contains(&GameEvent::Collect));
    }

    #[test]
    fn test_large_fuel_clamps_to_max() {
        let mut state = fresh();
        state.energy = 80.0;
        state
            .fuels
            .push(Fuel::new(Vec2::new(105.0, 290.0), FuelKind::Large, 0.0));
        resolve_collisions(&mut state, Bounds::default());
        assert_eq!(state.energy, state.max_energy());
    }

    #[test]
    fn test_power_up_pickup_activates() {
        let mut state = fresh();
        state
            .power_ups
            .push(PowerUp::new(PowerUpKind::Shield, state.player.center(), 0.0));
        resolve_collisions(&mut state, Bounds::default());

        assert!(state.effects().shield);
        assert!(state.power_ups[0].marked_for_deletion);
        assert!(state.events().contains(&GameEvent::PowerUp(PowerUpKind::Shield)));
    }

    #[test]
    fn test_enemy_shot_hits_player() {
        let mut state = fresh();
        state
            .projectiles
            .push(Projectile::new(state.player.center(), Vec2::new(-500.0, 0.0), 8.0, 5.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.projectiles[0].marked_for_deletion);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_shield_absorbs_shot() {
        let mut state = fresh();
        activate(&mut state.active_power_ups, PowerUpKind::Shield);
        state
            .projectiles
            .push(Projectile::new(state.player.center(), Vec2::new(-500.0, 0.0), 8.0, 5.0));
        resolve_collisions(&mut state, Bounds::default());
        assert!(state.projectiles[0].marked_for_deletion);
        assert_eq!(state.health, 1.0);
    }

    #[test]
    fn test_boss_kill_reward() {
        let mut state = fresh();
        let mut boss = Boss::new(BossKind::Standard, Bounds::default());
        boss.pos = Vec2::new(400.0, 270.0);
        boss.hp = 10;
        state.boss = Some(boss);
        state
            .player_projectiles
            .push(PlayerProjectile::new(Vec2::new(420.0, 300.0), WeaponKind::Pulse));

        resolve_collisions(&mut state, Bounds::default());

        assert!(state.boss.as_ref().is_some_and(|b| b.is_dead()));
        assert_eq!(state.currency_earned, BOSS_KILL_REWARD as u64);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Explosion));
        assert!(events.contains(&GameEvent::CurrencyAwarded {
            amount: 50,
            source: CurrencySource::BossKill
        }));
        assert!(state.floating_texts.iter().any(|t| t.text == "BOSS DEFEATED!"));

        state.prune();
        assert!(state.boss.is_none());
        assert!(state.player_projectiles.is_empty());
        assert_eq!(state.drain_events(), vec![GameEvent::BossMusicStop]);
    }

    #[test]
    fn test_boss_hit_without_kill_plays_hit_sound() {
        let mut state = fresh();
        let mut boss = Boss::new(BossKind::Juggernaut, Bounds::default());
        boss.pos = Vec2::new(400.0, 270.0);
        state.boss = Some(boss);
        state
            .player_projectiles
            .push(PlayerProjectile::new(Vec2::new(420.0, 300.0), WeaponKind::Cannon));

        resolve_collisions(&mut state, Bounds::default());
        assert_eq!(state.boss.as_ref().map(|b| b.hp), Some(75));
        assert_eq!(state.drain_events(), vec![GameEvent::Shoot]);
        assert_eq!(state.currency_earned, 0);
    }
}
