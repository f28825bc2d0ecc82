//! Session state and entity models
//!
//! One `GameState` per run. The simulation step is its only mutator; the draw
//! hook gets a shared borrow.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::boss::Boss;
use super::collision::Rect;
use super::effects::{ActivePowerUp, EffectFlags, PowerUpKind, derive_effects};
use super::spawn::SpawnConfig;
use crate::consts::*;
use crate::loadout::{Loadout, RunStats, WeaponKind};
use crate::{heading_of, heading_vec, normalize_angle};

/// Current play-field size, supplied by the host every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    /// x = left edge, y = vertical center
    pub pos: Vec2,
    /// Vertical velocity (px/s, positive = falling)
    pub velocity: f32,
    pub gravity: f32,
    pub lift: f32,
    pub boosting: bool,
    /// Visual tilt in degrees
    pub rotation: f32,
}

impl Player {
    pub fn new(lift: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, PLAYER_START_Y),
            velocity: 0.0,
            gravity: GRAVITY,
            lift,
            boosting: false,
            rotation: 0.0,
        }
    }

    /// Integrate one tick of boost/gravity
    pub fn update(&mut self, dt: f32) {
        let accel = if self.boosting { -self.lift } else { self.gravity };
        self.velocity += accel * dt;
        self.pos.y += self.velocity * dt;

        self.rotation = (self.velocity * ROTATION_PER_VELOCITY)
            .clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);

        // Ceiling only; falling out the bottom is a collision concern
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.velocity = 0.0;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x,
            self.pos.y - PLAYER_HEIGHT / 2.0,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x + PLAYER_WIDTH / 2.0, self.pos.y)
    }
}

/// Wall segment hanging from the ceiling or standing on the floor
#[derive(Debug, Clone, Serialize)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub marked_for_deletion: bool,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, dt: f32, speed: f32) {
        self.pos.x -= speed * dt;
        if self.pos.x + self.size.x < 0.0 {
            self.marked_for_deletion = true;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Horizontal scroll plus a gentle vertical bob
fn drift(pos: &mut Vec2, oscillation: &mut f32, dt: f32, speed: f32) {
    pos.x -= speed * dt;
    *oscillation += dt * BOB_RATE;
    pos.y += oscillation.sin() * BOB_AMPLITUDE * dt;
}

/// Currency orb
#[derive(Debug, Clone, Serialize)]
pub struct Collectible {
    /// Center
    pub pos: Vec2,
    pub radius: f32,
    pub oscillation: f32,
    pub marked_for_deletion: bool,
}

impl Collectible {
    pub fn new(pos: Vec2, oscillation: f32) -> Self {
        Self {
            pos,
            radius: COLLECTIBLE_RADIUS,
            oscillation,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, dt: f32, speed: f32) {
        drift(&mut self.pos, &mut self.oscillation, dt, speed);
        if self.pos.x + self.radius < 0.0 {
            self.marked_for_deletion = true;
        }
    }
}

/// Fuel canister size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuelKind {
    Small,
    Large,
}

impl FuelKind {
    /// Percent of max energy restored
    pub fn value(&self) -> f32 {
        match self {
            FuelKind::Small => 25.0,
            FuelKind::Large => 50.0,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FuelKind::Small => "#ffff00",
            FuelKind::Large => "#0088ff",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FuelKind::Small => "+FUEL",
            FuelKind::Large => "+SUPER FUEL",
        }
    }
}

/// Energy pickup
#[derive(Debug, Clone, Serialize)]
pub struct Fuel {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: FuelKind,
    pub oscillation: f32,
    pub marked_for_deletion: bool,
}

impl Fuel {
    pub fn new(pos: Vec2, kind: FuelKind, oscillation: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(FUEL_SIZE),
            kind,
            oscillation,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, dt: f32, speed: f32) {
        drift(&mut self.pos, &mut self.oscillation, dt, speed);
        if self.pos.x + self.size.x < 0.0 {
            self.marked_for_deletion = true;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Hexagonal power-up pickup
#[derive(Debug, Clone, Serialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Center
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub pulse_timer: f32,
    pub oscillation: f32,
    pub marked_for_deletion: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2, oscillation: f32) -> Self {
        Self {
            kind,
            pos,
            radius: POWERUP_RADIUS,
            rotation: 0.0,
            pulse_timer: 0.0,
            oscillation,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, dt: f32, speed: f32) {
        drift(&mut self.pos, &mut self.oscillation, dt, speed);
        self.rotation += dt * 2.0;
        self.pulse_timer += dt * 4.0;
        if self.pos.x + self.radius < 0.0 {
            self.marked_for_deletion = true;
        }
    }

    /// Bounding box of the hexagon
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// Steering for homing projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Homing {
    /// Max heading change (rad/s)
    pub turn_rate: f32,
}

/// Rotate `vel` toward `target - from` by at most `max_turn` radians, keeping speed
pub fn steer_toward(vel: Vec2, from: Vec2, target: Vec2, max_turn: f32) -> Vec2 {
    let to_target = target - from;
    if to_target.length_squared() < f32::EPSILON {
        return vel;
    }
    let current = heading_of(vel);
    let delta = normalize_angle(heading_of(to_target) - current);
    let turn = delta.clamp(-max_turn, max_turn);
    heading_vec(current + turn) * vel.length()
}

/// Enemy shot
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Seconds left before it fizzles
    pub life: f32,
    pub homing: Option<Homing>,
    pub marked_for_deletion: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, life: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            life,
            homing: None,
            marked_for_deletion: false,
        }
    }

    pub fn homing(mut self, turn_rate: f32) -> Self {
        self.homing = Some(Homing { turn_rate });
        self
    }

    pub fn update(&mut self, dt: f32, target: Vec2, bounds: Bounds) {
        if let Some(homing) = self.homing {
            self.vel = steer_toward(self.vel, self.pos, target, homing.turn_rate * dt);
        }
        self.pos += self.vel * dt;
        self.life -= dt;

        let off_screen = self.pos.x + self.radius < 0.0
            || self.pos.x - self.radius > bounds.width + 100.0
            || self.pos.y < -100.0
            || self.pos.y > bounds.height + 100.0;
        if self.life <= 0.0 || off_screen {
            self.marked_for_deletion = true;
        }
    }

    pub fn heading(&self) -> f32 {
        heading_of(self.vel)
    }
}

/// Player shot
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProjectile {
    /// Center
    pub pos: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub damage: u32,
    pub weapon: WeaponKind,
    pub marked_for_deletion: bool,
}

impl PlayerProjectile {
    pub fn new(pos: Vec2, weapon: WeaponKind) -> Self {
        let stats = weapon.stats();
        Self {
            pos,
            speed: stats.speed,
            radius: stats.radius,
            damage: stats.damage,
            weapon,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, dt: f32, bounds: Bounds) {
        self.pos.x += self.speed * dt;
        if self.pos.x - self.radius > bounds.width {
            self.marked_for_deletion = true;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// "+$1" style feedback that rises and fades
#[derive(Debug, Clone, Serialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: &'static str,
    pub life: f32,
}

/// Where a currency award came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CurrencySource {
    Pickup,
    BossKill,
}

/// Notifications for the sound layer and the currency sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Collect,
    Shoot,
    Explosion,
    PowerUp(PowerUpKind),
    MusicStart,
    MusicStop,
    BossMusicStart,
    BossMusicStop,
    CurrencyAwarded { amount: u32, source: CurrencySource },
    GameOver { currency_collected: u64 },
}

/// Complete run state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    pub loadout: Loadout,
    pub stats: RunStats,
    #[serde(skip)]
    pub spawn: SpawnConfig,
    pub player: Player,
    /// World scroll speed (px/s)
    pub speed: f32,
    pub distance: f32,
    /// Seconds since run start
    pub elapsed: f32,
    pub currency_earned: u64,
    pub health: f32,
    pub energy: f32,
    pub ammo: u32,
    pub ammo_timer: f32,
    /// Seconds until the plasma ram is ready again
    pub ram_cooldown: f32,
    pub active_power_ups: Vec<ActivePowerUp>,
    pub boss: Option<Boss>,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub fuels: Vec<Fuel>,
    pub power_ups: Vec<PowerUp>,
    pub projectiles: Vec<Projectile>,
    pub player_projectiles: Vec<PlayerProjectile>,
    pub floating_texts: Vec<FloatingText>,
    pub game_over: bool,
    /// Pending notifications (drained by the host)
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a fresh run
    pub fn new(seed: u64, loadout: Loadout) -> Self {
        let stats = RunStats::from_loadout(&loadout);
        log::info!(
            "Run start: seed={} ship={} weapon={}",
            seed,
            loadout.ship.id(),
            loadout.weapon.id()
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            loadout,
            stats,
            spawn: SpawnConfig::default(),
            player: Player::new(stats.lift),
            speed: stats.start_speed,
            distance: 0.0,
            elapsed: 0.0,
            currency_earned: 0,
            health: stats.max_health,
            energy: stats.max_energy,
            ammo: stats.perks.max_ammo,
            ammo_timer: 0.0,
            ram_cooldown: 0.0,
            active_power_ups: Vec::new(),
            boss: None,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            fuels: Vec::new(),
            power_ups: Vec::new(),
            projectiles: Vec::new(),
            player_projectiles: Vec::new(),
            floating_texts: Vec::new(),
            game_over: false,
            events: vec![GameEvent::MusicStart],
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    pub fn max_energy(&self) -> f32 {
        self.stats.max_energy
    }

    pub fn max_ammo(&self) -> u32 {
        self.stats.perks.max_ammo
    }

    /// Aggregate power-up effects, derived fresh from the active list
    pub fn effects(&self) -> EffectFlags {
        derive_effects(&self.active_power_ups)
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at queued events without draining
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // --- Input -----------------------------------------------------------

    /// Boost held/released. Starting a boost needs energy.
    pub fn set_boost(&mut self, active: bool) {
        if active {
            if !self.game_over && self.energy > 0.0 {
                self.player.boosting = true;
            }
        } else {
            self.player.boosting = false;
        }
    }

    /// Fire the equipped weapon. Returns true if a shot left the barrel.
    pub fn fire(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        if !self.effects().unlimited_ammo {
            if self.ammo == 0 {
                return false;
            }
            self.ammo -= 1;
        }

        let muzzle = Vec2::new(self.player.pos.x + MUZZLE_OFFSET, self.player.pos.y);
        self.player_projectiles
            .push(PlayerProjectile::new(muzzle, self.loadout.weapon));
        self.emit(GameEvent::Shoot);
        true
    }

    // --- Clamped mutators ------------------------------------------------

    pub fn restore_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, self.stats.max_energy);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, self.stats.max_health);
    }

    pub fn add_ammo(&mut self, amount: u32) {
        self.ammo = self.ammo.saturating_add(amount).min(self.max_ammo());
    }

    /// Lose one hull point. Returns true if that ended the run.
    pub fn damage_player(&mut self) -> bool {
        self.health = (self.health - 1.0).max(0.0);
        if self.health <= 0.0 {
            self.trigger_game_over();
            return true;
        }
        self.emit(GameEvent::Explosion);
        false
    }

    pub fn award_currency(&mut self, amount: u32, source: CurrencySource) {
        self.currency_earned += amount as u64;
        self.emit(GameEvent::CurrencyAwarded { amount, source });
    }

    pub fn add_floating_text(
        &mut self,
        pos: Vec2,
        text: impl Into<String>,
        color: &'static str,
        life: f32,
    ) {
        self.floating_texts.push(FloatingText {
            pos,
            text: text.into(),
            color,
            life,
        });
    }

    /// End the run (idempotent)
    pub fn trigger_game_over(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.player.boosting = false;
        self.emit(GameEvent::Explosion);
        self.emit(GameEvent::MusicStop);
        self.emit(GameEvent::GameOver {
            currency_collected: self.currency_earned,
        });
        log::info!(
            "Game over: distance={:.0}m currency={}",
            self.distance,
            self.currency_earned
        );
    }

    /// Drop every entity whose deletion flag is set
    pub fn prune(&mut self) {
        self.obstacles.retain(|o| !o.marked_for_deletion);
        self.collectibles.retain(|c| !c.marked_for_deletion);
        self.fuels.retain(|f| !f.marked_for_deletion);
        self.power_ups.retain(|p| !p.marked_for_deletion);
        self.projectiles.retain(|p| !p.marked_for_deletion);
        self.player_projectiles.retain(|p| !p.marked_for_deletion);
        self.remove_finished_boss();
    }

    /// Remove the boss once it is dead or gone, restoring normal music
    pub(crate) fn remove_finished_boss(&mut self) {
        if self.boss.as_ref().is_some_and(|b| b.marked_for_deletion()) {
            if let Some(boss) = self.boss.take() {
                log::info!("Boss {:?} removed ({:?})", boss.kind, boss.fate);
            }
            self.emit(GameEvent::BossMusicStop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_gravity_and_boost() {
        let mut player = Player::new(BASE_LIFT);
        player.update(0.1);
        assert!((player.velocity - 50.0).abs() < 1e-4);
        assert!(player.pos.y > PLAYER_START_Y);

        player.boosting = true;
        player.update(0.1);
        // 50 - 80
        assert!((player.velocity - (-30.0)).abs() < 1e-4);
    }

    #[test]
    fn test_player_rotation_clamped() {
        let mut player = Player::new(BASE_LIFT);
        player.velocity = 5000.0;
        player.update(0.0);
        assert_eq!(player.rotation, MAX_ROTATION_DEG);
        player.velocity = -5000.0;
        player.pos.y = 400.0;
        player.update(0.0);
        assert_eq!(player.rotation, -MAX_ROTATION_DEG);
    }

    #[test]
    fn test_player_ceiling_clamp() {
        let mut player = Player::new(BASE_LIFT);
        player.pos.y = 1.0;
        player.velocity = -500.0;
        player.boosting = true;
        player.update(0.05);
        assert_eq!(player.pos.y, 0.0);
        assert_eq!(player.velocity, 0.0);
    }

    #[test]
    fn test_player_floor_not_clamped() {
        let mut player = Player::new(BASE_LIFT);
        player.pos.y = 10_000.0;
        player.update(0.1);
        assert!(player.pos.y > 10_000.0);
    }

    #[test]
    fn test_obstacle_marked_off_screen() {
        let mut obs = Obstacle::new(10.0, 0.0, 50.0, 100.0);
        obs.update(0.1, 400.0);
        assert!(!obs.marked_for_deletion);
        obs.update(0.1, 400.0);
        assert!(obs.marked_for_deletion);
    }

    #[test]
    fn test_prune_drops_only_marked() {
        let mut state = GameState::new(1, Loadout::default());
        let mut gone = Obstacle::new(10.0, 0.0, 50.0, 100.0);
        gone.marked_for_deletion = true;
        state.obstacles.push(gone);
        state.obstacles.push(Obstacle::new(500.0, 0.0, 50.0, 100.0));

        state.prune();
        assert_eq!(state.obstacles.len(), 1);
        assert!(!state.obstacles[0].marked_for_deletion);
        assert_eq!(state.obstacles[0].pos.x, 500.0);
    }

    #[test]
    fn test_fuel_kinds() {
        assert_eq!(FuelKind::Small.value(), 25.0);
        assert_eq!(FuelKind::Large.value(), 50.0);
        assert_ne!(FuelKind::Small.color(), FuelKind::Large.color());
    }

    #[test]
    fn test_player_projectile_uses_weapon_table() {
        let shot = PlayerProjectile::new(Vec2::ZERO, WeaponKind::Cannon);
        assert_eq!(shot.damage, 25);
        assert_eq!(shot.radius, 8.0);
    }

    #[test]
    fn test_fire_consumes_ammo_until_empty() {
        let mut state = GameState::new(1, Loadout::default());
        let max = state.max_ammo();
        for _ in 0..max {
            assert!(state.fire());
        }
        assert_eq!(state.ammo, 0);
        assert!(!state.fire());
        assert_eq!(state.player_projectiles.len(), max as usize);
    }

    #[test]
    fn test_boost_needs_energy() {
        let mut state = GameState::new(1, Loadout::default());
        state.energy = 0.0;
        state.set_boost(true);
        assert!(!state.player.boosting);
        state.energy = 10.0;
        state.set_boost(true);
        assert!(state.player.boosting);
        state.set_boost(false);
        assert!(!state.player.boosting);
    }

    #[test]
    fn test_clamped_mutators() {
        let mut state = GameState::new(1, Loadout::default());
        state.restore_energy(1000.0);
        assert_eq!(state.energy, state.max_energy());
        state.restore_energy(-1000.0);
        assert_eq!(state.energy, 0.0);
        state.heal(50.0);
        assert_eq!(state.health, state.max_health());
        state.add_ammo(u32::MAX);
        assert_eq!(state.ammo, state.max_ammo());
    }

    #[test]
    fn test_game_over_is_idempotent() {
        let mut state = GameState::new(1, Loadout::default());
        state.drain_events();
        state.trigger_game_over();
        state.trigger_game_over();
        let game_overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }
}
