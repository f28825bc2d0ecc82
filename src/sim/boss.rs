//! Boss AI
//!
//! One `Boss` struct for every variant. The `kind` tag selects a tuning table
//! and an attack pattern; everything else is shared.
//!
//! Lifecycle: Entering -> Attacking -> Leaving, with Killed or Departed as the
//! terminal fate. Burst shots are queued on the boss's own clock and drained as
//! they come due, so they die with the boss.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::Rect;
use super::state::{Bounds, PlayerProjectile, Projectile};
use crate::heading_vec;

/// Distance from the right edge the boss settles at
const ATTACK_INSET: f32 = 150.0;
/// Keep-out margin at the top and bottom of the field
const BAND_MARGIN: f32 = 50.0;
const LEAVE_SPEED: f32 = 500.0;
const DEPART_X: f32 = -200.0;
const HIT_FLASH: f32 = 0.1;

/// Dodge proximity box (ahead of the boss)
const DODGE_RANGE: f32 = 300.0;
const DODGE_HALF_HEIGHT: f32 = 60.0;

/// Lateral pursuit offset and its re-roll window
const OFFSET_SPREAD: f32 = 150.0;
const OFFSET_MIN_INTERVAL: f32 = 1.0;
const OFFSET_MAX_INTERVAL: f32 = 3.0;

/// Enemy shot tuning
const SHOT_SPEED: f32 = 500.0;
const SHOT_RADIUS: f32 = 8.0;
const SHOT_LIFE: f32 = 8.0;
const BURST_SIZE: usize = 3;
const BURST_GAP: f32 = 0.2;
const SPREAD_ANGLE: f32 = 0.25;
const MISSILE_SPEED: f32 = 250.0;
const MISSILE_RADIUS: f32 = 10.0;
const MISSILE_TURN_RATE: f32 = 1.2;
const MISSILE_LIFE: f32 = 6.0;

/// Boss variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossKind {
    Standard,
    Speedster,
    Juggernaut,
}

/// Scripted horizontal lunge (Speedster)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashTuning {
    pub interval: f32,
    pub speed: f32,
    pub duration: f32,
    /// Exponential ease back toward the attack x (1/s)
    pub return_rate: f32,
}

/// Per-variant movement and attack tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossTuning {
    pub max_hp: i32,
    pub size: Vec2,
    /// Pursuit spring constant
    pub stiffness: f32,
    pub max_accel: f32,
    pub max_speed: f32,
    pub friction: f32,
    /// Dodge push (px/s²) per shot in the proximity box
    pub dodge_accel: f32,
    pub dodges: bool,
    pub attack_cooldown: f32,
    /// Seconds of Attacking before the boss leaves
    pub attack_duration: f32,
    pub dash: Option<DashTuning>,
}

impl BossKind {
    pub const ALL: [BossKind; 3] = [BossKind::Standard, BossKind::Speedster, BossKind::Juggernaut];

    /// Relative spawn weight
    pub fn weight(&self) -> u32 {
        match self {
            BossKind::Standard => 50,
            BossKind::Speedster => 30,
            BossKind::Juggernaut => 20,
        }
    }

    /// Weighted draw over all variants
    pub fn pick(rng: &mut impl Rng) -> Self {
        let total: u32 = Self::ALL.iter().map(|k| k.weight()).sum();
        let mut roll = rng.random_range(0..total);
        for kind in Self::ALL {
            if roll < kind.weight() {
                return kind;
            }
            roll -= kind.weight();
        }
        BossKind::Standard
    }

    pub fn tuning(&self) -> BossTuning {
        match self {
            BossKind::Standard => BossTuning {
                max_hp: 20,
                size: Vec2::new(80.0, 60.0),
                stiffness: 6.0,
                max_accel: 900.0,
                max_speed: 300.0,
                friction: 2.0,
                dodge_accel: 1500.0,
                dodges: true,
                attack_cooldown: 2.0,
                attack_duration: 15.0,
                dash: None,
            },
            BossKind::Speedster => BossTuning {
                max_hp: 40,
                size: Vec2::new(60.0, 45.0),
                stiffness: 10.0,
                max_accel: 1400.0,
                max_speed: 420.0,
                friction: 1.5,
                dodge_accel: 2200.0,
                dodges: true,
                attack_cooldown: 1.5,
                attack_duration: 18.0,
                dash: Some(DashTuning {
                    interval: 2.5,
                    speed: 450.0,
                    duration: 0.3,
                    return_rate: 3.0,
                }),
            },
            BossKind::Juggernaut => BossTuning {
                max_hp: 100,
                size: Vec2::new(110.0, 80.0),
                stiffness: 3.0,
                max_accel: 400.0,
                max_speed: 150.0,
                friction: 4.0,
                dodge_accel: 0.0,
                dodges: false,
                attack_cooldown: 3.0,
                attack_duration: 20.0,
                dash: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossPhase {
    Entering,
    Attacking,
    Leaving,
}

/// Lifecycle flag; anything but Alive means "remove me"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossFate {
    Alive,
    Killed,
    Departed,
}

/// What a queued shot turns into when it fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ShotPattern {
    Single,
    Spread,
    Homing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingShot {
    /// Boss clock time the shot is due
    pub fire_at: f32,
    pub pattern: ShotPattern,
}

/// Speedster lunge bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashState {
    /// Seconds until the next lunge
    pub cooldown: f32,
    /// Seconds left in the current lunge (0 = easing back)
    pub remaining: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub kind: BossKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub phase: BossPhase,
    pub phase_time: f32,
    pub attack_timer: f32,
    pub hit_flash: f32,
    pub vel_y: f32,
    /// Lateral offset added to the player's y while pursuing
    pub offset: f32,
    pub offset_timer: f32,
    pub dash: DashState,
    pub pending: Vec<PendingShot>,
    /// Seconds since spawn (pending shots are scheduled on this)
    pub clock: f32,
    pub fate: BossFate,
    #[serde(skip)]
    tuning: BossTuning,
}

impl Boss {
    /// Spawn at the right edge, vertically centered
    pub fn new(kind: BossKind, bounds: Bounds) -> Self {
        let tuning = kind.tuning();
        Self {
            kind,
            pos: Vec2::new(bounds.width, (bounds.height - tuning.size.y) / 2.0),
            size: tuning.size,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            phase: BossPhase::Entering,
            phase_time: 0.0,
            attack_timer: 0.0,
            hit_flash: 0.0,
            vel_y: 0.0,
            offset: 0.0,
            offset_timer: 0.0,
            dash: DashState {
                cooldown: tuning.dash.map_or(0.0, |d| d.interval),
                remaining: 0.0,
            },
            pending: Vec::new(),
            clock: 0.0,
            fate: BossFate::Alive,
            tuning,
        }
    }

    pub fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Health bar fill, against the boss's real max hp
    pub fn health_fraction(&self) -> f32 {
        (self.hp.max(0) as f32 / self.max_hp.max(1) as f32).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.fate == BossFate::Alive
    }

    pub fn is_dead(&self) -> bool {
        self.fate == BossFate::Killed
    }

    pub fn marked_for_deletion(&self) -> bool {
        self.fate != BossFate::Alive
    }

    /// Apply a hit. Returns true if this hit killed the boss.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount.min(i32::MAX as u32) as i32);
        self.hit_flash = HIT_FLASH;
        if self.hp <= 0 {
            self.fate = BossFate::Killed;
            self.pending.clear();
            return true;
        }
        false
    }

    /// Advance the state machine. Returns the shots that came due this tick.
    pub fn update(
        &mut self,
        dt: f32,
        player_y: f32,
        incoming: &[PlayerProjectile],
        bounds: Bounds,
        rng: &mut impl Rng,
    ) -> Vec<Projectile> {
        if !self.is_alive() {
            return Vec::new();
        }

        self.clock += dt;
        self.phase_time += dt;
        self.hit_flash = (self.hit_flash - dt).max(0.0);

        match self.phase {
            BossPhase::Entering => self.enter(dt, player_y, bounds),
            BossPhase::Attacking => {
                self.pursue(dt, player_y, incoming, bounds, rng);
                self.dash(dt, bounds);
                self.schedule_attack(dt);
                if self.phase_time > self.tuning.attack_duration {
                    self.set_phase(BossPhase::Leaving);
                }
            }
            BossPhase::Leaving => {
                self.pos.x -= LEAVE_SPEED * dt;
                if self.pos.x < DEPART_X {
                    self.fate = BossFate::Departed;
                    self.pending.clear();
                    return Vec::new();
                }
            }
        }

        self.fire_due()
    }

    fn set_phase(&mut self, phase: BossPhase) {
        self.phase = phase;
        self.phase_time = 0.0;
    }

    fn attack_x(bounds: Bounds) -> f32 {
        bounds.width - ATTACK_INSET
    }

    fn enter(&mut self, dt: f32, player_y: f32, bounds: Bounds) {
        let target = Self::attack_x(bounds);
        self.pos.x -= (self.pos.x - target) * 2.0 * dt;
        self.pos.y += (player_y - self.center().y) * dt;

        if (self.pos.x - target).abs() < 10.0 {
            self.set_phase(BossPhase::Attacking);
        }
    }

    /// Critically damped vertical pursuit plus dodge
    fn pursue(
        &mut self,
        dt: f32,
        player_y: f32,
        incoming: &[PlayerProjectile],
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        let t = self.tuning;

        self.offset_timer -= dt;
        if self.offset_timer <= 0.0 {
            self.offset = rng.random_range(-OFFSET_SPREAD..OFFSET_SPREAD);
            self.offset_timer = rng.random_range(OFFSET_MIN_INTERVAL..OFFSET_MAX_INTERVAL);
        }

        let center_y = self.center().y;
        let desired = player_y + self.offset;
        let accel = (t.stiffness * (desired - center_y) - 2.0 * t.stiffness.sqrt() * self.vel_y)
            .clamp(-t.max_accel, t.max_accel);
        self.vel_y += accel * dt;

        if t.dodges {
            self.vel_y += self.dodge_push(incoming) * dt;
        }

        self.vel_y /= 1.0 + t.friction * dt;
        self.vel_y = self.vel_y.clamp(-t.max_speed, t.max_speed);
        self.pos.y += self.vel_y * dt;

        // Band may collapse on tiny viewports; top wins
        let top = BAND_MARGIN;
        let bottom = (bounds.height - BAND_MARGIN - self.size.y).max(top);
        if self.pos.y < top {
            self.pos.y = top;
            self.vel_y = self.vel_y.max(0.0);
        } else if self.pos.y > bottom {
            self.pos.y = bottom;
            self.vel_y = self.vel_y.min(0.0);
        }
    }

    /// Summed push away from every shot heading into the proximity box
    fn dodge_push(&self, incoming: &[PlayerProjectile]) -> f32 {
        let center_y = self.center().y;
        incoming
            .iter()
            .filter(|p| !p.marked_for_deletion)
            .filter(|p| {
                let ahead = self.pos.x - p.pos.x;
                ahead > 0.0 && ahead < DODGE_RANGE && (p.pos.y - center_y).abs() < DODGE_HALF_HEIGHT
            })
            .map(|p| {
                if p.pos.y >= center_y {
                    -self.tuning.dodge_accel
                } else {
                    self.tuning.dodge_accel
                }
            })
            .sum()
    }

    fn dash(&mut self, dt: f32, bounds: Bounds) {
        let Some(dash) = self.tuning.dash else {
            return;
        };

        if self.dash.remaining > 0.0 {
            self.pos.x -= dash.speed * dt;
            self.dash.remaining -= dt;
            return;
        }

        let home = Self::attack_x(bounds);
        self.pos.x += (home - self.pos.x) * (dash.return_rate * dt).min(1.0);
        self.dash.cooldown -= dt;
        if self.dash.cooldown <= 0.0 {
            self.dash.cooldown = dash.interval;
            self.dash.remaining = dash.duration;
        }
    }

    fn schedule_attack(&mut self, dt: f32) {
        self.attack_timer += dt;
        if self.attack_timer < self.tuning.attack_cooldown {
            return;
        }
        self.attack_timer = 0.0;

        match self.kind {
            BossKind::Standard => {
                for i in 0..BURST_SIZE {
                    self.pending.push(PendingShot {
                        fire_at: self.clock + i as f32 * BURST_GAP,
                        pattern: ShotPattern::Single,
                    });
                }
            }
            BossKind::Speedster => self.pending.push(PendingShot {
                fire_at: self.clock,
                pattern: ShotPattern::Spread,
            }),
            BossKind::Juggernaut => self.pending.push(PendingShot {
                fire_at: self.clock,
                pattern: ShotPattern::Homing,
            }),
        }
    }

    /// Pop every queued shot that is due and turn it into projectiles
    fn fire_due(&mut self) -> Vec<Projectile> {
        let clock = self.clock;
        let muzzle = Vec2::new(self.pos.x, self.center().y);
        let mut shots = Vec::new();

        self.pending.retain(|shot| {
            if shot.fire_at > clock {
                return true;
            }
            match shot.pattern {
                ShotPattern::Single => shots.push(Projectile::new(
                    muzzle,
                    Vec2::new(-SHOT_SPEED, 0.0),
                    SHOT_RADIUS,
                    SHOT_LIFE,
                )),
                ShotPattern::Spread => {
                    for angle in [-SPREAD_ANGLE, 0.0, SPREAD_ANGLE] {
                        shots.push(Projectile::new(
                            muzzle,
                            heading_vec(PI + angle) * SHOT_SPEED,
                            SHOT_RADIUS,
                            SHOT_LIFE,
                        ));
                    }
                }
                ShotPattern::Homing => shots.push(
                    Projectile::new(
                        muzzle,
                        Vec2::new(-MISSILE_SPEED, 0.0),
                        MISSILE_RADIUS,
                        MISSILE_LIFE,
                    )
                    .homing(MISSILE_TURN_RATE),
                ),
            }
            false
        });

        shots
    }
}
