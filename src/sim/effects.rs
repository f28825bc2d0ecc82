//! Power-up catalogue and active-effect bookkeeping
//!
//! The active list is the single source of truth. `EffectFlags` is always
//! recomputed from it with `derive_effects`, never stored.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::state::{Bounds, Collectible, GameEvent, GameState};
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerUpKind {
    Shield,
    TimeSlow,
    Magnet,
    RapidFire,
    GhostMode,
    CoinRain,
    DoubleCoins,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::Shield,
        PowerUpKind::TimeSlow,
        PowerUpKind::Magnet,
        PowerUpKind::RapidFire,
        PowerUpKind::GhostMode,
        PowerUpKind::CoinRain,
        PowerUpKind::DoubleCoins,
    ];

    /// Effect duration in seconds (None = instant)
    pub fn duration(&self) -> Option<f32> {
        match self {
            PowerUpKind::Shield => Some(8.0),
            PowerUpKind::TimeSlow => Some(6.0),
            PowerUpKind::Magnet => Some(10.0),
            PowerUpKind::RapidFire => Some(8.0),
            PowerUpKind::GhostMode => Some(5.0),
            PowerUpKind::DoubleCoins => Some(10.0),
            PowerUpKind::CoinRain => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "SHIELD",
            PowerUpKind::TimeSlow => "TIME SLOW",
            PowerUpKind::Magnet => "MAGNET",
            PowerUpKind::RapidFire => "RAPID FIRE",
            PowerUpKind::GhostMode => "GHOST MODE",
            PowerUpKind::CoinRain => "COIN RAIN",
            PowerUpKind::DoubleCoins => "DOUBLE COINS",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "#00aaff",
            PowerUpKind::TimeSlow => "#a855f7",
            PowerUpKind::Magnet => "#ff0055",
            PowerUpKind::RapidFire => "#ffaa00",
            PowerUpKind::GhostMode => "#00ff88",
            PowerUpKind::CoinRain => "#ffd700",
            PowerUpKind::DoubleCoins => "#ffee55",
        }
    }
}

/// A timed effect currently running
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: f32,
    pub duration: f32,
    pub label: &'static str,
    pub color: &'static str,
}

impl ActivePowerUp {
    pub fn new(kind: PowerUpKind, duration: f32) -> Self {
        Self {
            kind,
            remaining: duration,
            duration,
            label: kind.label(),
            color: kind.color(),
        }
    }
}

/// Aggregate rule modifiers for this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectFlags {
    pub currency_multiplier: u32,
    /// Hits are absorbed (obstacles/shots still consumed)
    pub shield: bool,
    /// No damage from any source
    pub invincible: bool,
    /// Multiplier on world scroll speed
    pub time_scale: f32,
    pub unlimited_ammo: bool,
    /// Fly through obstacles and shots untouched
    pub phase_through: bool,
    pub magnet: bool,
}

impl Default for EffectFlags {
    fn default() -> Self {
        Self {
            currency_multiplier: 1,
            shield: false,
            invincible: false,
            time_scale: 1.0,
            unlimited_ammo: false,
            phase_through: false,
            magnet: false,
        }
    }
}

/// Reduce the active list to effect flags
pub fn derive_effects(active: &[ActivePowerUp]) -> EffectFlags {
    active
        .iter()
        .filter(|p| p.remaining > 0.0)
        .fold(EffectFlags::default(), |mut flags, p| {
            match p.kind {
                PowerUpKind::Shield => {
                    flags.shield = true;
                    flags.invincible = true;
                }
                PowerUpKind::TimeSlow => flags.time_scale = flags.time_scale.min(0.5),
                PowerUpKind::Magnet => flags.magnet = true,
                PowerUpKind::RapidFire => flags.unlimited_ammo = true,
                PowerUpKind::GhostMode => {
                    flags.phase_through = true;
                    flags.invincible = true;
                }
                PowerUpKind::DoubleCoins => flags.currency_multiplier = 2,
                PowerUpKind::CoinRain => {}
            }
            flags
        })
}

/// Insert a timed effect or refresh it if already running.
/// Returns true on refresh. Instant kinds are ignored.
pub fn activate(active: &mut Vec<ActivePowerUp>, kind: PowerUpKind) -> bool {
    let Some(duration) = kind.duration() else {
        return false;
    };
    if let Some(existing) = active.iter_mut().find(|p| p.kind == kind) {
        existing.remaining = duration;
        existing.duration = duration;
        return true;
    }
    active.push(ActivePowerUp::new(kind, duration));
    false
}

/// Count down timers and drop expired effects. Returns the kinds that ended.
pub fn age(active: &mut Vec<ActivePowerUp>, dt: f32) -> Vec<PowerUpKind> {
    let mut expired = Vec::new();
    active.retain_mut(|p| {
        p.remaining -= dt;
        if p.remaining <= 0.0 {
            expired.push(p.kind);
            false
        } else {
            true
        }
    });
    expired
}

/// Apply a collected power-up to the session
pub fn apply_power_up(state: &mut GameState, kind: PowerUpKind, bounds: Bounds) {
    match kind {
        PowerUpKind::CoinRain => {
            // Burst of orbs just ahead of the player
            let start_x = state.player.pos.x + 150.0;
            let max_y = (bounds.height - 50.0).max(51.0);
            for i in 0..COIN_RAIN_COUNT {
                let x = start_x + i as f32 * 40.0;
                let y = state.rng.random_range(50.0..max_y);
                let phase = state.rng.random::<f32>() * std::f32::consts::TAU;
                state.collectibles.push(Collectible::new(Vec2::new(x, y), phase));
            }
        }
        _ => {
            let refreshed = activate(&mut state.active_power_ups, kind);
            log::debug!(
                "Power-up {:?} {}",
                kind,
                if refreshed { "refreshed" } else { "activated" }
            );
        }
    }
    state.emit(GameEvent::PowerUp(kind));
}
