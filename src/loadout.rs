//! Ship/weapon catalogue and upgrade-derived run stats
//!
//! Everything here is read once at run start. The simulation never mutates
//! a loadout mid-run.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Unlockable ship hulls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipKind {
    #[default]
    Default,
    Interceptor,
    Cruiser,
    Stealth,
    VoidRunner,
    PlasmaBreaker,
}

/// Ship-specific tunables layered on top of upgrades
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShipPerks {
    pub max_ammo: u32,
    /// Seconds per regenerated round
    pub ammo_regen_interval: f32,
    pub bonus_health: u32,
    /// Multiplier on collectible spawn chance
    pub collectible_rate: f32,
    /// Multiplier on power-up spawn chance
    pub power_up_rate: f32,
    /// Phase through obstacles shorter than SMALL_OBSTACLE_HEIGHT
    pub phase_small_obstacles: bool,
    /// Seconds between free obstacle rams (None = no ram ability)
    pub ram_cooldown: Option<f32>,
}

impl ShipKind {
    pub const ALL: [ShipKind; 6] = [
        ShipKind::Default,
        ShipKind::Interceptor,
        ShipKind::Cruiser,
        ShipKind::Stealth,
        ShipKind::VoidRunner,
        ShipKind::PlasmaBreaker,
    ];

    /// Storage id used by the shop
    pub fn id(&self) -> &'static str {
        match self {
            ShipKind::Default => "default",
            ShipKind::Interceptor => "interceptor",
            ShipKind::Cruiser => "cruiser",
            ShipKind::Stealth => "stealth",
            ShipKind::VoidRunner => "void_runner",
            ShipKind::PlasmaBreaker => "plasma_breaker",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id.trim())
    }

    pub fn perks(&self) -> ShipPerks {
        let base = ShipPerks {
            max_ammo: 10,
            ammo_regen_interval: 2.0,
            bonus_health: 0,
            collectible_rate: 1.0,
            power_up_rate: 1.0,
            phase_small_obstacles: false,
            ram_cooldown: None,
        };
        match self {
            ShipKind::Default => base,
            ShipKind::Interceptor => ShipPerks {
                max_ammo: 12,
                ammo_regen_interval: 1.2,
                ..base
            },
            ShipKind::Cruiser => ShipPerks {
                bonus_health: 1,
                ..base
            },
            ShipKind::Stealth => ShipPerks {
                phase_small_obstacles: true,
                ..base
            },
            ShipKind::VoidRunner => ShipPerks {
                collectible_rate: 1.5,
                power_up_rate: 2.0,
                ..base
            },
            ShipKind::PlasmaBreaker => ShipPerks {
                ram_cooldown: Some(8.0),
                ..base
            },
        }
    }
}

/// Player weapons (decides projectile speed/size/damage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Pulse,
    Blaster,
    Cannon,
    Beam,
    Wave,
    Shock,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeaponStats {
    pub speed: f32,
    pub radius: f32,
    pub damage: u32,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::Pulse,
        WeaponKind::Blaster,
        WeaponKind::Cannon,
        WeaponKind::Beam,
        WeaponKind::Wave,
        WeaponKind::Shock,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            WeaponKind::Pulse => "pulse",
            WeaponKind::Blaster => "blaster",
            WeaponKind::Cannon => "cannon",
            WeaponKind::Beam => "beam",
            WeaponKind::Wave => "wave",
            WeaponKind::Shock => "shock",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.id() == id.trim())
    }

    pub fn stats(&self) -> WeaponStats {
        let (speed, radius, damage) = match self {
            WeaponKind::Pulse => (800.0, 5.0, 10),
            WeaponKind::Blaster => (900.0, 6.0, 15),
            WeaponKind::Cannon => (600.0, 8.0, 25),
            WeaponKind::Beam => (1400.0, 3.0, 12),
            WeaponKind::Wave => (700.0, 7.0, 18),
            WeaponKind::Shock => (1000.0, 5.0, 20),
        };
        WeaponStats {
            speed,
            radius,
            damage,
        }
    }
}

/// Purchased upgrade counts (0 = never bought)
///
/// The shop stores 1-based levels; `Loadout::from_stored` converts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub battery: u32,
    pub thruster: u32,
    pub magnet: u32,
    pub hull: u32,
    pub multiplier: u32,
    #[serde(alias = "shieldGen", alias = "shield_generator")]
    pub shield_gen: u32,
}

/// What the player flies with this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub ship: ShipKind,
    pub weapon: WeaponKind,
    pub upgrades: Upgrades,
}

/// Numbers the simulation actually reads, derived once from a loadout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStats {
    pub max_energy: f32,
    pub lift: f32,
    pub start_speed: f32,
    pub magnet_range: f32,
    pub max_health: f32,
    pub currency_multiplier: u32,
    /// Health regenerated per second (0 without a shield generator)
    pub regen_rate: f32,
    pub perks: ShipPerks,
}

impl RunStats {
    pub fn from_loadout(loadout: &Loadout) -> Self {
        let up = &loadout.upgrades;
        let perks = loadout.ship.perks();
        Self {
            max_energy: BASE_MAX_ENERGY + up.battery as f32 * 20.0,
            lift: BASE_LIFT + up.thruster as f32 * 60.0,
            // An untouched thruster already counts as one step
            start_speed: BASE_SCROLL_SPEED + (up.thruster + 1) as f32 * 20.0,
            magnet_range: 70.0 + up.magnet as f32 * 20.0,
            max_health: (1 + up.hull + perks.bonus_health) as f32,
            currency_multiplier: 1 + up.multiplier,
            regen_rate: up.shield_gen as f32 * 0.05,
            perks,
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::from_loadout(&Loadout::default())
    }
}
