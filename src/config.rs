//! Persisted loadout (read-only from the simulation's point of view)
//!
//! The shop writes these LocalStorage keys; a run only reads them at start.
//! Anything unparseable is treated as absent.

use crate::loadout::{Loadout, ShipKind, Upgrades, WeaponKind};

/// LocalStorage keys written by the shop
pub const UPGRADES_KEY: &str = "neon_glide_upgrades";
pub const SHIP_KEY: &str = "neon_glide_equipped_ship";
pub const WEAPON_KEY: &str = "neon_glide_equipped_weapon";

impl Upgrades {
    /// Convert the shop's 1-based levels (1 = nothing bought) to purchase counts
    pub fn from_shop_levels(stored: Upgrades) -> Self {
        Self {
            battery: stored.battery.saturating_sub(1),
            thruster: stored.thruster.saturating_sub(1),
            magnet: stored.magnet.saturating_sub(1),
            hull: stored.hull.saturating_sub(1),
            multiplier: stored.multiplier.saturating_sub(1),
            shield_gen: stored.shield_gen.saturating_sub(1),
        }
    }
}

impl Loadout {
    /// Build a loadout from raw stored values, falling back per field
    pub fn from_stored(
        upgrades_json: Option<&str>,
        ship_id: Option<&str>,
        weapon_id: Option<&str>,
    ) -> Self {
        let upgrades = match upgrades_json {
            Some(json) => match serde_json::from_str::<Option<Upgrades>>(json) {
                Ok(stored) => stored.map(Upgrades::from_shop_levels).unwrap_or_default(),
                Err(e) => {
                    log::warn!("Ignoring malformed upgrades ({}), using base stats", e);
                    Upgrades::default()
                }
            },
            None => Upgrades::default(),
        };

        let ship = ship_id
            .and_then(|id| {
                let ship = ShipKind::from_id(id);
                if ship.is_none() {
                    log::warn!("Unknown ship id {:?}, using default", id);
                }
                ship
            })
            .unwrap_or_default();

        let weapon = weapon_id
            .and_then(|id| {
                let weapon = WeaponKind::from_id(id);
                if weapon.is_none() {
                    log::warn!("Unknown weapon id {:?}, using default", id);
                }
                weapon
            })
            .unwrap_or_default();

        Self {
            ship,
            weapon,
            upgrades,
        }
    }

    /// Load the equipped loadout from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("No LocalStorage, using default loadout");
            return Self::default();
        };

        let read = |key: &str| storage.get_item(key).ok().flatten();
        let upgrades = read(UPGRADES_KEY);
        let ship = read(SHIP_KEY);
        let weapon = read(WEAPON_KEY);

        let loadout = Self::from_stored(upgrades.as_deref(), ship.as_deref(), weapon.as_deref());
        log::info!(
            "Loaded loadout: ship={} weapon={}",
            loadout.ship.id(),
            loadout.weapon.id()
        );
        loadout
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::RunStats;

    #[test]
    fn test_from_stored_all_present() {
        let loadout = Loadout::from_stored(
            Some(r#"{"battery":3,"magnet":1,"shieldGen":2}"#),
            Some("stealth"),
            Some("beam"),
        );
        assert_eq!(loadout.ship, ShipKind::Stealth);
        assert_eq!(loadout.weapon, WeaponKind::Beam);
        assert_eq!(loadout.upgrades.battery, 2);
        assert_eq!(loadout.upgrades.magnet, 0);
        assert_eq!(loadout.upgrades.shield_gen, 1);
        assert_eq!(loadout.upgrades.hull, 0);
    }

    #[test]
    fn test_shop_levels_are_one_based() {
        // One purchase each of battery and thruster, as the shop writes it
        let loadout = Loadout::from_stored(Some(r#"{"battery":2,"thruster":2}"#), None, None);
        let stats = RunStats::from_loadout(&loadout);
        assert_eq!(stats.max_energy, 120.0);
        assert_eq!(stats.start_speed, 340.0);

        // Level 1 written back for an unbought upgrade means nothing bought
        let loadout = Loadout::from_stored(Some(r#"{"magnet":1,"hull":1}"#), None, None);
        assert_eq!(RunStats::from_loadout(&loadout), RunStats::default());
        assert_eq!(RunStats::default().start_speed, 320.0);
        assert_eq!(RunStats::default().magnet_range, 70.0);
    }

    #[test]
    fn test_malformed_upgrades_fall_back() {
        let loadout = Loadout::from_stored(Some("{battery: lots"), None, None);
        assert_eq!(loadout, Loadout::default());

        // Shop once stored a literal null
        let loadout = Loadout::from_stored(Some("null"), Some("cruiser"), None);
        assert_eq!(loadout.upgrades, Upgrades::default());
        assert_eq!(loadout.ship, ShipKind::Cruiser);
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let loadout = Loadout::from_stored(None, Some("x-wing"), Some("photon"));
        assert_eq!(loadout.ship, ShipKind::Default);
        assert_eq!(loadout.weapon, WeaponKind::Pulse);
    }
}
