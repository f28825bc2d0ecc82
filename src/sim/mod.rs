//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (one `Pcg32` per run)
//! - Viewport passed in as `Bounds`, never read from globals
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod effects;
pub mod spawn;
pub mod state;
pub mod tick;

pub use boss::{Boss, BossFate, BossKind, BossPhase};
pub use collision::{Rect, resolve_collisions};
pub use effects::{ActivePowerUp, EffectFlags, PowerUpKind, derive_effects};
pub use spawn::{SpawnConfig, run_spawner};
pub use state::{
    Bounds, Collectible, CurrencySource, FloatingText, Fuel, FuelKind, GameEvent, GameState,
    Obstacle, Player, PlayerProjectile, PowerUp, Projectile,
};
pub use tick::tick;
