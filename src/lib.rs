//! Neon Glide - A side-scrolling neon arcade flyer
//!
//! Core modules:
//! - `sim`: Simulation step (physics, boss AI, collisions, session state)
//! - `loadout`: Ship/weapon catalogue and upgrade-derived run stats
//! - `config`: Persisted loadout read at run start
//! - `platform`: Frame loop driver (browser/native)

pub mod config;
pub mod loadout;
pub mod platform;
pub mod sim;

pub use loadout::{Loadout, RunStats, ShipKind, Upgrades, WeaponKind};
pub use platform::frame_loop::{LoopDriver, clamp_frame_dt};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest step the loop will hand to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player defaults (y grows downward, player.y is the vertical center)
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = 300.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    pub const GRAVITY: f32 = 500.0;
    pub const BASE_LIFT: f32 = 800.0;
    /// Degrees of tilt per px/s of vertical velocity
    pub const ROTATION_PER_VELOCITY: f32 = 0.05;
    pub const MAX_ROTATION_DEG: f32 = 45.0;

    /// World scroll
    pub const BASE_SCROLL_SPEED: f32 = 300.0;
    /// Scroll acceleration (px/s per second)
    pub const SCROLL_ACCEL: f32 = 10.0;
    /// Distance units are scroll pixels / 10
    pub const DISTANCE_DIVISOR: f32 = 10.0;

    /// Energy drained per second while boosting
    pub const ENERGY_DRAIN: f32 = 10.0;
    pub const BASE_MAX_ENERGY: f32 = 100.0;

    /// Pickup geometry
    pub const COLLECTIBLE_RADIUS: f32 = 10.0;
    pub const PICKUP_RADIUS: f32 = 30.0;
    /// Fraction of remaining distance a magnetized collectible closes per tick
    pub const MAGNET_PULL: f32 = 0.1;
    /// Magnet radius while the Magnet power-up is active
    pub const MAGNET_POWERUP_RADIUS: f32 = 300.0;
    pub const FUEL_SIZE: f32 = 30.0;
    pub const POWERUP_RADIUS: f32 = 15.0;
    /// Vertical bob speed (px/s at peak) shared by drifting pickups
    pub const BOB_AMPLITUDE: f32 = 30.0;
    pub const BOB_RATE: f32 = 5.0;

    /// Obstacles
    pub const OBSTACLE_WIDTH: f32 = 50.0;
    pub const OBSTACLE_MIN_HEIGHT: f32 = 50.0;
    pub const OBSTACLE_MAX_HEIGHT: f32 = 150.0;
    /// Obstacles shorter than this are "small" (stealth hull phases through)
    pub const SMALL_OBSTACLE_HEIGHT: f32 = 80.0;

    /// Currency
    pub const BOSS_KILL_REWARD: u32 = 50;
    pub const COIN_RAIN_COUNT: usize = 15;

    /// Player shots spawn this far ahead of the player's x
    pub const MUZZLE_OFFSET: f32 = 50.0;

    /// Floating text rise speed (px/s)
    pub const FLOATING_TEXT_RISE: f32 = 50.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Heading angle of a vector (radians)
#[inline]
pub fn heading_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI + 0.1) - (-PI + 0.1)).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) - (-PI / 2.0)).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_heading_roundtrip() {
        let theta = 0.7;
        assert!((heading_of(heading_vec(theta)) - theta).abs() < 1e-6);
    }
}
