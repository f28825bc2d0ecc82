//! Platform layer
//!
//! Browser/native differences stay out of `sim`. The frame driver itself is
//! host-agnostic; the browser glue in `main.rs` feeds it animation-frame
//! timestamps.

pub mod frame_loop;

pub use frame_loop::{LoopDriver, clamp_frame_dt};
