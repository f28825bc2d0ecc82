//! Frame loop driver
//!
//! Host-agnostic: the browser feeds it `requestAnimationFrame` timestamps, the
//! native demo feeds it a synthetic clock. Each frame runs update then draw
//! with the same clamped `dt`.

use crate::consts::MAX_FRAME_DT;

/// Clamp a raw frame time (seconds) to [0, MAX_FRAME_DT]
pub fn clamp_frame_dt(raw: f32) -> f32 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_FRAME_DT)
}

/// Start/stop state plus the previous frame's timestamp
#[derive(Debug, Clone, Default)]
pub struct LoopDriver {
    running: bool,
    last_ms: Option<f64>,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin running. Returns false (and changes nothing) if already running.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_ms = Some(now_ms);
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame: `update` gets the mutable context, `draw` only a shared
    /// borrow. Returns the dt used, or None if the loop is stopped.
    pub fn frame<S>(
        &mut self,
        now_ms: f64,
        ctx: &mut S,
        mut update: impl FnMut(&mut S, f32),
        mut draw: impl FnMut(&S, f32),
    ) -> Option<f32> {
        if !self.running {
            return None;
        }
        let last = self.last_ms.replace(now_ms).unwrap_or(now_ms);
        let dt = clamp_frame_dt(((now_ms - last) / 1000.0) as f32);

        update(ctx, dt);
        draw(ctx, dt);
        Some(dt)
    }
}
