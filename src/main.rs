//! Neon Glide entry point
//!
//! Browser: drives the simulation from `requestAnimationFrame` and hands a JSON
//! snapshot to the page's renderer. Native: runs a headless autopilot demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::Serialize;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use neon_glide::sim::{Bounds, EffectFlags, GameEvent, GameState, tick};
    use neon_glide::{Loadout, LoopDriver};

    // Renderer and sound live in page JS; these hooks are fire-and-forget
    #[wasm_bindgen(inline_js = "
        export function draw_frame(json) {
            if (window.neonGlideDraw) window.neonGlideDraw(json);
        }

        export function play_event(json) {
            if (window.neonGlideEvent) window.neonGlideEvent(json);
        }
    ")]
    extern "C" {
        fn draw_frame(json: &str);
        fn play_event(json: &str);
    }

    /// What the page renderer receives each frame
    #[derive(Serialize)]
    struct Snapshot<'a> {
        dt: f32,
        state: &'a GameState,
        effects: EffectFlags,
        boss_health: Option<f32>,
    }

    struct Game {
        state: GameState,
        driver: LoopDriver,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: GameState::new(seed, Loadout::load()),
                driver: LoopDriver::new(),
            }
        }

        fn restart(&mut self, seed: u64) {
            self.state = GameState::new(seed, Loadout::load());
            log::info!("Run restarted with seed: {}", seed);
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Current viewport in CSS pixels
    fn viewport() -> Bounds {
        let Some(window) = web_sys::window() else {
            return Bounds::default();
        };
        let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
        match (read(window.inner_width()), read(window.inner_height())) {
            (Some(w), Some(h)) => Bounds::new(w as f32, h as f32),
            _ => Bounds::default(),
        }
    }

    fn draw(state: &GameState, dt: f32) {
        let snapshot = Snapshot {
            dt,
            state,
            effects: state.effects(),
            boss_health: state.boss.as_ref().map(|b| b.health_fraction()),
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => draw_frame(&json),
            Err(e) => log::warn!("Failed to serialize frame: {}", e),
        }
    }

    fn forward_events(state: &mut GameState) {
        for event in state.drain_events() {
            if let GameEvent::CurrencyAwarded { amount, source } = event {
                log::debug!("+{} currency ({:?})", amount, source);
            }
            match serde_json::to_string(&event) {
                Ok(json) => play_event(&json),
                Err(e) => log::warn!("Failed to serialize event: {}", e),
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Glide starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_visibility_release(game.clone());

        start_loop(game);
        log::info!("Neon Glide running!");
    }

    /// Start the driver and schedule the first frame if it wasn't running
    fn start_loop(game: Rc<RefCell<Game>>) {
        let started = game.borrow_mut().driver.start(now_ms());
        if started {
            request_animation_frame(game);
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_running = {
            let mut g = game.borrow_mut();
            let Game { state, driver } = &mut *g;
            let bounds = viewport();

            driver.frame(time, state, |s, dt| tick(s, dt, bounds), draw);
            forward_events(state);

            if state.is_game_over() && driver.is_running() {
                driver.stop();
                log::info!("Loop stopped (game over)");
            }
            driver.is_running()
        };

        // Next frame only after both hooks returned
        if keep_running {
            request_animation_frame(game);
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard down: boost, fire, restart
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "ArrowUp" | "w" | "W" => {
                        event.prevent_default();
                        game.borrow_mut().state.set_boost(true);
                    }
                    "Shift" | "f" | "F" => {
                        game.borrow_mut().state.fire();
                    }
                    "r" | "R" | "Enter" => {
                        let over = game.borrow().state.is_game_over();
                        if over {
                            game.borrow_mut().restart(js_sys::Date::now() as u64);
                            start_loop(game.clone());
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up: release boost
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), " " | "ArrowUp" | "w" | "W") {
                    game.borrow_mut().state.set_boost(false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: left boosts, right fires
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                match event.button() {
                    0 => g.state.set_boost(true),
                    2 => {
                        g.state.fire();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 {
                    game.borrow_mut().state.set_boost(false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: hold to boost
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().state.set_boost(true);
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().state.set_boost(false);
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Drop a held boost when the tab is hidden (keyup never arrives)
    fn setup_visibility_release(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                game.borrow_mut().state.set_boost(false);
                log::info!("Boost released (tab hidden)");
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon Glide (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot run on a synthetic 60 Hz clock
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use neon_glide::sim::{Bounds, GameEvent, GameState, tick};
    use neon_glide::{Loadout, LoopDriver};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_SECONDS: f64 = 120.0;

    /// Hover around mid-screen and shoot whenever a boss is up
    fn autopilot(state: &mut GameState, bounds: Bounds) {
        let low = state.player.pos.y > bounds.height * 0.5;
        let climbing = state.player.velocity < -150.0;
        state.set_boost(low && !climbing);

        if state.boss.is_some() && state.elapsed.fract() < 0.02 {
            state.fire();
        }
    }

    pub fn run(seed: u64) {
        let bounds = Bounds::default();
        let mut state = GameState::new(seed, Loadout::load());
        let mut driver = LoopDriver::new();
        let mut frames = 0u64;
        let (mut pickups, mut explosions) = (0u32, 0u32);

        driver.start(0.0);
        let mut now = 0.0;
        while driver.is_running() && now < MAX_SECONDS * 1000.0 {
            now += FRAME_MS;
            driver.frame(
                now,
                &mut state,
                |s, dt| {
                    autopilot(s, bounds);
                    tick(s, dt, bounds);
                },
                |_, _| frames += 1,
            );

            for event in state.drain_events() {
                match event {
                    GameEvent::Collect => pickups += 1,
                    GameEvent::Explosion => explosions += 1,
                    GameEvent::BossMusicStart => {
                        log::info!("Boss incoming at {:.1}s", state.elapsed)
                    }
                    _ => {}
                }
            }

            if state.is_game_over() {
                driver.stop();
            }
        }

        log::info!(
            "Demo finished: seed={} frames={} time={:.1}s distance={:.0}m currency={} \
             pickups={} explosions={} game_over={}",
            seed,
            frames,
            state.elapsed,
            state.distance,
            state.currency_earned,
            pickups,
            explosions,
            state.is_game_over()
        );
    }
}
