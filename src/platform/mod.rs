//! Platform abstraction layer
//!
//! Browser bindings for a JS host. The host owns the canvas, the frame loop
//! and the audio; it calls `update` once per animation frame, reads instance
//! bytes to draw, and drains events for effects.
//!
//! Native builds drive [`crate::PhysicsEngine`] directly and get nothing
//! from this module.

#[cfg(target_arch = "wasm32")]
mod web {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use crate::config::{QualityPreset, SimConfig};
    use crate::sim::{BallId, ContactKind, PhysicsEngine, SpawnRequest, scenario};
    use crate::snapshot::{self, BallInstance};

    /// Floats per event in [`WasmEngine::drain_events`]
    const EVENT_STRIDE: usize = 5;

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Verlet Pit starting...");
    }

    fn js_err(e: crate::SimError) -> JsError {
        JsError::new(&e.to_string())
    }

    /// Engine handle exported to JS
    #[wasm_bindgen]
    pub struct WasmEngine {
        engine: PhysicsEngine,
        instances: Vec<BallInstance>,
    }

    impl WasmEngine {
        fn with_config(config: SimConfig, width: f32, height: f32) -> Result<WasmEngine, JsError> {
            Ok(Self {
                engine: PhysicsEngine::new(config, width, height).map_err(js_err)?,
                instances: Vec::new(),
            })
        }
    }

    #[wasm_bindgen]
    impl WasmEngine {
        // === Construction ===

        /// Engine with the stored (or default) config
        #[wasm_bindgen(constructor)]
        pub fn new(width: f32, height: f32) -> Result<WasmEngine, JsError> {
            Self::with_config(SimConfig::load(), width, height)
        }

        /// Engine from a JSON config; missing fields take defaults
        pub fn from_json(json: &str, width: f32, height: f32) -> Result<WasmEngine, JsError> {
            let config = SimConfig::from_json(json).map_err(js_err)?;
            Self::with_config(config, width, height)
        }

        /// Engine with a named quality preset ("low", "medium", "high")
        pub fn with_quality(quality: &str, width: f32, height: f32) -> Result<WasmEngine, JsError> {
            let preset = QualityPreset::from_str(quality)
                .ok_or_else(|| JsError::new(&format!("unknown quality: {quality}")))?;
            Self::with_config(SimConfig::from_preset(preset), width, height)
        }

        /// Persist the current config to LocalStorage
        pub fn save_config(&self) {
            self.engine.config().save();
        }

        pub fn config_json(&self) -> Result<String, JsError> {
            self.engine.config().to_json().map_err(js_err)
        }

        // === World ===

        pub fn init(&mut self, count: usize) -> Result<(), JsError> {
            self.engine.init(count).map_err(js_err)
        }

        /// Spawn a random-sized ball at a point; returns its id
        pub fn spawn(&mut self, x: f32, y: f32) -> Result<u32, JsError> {
            let id = self
                .engine
                .spawn_one(SpawnRequest::at(Vec2::new(x, y)))
                .map_err(js_err)?;
            Ok(id.0)
        }

        pub fn remove(&mut self, id: u32) -> Result<(), JsError> {
            self.engine.remove_ball(BallId(id)).map_err(js_err)?;
            Ok(())
        }

        pub fn clear(&mut self) {
            self.engine.clear();
        }

        pub fn resize(&mut self, width: f32, height: f32) -> Result<(), JsError> {
            self.engine.set_bounds(width, height).map_err(js_err)
        }

        /// Install a staggered peg field sized to the current bounds
        pub fn set_pegs(&mut self, rows: usize, cols: usize, radius: f32) -> Result<(), JsError> {
            let pegs = scenario::peg_field(&self.engine.bounds(), rows, cols, radius).map_err(js_err)?;
            self.engine.set_obstacles(pegs);
            Ok(())
        }

        pub fn ball_count(&self) -> usize {
            self.engine.balls().len()
        }

        // === Pointer ===

        pub fn set_attractor(&mut self, x: f32, y: f32, active: bool) {
            self.engine.set_attractor(Vec2::new(x, y), active);
        }

        /// Grab the topmost ball under the pointer, if any
        pub fn grab_at(&mut self, x: f32, y: f32) -> Option<u32> {
            let id = self.engine.ball_at(Vec2::new(x, y))?;
            self.engine.grab(id).ok()?;
            Some(id.0)
        }

        pub fn drag(&mut self, id: u32, x: f32, y: f32) -> Result<(), JsError> {
            self.engine.drag_to(BallId(id), Vec2::new(x, y)).map_err(js_err)
        }

        /// Let go, throwing at `(vx, vy)` pixels/s
        pub fn release(&mut self, id: u32, vx: f32, vy: f32) -> Result<(), JsError> {
            self.engine.release(BallId(id), Vec2::new(vx, vy)).map_err(js_err)
        }

        // === Frame ===

        /// Advance by `dt` seconds; returns the ball-ball contact count
        pub fn update(&mut self, dt: f32) -> u32 {
            self.engine.update(dt).collisions
        }

        /// Packed `BallInstance` records (20 bytes each)
        pub fn instance_bytes(&mut self) -> Vec<u8> {
            snapshot::write_instances(&self.engine, &mut self.instances);
            snapshot::as_bytes(&self.instances).to_vec()
        }

        /// Queued events as `[x, y, speed, color, kind]` per event
        /// (`kind` 0 = ball, 1 = obstacle)
        pub fn drain_events(&mut self) -> Vec<f32> {
            let mut out = Vec::with_capacity(self.engine.events().len() * EVENT_STRIDE);
            for event in self.engine.drain_events() {
                let kind = match event.kind {
                    ContactKind::Ball => 0.0,
                    ContactKind::Obstacle => 1.0,
                };
                out.extend_from_slice(&[
                    event.point.x,
                    event.point.y,
                    event.speed,
                    event.color.0 as f32,
                    kind,
                ]);
            }
            out
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WasmEngine;
