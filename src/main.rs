//! Verlet Pit headless driver
//!
//! Runs the engine without a window: spawns a pit over a peg field, steps it
//! at a fixed 60 Hz and logs telemetry once per simulated second. Useful for
//! profiling and for checking a config file before shipping it to the web
//! build.
//!
//! Usage: `verlet-pit [config.json] [ball count] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Verlet Pit (native) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::start`, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Instant;

    use verlet_pit::sim::scenario;
    use verlet_pit::{PhysicsEngine, Result, SimConfig, SimError};

    const WIDTH: f32 = 1280.0;
    const HEIGHT: f32 = 720.0;
    const FRAME_DT: f32 = 1.0 / 60.0;

    pub fn run(args: Vec<String>) -> Result<()> {
        let config = match args.first() {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| SimError::InvalidConfig(format!("{path}: {e}")))?;
                log::info!("Loaded config from {path}");
                SimConfig::from_json(&json)?
            }
            None => SimConfig::default(),
        };
        let count: usize = parse_arg(&args, 1, 400)?;
        let seconds: u32 = parse_arg(&args, 2, 10)?;

        let mut engine = PhysicsEngine::new(config, WIDTH, HEIGHT)?;
        let mut obstacles = scenario::peg_field(&engine.bounds(), 5, 11, 7.0)?;
        obstacles.extend(scenario::side_bumpers(&engine.bounds(), 3, 24.0)?);
        engine.set_obstacles(obstacles);
        engine.init(count)?;

        let started = Instant::now();
        for second in 1..=seconds {
            let mut collisions = 0u64;
            let mut events = 0u64;
            for _ in 0..60 {
                let stats = engine.update(FRAME_DT);
                collisions += u64::from(stats.collisions);
                events += engine.drain_events().count() as u64;
            }
            let energy: f32 = engine.balls().iter().map(|b| b.kinetic_energy()).sum();
            log::info!(
                "t={second}s: {collisions} contacts, {events} events, kinetic energy {energy:.1}"
            );
        }

        let elapsed = started.elapsed();
        let frames = seconds * 60;
        log::info!(
            "{} frames in {:.2?} ({:.3} ms/frame)",
            frames,
            elapsed,
            elapsed.as_secs_f64() * 1000.0 / f64::from(frames.max(1))
        );
        Ok(())
    }

    fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T> {
        match args.get(index) {
            Some(raw) => raw
                .parse()
                .map_err(|_| SimError::InvalidConfig(format!("bad argument: {raw}"))),
            None => Ok(default),
        }
    }
}
