use std::thread;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use rand::Rng;

use bounce_sim::{Args, Simulation, viewer};

/// Runs `frames` frames without a window, paced like the viewer.
fn run_headless(sim: &mut Simulation, frames: u64) {
    let mut last = Instant::now();
    for _ in 0..frames {
        let frame_start = Instant::now();
        let report = sim.step();
        if let Some(delay) = sim.frame_delay(frame_start.elapsed()) {
            thread::sleep(delay);
        }

        let now = Instant::now();
        sim.record_frame(now.duration_since(last), Some(report.tick_time));
        last = now;
    }
}

fn main() -> Result<()> {
    // RUST_LOG=debug for per-tick collision counts
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let run = Args::parse().resolve()?;
    let seed = run.seed.unwrap_or_else(|| rand::rng().random());
    let mut sim = Simulation::new(run.params, run.count, seed, run.mode)?;

    if run.headless {
        run_headless(&mut sim, run.frames);
        println!("{}", sim.stats().summary());
        return Ok(());
    }

    viewer::run(sim).map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
