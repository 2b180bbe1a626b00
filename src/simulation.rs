use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Deserialize;

use crate::engine::{CollisionCount, Engine};
use crate::error::SimError;
use crate::params::SimulationParams;
use crate::stats::FrameStats;
use crate::storage::ParticleStorage;

/// Which engine schedule a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Sequential,
    Parallel,
}

/// What one call to [`Simulation::step`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub collisions: CollisionCount,
    pub tick_time: Duration,
}

/// Everything a run owns: parameters, particles, engine and frame statistics.
///
/// Created once at startup and passed by reference to whatever drives the
/// frames (the viewer or the headless loop).
pub struct Simulation {
    params: SimulationParams,
    particles: ParticleStorage,
    engine: Engine,
    stats: FrameStats,
    seed: u64,
    ticks: u64,
    last_collisions: CollisionCount,
}

impl Simulation {
    /// Seeds a PCG generator with `seed`, samples `count` particles and
    /// starts the engine for `mode`.
    pub fn new(params: SimulationParams, count: usize, seed: u64, mode: Mode) -> Result<Self, SimError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let particles = ParticleStorage::initialize(count, &params, &mut rng)?;

        let arena = params.arena();
        let engine = match mode {
            Mode::Sequential => Engine::sequential(arena),
            Mode::Parallel => Engine::parallel(arena, params.resolved_workers())?,
        };
        let stats = FrameStats::new(params.stats_window);

        log::info!(
            "simulation ready: {} particles, {:?} schedule ({} workers), seed {}",
            particles.len(),
            mode,
            engine.workers(),
            seed
        );

        Ok(Self {
            params,
            particles,
            engine,
            stats,
            seed,
            ticks: 0,
            last_collisions: CollisionCount::default(),
        })
    }

    /// Advances the particles by one tick and times it.
    pub fn step(&mut self) -> StepReport {
        let start = Instant::now();
        self.engine.integrate(&mut self.particles);
        let collisions = self.engine.resolve_collisions(&mut self.particles);
        let tick_time = start.elapsed();

        self.ticks += 1;
        self.last_collisions = collisions;
        if collisions.pairs > 0 {
            log::debug!(
                "tick {}: {} colliding pairs ({} coincident)",
                self.ticks,
                collisions.pairs,
                collisions.coincident
            );
        }

        StepReport { collisions, tick_time }
    }

    /// Runs `ticks` steps back to back, without frame accounting.
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Feeds one rendered frame into the statistics and logs the FPS each
    /// time a one-second window closes. `tick_time` is `None` for frames that
    /// did not step the simulation.
    pub fn record_frame(&mut self, frame_time: Duration, tick_time: Option<Duration>) {
        if let Some(fps) = self.stats.record_frame(frame_time, tick_time) {
            log::info!("FPS: {fps}");
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn particles(&self) -> &ParticleStorage {
        &self.particles
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_collisions(&self) -> CollisionCount {
        self.last_collisions
    }

    /// Pause between frames that keeps the loop at `target_fps`, given how
    /// long the current frame already took. `None` when pacing is off or the
    /// frame is already late.
    pub fn frame_delay(&self, elapsed: Duration) -> Option<Duration> {
        if self.params.target_fps == 0 {
            return None;
        }
        let budget = Duration::from_secs(1) / self.params.target_fps;
        budget.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_count_before_building() {
        let err = Simulation::new(SimulationParams::default(), 0, 1, Mode::Sequential)
            .err()
            .unwrap();
        assert!(matches!(err, SimError::InvalidParticleCount { .. }));
    }

    #[test]
    fn step_counts_ticks() {
        let mut sim = Simulation::new(SimulationParams::default(), 20, 5, Mode::Sequential).unwrap();
        sim.step();
        sim.advance(4);
        assert_eq!(sim.ticks(), 5);
        assert_eq!(sim.particles().len(), 20);
        assert_eq!(sim.seed(), 5);
    }

    #[test]
    fn parallel_mode_uses_configured_workers() {
        let params = SimulationParams {
            workers: 3,
            ..Default::default()
        };
        let sim = Simulation::new(params, 10, 5, Mode::Parallel).unwrap();
        assert_eq!(sim.engine().workers(), 3);
    }

    #[test]
    fn frame_delay_respects_target() {
        let params = SimulationParams {
            target_fps: 50,
            ..Default::default()
        };
        let sim = Simulation::new(params, 1, 0, Mode::Sequential).unwrap();
        assert_eq!(sim.frame_delay(Duration::from_millis(5)), Some(Duration::from_millis(15)));
        assert_eq!(sim.frame_delay(Duration::from_millis(20)), None);
        assert_eq!(sim.frame_delay(Duration::from_millis(30)), None);

        let unpaced = Simulation::new(
            SimulationParams {
                target_fps: 0,
                ..Default::default()
            },
            1,
            0,
            Mode::Sequential,
        )
        .unwrap();
        assert_eq!(unpaced.frame_delay(Duration::ZERO), None);
    }

    #[test]
    fn mode_parses_from_yaml() {
        let mode: Mode = serde_yaml::from_str("parallel").unwrap();
        assert_eq!(mode, Mode::Parallel);
    }
}
