use rayon::prelude::*;

use crate::error::SimError;
use crate::params::Arena;
use crate::storage::ParticleStorage;

/// How the integration phase is scheduled.
pub enum Schedule {
    /// Everything on the calling thread.
    Sequential,
    /// Integration fork-joined over a dedicated pool of `workers` threads.
    Parallel {
        pool: rayon::ThreadPool,
        workers: usize,
    },
}

/// Collisions handled during one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionCount {
    /// Pairs found overlapping (or touching).
    pub pairs: usize,
    /// Pairs whose centres coincided; their velocities were reflected but
    /// they could not be pushed apart.
    pub coincident: usize,
}

/// Outcome of testing a single pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Contact {
    Apart,
    Separated,
    Coincident,
}

/// Advances a [`ParticleStorage`] one tick at a time.
pub struct Engine {
    arena: Arena,
    schedule: Schedule,
}

impl Engine {
    pub fn sequential(arena: Arena) -> Self {
        Self {
            arena,
            schedule: Schedule::Sequential,
        }
    }

    /// Builds the worker pool up front; it lives as long as the engine.
    pub fn parallel(arena: Arena, workers: usize) -> Result<Self, SimError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("integrate-{i}"))
            .build()?;
        log::debug!("integration pool started with {workers} workers");
        Ok(Self {
            arena,
            schedule: Schedule::Parallel { pool, workers },
        })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Worker threads used for integration; 1 for the sequential schedule.
    pub fn workers(&self) -> usize {
        match &self.schedule {
            Schedule::Sequential => 1,
            Schedule::Parallel { workers, .. } => *workers,
        }
    }

    /// One full frame: integration + wall reflection, then collisions.
    pub fn tick(&self, particles: &mut ParticleStorage) {
        self.integrate(particles);
        self.resolve_collisions(particles);
    }

    /// Moves every particle by its velocity and bounces it off the walls.
    ///
    /// With the parallel schedule the index range is split into one
    /// contiguous chunk per worker; this returns only once every chunk is done.
    pub fn integrate(&self, particles: &mut ParticleStorage) {
        match &self.schedule {
            Schedule::Sequential => integrate_range(
                &self.arena,
                &mut particles.x,
                &mut particles.y,
                &mut particles.vx,
                &mut particles.vy,
            ),
            Schedule::Parallel { pool, workers } => {
                let n = particles.len();
                if n == 0 {
                    return;
                }
                let chunk = n.div_ceil(*workers);
                let arena = &self.arena;
                pool.install(|| {
                    particles
                        .x
                        .par_chunks_mut(chunk)
                        .zip(particles.y.par_chunks_mut(chunk))
                        .zip(particles.vx.par_chunks_mut(chunk))
                        .zip(particles.vy.par_chunks_mut(chunk))
                        .for_each(|(((x, y), vx), vy)| integrate_range(arena, x, y, vx, vy));
                });
            }
        }
    }

    /// Runs an O(n^2) collision detection/resolution on a **single thread**.
    ///
    /// Pairs are visited in ascending `(i, j)` order and each correction is
    /// applied immediately, so later pairs see the updated state.
    pub fn resolve_collisions(&self, particles: &mut ParticleStorage) -> CollisionCount {
        let diameter = self.arena.diameter();
        let n = particles.len();
        let mut count = CollisionCount::default();

        for i in 0..n {
            for j in (i + 1)..n {
                match resolve_pair(particles, i, j, diameter) {
                    Contact::Apart => {}
                    Contact::Separated => count.pairs += 1,
                    Contact::Coincident => {
                        log::trace!("particles {i} and {j} share a centre, skipping separation");
                        count.pairs += 1;
                        count.coincident += 1;
                    }
                }
            }
        }

        count
    }
}

/// Per-range integration kernel shared by both schedules.
fn integrate_range(arena: &Arena, x: &mut [f32], y: &mut [f32], vx: &mut [i32], vy: &mut [i32]) {
    let lo = arena.min_center();
    let hi_x = arena.max_center_x();
    let hi_y = arena.max_center_y();

    for (((x, y), vx), vy) in x.iter_mut().zip(y.iter_mut()).zip(vx.iter_mut()).zip(vy.iter_mut()) {
        *x += *vx as f32;
        *y += *vy as f32;

        // velocity-only bounce; an overshoot is walked back on later ticks
        if *x <= lo || *x >= hi_x {
            *vx = -*vx;
        }
        if *y <= lo || *y >= hi_y {
            *vy = -*vy;
        }
    }
}

/// Tests one pair and, if their circles touch, reflects both velocities and
/// pushes them apart along the line between centres until they are exactly
/// `diameter` apart.
pub(crate) fn resolve_pair(p: &mut ParticleStorage, i: usize, j: usize, diameter: f32) -> Contact {
    let dx = p.x[i] - p.x[j];
    let dy = p.y[i] - p.y[j];
    let dist2 = dx * dx + dy * dy;
    if dist2 > diameter * diameter {
        return Contact::Apart;
    }

    p.vx[i] = -p.vx[i];
    p.vy[i] = -p.vy[i];
    p.vx[j] = -p.vx[j];
    p.vy[j] = -p.vy[j];

    let dist = dist2.sqrt();
    if dist == 0.0 {
        return Contact::Coincident;
    }

    let nx = dx / dist;
    let ny = dy / dist;
    let half_overlap = 0.5 * (diameter - dist);
    p.x[i] += nx * half_overlap;
    p.y[i] += ny * half_overlap;
    p.x[j] -= nx * half_overlap;
    p.y[j] -= ny * half_overlap;

    Contact::Separated
}
