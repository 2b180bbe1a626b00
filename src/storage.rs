use rand::Rng;

use crate::error::SimError;
use crate::params::SimulationParams;

// ===================================================================================
// Particle Storage
// ===================================================================================

/// Opaque colour picked at creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One particle's state, copied out of (or into) [`ParticleStorage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Centre of the circle.
    pub x: f32,
    pub y: f32,
    /// Displacement per tick.
    pub vx: i32,
    pub vy: i32,
    pub color: Rgb,
}

/// Stores the particle data in a **Structure of Arrays** (SoA) layout so the
/// integration phase can hand out disjoint slices to worker threads.
///
/// The number of particles is fixed once the storage is built; index identity
/// is stable across ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleStorage {
    /// Per-particle x-coordinate of the centre.
    pub(crate) x: Vec<f32>,
    /// Per-particle y-coordinate of the centre.
    pub(crate) y: Vec<f32>,
    /// Per-particle velocity in the x-direction.
    pub(crate) vx: Vec<i32>,
    /// Per-particle velocity in the y-direction.
    pub(crate) vy: Vec<i32>,

    /// Per-particle colour used when drawing.
    colors: Vec<Rgb>,
}

impl ParticleStorage {
    /// Storage for `n` particles at the origin, at rest.
    fn with_capacity(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            y: vec![0.0; n],
            vx: vec![0; n],
            vy: vec![0; n],
            colors: vec![Rgb::default(); n],
        }
    }

    /// Samples `count` independent particles from `rng`:
    /// centres uniformly on the integer grid inside the walls, each velocity
    /// component in `[-max_speed, max_speed]`, each colour channel in `[0, 255]`.
    ///
    /// Fails before creating anything when `count` is outside
    /// `1..=params.max_particles`.
    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        params.validate_count(count)?;
        params.validate()?;

        let (x_lo, x_hi) = grid_span(params.width, params.radius);
        let (y_lo, y_hi) = grid_span(params.height, params.radius);
        let max_speed = params.max_speed;

        let mut particles = Self::with_capacity(count);
        for i in 0..count {
            // random position
            particles.x[i] = rng.random_range(x_lo..x_hi) as f32;
            particles.y[i] = rng.random_range(y_lo..y_hi) as f32;

            // random velocity
            particles.vx[i] = rng.random_range(-max_speed..=max_speed);
            particles.vy[i] = rng.random_range(-max_speed..=max_speed);

            // random colour
            let r = rng.random_range(0..=255) as u8;
            let g = rng.random_range(0..=255) as u8;
            let b = rng.random_range(0..=255) as u8;
            particles.colors[i] = Rgb::new(r, g, b);
        }

        Ok(particles)
    }

    /// Builds storage from explicit particle states, keeping their order.
    pub fn from_particles(particles: &[Particle]) -> Self {
        let mut storage = Self::with_capacity(particles.len());
        for (i, p) in particles.iter().enumerate() {
            storage.x[i] = p.x;
            storage.y[i] = p.y;
            storage.vx[i] = p.vx;
            storage.vy[i] = p.vy;
            storage.colors[i] = p.color;
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Copy of particle `i`. Panics if `i` is out of range.
    pub fn particle(&self, i: usize) -> Particle {
        Particle {
            x: self.x[i],
            y: self.y[i],
            vx: self.vx[i],
            vy: self.vy[i],
            color: self.colors[i],
        }
    }

    pub fn set_position(&mut self, i: usize, x: f32, y: f32) {
        self.x[i] = x;
        self.y[i] = y;
    }

    pub fn set_velocity(&mut self, i: usize, vx: i32, vy: i32) {
        self.vx[i] = vx;
        self.vy[i] = vy;
    }

    /// Read-only walk over all particles in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Particle> + '_ {
        (0..self.len()).map(move |i| self.particle(i))
    }
}

/// Half-open integer range of centre coordinates along one axis that keeps
/// the whole circle inside `[0, extent]`.
fn grid_span(extent: u32, radius: f32) -> (i32, i32) {
    let lo = radius.ceil() as i32;
    let hi = (extent as f32 - radius).floor() as i32;
    (lo, hi.max(lo + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn initialize_samples_within_bounds() {
        let params = SimulationParams::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let store = ParticleStorage::initialize(500, &params, &mut rng).unwrap();

        assert_eq!(store.len(), 500);
        for p in store.iter() {
            assert!(p.x >= params.radius && p.x < params.width as f32 - params.radius);
            assert!(p.y >= params.radius && p.y < params.height as f32 - params.radius);
            assert!(p.vx.abs() <= params.max_speed);
            assert!(p.vy.abs() <= params.max_speed);
            assert_eq!(p.x.fract(), 0.0);
        }
    }

    #[test]
    fn initialize_rejects_out_of_range_counts() {
        let params = SimulationParams::default();
        let mut rng = Pcg32::seed_from_u64(1);

        let err = ParticleStorage::initialize(0, &params, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidParticleCount { count: 0, .. }));

        let too_many = params.max_particles + 1;
        assert!(ParticleStorage::initialize(too_many, &params, &mut rng).is_err());
    }

    #[test]
    fn initialize_rejects_negative_max_speed() {
        let params = SimulationParams {
            max_speed: -5,
            ..Default::default()
        };
        let err = ParticleStorage::initialize(10, &params, &mut Pcg32::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SimError::InvalidMaxSpeed(-5)));
    }

    #[test]
    fn same_seed_same_store() {
        let params = SimulationParams::default();
        let a = ParticleStorage::initialize(64, &params, &mut Pcg32::seed_from_u64(99)).unwrap();
        let b = ParticleStorage::initialize(64, &params, &mut Pcg32::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn indexed_access_round_trips() {
        let color = Rgb::new(10, 20, 30);
        let mut store = ParticleStorage::from_particles(&[
            Particle { x: 1.0, y: 2.0, vx: 3, vy: 4, color },
            Particle { x: 5.0, y: 6.0, vx: -1, vy: -2, color },
        ]);

        store.set_position(1, 50.0, 60.0);
        store.set_velocity(0, -3, -4);

        assert_eq!(store.particle(0).vx, -3);
        assert_eq!(store.particle(0).vy, -4);
        assert_eq!(store.particle(1).x, 50.0);
        assert_eq!(store.particle(1).color, color);
    }

    #[test]
    fn grid_span_never_empty() {
        assert_eq!(grid_span(1800, 20.0), (20, 1780));
        let (lo, hi) = grid_span(41, 20.4);
        assert!(lo < hi);
    }
}
