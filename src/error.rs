use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a simulation from being set up.
///
/// Once a [`crate::Simulation`] exists, ticking it cannot fail; the only
/// irregular case during a tick (two coincident centres) is absorbed by the
/// engine and reported through [`crate::CollisionCount::coincident`].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid number of particles {count}: use a value between 1 and {max}")]
    InvalidParticleCount { count: usize, max: usize },

    #[error("arena {width}x{height} is too small for circles of radius {radius}")]
    ArenaTooSmall { width: u32, height: u32, radius: f32 },

    #[error("particle radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("max speed must not be negative, got {0}")]
    InvalidMaxSpeed(i32),

    #[error("could not start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to parse scenario file {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read scenario file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
