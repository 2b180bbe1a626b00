//! Circles bouncing around a rectangular arena.
//!
//! - `storage`: fixed-size particle store (structure of arrays)
//! - `engine`: integration, wall reflection and pairwise collisions, with a
//!   sequential and a fork-join parallel schedule
//! - `simulation`: the owned run context tying parameters, store, engine and
//!   statistics together
//! - `stats`: frame-rate bookkeeping
//! - `config` / `params`: command line, scenario files and defaults
//! - `viewer`: eframe window

pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod simulation;
pub mod stats;
pub mod storage;
pub mod viewer;

pub use config::{Args, ModeArg, RunConfig, ScenarioFile};
pub use engine::{CollisionCount, Engine, Schedule};
pub use error::SimError;
pub use params::{Arena, SimulationParams};
pub use simulation::{Mode, Simulation, StepReport};
pub use stats::{FrameStats, StatsSummary};
pub use storage::{Particle, ParticleStorage, Rgb};
