//! Command-line and scenario-file configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML scenario
//! file, then command-line flags.
//!
//! ```yaml
//! mode: parallel
//! params:
//!   width: 1280
//!   height: 720
//!   radius: 12.0
//!   workers: 4
//!   target_fps: 120
//! ```
//!
//! Unknown keys are rejected so a typo does not silently fall back to a default.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::SimError;
use crate::params::SimulationParams;
use crate::simulation::Mode;

/// `--mode` values; mapped onto [`Mode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Sequential,
    Parallel,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Sequential => Mode::Sequential,
            ModeArg::Parallel => Mode::Parallel,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Bouncing circles screensaver")]
pub struct Args {
    /// Number of circles to simulate.
    pub count: usize,

    /// Schedule for the integration phase.
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Worker threads for the parallel schedule (0 = one per physical core).
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Seed for the initial layout; random when omitted.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// YAML scenario file with simulation parameters.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frame pacing target (0 runs unpaced).
    #[arg(long)]
    pub target_fps: Option<u32>,

    /// Run without a window and print statistics.
    #[arg(long)]
    pub headless: bool,

    /// Number of frames to run in headless mode.
    #[arg(long, default_value_t = 600)]
    pub frames: u64,
}

/// Shape of a scenario file: simulation parameters plus the schedule.
#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioFile {
    pub mode: Option<Mode>,
    pub params: SimulationParams,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| SimError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub params: SimulationParams,
    pub count: usize,
    pub mode: Mode,
    pub seed: Option<u64>,
    pub headless: bool,
    pub frames: u64,
}

impl Args {
    /// Merges defaults, the scenario file and the flags, then validates the
    /// particle count and arena before anything is allocated.
    pub fn resolve(self) -> Result<RunConfig, SimError> {
        let scenario = match &self.config {
            Some(path) => ScenarioFile::load(path)?,
            None => ScenarioFile::default(),
        };
        self.resolve_with(scenario)
    }

    fn resolve_with(self, scenario: ScenarioFile) -> Result<RunConfig, SimError> {
        let mut params = scenario.params;
        if let Some(workers) = self.workers {
            params.workers = workers;
        }
        if let Some(target_fps) = self.target_fps {
            params.target_fps = target_fps;
        }

        params.validate()?;
        params.validate_count(self.count)?;

        Ok(RunConfig {
            params,
            count: self.count,
            mode: self.mode.map(Mode::from).or(scenario.mode).unwrap_or_default(),
            seed: self.seed,
            headless: self.headless,
            frames: self.frames,
        })
    }
}
