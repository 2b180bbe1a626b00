use serde::Deserialize;

use crate::error::SimError;

// ===================================================================================
// Default Constants
// ===================================================================================

pub const DEFAULT_WIDTH: u32 = 1800;
pub const DEFAULT_HEIGHT: u32 = 1000;
pub const DEFAULT_RADIUS: f32 = 20.0;
pub const DEFAULT_MAX_SPEED: i32 = 5;
pub const DEFAULT_MAX_PARTICLES: usize = 750;
pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const DEFAULT_STATS_WINDOW: usize = 120;

// ===================================================================================
// Simulation Parameters
// ===================================================================================

/// Fixed parameters of a run. Loaded from the `params` section of a scenario
/// file or taken from the defaults, then overridden by command-line flags.
///
/// ```yaml
/// width: 1800
/// height: 1000
/// radius: 20.0
/// max_speed: 5
/// max_particles: 750
/// workers: 2
/// target_fps: 60
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    /// Arena width in pixels.
    pub width: u32,
    /// Arena height in pixels.
    pub height: u32,
    /// Radius shared by every circle.
    pub radius: f32,
    /// Bound on each velocity component, in pixels per tick.
    pub max_speed: i32,
    /// Upper bound accepted for the particle count.
    pub max_particles: usize,
    /// Worker threads for the parallel schedule; 0 means one per physical core.
    pub workers: usize,
    /// Frame pacing target; 0 disables pacing.
    pub target_fps: u32,
    /// Number of one-second FPS samples kept for plotting.
    pub stats_window: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            radius: DEFAULT_RADIUS,
            max_speed: DEFAULT_MAX_SPEED,
            max_particles: DEFAULT_MAX_PARTICLES,
            workers: DEFAULT_WORKERS,
            target_fps: DEFAULT_TARGET_FPS,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }
}

impl SimulationParams {
    /// Checks that the arena can hold at least one circle with room to move.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::InvalidRadius(self.radius));
        }
        if self.max_speed < 0 {
            return Err(SimError::InvalidMaxSpeed(self.max_speed));
        }
        let diameter = 2.0 * self.radius;
        if (self.width as f32) <= diameter || (self.height as f32) <= diameter {
            return Err(SimError::ArenaTooSmall {
                width: self.width,
                height: self.height,
                radius: self.radius,
            });
        }
        Ok(())
    }

    /// Rejects counts outside `1..=max_particles`. Never clamps.
    pub fn validate_count(&self, count: usize) -> Result<(), SimError> {
        if count < 1 || count > self.max_particles {
            return Err(SimError::InvalidParticleCount {
                count,
                max: self.max_particles,
            });
        }
        Ok(())
    }

    /// Worker count with the "0 = physical cores" convention resolved.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            0 => num_cpus::get_physical().max(1),
            n => n,
        }
    }

    pub fn arena(&self) -> Arena {
        Arena {
            width: self.width as f32,
            height: self.height as f32,
            radius: self.radius,
        }
    }
}

/// Geometry the engine needs each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl Arena {
    /// Lowest centre coordinate that does not touch the left/top wall.
    #[inline]
    pub fn min_center(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn max_center_x(&self) -> f32 {
        self.width - self.radius
    }

    #[inline]
    pub fn max_center_y(&self) -> f32 {
        self.height - self.radius
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        2.0 * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.arena().max_center_x(), 1780.0);
        assert_eq!(params.arena().max_center_y(), 980.0);
    }

    #[test]
    fn count_bounds_are_inclusive() {
        let params = SimulationParams::default();
        assert!(params.validate_count(1).is_ok());
        assert!(params.validate_count(DEFAULT_MAX_PARTICLES).is_ok());
        assert!(matches!(
            params.validate_count(0),
            Err(SimError::InvalidParticleCount { count: 0, max: DEFAULT_MAX_PARTICLES })
        ));
        assert!(params.validate_count(DEFAULT_MAX_PARTICLES + 1).is_err());
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let params = SimulationParams {
            radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(SimError::InvalidRadius(_))));

        let params = SimulationParams {
            width: 40,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(SimError::ArenaTooSmall { .. })));
    }

    #[test]
    fn rejects_negative_max_speed() {
        let params = SimulationParams {
            max_speed: -3,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(SimError::InvalidMaxSpeed(-3))));

        let still = SimulationParams {
            max_speed: 0,
            ..Default::default()
        };
        assert!(still.validate().is_ok());
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let parsed: Result<SimulationParams, _> = serde_yaml::from_str("radious: 10.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_workers_means_physical_cores() {
        let params = SimulationParams {
            workers: 0,
            ..Default::default()
        };
        assert!(params.resolved_workers() >= 1);

        let params = SimulationParams {
            workers: 3,
            ..Default::default()
        };
        assert_eq!(params.resolved_workers(), 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let params: SimulationParams = serde_yaml::from_str("radius: 10.0\nmax_particles: 50\n").unwrap();
        assert_eq!(params.radius, 10.0);
        assert_eq!(params.max_particles, 50);
        assert_eq!(params.width, DEFAULT_WIDTH);
        assert_eq!(params.workers, DEFAULT_WORKERS);
    }
}
