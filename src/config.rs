// src/config.rs

//! # Navigation Configuration
//!
//! Tunable constants for every stage of the navigation pipeline. Each
//! stage has its own configuration structure with public fields and a
//! `new()` constructor returning the values tuned for a small indoor racer.
//! [`NavigationConfig`] bundles them for the [`Navigator`](crate::Navigator).
//!
//! Example Usage
//! ```
//! use free_flight_navigation::NavigationConfig;
//!
//! let mut config = NavigationConfig::new();
//!
//! // Fly faster on a larger course.
//! config.control.max_speed = 4.0;
//! config.planner.look_ahead_radius = 2.0;
//!
//! // Keep vision samples around for longer.
//! config.ransac.dt_max = 2.0;
//! ```

use core::f32::consts::PI;

/// Converts degrees to radians.
pub const fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * PI / 180.0
}

/// Dead-reckoning model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Gravitational acceleration in m/s².
    pub gravity: f32,
    /// Linear drag coefficient applied to the earth-frame velocity.
    pub drag: f32,
    /// Thrust-angle correction factor applied to the tilt angles in the
    /// hover thrust model.
    pub thrust_correction: f32,
    /// Largest elapsed time in seconds integrated in one cycle. Longer
    /// intervals are clamped to it, so hosts cycling slower than
    /// `1 / max_dt` Hz see mission time run slow.
    pub max_dt: f32,
}

impl EstimatorConfig {
    /// Creates the default dead-reckoning configuration.
    pub const fn new() -> Self {
        Self {
            gravity: 9.81,
            drag: 0.5,
            thrust_correction: 0.8,
            max_dt: 0.1,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate sequencing thresholds.
///
/// `arrival_radius` must not exceed `look_ahead_radius`, otherwise the
/// vehicle switches gates before it starts turning towards the next one.
/// This is not checked at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Distance in meters below which the next gate's heading is commanded.
    pub look_ahead_radius: f32,
    /// Distance in meters below which the active gate counts as passed.
    pub arrival_radius: f32,
}

impl PlannerConfig {
    /// Creates the default planner configuration.
    pub const fn new() -> Self {
        Self {
            look_ahead_radius: 1.4,
            arrival_radius: 0.5,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gains and limits of the cascaded position controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlConfig {
    /// Position error to velocity setpoint gain.
    pub kp_position: f32,
    /// Velocity error to acceleration (attitude) setpoint gain.
    pub kp_velocity: f32,
    /// Gain applied to the velocity setpoint itself to pre-bank.
    pub feedforward_gain: f32,
    /// Velocity setpoint limit in m/s.
    pub max_speed: f32,
    /// Tilt command limit in radians.
    pub max_pitch: f32,
    /// Heading reference rate limit in rad/s.
    pub max_yaw_rate: f32,
}

impl ControlConfig {
    /// Creates the default slow-speed controller configuration.
    pub const fn new() -> Self {
        Self {
            kp_position: 1.1,
            kp_velocity: 1.0,
            feedforward_gain: degrees_to_radians(10.0) / 3.0,
            max_speed: 2.5,
            max_pitch: degrees_to_radians(15.0),
            max_yaw_rate: degrees_to_radians(45.0),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Vision drift estimation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacConfig {
    /// Maximum age in seconds of a sample that still takes part in a fit.
    pub dt_max: f32,
    /// A fit is attempted only when more fresh samples than this exist.
    pub min_samples: usize,
    /// Fraction of the fresh samples drawn for each candidate model.
    pub sample_fraction: f32,
    /// Number of candidate models evaluated per fit.
    pub iterations: usize,
    /// Residual in meters above which a sample counts as an outlier.
    pub error_threshold: f32,
    /// Seed of the sampling random number generator.
    pub seed: u64,
    /// Apply each successful fit to the live position estimate.
    pub apply_correction: bool,
}

impl RansacConfig {
    /// Creates the default vision correction configuration.
    pub const fn new() -> Self {
        Self {
            dt_max: 1.0,
            min_samples: 4,
            sample_fraction: 0.4,
            iterations: 200,
            error_threshold: 1.0,
            seed: 0x5EED_0F_6A7E,
            apply_correction: true,
        }
    }
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the complete navigation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavigationConfig {
    /// Dead-reckoning model.
    pub estimator: EstimatorConfig,
    /// Gate sequencing.
    pub planner: PlannerConfig,
    /// Position, velocity and heading control.
    pub control: ControlConfig,
    /// Vision drift correction.
    pub ransac: RansacConfig,
}

impl NavigationConfig {
    /// Creates a configuration with all stage defaults.
    pub const fn new() -> Self {
        Self {
            estimator: EstimatorConfig::new(),
            planner: PlannerConfig::new(),
            control: ControlConfig::new(),
            ransac: RansacConfig::new(),
        }
    }
}
