// src/estimator.rs

//! # Dead-Reckoning State Estimator
//!
//! Estimates the horizontal position and velocity of a multirotor without
//! any position sensor. The thrust vector of a hovering vehicle tilted by
//! roll and pitch produces a horizontal acceleration; rotating it into the
//! earth frame with the current heading, subtracting linear drag and
//! integrating twice gives the position estimate. Heading is not
//! integrated, it is copied from the attitude source every cycle.
//!
//! Elapsed time is measured with a wrapping 32-bit microsecond counter.
//! The first cycle only anchors the timestamp, and an overlong interval
//! (a stalled scheduler) is clamped to `max_dt`.

use crate::config::EstimatorConfig;
use crate::{AttitudeSource, MicrosClock};
use log::{trace, warn};
use num_traits::Float;

/// The dead-reckoned horizontal state of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavState {
    /// Mission time in seconds, never decreasing.
    pub time: f32,
    /// Earth-frame x position in meters.
    pub x: f32,
    /// Earth-frame y position in meters.
    pub y: f32,
    /// Earth-frame x velocity in m/s.
    pub vx: f32,
    /// Earth-frame y velocity in m/s.
    pub vy: f32,
    /// Heading in radians, the latest attitude yaw.
    pub psi: f32,
}

/// Dead-reckoning estimator.
#[derive(Debug, Clone, Copy)]
pub struct StateEstimator {
    state: NavState,
    config: EstimatorConfig,
    previous_us: Option<u32>,
    dt: f32,
}

impl StateEstimator {
    /// Creates an estimator at rest at the origin.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            state: NavState::default(),
            config,
            previous_us: None,
            dt: 0.0,
        }
    }

    /// Creates an estimator with the default model parameters.
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::new())
    }

    /// Returns the estimate to the origin at rest and forgets the last
    /// timestamp, so the next cycle is treated as the first.
    pub fn reset(&mut self) {
        self.state = NavState::default();
        self.previous_us = None;
        self.dt = 0.0;
    }

    /// The current estimate.
    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// The elapsed time used by the last cycle, in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Runs one prediction cycle from the attitude source and clock.
    pub fn predict<A, C>(&mut self, attitude: &A, clock: &C)
    where
        A: AttitudeSource + ?Sized,
        C: MicrosClock + ?Sized,
    {
        let (phi, theta, psi) = attitude.attitude().to_radians();
        let dt = self.elapsed(clock.micros());
        self.propagate(phi, theta, psi, dt);
    }

    /// Measures the time since the previous cycle and publishes it.
    fn elapsed(&mut self, now_us: u32) -> f32 {
        let dt = match self.previous_us {
            None => 0.0,
            Some(previous_us) => now_us.wrapping_sub(previous_us) as f32 * 1e-6,
        };
        self.previous_us = Some(now_us);

        self.dt = if dt > self.config.max_dt {
            warn!("clamping {} s cycle to {} s", dt, self.config.max_dt);
            self.config.max_dt
        } else {
            dt
        };
        self.dt
    }

    /// Integrates the model over `dt` seconds for the given attitude in
    /// radians, navigation convention (nose-down theta accelerates forward).
    pub fn propagate(&mut self, phi: f32, theta: f32, psi: f32, dt: f32) {
        let EstimatorConfig {
            gravity,
            drag,
            thrust_correction,
            ..
        } = self.config;

        // Body accelerations
        let tilt = (theta * thrust_correction).cos() * (phi * thrust_correction).cos();
        let abx = (-theta).sin() * gravity / tilt;
        let aby = phi.sin() * gravity / tilt;

        // Earth accelerations
        let (sin_psi, cos_psi) = psi.sin_cos();
        let state = &mut self.state;
        let ax = cos_psi * abx - sin_psi * aby - state.vx * drag;
        let ay = sin_psi * abx + cos_psi * aby - state.vy * drag;

        state.vx += ax * dt;
        state.vy += ay * dt;
        state.x += state.vx * dt;
        state.y += state.vy * dt;
        state.time += dt;
        state.psi = psi;

        trace!(
            "nav t={} x={} y={} vx={} vy={}",
            state.time,
            state.x,
            state.y,
            state.vx,
            state.vy
        );
    }

    /// Shifts the position estimate by subtracting a drift offset.
    pub fn apply_correction(&mut self, dx: f32, dy: f32) {
        self.state.x -= dx;
        self.state.y -= dy;
    }
}

impl Default for StateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Test that a level vehicle at rest stays put whatever the interval.
    #[test]
    fn test_estimator_zero_tilt_stays_at_rest() {
        let mut estimator = StateEstimator::new();
        for dt in [0.0005, 0.01, 0.1, 0.05] {
            estimator.propagate(0.0, 0.0, 1.2, dt);
        }
        let state = estimator.state();
        assert_eq!(0.0, state.x, "x should remain exactly zero.");
        assert_eq!(0.0, state.y, "y should remain exactly zero.");
        assert_eq!(0.0, state.vx, "vx should remain exactly zero.");
        assert_eq!(0.0, state.vy, "vy should remain exactly zero.");
        assert!(value_close(0.1605, state.time), "Time should accumulate.");
        assert!(value_close(1.2, state.psi), "Heading should track yaw.");
    }

    /// Test that the first cycle is a no-op apart from the heading.
    #[test]
    fn test_estimator_first_cycle_anchors_clock() {
        let mut estimator = StateEstimator::new();
        let attitude = FixedAttitude::new(100, -100, 900);
        let clock = StepClock::starting_at(123_456_789);

        estimator.predict(&attitude, &clock);

        let state = estimator.state();
        assert_eq!(0.0, estimator.dt(), "First dt should be zero.");
        assert_eq!(0.0, state.time, "Time should not advance.");
        assert_eq!((0.0, 0.0), (state.x, state.y), "No motion expected.");
        assert!(
            value_close(core::f32::consts::FRAC_PI_2, state.psi),
            "Heading should still be stored."
        );
    }

    /// Test that the elapsed time survives counter wraparound.
    #[test]
    fn test_estimator_clock_wraparound() {
        let mut estimator = StateEstimator::new();
        let attitude = FixedAttitude::new(0, 0, 0);
        let clock = StepClock::starting_at(u32::MAX - 199);

        estimator.predict(&attitude, &clock);
        clock.advance(500);
        estimator.predict(&attitude, &clock);

        assert!(
            value_close(0.0005, estimator.dt()),
            "Wrapped interval should be 500 us, got {}",
            estimator.dt()
        );
    }

    /// Test that an overlong interval is clamped rather than dropped.
    #[test]
    fn test_estimator_clamps_long_cycle() {
        let mut estimator = StateEstimator::new();
        let attitude = FixedAttitude::new(0, 100, 0);
        let clock = StepClock::starting_at(1_000_000);

        estimator.predict(&attitude, &clock);
        clock.advance(3_000_000);
        estimator.predict(&attitude, &clock);

        assert!(value_close(0.1, estimator.dt()), "Interval should be clamped.");
        assert!(value_close(0.1, estimator.state().time), "Time should advance by max_dt.");
        assert!(estimator.state().vx > 0.0, "Clamped cycle is still integrated.");

        // Anchored on the late timestamp, so the next cycle is regular.
        clock.advance(1000);
        estimator.predict(&attitude, &clock);
        assert!(value_close(0.001, estimator.dt()));
    }

    /// Test that a host running at the slowest supported rate keeps going.
    #[test]
    fn test_estimator_slow_host() {
        let mut estimator = StateEstimator::new();
        let attitude = FixedAttitude::default();
        let clock = StepClock::starting_at(0);

        estimator.predict(&attitude, &clock);
        for _ in 0..10 {
            clock.advance(250_000);
            estimator.predict(&attitude, &clock);
        }
        assert!(
            value_within(1.0, estimator.state().time, 1e-4),
            "Each slow cycle should count as max_dt."
        );
    }

    /// Test the direction of the acceleration for a forward tilt.
    #[test]
    fn test_estimator_nose_down_accelerates_forward() {
        let mut estimator = StateEstimator::new();
        // Source pitch of +10 degrees is theta = -10 degrees.
        let attitude = FixedAttitude::new(0, 100, 0);
        let clock = StepClock::starting_at(0);

        estimator.predict(&attitude, &clock);
        for _ in 0..100 {
            clock.advance(2000);
            estimator.predict(&attitude, &clock);
        }

        let state = estimator.state();
        assert!(state.vx > 0.0, "Forward velocity expected, got {}", state.vx);
        assert!(state.x > 0.0, "Forward position expected, got {}", state.x);
        assert!(value_close(0.0, state.vy), "No lateral velocity expected.");
        assert!(value_close(0.2, state.time), "Time should be 0.2 s.");
    }

    /// Test one integration step against a hand computation.
    #[test]
    fn test_estimator_specific_step() {
        let mut estimator = StateEstimator::new();
        let phi: f32 = 0.1;
        let theta: f32 = -0.2;
        let dt = 0.01;

        estimator.propagate(phi, theta, 0.0, dt);

        let tilt = (theta * 0.8).cos() * (phi * 0.8).cos();
        let abx = (-theta).sin() * 9.81 / tilt;
        let aby = phi.sin() * 9.81 / tilt;
        let state = estimator.state();
        assert!(
            pair_close((abx * dt, aby * dt), (state.vx, state.vy)),
            "Velocity should be one acceleration step."
        );
        assert!(
            pair_close((abx * dt * dt, aby * dt * dt), (state.x, state.y)),
            "Position should use the updated velocity."
        );
    }

    /// Test that drag decays velocity for a level vehicle.
    #[test]
    fn test_estimator_drag_decay() {
        let mut estimator = StateEstimator::new();
        estimator.state.vx = 2.0;
        estimator.propagate(0.0, 0.0, 0.0, 0.1);
        assert!(
            value_close(1.9, estimator.state().vx),
            "Velocity should lose drag * v * dt."
        );
    }

    /// Test that a correction shifts only the position.
    #[test]
    fn test_estimator_apply_correction() {
        let mut estimator = StateEstimator::new();
        estimator.state.vx = 1.0;
        estimator.apply_correction(0.5, -0.25);
        let state = estimator.state();
        assert!(pair_close((-0.5, 0.25), (state.x, state.y)));
        assert!(value_close(1.0, state.vx), "Velocity is untouched.");
    }
}
