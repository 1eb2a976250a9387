// src/test_utils.rs

//! This module contains utilities for testing.

use crate::{Attitude, AttitudeSource, MicrosClock};
use core::cell::Cell;
use num_traits::Float;

/// A constant defining the tolerance within which floating-point values
/// are considered close enough to be equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
///
/// # Arguments
/// * `target` - The target value.
/// * `value` - The value to compare against the target.
///
/// # Returns
/// `true` if the absolute difference between `target` and `value` is less than
/// `TEST_TOLERANCE`, otherwise `false`.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Checks if two floating point numbers are within a caller supplied
/// tolerance of each other.
pub fn value_within(target: f32, value: f32, tolerance: f32) -> bool {
    (target - value).abs() < tolerance
}

/// Checks if each of the components in a planar vector is close enough to
/// be considered equal.
///
/// # Arguments
/// * `target` - The target vector as a tuple of two `f32` values.
/// * `value` - The vector to compare against the target.
///
/// # Returns
/// `true` if each component of `target` and `value` is close as per `value_close`,
/// otherwise `false`.
pub fn pair_close(target: (f32, f32), value: (f32, f32)) -> bool {
    value_close(target.0, value.0) && value_close(target.1, value.1)
}

/// Attitude source returning whatever was last stored in it.
#[derive(Default)]
pub struct FixedAttitude(pub Cell<Attitude>);

impl FixedAttitude {
    /// Creates a source reporting the given decidegree angles.
    pub fn new(roll: i16, pitch: i16, yaw: i16) -> Self {
        Self(Cell::new(Attitude { roll, pitch, yaw }))
    }
}

impl AttitudeSource for FixedAttitude {
    fn attitude(&self) -> Attitude {
        self.0.get()
    }
}

/// Manually advanced microsecond clock.
#[derive(Default)]
pub struct StepClock(pub Cell<u32>);

impl StepClock {
    /// Creates a clock reading `start` microseconds.
    pub fn starting_at(start: u32) -> Self {
        Self(Cell::new(start))
    }

    /// Advances the clock, wrapping like the hardware counter.
    pub fn advance(&self, micros: u32) {
        self.0.set(self.0.get().wrapping_add(micros));
    }
}

impl MicrosClock for StepClock {
    fn micros(&self) -> u32 {
        self.0.get()
    }
}
