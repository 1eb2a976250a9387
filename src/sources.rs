// src/sources.rs

//! # Collaborator Interfaces
//!
//! The navigation core reads its inputs through two small traits so that
//! the host firmware can plug in its own attitude estimator and timer.
//! Both are read once per control cycle.

use core::f32::consts::PI;

/// Converts a fixed-point angle in tenths of a degree to radians.
pub fn decidegrees_to_radians(angle: i16) -> f32 {
    f32::from(angle) * PI / 1800.0
}

/// Attitude as reported by the host's attitude estimator, in decidegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attitude {
    /// Roll angle, right wing down positive.
    pub roll: i16,
    /// Pitch angle in the source convention.
    pub pitch: i16,
    /// Heading angle.
    pub yaw: i16,
}

impl Attitude {
    /// Returns `(phi, theta, psi)` in radians in the navigation
    /// convention, where theta is the negated source pitch.
    pub fn to_radians(self) -> (f32, f32, f32) {
        (
            decidegrees_to_radians(self.roll),
            -decidegrees_to_radians(self.pitch),
            decidegrees_to_radians(self.yaw),
        )
    }
}

/// A provider of the current vehicle attitude.
pub trait AttitudeSource {
    /// Returns the most recent attitude estimate.
    fn attitude(&self) -> Attitude;
}

/// A monotonic, wrapping, 32-bit microsecond counter.
pub trait MicrosClock {
    /// Returns the current counter value.
    fn micros(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Test the decidegree conversion against known angles.
    #[test]
    fn test_sources_decidegree_conversion() {
        assert!(value_close(PI, decidegrees_to_radians(1800)));
        assert!(value_close(-PI / 2.0, decidegrees_to_radians(-900)));
        assert!(value_close(0.0, decidegrees_to_radians(0)));
    }

    /// Test that pitch is inverted and the other axes are not.
    #[test]
    fn test_sources_attitude_pitch_inverted() {
        let attitude = Attitude {
            roll: 100,
            pitch: 100,
            yaw: -450,
        };
        let (phi, theta, psi) = attitude.to_radians();
        assert!(value_close(0.174_532_9, phi), "Roll should be 10 degrees.");
        assert!(
            value_close(-0.174_532_9, theta),
            "Pitch should be inverted."
        );
        assert!(value_close(-0.785_398_2, psi), "Yaw should be -45 degrees.");
    }
}
