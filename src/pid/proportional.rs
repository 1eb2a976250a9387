// src/pid/proportional.rs

//! # Proportional Control Module
//!
//! Compute callback for the position and velocity loops. Only the error
//! term is produced, so the controller output is `kp * error`; the caller
//! saturates it.

use piddiy::PidController;

/// Control data for a proportional loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProportionalControlData {
    /// The measured value of the controlled quantity.
    pub measurement: f32,
}

/// Proportional compute callback.
pub fn compute_proportional(
    pid: &mut PidController<f32, ProportionalControlData>,
    data: ProportionalControlData,
) -> (f32, f32, f32) {
    let error = pid.set_point - data.measurement;
    (error, 0.0, 0.0)
}
