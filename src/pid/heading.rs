// src/pid/heading.rs

//! # Heading Control Module
//!
//! Compute callback for the heading channel. The error between the heading
//! setpoint and the internal heading reference is wrapped so the vehicle
//! always takes the shorter way round.

use core::f32::consts::{PI, TAU};
use piddiy::PidController;

/// Wraps an angle into `(-PI, PI]`.
///
/// Non-finite input yields zero, so a corrupted setpoint commands no turn.
pub fn wrap_pi(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut shifted = (angle + PI) % TAU;
    if shifted <= 0.0 {
        shifted += TAU;
    }
    // shifted is now in (0, TAU]
    let wrapped = shifted - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Control data for the heading channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingControlData {
    /// The rate limited heading reference being steered, in radians.
    pub reference: f32,
}

/// Heading compute callback producing the shortest-turn error.
pub fn compute_heading(
    pid: &mut PidController<f32, HeadingControlData>,
    data: HeadingControlData,
) -> (f32, f32, f32) {
    let error = wrap_pi(pid.set_point - data.reference);
    (error, 0.0, 0.0)
}
