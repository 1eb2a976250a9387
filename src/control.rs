// src/control.rs

//! # Cascaded Navigation Control Law
//!
//! Converts the planner's setpoints into commands for the inner attitude
//! and altitude stabilizer.
//!
//! ## Heading Channel
//!
//! The commanded heading is not the setpoint itself but a rate limited
//! reference that is steered towards it along the shortest turn, so gate
//! transitions never produce a heading step.
//!
//! ## Position Channel
//!
//! Position error produces a saturated velocity setpoint, velocity error
//! plus a feedforward on the velocity setpoint produces a saturated
//! earth-frame acceleration, and the acceleration is rotated into body
//! roll and pitch commands with the current heading.
//!
//! The control law has no failure states. Every output is saturated, so
//! bad inputs degrade the trajectory but never the command range.

use crate::config::ControlConfig;
use crate::pid::{
    compute_heading, compute_proportional, HeadingControlData, ProportionalControlData,
};
use crate::{FlightPlan, NavState};
use num_traits::Float;
use piddiy::PidController;

/// Commands for the inner stabilization loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlOutput {
    /// Rate limited heading reference in radians.
    pub psi_ref: f32,
    /// Roll command in radians.
    pub phi_cmd: f32,
    /// Pitch command in radians.
    pub theta_cmd: f32,
    /// Heading command in radians.
    pub psi_cmd: f32,
    /// Altitude command.
    pub alt_cmd: f32,
}

/// Cascaded position, velocity and heading controller.
pub struct ControlLaw {
    x_pid: PidController<f32, ProportionalControlData>,
    y_pid: PidController<f32, ProportionalControlData>,
    vx_pid: PidController<f32, ProportionalControlData>,
    vy_pid: PidController<f32, ProportionalControlData>,
    heading_pid: PidController<f32, HeadingControlData>,
    config: ControlConfig,
    output: ControlOutput,
    velocity_cmd: (f32, f32),
    acceleration_cmd: (f32, f32),
    yaw_rate_cmd: f32,
}

impl ControlLaw {
    /// Creates a controller using the provided configuration.
    pub fn with_config(config: ControlConfig) -> Self {
        let position_pid = || {
            let mut pid = PidController::<f32, ProportionalControlData>::new();
            pid.compute_fn(compute_proportional)
                .kp(config.kp_position)
                .ki(0.0)
                .kd(0.0);
            pid
        };
        let velocity_pid = || {
            let mut pid = PidController::<f32, ProportionalControlData>::new();
            pid.compute_fn(compute_proportional)
                .kp(config.kp_velocity)
                .ki(0.0)
                .kd(0.0);
            pid
        };

        let mut heading_pid = PidController::new();
        heading_pid
            .compute_fn(compute_heading)
            .kp(1.0)
            .ki(0.0)
            .kd(0.0);

        ControlLaw {
            x_pid: position_pid(),
            y_pid: position_pid(),
            vx_pid: velocity_pid(),
            vy_pid: velocity_pid(),
            heading_pid,
            config,
            output: ControlOutput::default(),
            velocity_cmd: (0.0, 0.0),
            acceleration_cmd: (0.0, 0.0),
            yaw_rate_cmd: 0.0,
        }
    }

    /// Creates a controller with default gains and limits.
    pub fn new() -> Self {
        Self::with_config(ControlConfig::new())
    }

    /// Clears all commands and sets the heading reference to `psi_ref`.
    pub fn reset(&mut self, psi_ref: f32) {
        self.output = ControlOutput {
            psi_ref,
            psi_cmd: psi_ref,
            ..ControlOutput::default()
        };
        self.velocity_cmd = (0.0, 0.0);
        self.acceleration_cmd = (0.0, 0.0);
        self.yaw_rate_cmd = 0.0;
    }

    /// The latest commands.
    pub fn output(&self) -> &ControlOutput {
        &self.output
    }

    /// The latest saturated earth-frame velocity setpoint.
    pub fn velocity_cmd(&self) -> (f32, f32) {
        self.velocity_cmd
    }

    /// The latest saturated earth-frame acceleration setpoint in radians
    /// of tilt.
    pub fn acceleration_cmd(&self) -> (f32, f32) {
        self.acceleration_cmd
    }

    /// The latest rate limited heading rate in rad/s.
    pub fn yaw_rate_cmd(&self) -> f32 {
        self.yaw_rate_cmd
    }

    /// Runs one control cycle over `dt` seconds.
    pub fn run(&mut self, state: &NavState, plan: &FlightPlan, dt: f32) -> &ControlOutput {
        let ControlConfig {
            feedforward_gain,
            max_speed,
            max_pitch,
            max_yaw_rate,
            ..
        } = self.config;

        // Heading controller
        self.heading_pid.set_point(plan.psi_set);
        let r_cmd = self
            .heading_pid
            .compute(HeadingControlData {
                reference: self.output.psi_ref,
            })
            .clamp(-max_yaw_rate, max_yaw_rate);
        self.yaw_rate_cmd = r_cmd;
        self.output.psi_ref += r_cmd * dt;

        // Position error to speed
        self.x_pid.set_point(plan.x_set);
        self.y_pid.set_point(plan.y_set);
        let vxcmd = self
            .x_pid
            .compute(ProportionalControlData { measurement: state.x })
            .clamp(-max_speed, max_speed);
        let vycmd = self
            .y_pid
            .compute(ProportionalControlData { measurement: state.y })
            .clamp(-max_speed, max_speed);
        self.velocity_cmd = (vxcmd, vycmd);

        // Speed to attitude
        self.vx_pid.set_point(vxcmd);
        self.vy_pid.set_point(vycmd);
        let ax = (self
            .vx_pid
            .compute(ProportionalControlData { measurement: state.vx })
            + vxcmd * feedforward_gain)
            .clamp(-max_pitch, max_pitch);
        let ay = (self
            .vy_pid
            .compute(ProportionalControlData { measurement: state.vy })
            + vycmd * feedforward_gain)
            .clamp(-max_pitch, max_pitch);
        self.acceleration_cmd = (ax, ay);

        let (sin_psi, cos_psi) = state.psi.sin_cos();
        self.output.phi_cmd = -sin_psi * ax + cos_psi * ay;
        self.output.theta_cmd = -cos_psi * ax - sin_psi * ay;
        self.output.psi_cmd = self.output.psi_ref;
        self.output.alt_cmd = plan.alt_set;

        &self.output
    }
}

impl Default for ControlLaw {
    fn default() -> Self {
        Self::new()
    }
}
