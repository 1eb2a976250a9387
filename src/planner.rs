// src/planner.rs

//! # Gate Sequencing Flight Planner
//!
//! A small state machine over the static gate table. The active gate is
//! flown to directly; once inside the look-ahead radius the heading of the
//! following gate is commanded so the turn starts before arrival, and once
//! inside the arrival radius the next gate becomes active. The last gate
//! is terminal: the planner holds on it for the rest of the mission.

use crate::config::PlannerConfig;
use crate::{GateTable, NavState};
use log::info;

/// The navigation target derived from the estimate and the gate table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightPlan {
    /// Index of the active gate, never decreasing.
    pub gate_index: usize,
    /// Active gate x position in meters.
    pub gate_x: f32,
    /// Active gate y position in meters.
    pub gate_y: f32,
    /// Active gate altitude.
    pub gate_alt: f32,
    /// Active gate heading in radians.
    pub gate_psi: f32,
    /// Position setpoint x in meters.
    pub x_set: f32,
    /// Position setpoint y in meters.
    pub y_set: f32,
    /// Altitude setpoint.
    pub alt_set: f32,
    /// Heading setpoint in radians.
    pub psi_set: f32,
}

/// Gate sequencing state machine.
#[derive(Debug, Clone, Copy)]
pub struct FlightPlanner<'a> {
    gates: GateTable<'a>,
    config: PlannerConfig,
    plan: FlightPlan,
}

impl<'a> FlightPlanner<'a> {
    /// Creates a planner at the first gate.
    pub fn with_config(gates: GateTable<'a>, config: PlannerConfig) -> Self {
        let mut planner = Self {
            gates,
            config,
            plan: FlightPlan::default(),
        };
        planner.reset();
        planner
    }

    /// Creates a planner with the default thresholds.
    pub fn new(gates: GateTable<'a>) -> Self {
        Self::with_config(gates, PlannerConfig::new())
    }

    /// Restarts the mission at the first gate.
    pub fn reset(&mut self) {
        self.plan.gate_index = 0;
        self.update_gate_setpoints();

        self.plan.x_set = 0.0;
        self.plan.y_set = 0.0;
        self.plan.alt_set = self.plan.gate_alt;
        self.plan.psi_set = 0.0;
    }

    /// The current plan.
    pub fn plan(&self) -> &FlightPlan {
        &self.plan
    }

    /// The course being flown.
    pub fn gates(&self) -> &GateTable<'a> {
        &self.gates
    }

    /// Copies the active gate into the plan.
    fn update_gate_setpoints(&mut self) {
        let gate = self.gates.gate(self.plan.gate_index);
        self.plan.gate_x = gate.x;
        self.plan.gate_y = gate.y;
        self.plan.gate_alt = gate.alt;
        self.plan.gate_psi = gate.psi;
    }

    /// Runs one planning cycle against the current estimate.
    pub fn run(&mut self, state: &NavState) -> &FlightPlan {
        self.update_gate_setpoints();

        let plan = &mut self.plan;
        plan.x_set = plan.gate_x;
        plan.y_set = plan.gate_y;
        plan.alt_set = plan.gate_alt;

        let dx = plan.gate_x - state.x;
        let dy = plan.gate_y - state.y;
        let dist2 = dx * dx + dy * dy;

        plan.psi_set = plan.gate_psi;

        // Too close to keep the gate in sight, turn towards the next one
        let look_ahead = self.config.look_ahead_radius;
        if dist2 < look_ahead * look_ahead {
            if let Some(next) = self.gates.get(plan.gate_index + 1) {
                plan.psi_set = next.psi;
            }
        }

        let arrival = self.config.arrival_radius;
        if dist2 < arrival * arrival {
            let next_index = (plan.gate_index + 1).min(self.gates.last_index());
            if next_index != plan.gate_index {
                info!("gate {} passed, heading for gate {}", plan.gate_index, next_index);
            }
            plan.gate_index = next_index;
        }

        &self.plan
    }
}
