// src/navigator.rs

//! # Navigator
//!
//! Owns every stage of the pipeline and runs them in order. The control
//! loop calls [`Navigator::step`] once per cycle; vision measurements are
//! handed over whenever they arrive, either directly or through the read
//! end of a [`VisionLink`](crate::VisionLink).

use crate::corrector::{DriftFit, VisionCorrector};
use crate::ransac::RANSAC_CAPACITY;
use crate::{
    AttitudeSource, ControlLaw, ControlOutput, FlightPlan, FlightPlanner, GateTable,
    MicrosClock, NavState, NavigationConfig, StateEstimator, VisionMeasurement, VisionReader,
};
use log::trace;

/// The complete outer-loop navigation pipeline.
pub struct Navigator<'a, const CAP: usize = RANSAC_CAPACITY> {
    estimator: StateEstimator,
    planner: FlightPlanner<'a>,
    control: ControlLaw,
    corrector: VisionCorrector<CAP>,
    config: NavigationConfig,
}

impl<'a, const CAP: usize> Navigator<'a, CAP> {
    /// Creates a navigator for the given course, ready for mission start.
    pub fn new(gates: GateTable<'a>, config: NavigationConfig) -> Self {
        let mut navigator = Self {
            estimator: StateEstimator::with_config(config.estimator),
            planner: FlightPlanner::with_config(gates, config.planner),
            control: ControlLaw::with_config(config.control),
            corrector: VisionCorrector::with_config(config.ransac),
            config,
        };
        navigator.reset();
        navigator
    }

    /// Restarts the mission: origin at rest, first gate, heading reference
    /// zero and an empty sample window.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.planner.reset();
        self.control.reset(0.0);
        self.corrector.reset();
    }

    /// Runs one control cycle and returns the commands for the inner loop.
    pub fn step<A, C>(&mut self, attitude: &A, clock: &C) -> ControlOutput
    where
        A: AttitudeSource + ?Sized,
        C: MicrosClock + ?Sized,
    {
        self.estimator.predict(attitude, clock);
        let state = *self.estimator.state();
        self.corrector.update_buffer_size(state.time);

        let plan = *self.planner.run(&state);
        let output = *self.control.run(&state, &plan, self.estimator.dt());
        trace!(
            "gate {} cmd phi={} theta={} psi={}",
            plan.gate_index,
            output.phi_cmd,
            output.theta_cmd,
            output.psi_cmd
        );
        output
    }

    /// Runs the correction step for one vision measurement.
    pub fn ingest_vision(&mut self, measurement: VisionMeasurement) -> Option<DriftFit> {
        self.corrector
            .correct(&mut self.estimator, self.planner.plan(), measurement)
    }

    /// Ingests the newest measurement waiting on the vision link, if any.
    pub fn ingest_latest<const N: usize>(
        &mut self,
        reader: &mut VisionReader<'_, N>,
    ) -> Option<DriftFit> {
        let measurement = reader.latest()?;
        self.ingest_vision(measurement)
    }

    /// The current estimate.
    pub fn state(&self) -> &NavState {
        self.estimator.state()
    }

    /// The current plan.
    pub fn plan(&self) -> &FlightPlan {
        self.planner.plan()
    }

    /// The latest commands.
    pub fn output(&self) -> &ControlOutput {
        self.control.output()
    }

    /// The most recent drift fit.
    pub fn last_fit(&self) -> Option<&DriftFit> {
        self.corrector.last_fit()
    }

    /// The vision corrector.
    pub fn corrector(&self) -> &VisionCorrector<CAP> {
        &self.corrector
    }

    /// The configuration the pipeline was built with.
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }
}

impl Default for Navigator<'static> {
    fn default() -> Self {
        Self::new(GateTable::default(), NavigationConfig::new())
    }
}
