// src/corrector.rs

//! # Vision Drift Corrector
//!
//! Pairs each new vision measurement with the estimator's prediction at
//! the same instant, keeps the pairs in a time windowed ring and fits the
//! prediction error over time on each axis. The intercept of the fit at
//! the current time is the drift of the dead-reckoned position, which is
//! subtracted from the live estimate and from the buffered predictions.
//!
//! The fit is advisory. Too few samples, or no usable model, simply leave
//! the estimate untouched.

use crate::config::RansacConfig;
use crate::ransac::{
    ransac_linear_fit, LinearModel, RansacParams, RansacSample, RansacWindow, RANSAC_CAPACITY,
};
use crate::{FlightPlan, StateEstimator, VisionMeasurement};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Estimated position drift on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriftFit {
    /// Prediction error along x against sample age.
    pub x: LinearModel,
    /// Prediction error along y against sample age.
    pub y: LinearModel,
    /// Samples within the error threshold of the x model.
    pub inliers_x: usize,
    /// Samples within the error threshold of the y model.
    pub inliers_y: usize,
    /// Capped residual sum of the x model.
    pub fit_error_x: f32,
    /// Capped residual sum of the y model.
    pub fit_error_y: f32,
}

impl DriftFit {
    /// The drift at the time of the fit, to be subtracted from the estimate.
    pub fn correction(&self) -> (f32, f32) {
        (self.x.intercept, self.y.intercept)
    }
}

/// Windowed robust drift estimator.
pub struct VisionCorrector<const CAP: usize = RANSAC_CAPACITY> {
    window: RansacWindow<CAP>,
    config: RansacConfig,
    rng: SmallRng,
    last_fit: Option<DriftFit>,
    fit_count: u32,
    last_count: Option<u32>,
}

impl<const CAP: usize> VisionCorrector<CAP> {
    /// Creates a corrector with an empty window.
    pub fn with_config(config: RansacConfig) -> Self {
        Self {
            window: RansacWindow::new(config.dt_max),
            config,
            rng: SmallRng::seed_from_u64(config.seed),
            last_fit: None,
            fit_count: 0,
            last_count: None,
        }
    }

    /// Forgets every sample and fit and reseeds the sampler.
    pub fn reset(&mut self) {
        self.window.reset();
        self.rng = SmallRng::seed_from_u64(self.config.seed);
        self.last_fit = None;
        self.fit_count = 0;
        self.last_count = None;
    }

    /// The sample window.
    pub fn window(&self) -> &RansacWindow<CAP> {
        &self.window
    }

    /// The most recent successful fit.
    pub fn last_fit(&self) -> Option<&DriftFit> {
        self.last_fit.as_ref()
    }

    /// Number of fits attempted since the last reset.
    pub fn fit_count(&self) -> u32 {
        self.fit_count
    }

    /// Recounts the fresh samples as of `now`.
    pub fn update_buffer_size(&mut self, now: f32) -> usize {
        self.window.update_buffer_size(now)
    }

    /// Stores a sample and fits the window if it holds enough fresh ones.
    pub fn push(&mut self, sample: RansacSample, now: f32) -> Option<DriftFit> {
        self.window.push(sample);
        let size = self.window.update_buffer_size(now);
        if size <= self.config.min_samples {
            debug!("{} fresh vision samples, fit skipped", size);
            return None;
        }
        self.fit(now)
    }

    fn fit(&mut self, now: f32) -> Option<DriftFit> {
        let mut features = [0.0f32; CAP];
        let mut targets_x = [0.0f32; CAP];
        let mut targets_y = [0.0f32; CAP];
        let mut count = 0;
        for (i, sample) in self.window.fresh().enumerate() {
            features[i] = sample.time - now;
            targets_x[i] = sample.x - sample.mx;
            targets_y[i] = sample.y - sample.my;
            count = i + 1;
        }

        self.fit_count = self.fit_count.wrapping_add(1);
        let params = RansacParams {
            n_samples: ((count as f32 * self.config.sample_fraction) as usize).max(2),
            iterations: self.config.iterations,
            error_threshold: self.config.error_threshold,
        };

        let x = ransac_linear_fit::<CAP, _>(
            &params,
            &features[..count],
            &targets_x[..count],
            &mut self.rng,
        )?;
        let y = ransac_linear_fit::<CAP, _>(
            &params,
            &features[..count],
            &targets_y[..count],
            &mut self.rng,
        )?;

        let fit = DriftFit {
            x: x.model,
            y: y.model,
            inliers_x: x.inliers,
            inliers_y: y.inliers,
            fit_error_x: x.fit_error,
            fit_error_y: y.fit_error,
        };
        debug!(
            "drift fit over {} samples: x {}+{}t ({} inliers), y {}+{}t ({} inliers)",
            count,
            fit.x.intercept,
            fit.x.slope,
            fit.inliers_x,
            fit.y.intercept,
            fit.y.slope,
            fit.inliers_y
        );
        self.last_fit = Some(fit);
        Some(fit)
    }

    /// Runs the correction step for a vision measurement taken against the
    /// active gate of `plan`.
    ///
    /// A measurement carrying the same count as the previous one is
    /// ignored. Returns the fit produced by this measurement, if any.
    pub fn correct(
        &mut self,
        estimator: &mut StateEstimator,
        plan: &FlightPlan,
        measurement: VisionMeasurement,
    ) -> Option<DriftFit> {
        if self.last_count == Some(measurement.count) {
            debug!("vision count {} already ingested", measurement.count);
            return None;
        }
        self.last_count = Some(measurement.count);

        let state = *estimator.state();
        let sample = RansacSample {
            time: state.time,
            x: state.x,
            y: state.y,
            mx: plan.gate_x - measurement.dx,
            my: plan.gate_y - measurement.dy,
        };
        let fit = self.push(sample, state.time)?;

        if self.config.apply_correction {
            let (dx, dy) = fit.correction();
            estimator.apply_correction(dx, dy);
            self.window.shift_predictions(dx, dy);
            info!("position corrected by ({}, {})", dx, dy);
        }
        Some(fit)
    }
}

impl VisionCorrector<RANSAC_CAPACITY> {
    /// Creates a corrector with the default window and fit settings.
    pub fn new() -> Self {
        Self::with_config(RansacConfig::new())
    }
}

impl Default for VisionCorrector<RANSAC_CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn sample_at(time: f32) -> RansacSample {
        RansacSample {
            time,
            x: 0.2,
            y: -0.1,
            mx: 0.0,
            my: 0.0,
        }
    }

    fn plan_at_gate(gate_x: f32, gate_y: f32) -> FlightPlan {
        FlightPlan {
            gate_x,
            gate_y,
            ..FlightPlan::default()
        }
    }

    fn seen_from(gate: (f32, f32), position: (f32, f32), count: u32) -> VisionMeasurement {
        VisionMeasurement {
            dx: gate.0 - position.0,
            dy: gate.1 - position.1,
            dz: 0.0,
            count,
        }
    }

    /// Test that a fit needs more than four fresh samples.
    #[test]
    fn test_corrector_fit_threshold() {
        let mut corrector = VisionCorrector::new();

        assert!(corrector.push(sample_at(0.0), 0.0).is_none());
        assert!(corrector.push(sample_at(0.1), 0.1).is_none());
        assert!(corrector.push(sample_at(0.2), 0.25).is_none());
        assert_eq!(3, corrector.window().buf_size(), "Three fresh samples.");
        assert_eq!(0, corrector.fit_count(), "No fit should be attempted.");

        corrector.push(sample_at(0.3), 0.5);
        corrector.push(sample_at(0.4), 0.5);
        let fit = corrector.push(sample_at(0.5), 0.5);
        assert_eq!(6, corrector.window().buf_size(), "Six fresh samples.");
        assert!(corrector.fit_count() > 0, "A fit should be attempted.");

        let fit = fit.unwrap();
        assert!(pair_close((0.2, -0.1), fit.correction()), "Constant drift.");
        assert_eq!(6, fit.inliers_x);
        assert_eq!(Some(&fit), corrector.last_fit());
    }

    /// Test that stale samples do not count towards a fit.
    #[test]
    fn test_corrector_stale_samples_skip_fit() {
        let mut corrector = VisionCorrector::new();
        for time in [0.0, 0.1, 0.2, 0.3] {
            corrector.push(sample_at(time), time);
        }
        assert!(
            corrector.push(sample_at(5.0), 5.0).is_none(),
            "Older samples are stale."
        );
        assert_eq!(1, corrector.window().buf_size());
        assert_eq!(0, corrector.fit_count());
    }

    /// Test that a constant drift is removed despite an outlier.
    #[test]
    fn test_corrector_removes_constant_drift() {
        let gate = (4.0, 0.0);
        let mut estimator = StateEstimator::new();
        let mut corrector = VisionCorrector::new();
        let plan = plan_at_gate(gate.0, gate.1);

        // The vehicle hovers at the origin, the estimate has drifted
        estimator.apply_correction(-0.5, 0.3);

        let mut applied = None;
        for count in 1..=5 {
            estimator.propagate(0.0, 0.0, 0.0, 0.1);
            let measurement = if count == 2 {
                seen_from(gate, (3.0, 0.0), count)
            } else {
                seen_from(gate, (0.0, 0.0), count)
            };
            applied = corrector.correct(&mut estimator, &plan, measurement);
        }

        let fit = applied.expect("Five fresh samples should produce a fit.");
        assert!(pair_close((0.5, -0.3), fit.correction()), "Drift misestimated.");
        assert_eq!(4, fit.inliers_x, "The outlier should be rejected on x.");
        assert_eq!(5, fit.inliers_y, "No outlier on y.");
        assert!(value_within(1.0, fit.fit_error_x, 1e-4), "One capped residual.");

        let state = estimator.state();
        assert!(pair_close((0.0, 0.0), (state.x, state.y)), "Estimate corrected.");
        let newest = corrector.window().get(0).unwrap();
        assert!(
            pair_close((0.0, 0.0), (newest.x, newest.y)),
            "Buffered predictions should be shifted."
        );
    }

    /// Test that the correction can be disabled.
    #[test]
    fn test_corrector_advisory_only() {
        let config = RansacConfig {
            apply_correction: false,
            ..RansacConfig::new()
        };
        let mut estimator = StateEstimator::new();
        let mut corrector: VisionCorrector = VisionCorrector::with_config(config);
        let plan = plan_at_gate(4.0, -2.0);
        estimator.apply_correction(-0.5, 0.0);

        for count in 1..=6 {
            estimator.propagate(0.0, 0.0, 0.0, 0.1);
            corrector.correct(&mut estimator, &plan, seen_from((4.0, -2.0), (0.0, 0.0), count));
        }

        assert!(corrector.last_fit().is_some(), "Fit should still run.");
        assert!(
            value_close(0.5, estimator.state().x),
            "Estimate should not be touched."
        );
    }

    /// Test that a repeated count is ignored.
    #[test]
    fn test_corrector_ignores_repeated_count() {
        let mut estimator = StateEstimator::new();
        let mut corrector = VisionCorrector::new();
        let plan = plan_at_gate(4.0, 0.0);

        estimator.propagate(0.0, 0.0, 0.0, 0.1);
        corrector.correct(&mut estimator, &plan, seen_from((4.0, 0.0), (0.0, 0.0), 7));
        estimator.propagate(0.0, 0.0, 0.0, 0.1);
        corrector.correct(&mut estimator, &plan, seen_from((4.0, 0.0), (0.0, 0.0), 7));
        assert_eq!(1, corrector.update_buffer_size(0.2), "Duplicate was stored.");

        corrector.correct(&mut estimator, &plan, seen_from((4.0, 0.0), (0.0, 0.0), 8));
        assert_eq!(2, corrector.window().buf_size());
    }

    /// Test that the vision-implied position is taken against the gate.
    #[test]
    fn test_corrector_measured_position() {
        let mut estimator = StateEstimator::new();
        let mut corrector = VisionCorrector::new();
        let plan = plan_at_gate(0.0, -2.0);

        corrector.correct(
            &mut estimator,
            &plan,
            VisionMeasurement {
                dx: -1.5,
                dy: -0.5,
                dz: 0.2,
                count: 1,
            },
        );
        let sample = corrector.window().get(0).unwrap();
        assert!(pair_close((1.5, -1.5), (sample.mx, sample.my)));
    }
}
