// src/ransac/fit.rs

//! # Robust Linear Fit
//!
//! RANSAC fit of a one dimensional linear model
//! `target = slope * feature + intercept`. Candidate models are fitted by least squares to random
//! subsets of the points and scored against all of them with a capped
//! residual; the candidate with the most inliers wins (ties go to the
//! lower capped error) and is then refitted on its inliers.
//!
//! Everything runs on fixed size stack buffers, the const parameter `CAP`
//! bounds the number of points considered.

use num_traits::Float;
use rand::Rng;

/// Variance below which the features are treated as a single point.
const DEGENERATE_VARIANCE: f32 = 1e-12;

/// A one dimensional linear model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearModel {
    /// Change of the target per unit of feature.
    pub slope: f32,
    /// Target at feature zero.
    pub intercept: f32,
}

impl LinearModel {
    /// Evaluates the model.
    pub fn evaluate(&self, feature: f32) -> f32 {
        self.slope * feature + self.intercept
    }

    /// Least squares fit over `(feature, target)` pairs. Degenerate
    /// features give a flat model through the mean target.
    pub fn least_squares<I>(points: I) -> Option<Self>
    where
        I: Iterator<Item = (f32, f32)> + Clone,
    {
        let (n, sum_x, sum_y) = points
            .clone()
            .fold((0usize, 0.0, 0.0), |(n, sx, sy), (x, y)| (n + 1, sx + x, sy + y));
        if n == 0 {
            return None;
        }
        let mean_x = sum_x / n as f32;
        let mean_y = sum_y / n as f32;

        let (sxx, sxy) = points.fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

        let model = if sxx / (n as f32) < DEGENERATE_VARIANCE {
            Self {
                slope: 0.0,
                intercept: mean_y,
            }
        } else {
            let slope = sxy / sxx;
            Self {
                slope,
                intercept: mean_y - slope * mean_x,
            }
        };

        (model.slope.is_finite() && model.intercept.is_finite()).then_some(model)
    }
}

/// Settings of one RANSAC run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacParams {
    /// Points drawn for every candidate model.
    pub n_samples: usize,
    /// Candidate models evaluated.
    pub iterations: usize,
    /// Residual above which a point is an outlier; also the cap applied
    /// to each point's contribution to the fit error.
    pub error_threshold: f32,
}

/// Result of a RANSAC run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RansacFit {
    /// The fitted model.
    pub model: LinearModel,
    /// Number of points within the error threshold.
    pub inliers: usize,
    /// Sum of residuals, each capped at the error threshold.
    pub fit_error: f32,
}

/// Scores a model against every point.
fn score(model: &LinearModel, features: &[f32], targets: &[f32], threshold: f32) -> RansacFit {
    let (inliers, fit_error) = features.iter().zip(targets).fold(
        (0, 0.0),
        |(inliers, error), (&feature, &target)| {
            let residual = (target - model.evaluate(feature)).abs();
            if residual < threshold {
                (inliers + 1, error + residual)
            } else {
                (inliers, error + threshold)
            }
        },
    );
    RansacFit {
        model: *model,
        inliers,
        fit_error,
    }
}

fn better(candidate: &RansacFit, best: &Option<RansacFit>) -> bool {
    match best {
        None => true,
        Some(best) => {
            candidate.inliers > best.inliers
                || (candidate.inliers == best.inliers && candidate.fit_error < best.fit_error)
        }
    }
}

/// Fits `targets` against `features` with RANSAC.
///
/// At most `CAP` points are used. Returns `None` if there are no points or
/// no candidate model has a single inlier.
pub fn ransac_linear_fit<const CAP: usize, R: Rng>(
    params: &RansacParams,
    features: &[f32],
    targets: &[f32],
    rng: &mut R,
) -> Option<RansacFit> {
    let count = features.len().min(targets.len()).min(CAP);
    if count == 0 {
        return None;
    }
    let features = &features[..count];
    let targets = &targets[..count];
    let n_samples = params.n_samples.clamp(1, count);
    let threshold = params.error_threshold;

    let mut indices = [0usize; CAP];
    for (i, index) in indices.iter_mut().enumerate() {
        *index = i;
    }

    let mut best: Option<RansacFit> = None;
    for _ in 0..params.iterations {
        // Partial Fisher-Yates shuffle, the first n_samples are the subset
        for i in 0..n_samples {
            let j = rng.random_range(i..count);
            indices.swap(i, j);
        }
        let subset = indices[..n_samples]
            .iter()
            .map(|&i| (features[i], targets[i]));
        let Some(model) = LinearModel::least_squares(subset) else {
            continue;
        };

        let candidate = score(&model, features, targets, threshold);
        if better(&candidate, &best) {
            best = Some(candidate);
        }
    }

    let best = best.filter(|fit| fit.inliers > 0)?;

    let inliers = features
        .iter()
        .zip(targets)
        .map(|(&feature, &target)| (feature, target))
        .filter(|&(feature, target)| (target - best.model.evaluate(feature)).abs() < threshold);
    match LinearModel::least_squares(inliers) {
        Some(refined) => {
            let refined = score(&refined, features, targets, threshold);
            if refined.inliers >= best.inliers {
                Some(refined)
            } else {
                Some(best)
            }
        }
        None => Some(best),
    }
}
