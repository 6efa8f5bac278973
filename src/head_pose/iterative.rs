//! Iterative PnP: Levenberg-Marquardt on the reprojection error.
//!
//! Parameters are the axis-angle rotation and the translation (six values).
//! The start point assumes a roughly frontal face: a half turn about the
//! camera x axis (model y points up, image y points down) at the depth
//! implied by the ratio of model size to image size.

use super::solver::{CameraIntrinsics, PnpSolution, PnpSolver};
use crate::{constants::EPSILON, error::PoseFailure};
use nalgebra::{DMatrix, DVector, Point2, Point3, Rotation3, Vector3, Vector6};
use std::f64::consts::PI;

const MIN_CORRESPONDENCES: usize = 4;
const MIN_IMAGE_SPAN: f64 = 1e-6;
const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;
const GRADIENT_TOLERANCE: f64 = 1e-12;
const STEP_TOLERANCE: f64 = 1e-12;
const COST_TOLERANCE: f64 = 1e-15;
const JACOBIAN_STEP: f64 = 1e-7;

type Params = Vector6<f64>;

/// Levenberg-Marquardt PnP solver
#[derive(Debug, Clone)]
pub struct IterativePnp {
    max_iterations: usize,
}

impl IterativePnp {
    #[must_use]
    pub fn new(max_iterations: usize) -> Self {
        log::info!("Initializing IterativePnp (max {max_iterations} iterations)");
        Self { max_iterations }
    }

    fn initial_guess(
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> Result<Params, PoseFailure> {
        let image_span = max_pairwise_distance(image.iter().map(|p| p.coords.push(0.0)));
        if image_span < MIN_IMAGE_SPAN {
            return Err(PoseFailure::Degenerate(format!(
                "image points span {image_span:.3e} px"
            )));
        }
        let model_span = max_pairwise_distance(model.iter().map(|p| p.coords));
        if model_span < EPSILON {
            return Err(PoseFailure::Degenerate("model points coincide".to_string()));
        }

        #[allow(clippy::cast_precision_loss)]
        let n = image.len() as f64;
        let image_centroid = image.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords.push(0.0)) / n;
        let model_centroid = model.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n;

        let depth = camera.focal_length * model_span / image_span;
        let rotation = Vector3::new(PI, 0.0, 0.0);
        let centroid_in_camera = Vector3::new(
            (image_centroid.x - camera.cx) * depth / camera.focal_length,
            (image_centroid.y - camera.cy) * depth / camera.focal_length,
            depth,
        );
        let translation = centroid_in_camera - Rotation3::new(rotation) * model_centroid;

        Ok(Params::new(
            rotation.x,
            rotation.y,
            rotation.z,
            translation.x,
            translation.y,
            translation.z,
        ))
    }

    /// Stacked (u, v) reprojection residuals, `None` if a point falls behind the camera
    fn residuals(
        params: &Params,
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> Option<DVector<f64>> {
        let rotation = Rotation3::new(Vector3::new(params[0], params[1], params[2]));
        let translation = Vector3::new(params[3], params[4], params[5]);

        let mut residuals = DVector::zeros(model.len() * 2);
        for (i, (point, observed)) in model.iter().zip(image).enumerate() {
            let projected = camera.project(&(rotation * point.coords + translation))?;
            residuals[2 * i] = projected.x - observed.x;
            residuals[2 * i + 1] = projected.y - observed.y;
        }
        Some(residuals)
    }

    /// Central-difference Jacobian, one-sided where a probe leaves the valid region
    fn jacobian(
        params: &Params,
        current: &DVector<f64>,
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> Option<DMatrix<f64>> {
        let mut jacobian = DMatrix::zeros(current.len(), 6);
        for j in 0..6 {
            let h = JACOBIAN_STEP * params[j].abs().max(1.0);
            let mut forward = *params;
            forward[j] += h;
            let mut backward = *params;
            backward[j] -= h;

            let column = match (
                Self::residuals(&forward, model, image, camera),
                Self::residuals(&backward, model, image, camera),
            ) {
                (Some(f), Some(b)) => (f - b) / (2.0 * h),
                (Some(f), None) => (f - current) / h,
                (None, Some(b)) => (current - b) / h,
                (None, None) => return None,
            };
            jacobian.set_column(j, &column);
        }
        Some(jacobian)
    }

    fn finish(params: Params, cost: f64, iterations: usize, points: usize) -> Result<PnpSolution, PoseFailure> {
        if !params.iter().all(|v| v.is_finite()) || !cost.is_finite() {
            return Err(PoseFailure::NonFinite("solver produced a non-finite pose".to_string()));
        }
        #[allow(clippy::cast_precision_loss)]
        let reprojection_rms = (cost / points as f64).sqrt();
        log::trace!("IterativePnp converged in {iterations} iterations, rms {reprojection_rms:.4} px");
        Ok(PnpSolution {
            rotation_vector: Vector3::new(params[0], params[1], params[2]),
            translation: Vector3::new(params[3], params[4], params[5]),
            iterations,
            reprojection_rms,
        })
    }
}

impl PnpSolver for IterativePnp {
    fn solve(
        &self,
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> Result<PnpSolution, PoseFailure> {
        if model.len() != image.len() || model.len() < MIN_CORRESPONDENCES {
            return Err(PoseFailure::Degenerate(format!(
                "need at least {MIN_CORRESPONDENCES} matched points, got {} model / {} image",
                model.len(),
                image.len()
            )));
        }
        if !image.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
            return Err(PoseFailure::NonFinite("image point".to_string()));
        }

        let mut params = Self::initial_guess(model, image, camera)?;
        let mut residual = Self::residuals(&params, model, image, camera).ok_or(PoseFailure::BehindCamera)?;
        let mut cost = residual.norm_squared();
        let mut damping = INITIAL_DAMPING;

        for iteration in 1..=self.max_iterations {
            let jacobian =
                Self::jacobian(&params, &residual, model, image, camera).ok_or(PoseFailure::BehindCamera)?;
            let normal = jacobian.tr_mul(&jacobian);
            let gradient = jacobian.tr_mul(&residual);

            if gradient.amax() <= GRADIENT_TOLERANCE {
                return Self::finish(params, cost, iteration, model.len());
            }

            loop {
                if damping > MAX_DAMPING {
                    // no descent direction left, we are at the minimum
                    return Self::finish(params, cost, iteration, model.len());
                }

                let mut damped = normal.clone();
                for k in 0..6 {
                    damped[(k, k)] += damping * normal[(k, k)].max(EPSILON);
                }
                let Some(cholesky) = damped.cholesky() else {
                    damping *= 10.0;
                    continue;
                };
                let step = cholesky.solve(&(-&gradient));
                let step = Params::from_column_slice(step.as_slice());
                let candidate = params + step;

                match Self::residuals(&candidate, model, image, camera) {
                    Some(candidate_residual) if candidate_residual.norm_squared() < cost => {
                        let candidate_cost = candidate_residual.norm_squared();
                        let small_step = step.norm() <= STEP_TOLERANCE * (candidate.norm() + STEP_TOLERANCE);
                        let small_gain = cost - candidate_cost <= COST_TOLERANCE * cost;

                        params = candidate;
                        residual = candidate_residual;
                        cost = candidate_cost;
                        damping = (damping / 10.0).max(MIN_DAMPING);

                        if small_step || small_gain {
                            return Self::finish(params, cost, iteration, model.len());
                        }
                        break;
                    }
                    _ => damping *= 10.0,
                }
            }
        }

        Err(PoseFailure::NotConverged {
            iterations: self.max_iterations,
        })
    }

    fn name(&self) -> &str {
        "IterativePnp"
    }
}

fn max_pairwise_distance(points: impl Iterator<Item = Vector3<f64>>) -> f64 {
    let collected: Vec<Vector3<f64>> = points.collect();
    let mut span: f64 = 0.0;
    for (i, a) in collected.iter().enumerate() {
        for b in &collected[i + 1..] {
            span = span.max((a - b).norm());
        }
    }
    span
}
