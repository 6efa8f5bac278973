//! `OpenCV`-backed PnP solver (`opencv` feature).

use super::solver::{CameraIntrinsics, PnpSolution, PnpSolver};
use crate::{error::PoseFailure, Result};
use nalgebra::{Point2, Point3, Vector3};
use opencv::{
    calib3d,
    core::{Mat, Point2d, Point3d, Vector, CV_64F},
    prelude::*,
};

/// Wraps `calib3d::solve_pnp` with `SOLVEPNP_ITERATIVE`
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvPnp;

impl OpenCvPnp {
    fn run(
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> Result<Option<(Vector3<f64>, Vector3<f64>)>> {
        let object_points: Vector<Point3d> = model.iter().map(|p| Point3d::new(p.x, p.y, p.z)).collect();
        let image_points: Vector<Point2d> = image.iter().map(|p| Point2d::new(p.x, p.y)).collect();

        let mut camera_matrix = Mat::zeros(3, 3, CV_64F)?.to_mat()?;
        for (row, values) in (0..).zip(camera.matrix().iter()) {
            for (col, &value) in (0..).zip(values.iter()) {
                *camera_matrix.at_2d_mut::<f64>(row, col)? = value;
            }
        }

        // Assume no lens distortion
        let dist_coeffs = Mat::zeros(4, 1, CV_64F)?.to_mat()?;

        let mut rvec = Mat::default();
        let mut tvec = Mat::default();
        let found = calib3d::solve_pnp(
            &object_points,
            &image_points,
            &camera_matrix,
            &dist_coeffs,
            &mut rvec,
            &mut tvec,
            false,
            calib3d::SOLVEPNP_ITERATIVE,
        )?;
        if !found {
            return Ok(None);
        }

        let rotation = Vector3::new(*rvec.at_2d::<f64>(0, 0)?, *rvec.at_2d::<f64>(1, 0)?, *rvec.at_2d::<f64>(2, 0)?);
        let translation = Vector3::new(*tvec.at_2d::<f64>(0, 0)?, *tvec.at_2d::<f64>(1, 0)?, *tvec.at_2d::<f64>(2, 0)?);
        Ok(Some((rotation, translation)))
    }
}

impl PnpSolver for OpenCvPnp {
    fn solve(
        &self,
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> std::result::Result<PnpSolution, PoseFailure> {
        match Self::run(model, image, camera) {
            Ok(Some((rotation_vector, translation))) => Ok(PnpSolution {
                rotation_vector,
                translation,
                iterations: 0,
                reprojection_rms: f64::NAN,
            }),
            Ok(None) => Err(PoseFailure::NotConverged { iterations: 0 }),
            Err(e) => Err(PoseFailure::Backend(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "OpenCvPnp"
    }
}
