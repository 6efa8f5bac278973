//! Perspective-n-point solver seam.

use super::iterative::IterativePnp;
use crate::{constants::CAMERA_CENTER_FACTOR, error::PoseFailure, landmarks::FrameShape, Error, Result};
use nalgebra::{Point2, Point3, Vector3};

/// Solver names accepted by [`create_solver`]
#[cfg(not(feature = "opencv"))]
pub const SOLVER_NAMES: &[&str] = &["iterative", "lm"];

/// Solver names accepted by [`create_solver`]
#[cfg(feature = "opencv")]
pub const SOLVER_NAMES: &[&str] = &["iterative", "lm", "opencv"];

/// Approximate pinhole camera: focal length equal to the frame width,
/// principal point at the image center, no lens distortion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub focal_length: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CameraIntrinsics {
    #[must_use]
    pub fn from_frame(frame: FrameShape) -> Self {
        Self {
            focal_length: frame.width,
            cx: frame.width / CAMERA_CENTER_FACTOR,
            cy: frame.height / CAMERA_CENTER_FACTOR,
        }
    }

    /// Row-major camera matrix
    #[must_use]
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.focal_length, 0.0, self.cx],
            [0.0, self.focal_length, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Project a point given in camera coordinates, `None` if it is not in front of the camera
    #[must_use]
    pub fn project(&self, point: &Vector3<f64>) -> Option<Point2<f64>> {
        if point.z <= crate::constants::EPSILON {
            return None;
        }
        Some(Point2::new(
            self.focal_length * point.x / point.z + self.cx,
            self.focal_length * point.y / point.z + self.cy,
        ))
    }
}

/// Rigid transform from model to camera coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnpSolution {
    /// Axis-angle rotation (radians)
    pub rotation_vector: Vector3<f64>,
    pub translation: Vector3<f64>,
    /// Solver iterations used
    pub iterations: usize,
    /// Root mean square reprojection error in pixels
    pub reprojection_rms: f64,
}

/// Trait for all pose solvers
pub trait PnpSolver: Send + Sync {
    /// Recover the model pose from its 2D projections
    ///
    /// # Errors
    ///
    /// Returns a [`PoseFailure`] when no pose can be recovered
    fn solve(
        &self,
        model: &[Point3<f64>],
        image: &[Point2<f64>],
        camera: &CameraIntrinsics,
    ) -> std::result::Result<PnpSolution, PoseFailure>;

    /// Get solver name
    fn name(&self) -> &str;
}

/// Create a pose solver by name
///
/// # Errors
///
/// Returns `SolverError` for unknown names or a zero iteration cap
pub fn create_solver(name: &str, max_iterations: usize) -> Result<Box<dyn PnpSolver>> {
    if max_iterations == 0 {
        return Err(Error::SolverError("Iteration cap must be greater than 0".to_string()));
    }
    match name.to_lowercase().as_str() {
        "iterative" | "lm" => Ok(Box::new(IterativePnp::new(max_iterations))),
        #[cfg(feature = "opencv")]
        "opencv" => Ok(Box::new(super::opencv::OpenCvPnp)),
        _ => Err(Error::SolverError(format!("Unknown solver type: {name}"))),
    }
}
