//! Head pose attention scoring.
//!
//! Six face-mesh landmarks are matched against a generic 3D face model and a
//! perspective-n-point solve recovers the head rotation. The rotation is
//! decomposed into pitch/yaw/roll, pitch and yaw are folded back into
//! (-90°, 90°), and both are reported relative to a per-session baseline taken
//! from the first successful frame. The attention score follows the more
//! deviated of the two axes.

/// Rotation matrix decomposition
pub mod euler;

/// Levenberg-Marquardt PnP solver
pub mod iterative;

/// `OpenCV` PnP solver
#[cfg(feature = "opencv")]
pub mod opencv;

/// Solver trait, camera model and factory
pub mod solver;

use crate::{
    config::HeadPoseConfig,
    constants::{FACE_MODEL_POINTS, NEUTRAL_POSE_SCORE, POSE_LANDMARK_IDS},
    error::PoseFailure,
    landmarks::{FrameShape, Landmark},
    Result,
};
use euler::{rotation_matrix_to_euler, wrap_half_turn};
use nalgebra::{Point2, Point3, Rotation3};
use serde::{Deserialize, Serialize};
use solver::{create_solver, CameraIntrinsics, PnpSolver};

/// Baseline-relative head pose and its attention score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    /// Attention score in [0, 1]
    pub score: f64,
    /// Degrees, relative to the calibration baseline
    pub pitch: f64,
    /// Degrees, relative to the calibration baseline
    pub yaw: f64,
    /// Degrees, camera frame
    pub roll: f64,
}

impl PoseEstimate {
    /// Fallback reported when no pose could be recovered
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            score: NEUTRAL_POSE_SCORE,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
        }
    }
}

/// Outcome of one frame's pose solve
#[derive(Debug, Clone, PartialEq)]
pub enum PoseResult {
    Converged(PoseEstimate),
    Failed(PoseFailure),
}

impl PoseResult {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }

    /// The estimate, or [`PoseEstimate::neutral`] on failure
    #[must_use]
    pub fn estimate_or_neutral(&self) -> PoseEstimate {
        match self {
            Self::Converged(estimate) => *estimate,
            Self::Failed(_) => PoseEstimate::neutral(),
        }
    }
}

/// Raw pitch/yaw of the driver's neutral posture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    pub base_pitch: f64,
    pub base_yaw: f64,
}

/// Calibration lifecycle: entered once per session on the first converged pose
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Calibration {
    #[default]
    Uncalibrated,
    Calibrated(CalibrationBaseline),
}

/// Head pose agent for one tracked face
pub struct HeadPoseAgent {
    config: HeadPoseConfig,
    solver: Box<dyn PnpSolver>,
    model_points: Vec<Point3<f64>>,
    calibration: Calibration,
}

impl HeadPoseAgent {
    /// Create an agent using the solver named in the configuration
    ///
    /// # Errors
    ///
    /// Returns `SolverError` if the solver name is unknown
    pub fn new(config: HeadPoseConfig) -> Result<Self> {
        let solver = create_solver(&config.solver, config.max_iterations)?;
        Ok(Self::with_solver(config, solver))
    }

    /// Create an agent around an explicit solver
    #[must_use]
    pub fn with_solver(config: HeadPoseConfig, solver: Box<dyn PnpSolver>) -> Self {
        log::info!(
            "Initializing HeadPoseAgent with {} (pitch limit {}°, yaw limit {}°)",
            solver.name(),
            config.pitch_threshold,
            config.yaw_threshold
        );
        Self {
            config,
            solver,
            model_points: FACE_MODEL_POINTS.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
            calibration: Calibration::Uncalibrated,
        }
    }

    /// Estimate the pose for one frame, never failing; a failed solve is
    /// logged and reported as [`PoseEstimate::neutral`]
    pub fn update(&mut self, landmarks: &[Landmark], frame: FrameShape) -> PoseEstimate {
        match self.estimate(landmarks, frame) {
            PoseResult::Converged(estimate) => estimate,
            PoseResult::Failed(reason) => {
                log::warn!("Head pose unavailable: {reason}");
                PoseEstimate::neutral()
            }
        }
    }

    /// Estimate the pose for one frame, exposing why a solve failed
    pub fn estimate(&mut self, landmarks: &[Landmark], frame: FrameShape) -> PoseResult {
        match self.solve_raw(landmarks, frame) {
            Ok((pitch, yaw, roll)) => {
                let baseline = self.baseline_or_calibrate(pitch, yaw);
                PoseResult::Converged(self.score(pitch - baseline.base_pitch, yaw - baseline.base_yaw, roll))
            }
            Err(reason) => PoseResult::Failed(reason),
        }
    }

    #[must_use]
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    #[must_use]
    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        match self.calibration {
            Calibration::Calibrated(baseline) => Some(baseline),
            Calibration::Uncalibrated => None,
        }
    }

    /// Drop the baseline; the next converged pose becomes the new neutral
    pub fn reset_calibration(&mut self) {
        log::info!("Head pose calibration reset");
        self.calibration = Calibration::Uncalibrated;
    }

    #[must_use]
    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    #[must_use]
    pub fn config(&self) -> &HeadPoseConfig {
        &self.config
    }

    /// Camera-frame pitch/yaw (wrapped) and roll in degrees
    fn solve_raw(&self, landmarks: &[Landmark], frame: FrameShape) -> std::result::Result<(f64, f64, f64), PoseFailure> {
        if !frame.is_valid() {
            return Err(PoseFailure::InvalidFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let image_points = POSE_LANDMARK_IDS
            .iter()
            .map(|&index| {
                let landmark = landmarks.get(index).ok_or(PoseFailure::MissingLandmark {
                    index,
                    available: landmarks.len(),
                })?;
                let (x, y) = landmark.to_pixels(frame);
                if x.is_finite() && y.is_finite() {
                    Ok(Point2::new(x, y))
                } else {
                    Err(PoseFailure::NonFinite(format!("landmark {index}")))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let camera = CameraIntrinsics::from_frame(frame);
        let solution = self.solver.solve(&self.model_points, &image_points, &camera)?;

        let rotation = Rotation3::new(solution.rotation_vector);
        let angles = rotation_matrix_to_euler(rotation.matrix());
        if !angles.is_finite() {
            return Err(PoseFailure::NonFinite("euler angles".to_string()));
        }

        Ok((wrap_half_turn(angles.pitch), wrap_half_turn(angles.yaw), angles.roll))
    }

    fn baseline_or_calibrate(&mut self, pitch: f64, yaw: f64) -> CalibrationBaseline {
        match self.calibration {
            Calibration::Calibrated(baseline) => baseline,
            Calibration::Uncalibrated => {
                let baseline = CalibrationBaseline {
                    base_pitch: pitch,
                    base_yaw: yaw,
                };
                log::info!("Head pose calibrated: pitch {pitch:.2}°, yaw {yaw:.2}°");
                self.calibration = Calibration::Calibrated(baseline);
                baseline
            }
        }
    }

    fn score(&self, pitch: f64, yaw: f64, roll: f64) -> PoseEstimate {
        let pitch_score = 1.0 - (pitch.abs() / self.config.pitch_threshold).min(1.0);
        let yaw_score = 1.0 - (yaw.abs() / self.config.yaw_threshold).min(1.0);

        PoseEstimate {
            score: pitch_score.min(yaw_score).clamp(0.0, 1.0),
            pitch,
            yaw,
            roll,
        }
    }
}
