//! Head pose agent against synthetic faces and scripted solvers


use driver_alertness::{
    config::HeadPoseConfig,
    head_pose::{
        solver::{CameraIntrinsics, PnpSolution, PnpSolver},
        Calibration, HeadPoseAgent, PoseEstimate, PoseResult,
    },
    landmarks::Landmark,
    PoseFailure,
};
use nalgebra::{Point2, Point3, Rotation3, UnitQuaternion, Vector3};
use std::{collections::VecDeque, f64::consts::PI, sync::Mutex};
use test_helpers::{synthetic_landmarks, synthetic_landmarks_at, TEST_FRAME};

/// Solver replaying a fixed sequence of outcomes
struct ScriptedSolver {
    outcomes: Mutex<VecDeque<Result<PnpSolution, PoseFailure>>>,
}

impl ScriptedSolver {
    fn new(outcomes: Vec<Result<PnpSolution, PoseFailure>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

impl PnpSolver for ScriptedSolver {
    fn solve(
        &self,
        _model: &[Point3<f64>],
        _image: &[Point2<f64>],
        _camera: &CameraIntrinsics,
    ) -> Result<PnpSolution, PoseFailure> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(PoseFailure::NotConverged { iterations: 0 }))
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

/// Solution for a face at pitch/yaw degrees, built like the synthetic landmarks.
///
/// These rotations are half turns, so the axis is taken from the quaternion.
fn solution(pitch_deg: f64, yaw_deg: f64) -> Result<PnpSolution, PoseFailure> {
    let rotation = Rotation3::from_euler_angles(PI, 0.0, 0.0)
        * Rotation3::from_euler_angles(pitch_deg.to_radians(), yaw_deg.to_radians(), 0.0);
    Ok(PnpSolution {
        rotation_vector: UnitQuaternion::from_rotation_matrix(&rotation).scaled_axis(),
        translation: Vector3::new(0.0, 0.0, 1500.0),
        iterations: 5,
        reprojection_rms: 0.0,
    })
}

fn scripted_agent(outcomes: Vec<Result<PnpSolution, PoseFailure>>) -> HeadPoseAgent {
    HeadPoseAgent::with_solver(HeadPoseConfig::default(), Box::new(ScriptedSolver::new(outcomes)))
}

fn any_face() -> Vec<Landmark> {
    synthetic_landmarks(0.0, 0.0)
}

#[test]
fn test_neutral_posture_scores_full_attention() {
    let mut agent = HeadPoseAgent::new(HeadPoseConfig::default()).unwrap();
    let landmarks = synthetic_landmarks(7.0, -12.0);

    for _ in 0..5 {
        let estimate = agent.update(&landmarks, TEST_FRAME);
        assert_eq!(estimate.score, 1.0);
        assert_eq!(estimate.pitch, 0.0);
        assert_eq!(estimate.yaw, 0.0);
    }
}

#[test]
fn test_off_center_head_is_relative_to_baseline() {
    let mut agent = HeadPoseAgent::new(HeadPoseConfig::default()).unwrap();
    let position = Vector3::new(120.0, -60.0, 1800.0);

    agent.update(&synthetic_landmarks_at(3.0, 5.0, position), TEST_FRAME);
    let turned = agent.update(&synthetic_landmarks_at(3.0, 25.0, position), TEST_FRAME);

    assert!((turned.yaw.abs() - 20.0).abs() < 1e-2, "yaw {}", turned.yaw);
    assert!(turned.pitch.abs() < 1e-2, "pitch {}", turned.pitch);
    assert!((turned.score - 0.5).abs() < 1e-3);
}

#[test]
fn test_failed_frames_do_not_calibrate() {
    let mut agent = scripted_agent(vec![
        Err(PoseFailure::NotConverged { iterations: 100 }),
        Err(PoseFailure::Degenerate("collinear".to_string())),
        solution(10.0, 0.0),
        solution(10.0, 20.0),
    ]);

    assert_eq!(agent.update(&any_face(), TEST_FRAME), PoseEstimate::neutral());
    assert_eq!(agent.calibration(), Calibration::Uncalibrated);
    assert!(!agent.estimate(&any_face(), TEST_FRAME).is_converged());
    assert_eq!(agent.calibration(), Calibration::Uncalibrated);

    let first = agent.update(&any_face(), TEST_FRAME);
    assert_eq!(first.score, 1.0);
    let baseline = agent.baseline().unwrap();
    assert!((baseline.base_pitch.abs() - 10.0).abs() < 1e-9);

    let second = agent.update(&any_face(), TEST_FRAME);
    assert!((second.yaw.abs() - 20.0).abs() < 1e-9);
    assert!((second.score - 0.5).abs() < 1e-9);
}

#[test]
fn test_failure_reason_is_exposed() {
    let mut agent = scripted_agent(vec![Err(PoseFailure::BehindCamera)]);
    match agent.estimate(&any_face(), TEST_FRAME) {
        PoseResult::Failed(reason) => assert_eq!(reason, PoseFailure::BehindCamera),
        PoseResult::Converged(estimate) => panic!("expected failure, got {estimate:?}"),
    }
}

#[test]
fn test_lost_face_between_good_frames_keeps_baseline() {
    let mut agent = HeadPoseAgent::new(HeadPoseConfig::default()).unwrap();
    agent.update(&synthetic_landmarks(0.0, 0.0), TEST_FRAME);
    let baseline = agent.baseline();

    // detector lost the face: no landmarks at all, then a collapsed mesh
    assert_eq!(agent.update(&[], TEST_FRAME), PoseEstimate::neutral());
    let collapsed = vec![Landmark::new(0.5, 0.5); 468];
    assert_eq!(agent.update(&collapsed, TEST_FRAME), PoseEstimate::neutral());
    assert_eq!(agent.baseline(), baseline);

    let looking_away = agent.update(&synthetic_landmarks(0.0, 40.0), TEST_FRAME);
    assert!(looking_away.score < 1e-3);
}

#[test]
fn test_missing_landmark_reports_index() {
    let mut agent = HeadPoseAgent::new(HeadPoseConfig::default()).unwrap();
    let mut landmarks = synthetic_landmarks(0.0, 0.0);
    landmarks.truncate(200);

    assert_eq!(
        agent.estimate(&landmarks, TEST_FRAME),
        PoseResult::Failed(PoseFailure::MissingLandmark {
            index: 263,
            available: 200
        })
    );
}

#[test]
fn test_recalibration_after_reset() {
    let mut agent = scripted_agent(vec![solution(0.0, 0.0), solution(0.0, 30.0), solution(0.0, 30.0)]);

    agent.update(&any_face(), TEST_FRAME);
    let away = agent.update(&any_face(), TEST_FRAME);
    assert!(away.score < 0.5);

    agent.reset_calibration();
    let after_reset = agent.update(&any_face(), TEST_FRAME);
    assert_eq!(after_reset.score, 1.0);
}

#[test]
fn test_custom_thresholds() {
    let config = HeadPoseConfig {
        pitch_threshold: 10.0,
        yaw_threshold: 80.0,
        ..HeadPoseConfig::default()
    };
    let mut agent = HeadPoseAgent::with_solver(
        config,
        Box::new(ScriptedSolver::new(vec![solution(0.0, 0.0), solution(0.0, 40.0), solution(5.0, 0.0)])),
    );

    agent.update(&any_face(), TEST_FRAME);
    assert!((agent.update(&any_face(), TEST_FRAME).score - 0.5).abs() < 1e-9);
    assert!((agent.update(&any_face(), TEST_FRAME).score - 0.5).abs() < 1e-9);
}

#[test]
fn test_solver_selection_from_config() {
    for name in ["iterative", "LM"] {
        let config = HeadPoseConfig {
            solver: name.to_string(),
            ..HeadPoseConfig::default()
        };
        let agent = HeadPoseAgent::new(config).unwrap();
        assert_eq!(agent.solver_name(), "IterativePnp");
    }

    let unknown = HeadPoseConfig {
        solver: "ransac".to_string(),
        ..HeadPoseConfig::default()
    };
    assert!(HeadPoseAgent::new(unknown).is_err());

    assert_eq!(scripted_agent(Vec::new()).solver_name(), "Scripted");
}
