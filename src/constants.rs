//! Constants used throughout the library

/// Number of points used by the pose solve
pub const NUM_POSE_POINTS: usize = 6;

/// Face-mesh indices of the pose points: nose tip, chin, left eye outer corner,
/// right eye outer corner, left mouth corner, right mouth corner
pub const POSE_LANDMARK_IDS: [usize; NUM_POSE_POINTS] = [1, 152, 33, 263, 61, 291];

/// Generic 3D face model matching [`POSE_LANDMARK_IDS`] (arbitrary units, nose at origin)
pub const FACE_MODEL_POINTS: [[f64; 3]; NUM_POSE_POINTS] = [
    [0.0, 0.0, 0.0],
    [0.0, -330.0, -65.0],
    [-225.0, 170.0, -135.0],
    [225.0, 170.0, -135.0],
    [-150.0, -150.0, -125.0],
    [150.0, -150.0, -125.0],
];

/// Camera matrix center factor
pub const CAMERA_CENTER_FACTOR: f64 = 2.0;

/// Below this `sqrt(r00² + r10²)` the Euler decomposition takes the singular branch
pub const GIMBAL_LOCK_EPSILON: f64 = 1e-6;

/// Default frames per second assumption
pub const DEFAULT_FPS: f64 = 30.0;

/// Blink defaults
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.20;
pub const DEFAULT_WINDOW_SECONDS: f64 = 60.0;
pub const DEFAULT_BLINK_RATE_CEILING: f64 = 30.0;
pub const DEFAULT_DURATION_CEILING: f64 = 1.5;
pub const DEFAULT_BLINK_RATE_WEIGHT: f64 = 0.4;
pub const DEFAULT_DURATION_WEIGHT: f64 = 0.3;
pub const DEFAULT_PERCLOS_WEIGHT: f64 = 0.3;

/// Head pose defaults (degrees)
pub const DEFAULT_PITCH_THRESHOLD: f64 = 30.0;
pub const DEFAULT_YAW_THRESHOLD: f64 = 40.0;

/// Score reported when the pose solve fails
pub const NEUTRAL_POSE_SCORE: f64 = 0.5;

/// Iterative solver defaults
pub const DEFAULT_SOLVER: &str = "iterative";
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Fusion defaults
pub const DEFAULT_EYE_WEIGHT: f64 = 0.4;
pub const DEFAULT_BLINK_WEIGHT: f64 = 0.35;
pub const DEFAULT_HEAD_WEIGHT: f64 = 0.25;
pub const DEFAULT_SAFE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.4;

/// Allowed deviation of the fusion weight sum from 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
