//! Error types for the driver alertness library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unknown or misconfigured pose solver
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Reason a single-frame pose solve did not produce an estimate.
///
/// These never escape [`HeadPoseAgent::update`](crate::head_pose::HeadPoseAgent::update);
/// they are only visible through [`PoseResult::Failed`](crate::head_pose::PoseResult::Failed).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseFailure {
    /// Landmark list does not contain a required index
    #[error("landmark {index} missing (got {available} landmarks)")]
    MissingLandmark { index: usize, available: usize },

    /// A coordinate or frame dimension is NaN or infinite
    #[error("non-finite input: {0}")]
    NonFinite(String),

    /// Frame dimensions are zero or negative
    #[error("invalid frame shape {width}x{height}")]
    InvalidFrame { width: f64, height: f64 },

    /// Image points coincide, no pose can be recovered
    #[error("degenerate landmark geometry: {0}")]
    Degenerate(String),

    /// Solver iterations exhausted without meeting the tolerance
    #[error("solver did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// Solution places the face behind the camera
    #[error("solution places model behind the camera")]
    BehindCamera,

    /// Backend-specific failure (e.g. `OpenCV` exception)
    #[error("solver backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
