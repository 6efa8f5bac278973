//! Configuration management for the alertness monitor

use crate::{
    constants::{
        DEFAULT_BLINK_RATE_CEILING, DEFAULT_BLINK_RATE_WEIGHT, DEFAULT_BLINK_WEIGHT, DEFAULT_DURATION_CEILING,
        DEFAULT_DURATION_WEIGHT, DEFAULT_EAR_THRESHOLD, DEFAULT_EYE_WEIGHT, DEFAULT_FPS, DEFAULT_HEAD_WEIGHT,
        DEFAULT_MAX_ITERATIONS, DEFAULT_PERCLOS_WEIGHT, DEFAULT_PITCH_THRESHOLD, DEFAULT_SAFE_THRESHOLD, DEFAULT_SOLVER,
        DEFAULT_WARNING_THRESHOLD, DEFAULT_WINDOW_SECONDS, DEFAULT_YAW_THRESHOLD, WEIGHT_SUM_TOLERANCE,
    },
    head_pose::solver::SOLVER_NAMES,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Monitor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blink pattern tracking
    pub blink: BlinkConfig,

    /// Head pose estimation
    pub head_pose: HeadPoseConfig,

    /// Score fusion
    pub fusion: FusionConfig,
}

/// Blink pattern tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Eye-openness below this value counts as closed
    pub ear_threshold: f64,

    /// History horizon in seconds
    pub window_seconds: f64,

    /// Expected frame rate, only used to pre-size the frame window
    pub fps: f64,

    /// Blinks per minute mapped to a fully fatigued rate
    pub blink_rate_ceiling: f64,

    /// Mean blink duration (seconds) mapped to fully fatigued
    pub duration_ceiling: f64,

    /// Fatigue weight of the normalized blink rate
    pub blink_rate_weight: f64,

    /// Fatigue weight of the normalized blink duration
    pub duration_weight: f64,

    /// Fatigue weight of PERCLOS
    pub perclos_weight: f64,
}

/// Head pose configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadPoseConfig {
    /// Pitch deviation (degrees) at which attention drops to zero
    pub pitch_threshold: f64,

    /// Yaw deviation (degrees) at which attention drops to zero
    pub yaw_threshold: f64,

    /// PnP backend name (see [`SOLVER_NAMES`])
    pub solver: String,

    /// Iteration cap for the iterative solver
    pub max_iterations: usize,
}

/// Fusion weights and state thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub w_eye: f64,
    pub w_blink: f64,
    pub w_head: f64,

    /// Lowest fused score classified SAFE
    pub safe_threshold: f64,

    /// Lowest fused score classified WARNING
    pub warning_threshold: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            fps: DEFAULT_FPS,
            blink_rate_ceiling: DEFAULT_BLINK_RATE_CEILING,
            duration_ceiling: DEFAULT_DURATION_CEILING,
            blink_rate_weight: DEFAULT_BLINK_RATE_WEIGHT,
            duration_weight: DEFAULT_DURATION_WEIGHT,
            perclos_weight: DEFAULT_PERCLOS_WEIGHT,
        }
    }
}

impl Default for HeadPoseConfig {
    fn default() -> Self {
        Self {
            pitch_threshold: DEFAULT_PITCH_THRESHOLD,
            yaw_threshold: DEFAULT_YAW_THRESHOLD,
            solver: DEFAULT_SOLVER.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            w_eye: DEFAULT_EYE_WEIGHT,
            w_blink: DEFAULT_BLINK_WEIGHT,
            w_head: DEFAULT_HEAD_WEIGHT,
            safe_threshold: DEFAULT_SAFE_THRESHOLD,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }
}

fn require_positive(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{what} must be a positive number, got {value}")))
    }
}

fn require_non_negative(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{what} must be non-negative, got {value}")))
    }
}

impl BlinkConfig {
    /// Validate blink parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for non-positive horizons, rates or ceilings and
    /// for negative weights
    pub fn validate(&self) -> Result<()> {
        require_positive(self.ear_threshold, "EAR threshold")?;
        require_positive(self.window_seconds, "Window length")?;
        require_positive(self.fps, "Frame rate")?;
        require_positive(self.blink_rate_ceiling, "Blink rate ceiling")?;
        require_positive(self.duration_ceiling, "Blink duration ceiling")?;
        require_non_negative(self.blink_rate_weight, "Blink rate weight")?;
        require_non_negative(self.duration_weight, "Blink duration weight")?;
        require_non_negative(self.perclos_weight, "PERCLOS weight")?;
        Ok(())
    }
}

impl HeadPoseConfig {
    /// Validate head pose parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for non-positive thresholds, a zero iteration
    /// cap or an unknown solver name
    pub fn validate(&self) -> Result<()> {
        require_positive(self.pitch_threshold, "Pitch threshold")?;
        require_positive(self.yaw_threshold, "Yaw threshold")?;
        if self.max_iterations == 0 {
            return Err(Error::ConfigError("Solver iteration cap must be greater than 0".to_string()));
        }
        if !SOLVER_NAMES.contains(&self.solver.to_lowercase().as_str()) {
            return Err(Error::ConfigError(format!(
                "Unknown solver '{}', expected one of {:?}",
                self.solver, SOLVER_NAMES
            )));
        }
        Ok(())
    }
}

impl FusionConfig {
    /// Validate fusion weights and thresholds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a weight is negative, the weights do not sum
    /// to 1, a threshold lies outside [0, 1] or the bands overlap
    pub fn validate(&self) -> Result<()> {
        require_non_negative(self.w_eye, "Eye weight")?;
        require_non_negative(self.w_blink, "Blink weight")?;
        require_non_negative(self.w_head, "Head weight")?;

        let sum = self.w_eye + self.w_blink + self.w_head;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::ConfigError(format!("Fusion weights must sum to 1.0, got {sum}")));
        }

        for (value, what) in [
            (self.safe_threshold, "Safe threshold"),
            (self.warning_threshold, "Warning threshold"),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!("{what} must be between 0.0 and 1.0")));
            }
        }
        if self.warning_threshold > self.safe_threshold {
            return Err(Error::ConfigError(
                "Warning threshold must not exceed safe threshold".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found
    pub fn validate(&self) -> Result<()> {
        self.blink.validate()?;
        self.head_pose.validate()?;
        self.fusion.validate()?;
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Driver Alertness Configuration

# Blink pattern tracking
blink:
  ear_threshold: 0.2
  window_seconds: 60.0
  fps: 30.0
  blink_rate_ceiling: 30.0
  duration_ceiling: 1.5
  blink_rate_weight: 0.4
  duration_weight: 0.3
  perclos_weight: 0.3

# Head pose estimation
head_pose:
  pitch_threshold: 30.0
  yaw_threshold: 40.0
  solver: "iterative"
  max_iterations: 100

# Score fusion
fusion:
  w_eye: 0.4
  w_blink: 0.35
  w_head: 0.25
  safe_threshold: 0.7
  warning_threshold: 0.4
"#;
