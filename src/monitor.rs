//! One monitoring session: the three agents driven frame by frame.

use crate::{
    blink::BlinkPatternAgent,
    config::Config,
    fusion::{AlertnessState, FusionAgent},
    head_pose::{HeadPoseAgent, PoseEstimate},
    landmarks::{FrameShape, Landmark},
    Result,
};
use serde::{Deserialize, Serialize};

/// Everything the perception collaborators deliver for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Wall-clock seconds, non-decreasing across frames
    pub timestamp: f64,
    /// Eye-aspect-ratio-like openness value
    pub eye_openness: f64,
    /// Eye-state alertness score in [0, 1]
    pub eye_score: f64,
    /// Face-mesh landmarks in normalized coordinates
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub frame: FrameShape,
}

/// Per-frame output for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp: f64,
    pub blink_score: f64,
    pub head: PoseEstimate,
    pub alertness_score: f64,
    pub state: AlertnessState,
}

/// Agents for one camera stream and one tracked face
pub struct DriverMonitor {
    blink: BlinkPatternAgent,
    head_pose: HeadPoseAgent,
    fusion: FusionAgent,
    frames_processed: u64,
}

impl DriverMonitor {
    #[must_use]
    pub fn new(blink: BlinkPatternAgent, head_pose: HeadPoseAgent, fusion: FusionAgent) -> Self {
        Self {
            blink,
            head_pose,
            fusion,
            frames_processed: 0,
        }
    }

    /// Build all agents from configuration
    ///
    /// # Errors
    ///
    /// Returns `SolverError` if the configured solver is unknown
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BlinkPatternAgent::new(config.blink.clone()),
            HeadPoseAgent::new(config.head_pose.clone())?,
            FusionAgent::new(config.fusion.clone()),
        ))
    }

    /// Run one frame through blink tracking, head pose and fusion
    pub fn process_frame(&mut self, input: &FrameInput) -> FrameReport {
        let blink_score = self.blink.update(input.eye_openness, input.timestamp);
        let head = self.head_pose.update(&input.landmarks, input.frame);
        let fused = self.fusion.update(input.eye_score, blink_score, head.score);

        self.frames_processed += 1;
        log::debug!(
            "frame {} t={:.3}: blink {:.3}, head {:.3} (pitch {:.1}, yaw {:.1}), alertness {:.3} {}",
            self.frames_processed,
            input.timestamp,
            blink_score,
            head.score,
            head.pitch,
            head.yaw,
            fused.alertness_score,
            fused.state
        );

        FrameReport {
            timestamp: input.timestamp,
            blink_score,
            head,
            alertness_score: fused.alertness_score,
            state: fused.state,
        }
    }

    /// Start a new session for the same stream: clear blink history and calibration
    pub fn reset_session(&mut self) {
        log::info!("Resetting monitoring session after {} frames", self.frames_processed);
        self.blink.reset();
        self.head_pose.reset_calibration();
        self.frames_processed = 0;
    }

    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    #[must_use]
    pub fn blink_agent(&self) -> &BlinkPatternAgent {
        &self.blink
    }

    #[must_use]
    pub fn head_pose_agent(&self) -> &HeadPoseAgent {
        &self.head_pose
    }

    #[must_use]
    pub fn fusion_agent(&self) -> &FusionAgent {
        &self.fusion
    }
}
