//! Weighted fusion of eye, blink and head scores into one alertness decision.

use crate::config::FusionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete alertness state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertnessState {
    Safe,
    Warning,
    Drowsy,
}

impl AlertnessState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Warning => "WARNING",
            Self::Drowsy => "DROWSY",
        }
    }
}

impl fmt::Display for AlertnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fused score and its state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub alertness_score: f64,
    pub state: AlertnessState,
}

/// Stateless weighted combiner
#[derive(Debug, Clone)]
pub struct FusionAgent {
    config: FusionConfig,
}

impl FusionAgent {
    /// Weights are taken as given; see [`FusionConfig::validate`]
    #[must_use]
    pub fn new(config: FusionConfig) -> Self {
        log::info!(
            "Initializing FusionAgent: weights eye={} blink={} head={}, bands safe>={} warning>={}",
            config.w_eye,
            config.w_blink,
            config.w_head,
            config.safe_threshold,
            config.warning_threshold
        );
        Self { config }
    }

    /// Fuse one frame's scores.
    ///
    /// Inputs are clamped to [0, 1] and NaN counts as 0 (least alert).
    #[must_use]
    pub fn update(&self, eye_score: f64, blink_score: f64, head_score: f64) -> FusionResult {
        let alertness_score = (self.config.w_eye * clamp_score(eye_score)
            + self.config.w_blink * clamp_score(blink_score)
            + self.config.w_head * clamp_score(head_score))
        .clamp(0.0, 1.0);

        FusionResult {
            alertness_score,
            state: self.classify(alertness_score),
        }
    }

    /// Map a fused score onto its band; lower bounds are inclusive
    #[must_use]
    pub fn classify(&self, alertness_score: f64) -> AlertnessState {
        if alertness_score >= self.config.safe_threshold {
            AlertnessState::Safe
        } else if alertness_score >= self.config.warning_threshold {
            AlertnessState::Warning
        } else {
            AlertnessState::Drowsy
        }
    }

    #[must_use]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }
}

impl Default for FusionAgent {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
