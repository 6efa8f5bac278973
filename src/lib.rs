//! Driver alertness library for real-time drowsiness classification.
//!
//! This library turns per-frame facial geometry into an alertness decision:
//! - Blink pattern tracking (PERCLOS, blink rate, blink duration) over a time window
//! - Head pose estimation using `PnP` (Perspective-n-Point) against a generic face model,
//!   self-calibrated to the driver's neutral posture
//! - Weighted fusion into a single score and a SAFE / WARNING / DROWSY state
//!
//! Landmark detection, eye-openness measurement and video I/O are left to the
//! caller; every agent is fed plain numbers once per frame.
//!
//! # Examples
//!
//! ## Blink Tracking
//!
//! ```
//! use driver_alertness::{blink::BlinkPatternAgent, config::BlinkConfig};
//!
//! let mut blink = BlinkPatternAgent::new(BlinkConfig::default());
//!
//! // First frame of a session is always fully alert
//! assert_eq!(blink.update(0.31, 0.0), 1.0);
//!
//! // Eye closes and reopens: one completed blink
//! blink.update(0.12, 0.10);
//! let score = blink.update(0.30, 0.35);
//! assert_eq!(blink.blink_count(), 1);
//! assert!(score < 1.0);
//! ```
//!
//! ## Fusion
//!
//! ```
//! use driver_alertness::fusion::{AlertnessState, FusionAgent};
//!
//! let fusion = FusionAgent::default();
//! let result = fusion.update(0.9, 0.8, 0.5);
//! println!("Alertness {:.2} -> {}", result.alertness_score, result.state);
//! assert_eq!(result.state, AlertnessState::Safe);
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```
//! use driver_alertness::{
//!     config::Config,
//!     landmarks::{FrameShape, Landmark},
//!     monitor::{DriverMonitor, FrameInput},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut monitor = DriverMonitor::from_config(&Config::default())?;
//!
//! // Landmarks would come from a face-mesh detector
//! let frame = FrameInput {
//!     timestamp: 0.0,
//!     eye_openness: 0.3,
//!     eye_score: 1.0,
//!     landmarks: vec![Landmark::new(0.5, 0.5); 468],
//!     frame: FrameShape::new(640.0, 480.0),
//! };
//!
//! let report = monitor.process_frame(&frame);
//! println!(
//!     "blink {:.2}, head {:.2}, alertness {:.2} ({})",
//!     report.blink_score, report.head.score, report.alertness_score, report.state
//! );
//! # Ok(())
//! # }
//! ```

/// Blink pattern tracking
pub mod blink;

/// Head pose estimation and attention scoring
pub mod head_pose;

/// Score fusion and alertness states
pub mod fusion;

/// Per-stream monitoring session
pub mod monitor;

/// Landmark and frame input types
pub mod landmarks;

/// Time-bounded sliding window
pub mod window;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, PoseFailure, Result};
