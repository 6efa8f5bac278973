//! Blink pattern tracking.
//!
//! Turns per-frame eye-openness readings into a fatigue-derived alertness
//! score from three windowed signals:
//! - PERCLOS, the fraction of frames with the eye closed
//! - blink rate, completed blinks per minute
//! - mean blink duration
//!
//! A blink is only counted once the eye reopens. Both histories are bounded by
//! the configured window and evicted by wall-clock time, so dropped frames do
//! not distort the horizon.

use crate::{
    config::BlinkConfig,
    window::{SlidingWindow, Timestamped},
};
use serde::Serialize;

/// Eye state for one processed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub timestamp: f64,
    pub is_eye_closed: bool,
}

impl Timestamped for FrameSample {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }

    fn restamp(&mut self, timestamp: f64) {
        self.timestamp = timestamp;
    }
}

/// A completed blink
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkEvent {
    /// Time the eye reopened
    pub ended_at: f64,
    /// Seconds the eye stayed closed
    pub duration: f64,
}

impl Timestamped for BlinkEvent {
    fn timestamp(&self) -> f64 {
        self.ended_at
    }

    fn restamp(&mut self, timestamp: f64) {
        self.ended_at = timestamp;
    }
}

/// Windowed blink statistics behind the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlinkMetrics {
    pub perclos: f64,
    /// Blinks per minute
    pub blink_rate: f64,
    /// Mean blink duration in seconds
    pub avg_duration: f64,
    pub fatigue: f64,
    /// `1 - fatigue`, clipped to [0, 1]
    pub score: f64,
}

impl BlinkMetrics {
    /// Metrics of an empty history: nothing observed, fully alert
    #[must_use]
    pub const fn alert() -> Self {
        Self {
            perclos: 0.0,
            blink_rate: 0.0,
            avg_duration: 0.0,
            fatigue: 0.0,
            score: 1.0,
        }
    }
}

/// Blink pattern agent for one tracked face
pub struct BlinkPatternAgent {
    config: BlinkConfig,
    eye_closed: bool,
    closed_since: f64,
    last_timestamp: Option<f64>,
    frames: SlidingWindow<FrameSample>,
    blinks: SlidingWindow<BlinkEvent>,
}

impl BlinkPatternAgent {
    /// Create an agent with an empty history
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // capacity hint only
    pub fn new(config: BlinkConfig) -> Self {
        let expected_frames = (config.window_seconds * config.fps).max(0.0).ceil() as usize;
        log::info!(
            "Initializing BlinkPatternAgent: threshold={}, window={}s, ~{} frames",
            config.ear_threshold,
            config.window_seconds,
            expected_frames
        );
        Self {
            frames: SlidingWindow::with_capacity(config.window_seconds, expected_frames),
            blinks: SlidingWindow::new(config.window_seconds),
            eye_closed: false,
            closed_since: 0.0,
            last_timestamp: None,
            config,
        }
    }

    /// Record one frame and return the current alertness score in [0, 1].
    ///
    /// The very first frame of a session only seeds the history and yields 1.0.
    /// `eye_openness` is only compared against the threshold, so NaN counts as
    /// open. `now` must not go backwards; earlier or non-finite times are
    /// clamped to the last one seen.
    pub fn update(&mut self, eye_openness: f64, now: f64) -> f64 {
        let now = self.sanitize_time(now);
        let cold_start = self.frames.is_empty();
        let closed = eye_openness < self.config.ear_threshold;

        if closed && !self.eye_closed {
            self.eye_closed = true;
            self.closed_since = now;
            log::debug!("Eye closed at {now:.3}");
        } else if !closed && self.eye_closed {
            self.eye_closed = false;
            let duration = (now - self.closed_since).max(0.0);
            self.blinks.push(BlinkEvent { ended_at: now, duration });
            log::debug!("Blink completed at {now:.3}, duration {duration:.3}s");
        }

        self.frames.push(FrameSample {
            timestamp: now,
            is_eye_closed: closed,
        });

        self.frames.evict(now);
        self.blinks.evict(now);

        if cold_start {
            return 1.0;
        }
        self.metrics().score
    }

    /// Statistics over the current window
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // window counts are small
    pub fn metrics(&self) -> BlinkMetrics {
        if self.frames.is_empty() {
            return BlinkMetrics::alert();
        }

        let closed = self.frames.iter().filter(|s| s.is_eye_closed).count();
        let perclos = closed as f64 / self.frames.len() as f64;

        let blink_count = self.blinks.len() as f64;
        let blink_rate = blink_count / (self.config.window_seconds / 60.0);

        let avg_duration = if self.blinks.is_empty() {
            0.0
        } else {
            self.blinks.iter().map(|b| b.duration).sum::<f64>() / blink_count
        };

        let blink_rate_norm = (blink_rate / self.config.blink_rate_ceiling).min(1.0);
        let duration_norm = (avg_duration / self.config.duration_ceiling).min(1.0);

        let fatigue = self.config.blink_rate_weight * blink_rate_norm
            + self.config.duration_weight * duration_norm
            + self.config.perclos_weight * perclos;

        BlinkMetrics {
            perclos,
            blink_rate,
            avg_duration,
            fatigue,
            score: (1.0 - fatigue).clamp(0.0, 1.0),
        }
    }

    /// Completed blinks inside the window
    #[must_use]
    pub fn blink_count(&self) -> usize {
        self.blinks.len()
    }

    /// Frame samples inside the window
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether a blink is in progress
    #[must_use]
    pub fn is_eye_closed(&self) -> bool {
        self.eye_closed
    }

    /// History covers at least half of the window
    #[must_use]
    pub fn is_warmed_up(&self) -> bool {
        self.frames.len() >= 2 && self.frames.span() >= self.config.window_seconds * 0.5
    }

    #[must_use]
    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// Forget all history, the next update is a cold start
    pub fn reset(&mut self) {
        self.frames.clear();
        self.blinks.clear();
        self.eye_closed = false;
        self.closed_since = 0.0;
        self.last_timestamp = None;
    }

    fn sanitize_time(&mut self, now: f64) -> f64 {
        let sanitized = match self.last_timestamp {
            Some(last) if !now.is_finite() => {
                log::warn!("Non-finite timestamp {now}, reusing {last:.3}");
                last
            }
            Some(last) if now < last => {
                log::warn!("Timestamp went backwards ({now:.3} < {last:.3}), clamping");
                last
            }
            None if !now.is_finite() => {
                log::warn!("Non-finite timestamp {now} on first frame, using 0.0");
                0.0
            }
            _ => now,
        };
        self.last_timestamp = Some(sanitized);
        sanitized
    }
}

impl Default for BlinkPatternAgent {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}
