//! End-to-end monitoring sessions over synthetic perception output


use driver_alertness::{
    config::Config,
    fusion::AlertnessState,
    monitor::{DriverMonitor, FrameInput, FrameReport},
};
use test_helpers::{frame, synthetic_landmarks, timeline, EYE_CLOSED, EYE_OPEN};

fn monitor() -> DriverMonitor {
    DriverMonitor::from_config(&Config::default()).unwrap()
}

fn run(monitor: &mut DriverMonitor, frames: &[FrameInput]) -> Vec<FrameReport> {
    frames.iter().map(|f| monitor.process_frame(f)).collect()
}

#[test]
fn test_alert_driver_stays_safe() {
    let face = synthetic_landmarks(2.0, -3.0);
    let frames: Vec<_> = timeline(0.0, 10.0, 30.0)
        .map(|t| {
            // short blink every 4 seconds
            let eye = if (t % 4.0) > 3.85 { EYE_CLOSED } else { EYE_OPEN };
            frame(t, eye, 0.95, face.clone())
        })
        .collect();

    let mut monitor = monitor();
    let reports = run(&mut monitor, &frames);

    assert_eq!(reports.len(), frames.len());
    assert!(reports.iter().all(|r| r.state == AlertnessState::Safe));
    assert!(monitor.blink_agent().blink_count() >= 2);
    assert_eq!(monitor.frames_processed(), frames.len() as u64);
}

#[test]
fn test_distracted_driver_warns() {
    let mut monitor = monitor();
    monitor.process_frame(&frame(0.0, EYE_OPEN, 0.5, synthetic_landmarks(0.0, 0.0)));

    let looking_aside = synthetic_landmarks(0.0, 20.0);
    let reports: Vec<_> = timeline(0.1, 3.0, 10.0)
        .map(|t| monitor.process_frame(&frame(t, EYE_OPEN, 0.5, looking_aside.clone())))
        .collect();

    for report in &reports {
        assert!((report.head.score - 0.5).abs() < 1e-3);
        // 0.4 * 0.5 + 0.35 * 1.0 + 0.25 * 0.5
        assert!((report.alertness_score - 0.675).abs() < 1e-3);
        assert_eq!(report.state, AlertnessState::Warning);
    }
}

#[test]
fn test_drowsy_driver_detected() {
    let mut monitor = monitor();
    let first = monitor.process_frame(&frame(0.0, EYE_OPEN, 0.0, synthetic_landmarks(0.0, 0.0)));
    // blink and head start fully alert, eyes do not
    assert!((first.alertness_score - 0.6).abs() < 1e-9);
    assert_eq!(first.state, AlertnessState::Warning);

    let nodded_off = synthetic_landmarks(0.0, 45.0);
    let reports: Vec<_> = timeline(1.0 / 30.0, 5.0, 30.0)
        .map(|t| monitor.process_frame(&frame(t, EYE_CLOSED, 0.0, nodded_off.clone())))
        .collect();

    assert!(reports.iter().all(|r| r.state == AlertnessState::Drowsy));
    let last = reports.last().unwrap();
    assert_eq!(last.head.score, 0.0);
    // no completed blinks: only PERCLOS feeds fatigue
    let perclos = monitor.blink_agent().metrics().perclos;
    assert!(perclos > 0.9);
    assert!((last.blink_score - (1.0 - 0.3 * perclos)).abs() < 1e-9);
}

#[test]
fn test_missing_face_frames_fall_back_to_neutral_head() {
    let mut monitor = monitor();
    monitor.process_frame(&frame(0.0, EYE_OPEN, 1.0, synthetic_landmarks(0.0, 0.0)));

    let report = monitor.process_frame(&frame(0.1, EYE_OPEN, 1.0, Vec::new()));
    assert_eq!(report.head.score, 0.5);
    // 0.4 + 0.35 + 0.25 * 0.5
    assert!((report.alertness_score - 0.875).abs() < 1e-9);
    assert!(monitor.head_pose_agent().baseline().is_some());
}

#[test]
fn test_new_session_recalibrates() {
    let mut monitor = monitor();
    monitor.process_frame(&frame(0.0, EYE_OPEN, 1.0, synthetic_landmarks(0.0, 0.0)));
    let aside = monitor.process_frame(&frame(0.1, EYE_OPEN, 1.0, synthetic_landmarks(0.0, 30.0)));
    assert!(aside.head.score < 0.5);

    monitor.reset_session();
    let report = monitor.process_frame(&frame(100.0, EYE_CLOSED, 1.0, synthetic_landmarks(0.0, 30.0)));
    assert_eq!(report.blink_score, 1.0);
    assert_eq!(report.head.score, 1.0);
    assert_eq!(report.state, AlertnessState::Safe);
}

#[test]
fn test_reports_replay_as_json_lines() {
    let mut monitor = monitor();
    let input = frame(0.0, EYE_OPEN, 1.0, synthetic_landmarks(0.0, 0.0));
    let line = serde_json::to_string(&input).unwrap();

    let parsed: FrameInput = serde_json::from_str(&line).unwrap();
    let report = monitor.process_frame(&parsed);
    let output = serde_json::to_value(report).unwrap();

    assert_eq!(output["state"], "SAFE");
    assert_eq!(output["blink_score"], 1.0);
    assert_eq!(output["head"]["score"], 1.0);
}
