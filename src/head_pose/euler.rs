//! Rotation matrix to pitch/yaw/roll.

use crate::constants::GIMBAL_LOCK_EPSILON;
use nalgebra::Matrix3;

/// Euler angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl EulerAngles {
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// Convert rotation matrix to Euler angles (degrees).
///
/// Decomposes `R = Rz(roll) * Ry(yaw) * Rx(pitch)`. When
/// `sqrt(r00² + r10²)` collapses the yaw is ±90° and roll is pinned to 0.
#[must_use]
pub fn rotation_matrix_to_euler(rotation: &Matrix3<f64>) -> EulerAngles {
    let sy = (rotation[(0, 0)].powi(2) + rotation[(1, 0)].powi(2)).sqrt();

    let (pitch, yaw, roll) = if sy < GIMBAL_LOCK_EPSILON {
        (
            (-rotation[(1, 2)]).atan2(rotation[(1, 1)]),
            (-rotation[(2, 0)]).atan2(sy),
            0.0,
        )
    } else {
        (
            rotation[(2, 1)].atan2(rotation[(2, 2)]),
            (-rotation[(2, 0)]).atan2(sy),
            rotation[(1, 0)].atan2(rotation[(0, 0)]),
        )
    };

    EulerAngles {
        pitch: pitch.to_degrees(),
        yaw: yaw.to_degrees(),
        roll: roll.to_degrees(),
    }
}

/// Fold an angle reported as its supplement back into (-90°, 90°)
#[must_use]
pub fn wrap_half_turn(angle: f64) -> f64 {
    if angle < -90.0 {
        angle + 180.0
    } else if angle > 90.0 {
        angle - 180.0
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    #[test]
    fn test_euler_angle_conversion() {
        let angles = rotation_matrix_to_euler(&Matrix3::identity());
        assert!(angles.pitch.abs() < 1e-9);
        assert!(angles.yaw.abs() < 1e-9);
        assert!(angles.roll.abs() < 1e-9);
    }

    #[test]
    fn test_recovers_composed_rotation() {
        let (pitch, yaw, roll) = (10.0_f64, -20.0_f64, 5.0_f64);
        // from_euler_angles(a, b, c) builds Rz(c) * Ry(b) * Rx(a)
        let rotation = Rotation3::from_euler_angles(pitch.to_radians(), yaw.to_radians(), roll.to_radians());
        let angles = rotation_matrix_to_euler(rotation.matrix());

        assert!((angles.pitch - pitch).abs() < 1e-9);
        assert!((angles.yaw - yaw).abs() < 1e-9);
        assert!((angles.roll - roll).abs() < 1e-9);
    }

    #[test]
    fn test_singular_branch() {
        // yaw of exactly 90 degrees: r00 = r10 = 0
        let rotation = Rotation3::from_euler_angles(0.3, std::f64::consts::FRAC_PI_2, 0.0);
        let angles = rotation_matrix_to_euler(rotation.matrix());

        assert!(angles.is_finite());
        assert_eq!(angles.roll, 0.0);
        assert!((angles.yaw - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_half_turn_about_x_reads_as_flipped_pitch() {
        let rotation = Rotation3::from_euler_angles(std::f64::consts::PI - 0.1, 0.0, 0.0);
        let angles = rotation_matrix_to_euler(rotation.matrix());
        assert!(angles.pitch > 90.0);
        assert!((wrap_half_turn(angles.pitch) - (-0.1_f64).to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_half_turn() {
        assert_eq!(wrap_half_turn(45.0), 45.0);
        assert_eq!(wrap_half_turn(-90.0), -90.0);
        assert_eq!(wrap_half_turn(170.0), -10.0);
        assert_eq!(wrap_half_turn(-175.0), 5.0);
    }
}
