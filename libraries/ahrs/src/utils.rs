use core::f64::consts::PI;
use nalgebra as na;

/// Standard gravity in m/s^2
pub const GRAVITY: f64 = 9.81;

/// Convert radians to degrees
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Rotation matrix for Euler angles (roll, pitch, yaw) in radians
///
/// Composed as Rz(yaw) * Ry(pitch) * Rx(roll), mapping body vectors into the
/// world frame.
pub fn rotation_matrix(euler: &na::Vector3<f64>) -> na::Matrix3<f64> {
    na::Rotation3::from_euler_angles(euler.x, euler.y, euler.z).into_inner()
}

/// Transform a world frame vector into the body frame
pub fn world_to_body(vec: &na::Vector3<f64>, euler: &na::Vector3<f64>) -> na::Vector3<f64> {
    rotation_matrix(euler).transpose() * vec
}

/// Roll and pitch implied by an accelerometer vector
///
/// Returns (roll, pitch) in radians. With gravity along -z a level airframe
/// yields a roll of ±π.
pub fn tilt_from_accel(accel: &na::Vector3<f64>) -> (f64, f64) {
    let pitch = (-accel.x).atan2((accel.y * accel.y + accel.z * accel.z).sqrt());
    let roll = accel.y.atan2(accel.z);
    (roll, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[rustfmt::skip]
    fn test_rotation_matches_explicit_product() {
        let (roll, pitch, yaw) = (0.3_f64, -0.2_f64, 0.5_f64);
        let rx = na::Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, roll.cos(), -roll.sin(),
            0.0, roll.sin(), roll.cos(),
        );
        let ry = na::Matrix3::new(
            pitch.cos(), 0.0, pitch.sin(),
            0.0, 1.0, 0.0,
            -pitch.sin(), 0.0, pitch.cos(),
        );
        let rz = na::Matrix3::new(
            yaw.cos(), -yaw.sin(), 0.0,
            yaw.sin(), yaw.cos(), 0.0,
            0.0, 0.0, 1.0,
        );
        let expected = rz * ry * rx;
        let actual = rotation_matrix(&na::Vector3::new(roll, pitch, yaw));
        assert!((expected - actual).norm() < 1e-12);
    }

    #[test]
    fn test_world_to_body_keeps_length() {
        let euler = na::Vector3::new(0.1, 0.2, -0.7);
        let v = na::Vector3::new(1.0, -2.0, 3.0);
        let body = world_to_body(&v, &euler);
        assert!((body.norm() - v.norm()).abs() < 1e-12);
        assert!((rotation_matrix(&euler) * body - v).norm() < 1e-12);
    }

    #[test]
    fn test_tilt_from_level_accel() {
        let (roll, pitch) = tilt_from_accel(&na::Vector3::new(0.0, 0.0, -GRAVITY));
        assert!((roll.abs() - PI).abs() < 1e-12, "roll {}", roll);
        assert!(pitch.abs() < 1e-12);
    }

    #[test]
    fn test_rad_to_deg() {
        assert!((rad_to_deg(PI / 4.0) - 45.0).abs() < 1e-12);
    }
}
