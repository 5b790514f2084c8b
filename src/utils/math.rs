use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

use super::constants::{
    AIR_GAS_CONSTANT, GRAVITY, ISA_LAPSE_RATE, ISA_SEA_LEVEL_PRESSURE, ISA_SEA_LEVEL_TEMP,
    ISA_TROPOPAUSE,
};

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Linear interpolation between two values.
///
/// Unlike a clamped lerp the factor is used as given; callers bound it.
#[inline]
pub fn lerp(start: f64, end: f64, factor: f64) -> f64 {
    start + (end - start) * factor
}

/// Convert a quaternion to Euler angles (roll, pitch, yaw)
pub fn quaternion_to_euler(quat: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = quat.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// Build a body-to-NED attitude from roll, pitch and yaw
pub fn euler_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

/// Air density from the ISA troposphere model, held constant above the tropopause.
pub fn isa_density(altitude: f64) -> f64 {
    let h = altitude.clamp(0.0, ISA_TROPOPAUSE);
    let temperature = ISA_SEA_LEVEL_TEMP + ISA_LAPSE_RATE * h;
    let exponent = -GRAVITY / (ISA_LAPSE_RATE * AIR_GAS_CONSTANT);
    let pressure = ISA_SEA_LEVEL_PRESSURE * (temperature / ISA_SEA_LEVEL_TEMP).powf(exponent);
    pressure / (AIR_GAS_CONSTANT * temperature)
}

/// True when every component of the vector is finite
#[inline]
pub fn all_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_isa_density_sea_level() {
        assert_relative_eq!(isa_density(0.0), 1.225, epsilon = 1e-3);
        assert!(isa_density(3000.0) < isa_density(0.0));
    }

    #[test]
    fn test_euler_round_trip() {
        let q = euler_to_quaternion(0.1, -0.2, 1.3);
        let e = quaternion_to_euler(&q);
        assert_relative_eq!(e.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(e.y, -0.2, epsilon = 1e-12);
        assert_relative_eq!(e.z, 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_extrapolates() {
        assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
        assert_eq!(lerp(1.0, 3.0, 1.5), 4.0);
    }
}
