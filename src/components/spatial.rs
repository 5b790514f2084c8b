use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::all_finite;

/// Component for storing spatial state of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialComponent {
    /// Position in world space, NED [m]
    pub position: Vector3<f64>,

    /// Linear velocity in world space [m/s]
    pub velocity: Vector3<f64>,

    /// Attitude quaternion (rotation from body to world frame)
    pub attitude: UnitQuaternion<f64>,

    /// Angular velocity in body frame [rad/s]
    pub angular_velocity: Vector3<f64>,
}

impl Default for SpatialComponent {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl SpatialComponent {
    /// Create a new spatial component with initial values
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        attitude: UnitQuaternion<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Self {
        Self {
            position,
            velocity,
            attitude,
            angular_velocity,
        }
    }

    /// Create a new spatial component at a specific position
    pub fn at_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Altitude above the datum [m]
    pub fn altitude(&self) -> f64 {
        -self.position.z
    }

    /// Velocity expressed in body axes [m/s]
    pub fn body_velocity(&self) -> Vector3<f64> {
        self.attitude.inverse_transform_vector(&self.velocity)
    }

    /// Roll, pitch and yaw [rad]
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.attitude.euler_angles()
    }

    pub fn is_finite(&self) -> bool {
        all_finite(&self.position)
            && all_finite(&self.velocity)
            && self.attitude.coords.iter().all(|x| x.is_finite())
            && all_finite(&self.angular_velocity)
    }
}
