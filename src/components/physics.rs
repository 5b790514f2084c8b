use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::all_finite;

/// Mass properties plus the net loads from the latest force evaluation.
/// Forces and moments are body-axis values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsComponent {
    pub mass: f64,
    pub inertia: Matrix3<f64>,
    pub inertia_inv: Matrix3<f64>,
    pub net_force: Vector3<f64>,
    pub net_moment: Vector3<f64>,
}

impl PhysicsComponent {
    pub fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        let inertia_inv = inertia.try_inverse().unwrap_or(Matrix3::identity());
        Self {
            mass,
            inertia,
            inertia_inv,
            net_force: Vector3::zeros(),
            net_moment: Vector3::zeros(),
        }
    }

    pub fn set_loads(&mut self, force: Vector3<f64>, moment: Vector3<f64>) {
        self.net_force = force;
        self.net_moment = moment;
    }

    pub fn loads_finite(&self) -> bool {
        all_finite(&self.net_force) && all_finite(&self.net_moment)
    }
}
