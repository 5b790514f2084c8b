use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::physics::PhysicsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassModel {
    /// Total mass of the aircraft (kg).
    pub mass: f64,
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub ixz: f64,
}

impl MassModel {
    pub fn inertia(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            Vector3::new(self.ixx, 0.0, -self.ixz),
            Vector3::new(0.0, self.iyy, 0.0),
            Vector3::new(-self.ixz, 0.0, self.izz),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftGeometry {
    pub wing_area: f64,
    pub wing_span: f64,
    pub mac: f64,
}

/// Linear stability-derivative model; angles in radians, rates nondimensional.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroCoefficients {
    pub c_L_0: f64,
    pub c_L_alpha: f64,
    pub c_L_q: f64,
    pub c_L_deltae: f64,

    pub c_D_0: f64,
    /// Induced drag factor applied to CL^2
    pub c_D_k: f64,

    pub c_Y_beta: f64,
    pub c_Y_p: f64,
    pub c_Y_r: f64,
    pub c_Y_deltar: f64,

    pub c_l_beta: f64,
    pub c_l_p: f64,
    pub c_l_r: f64,
    pub c_l_deltaa: f64,
    pub c_l_deltar: f64,

    pub c_m_0: f64,
    pub c_m_alpha: f64,
    pub c_m_q: f64,
    pub c_m_deltae: f64,

    pub c_n_beta: f64,
    pub c_n_p: f64,
    pub c_n_r: f64,
    pub c_n_deltaa: f64,
    pub c_n_deltar: f64,
}

/// Spring-damper undercarriage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearConfig {
    /// Contact points in body axes [m]
    pub contact_points: Vec<[f64; 3]>,
    /// Per-point stiffness [N/m]
    pub stiffness: f64,
    /// Per-point damping [N·s/m]
    pub damping: f64,
    pub rolling_friction: f64,
}

/// Everything needed to build a [`GenericAircraft`](super::GenericAircraft).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericAircraftConfig {
    pub name: String,
    pub mass: MassModel,
    pub geometry: AircraftGeometry,
    pub aero_coef: AeroCoefficients,
    /// Static thrust at full power lever [N]
    pub max_thrust: f64,
    pub gear: GearConfig,
}

impl GenericAircraftConfig {
    /// A single-engine four-seat light aircraft
    pub fn generic_light() -> Self {
        Self {
            name: "GenericLight".to_string(),
            mass: MassModel {
                mass: 1100.0,
                ixx: 1285.0,
                iyy: 1825.0,
                izz: 2667.0,
                ixz: 0.0,
            },
            geometry: AircraftGeometry {
                wing_area: 16.2,
                wing_span: 10.9,
                mac: 1.49,
            },
            aero_coef: AeroCoefficients {
                c_L_0: 0.25,
                c_L_alpha: 4.6,
                c_L_q: 3.9,
                c_L_deltae: 0.35,
                c_D_0: 0.027,
                c_D_k: 0.054,
                c_Y_beta: -0.31,
                c_Y_p: -0.037,
                c_Y_r: 0.21,
                c_Y_deltar: 0.187,
                c_l_beta: -0.089,
                c_l_p: -0.47,
                c_l_r: 0.096,
                c_l_deltaa: 0.178,
                c_l_deltar: 0.0147,
                c_m_0: 0.04,
                c_m_alpha: -0.9,
                c_m_q: -12.4,
                c_m_deltae: -1.1,
                c_n_beta: 0.065,
                c_n_p: -0.03,
                c_n_r: -0.099,
                c_n_deltaa: -0.0053,
                c_n_deltar: -0.0657,
            },
            max_thrust: 3000.0,
            gear: GearConfig {
                contact_points: vec![[1.2, 0.0, 1.1], [-0.4, -1.2, 1.1], [-0.4, 1.2, 1.1]],
                stiffness: 75000.0,
                damping: 9000.0,
                rolling_friction: 0.03,
            },
        }
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = [
            ("mass", self.mass.mass),
            ("ixx", self.mass.ixx),
            ("iyy", self.mass.iyy),
            ("izz", self.mass.izz),
            ("wing_area", self.geometry.wing_area),
            ("wing_span", self.geometry.wing_span),
            ("mac", self.geometry.mac),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::ConfigError(format!(
                    "{}: {} must be positive, got {}",
                    self.name, field, value
                )));
            }
        }
        if self.mass.inertia().try_inverse().is_none() {
            return Err(PhysicsError::ConfigError(format!(
                "{}: inertia matrix is not invertible",
                self.name
            )));
        }
        if self.max_thrust < 0.0 {
            return Err(PhysicsError::ConfigError(format!(
                "{}: max_thrust must not be negative",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for GenericAircraftConfig {
    fn default() -> Self {
        Self::generic_light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_light_is_valid() {
        assert!(GenericAircraftConfig::generic_light().validate().is_ok());
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let mut config = GenericAircraftConfig::generic_light();
        config.mass.mass = -1.0;
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::ConfigError(_))
        ));
    }
}
