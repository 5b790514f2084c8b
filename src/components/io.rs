use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::{AircraftControlSurfaces, SimulationState, TimeStepSnapshot, TrimCondition};

/// Identifier of the flight model the manager should instantiate
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftType {
    #[default]
    GenericLight,
    Custom(String),
}

impl fmt::Display for AircraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftType::GenericLight => f.write_str("GenericLight"),
            AircraftType::Custom(name) => f.write_str(name),
        }
    }
}

/// Placement requested when a session is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Horizontal position, NED [m]
    pub north: f64,
    pub east: f64,
    /// Altitude above the datum [m]; ignored when starting on the ground
    pub altitude: f64,
    /// Heading [rad]
    pub heading: f64,
    /// True airspeed [m/s]
    pub airspeed: f64,
    /// Start parked on the terrain instead of in trimmed flight
    pub on_ground: bool,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            north: 0.0,
            east: 0.0,
            altitude: 1000.0,
            heading: 0.0,
            airspeed: 55.0,
            on_ground: false,
        }
    }
}

impl InitialConditions {
    /// Equilibrium to solve for before the session starts working
    pub fn trim_condition(&self) -> TrimCondition {
        if self.on_ground {
            TrimCondition::Ground {
                north: self.north,
                east: self.east,
                heading: self.heading,
            }
        } else {
            TrimCondition::StraightAndLevel {
                north: self.north,
                east: self.east,
                airspeed: self.airspeed,
                altitude: self.altitude,
                heading: self.heading,
            }
        }
    }
}

/// Per-tick input from the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataInp {
    pub requested: SimulationState,
    pub aircraft_type: AircraftType,
    pub initial: InitialConditions,
    /// Increments applied on top of the trimmed controls
    pub controls: AircraftControlSurfaces,
}

/// Per-tick output to the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataOut {
    pub state: SimulationState,
    pub time: f64,
    /// NED [m]
    pub position: Vector3<f64>,
    pub altitude: f64,
    pub altitude_agl: f64,
    /// Roll, pitch, yaw [rad]
    pub attitude: Vector3<f64>,
    /// Body rates p, q, r [rad/s]
    pub angular_rates: Vector3<f64>,
    /// World velocity [m/s]
    pub velocity: Vector3<f64>,
    /// World acceleration [m/s^2]
    pub acceleration: Vector3<f64>,
    pub airspeed: f64,
    pub controls: AircraftControlSurfaces,
    /// False when the session was seeded from an unconverged trim
    pub trim_converged: bool,
    pub trim_iterations: usize,
    pub replay_active: bool,
    pub statistics: TimeStepSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_condition_follows_on_ground_flag() {
        let mut initial = InitialConditions::default();
        assert!(matches!(
            initial.trim_condition(),
            TrimCondition::StraightAndLevel { airspeed, altitude, .. }
                if airspeed == 55.0 && altitude == 1000.0
        ));

        initial.on_ground = true;
        initial.north = 12.0;
        assert_eq!(
            initial.trim_condition(),
            TrimCondition::Ground {
                north: 12.0,
                east: 0.0,
                heading: 0.0
            }
        );
    }

    #[test]
    fn test_aircraft_type_display() {
        assert_eq!(AircraftType::GenericLight.to_string(), "GenericLight");
        assert_eq!(AircraftType::Custom("Glider".into()).to_string(), "Glider");
    }
}
