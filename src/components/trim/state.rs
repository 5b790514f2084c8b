use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::components::AircraftControlSurfaces;

/// Equilibrium the solver is asked to find
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrimCondition {
    /// Parked on the terrain at a horizontal location
    Ground { north: f64, east: f64, heading: f64 },
    /// Wings-level unaccelerated flight
    StraightAndLevel {
        north: f64,
        east: f64,
        airspeed: f64,
        altitude: f64,
        heading: f64,
    },
}

/// Unknowns of the in-flight problem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightTrimState {
    pub alpha: f64,
    pub beta: f64,
    pub elevator: f64,
    pub aileron: f64,
    pub rudder: f64,
    pub power_lever: f64,
}

impl Default for FlightTrimState {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            beta: 0.0,
            elevator: 0.0,
            aileron: 0.0,
            rudder: 0.0,
            power_lever: 0.5,
        }
    }
}

impl FlightTrimState {
    pub const DIMENSION: usize = 6;

    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_vec(vec![
            self.alpha,
            self.beta,
            self.elevator,
            self.aileron,
            self.rudder,
            self.power_lever,
        ])
    }

    pub fn from_vector(vec: &DVector<f64>) -> Self {
        Self {
            alpha: vec[0],
            beta: vec[1],
            elevator: vec[2],
            aileron: vec[3],
            rudder: vec[4],
            power_lever: vec[5],
        }
    }

    pub fn controls(&self) -> AircraftControlSurfaces {
        AircraftControlSurfaces {
            elevator: self.elevator,
            aileron: self.aileron,
            rudder: self.rudder,
            power_lever: self.power_lever,
        }
    }
}

/// Why the solver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimTermination {
    Converged,
    IterationLimit,
    /// A residual became NaN or infinite
    NonFinite,
    /// The search gave up before the cap without meeting tolerance
    Stalled,
}

/// Results from the trim calculation
#[derive(Debug, Clone, PartialEq)]
pub struct TrimResult {
    pub params: DVector<f64>,
    pub converged: bool,
    /// Euclidean norm of the residual at `params`
    pub cost: f64,
    /// Solver iterations, or Jacobian builds when the search was cut short
    pub iterations: usize,
    pub termination: TrimTermination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_state_vector_layout() {
        let state = FlightTrimState {
            alpha: 0.1,
            beta: 0.2,
            elevator: 0.3,
            aileron: 0.4,
            rudder: 0.5,
            power_lever: 0.6,
        };
        let vec = state.to_vector();
        assert_eq!(vec.len(), FlightTrimState::DIMENSION);
        assert_eq!(FlightTrimState::from_vector(&vec), state);
        assert_eq!(state.controls().power_lever, 0.6);
    }
}
