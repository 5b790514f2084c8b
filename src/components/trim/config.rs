use serde::{Deserialize, Serialize};

use crate::utils::deg_to_rad;

/// Configuration for the trim solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSolverConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence tolerance on the residual norm
    pub tolerance: f64,
    /// Relative perturbation used for the finite-difference Jacobian
    pub perturbation: f64,
    pub bounds: TrimBounds,
}

impl Default for TrimSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-6,
            perturbation: 1e-6,
            bounds: TrimBounds::default(),
        }
    }
}

impl TrimSolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("trim.max_iterations must be at least 1".into());
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(format!(
                "trim.tolerance must be finite and positive, got {}",
                self.tolerance
            ));
        }
        if !(self.perturbation.is_finite() && self.perturbation > 0.0) {
            return Err(format!(
                "trim.perturbation must be finite and positive, got {}",
                self.perturbation
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongitudinalBounds {
    pub elevator_range: (f64, f64),
    pub throttle_range: (f64, f64),
    pub alpha_range: (f64, f64),
}

impl Default for LongitudinalBounds {
    fn default() -> Self {
        Self {
            elevator_range: (deg_to_rad(-25.0), deg_to_rad(25.0)),
            throttle_range: (0.0, 1.0),
            alpha_range: (deg_to_rad(-10.0), deg_to_rad(20.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralBounds {
    pub aileron_range: (f64, f64),
    pub rudder_range: (f64, f64),
    pub beta_range: (f64, f64),
}

impl Default for LateralBounds {
    fn default() -> Self {
        Self {
            aileron_range: (deg_to_rad(-20.0), deg_to_rad(20.0)),
            rudder_range: (deg_to_rad(-25.0), deg_to_rad(25.0)),
            beta_range: (deg_to_rad(-20.0), deg_to_rad(20.0)),
        }
    }
}

/// Vertical search window for ground placement, relative to the terrain [m]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundBounds {
    pub height_range: (f64, f64),
}

impl Default for GroundBounds {
    fn default() -> Self {
        Self {
            height_range: (-20.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimBounds {
    pub lateral_bounds: LateralBounds,
    pub longitudinal_bounds: LongitudinalBounds,
    pub ground_bounds: GroundBounds,
}
