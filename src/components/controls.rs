use serde::{Deserialize, Serialize};

/// Primary flight controls. Surfaces in radians, power lever in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftControlSurfaces {
    pub elevator: f64,
    pub aileron: f64,
    pub rudder: f64,
    pub power_lever: f64,
}

impl AircraftControlSurfaces {
    pub fn new(elevator: f64, aileron: f64, rudder: f64, power_lever: f64) -> Self {
        Self {
            elevator,
            aileron,
            rudder,
            power_lever,
        }
    }

    /// Component-wise sum, used to apply pilot increments over trimmed controls
    pub fn offset_by(&self, delta: &AircraftControlSurfaces) -> Self {
        Self {
            elevator: self.elevator + delta.elevator,
            aileron: self.aileron + delta.aileron,
            rudder: self.rudder + delta.rudder,
            power_lever: self.power_lever + delta.power_lever,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.elevator.is_finite()
            && self.aileron.is_finite()
            && self.rudder.is_finite()
            && self.power_lever.is_finite()
    }
}
