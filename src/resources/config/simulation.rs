use serde::{Deserialize, Serialize};
use std::path::Path;

use super::recorder::RecorderConfig;
use crate::components::{AircraftType, AntiWindup, InitialConditions, TrimSolverConfig};
use crate::resources::ConfigError;
use crate::utils::{deg_to_rad, MAX_TIMESTEP, MIN_TIMESTEP, NOMINAL_TIMESTEP};
use crate::vehicles::GenericAircraftConfig;

/// Limits applied to the raw tick duration [s]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepConfig {
    pub min: f64,
    pub max: f64,
    pub nominal: f64,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self {
            min: MIN_TIMESTEP,
            max: MAX_TIMESTEP,
            nominal: NOMINAL_TIMESTEP,
        }
    }
}

/// Altitude-hold gains. Output is an elevator increment [rad].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltitudeHoldConfig {
    pub enabled: bool,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Largest elevator increment either way [rad]
    pub limit: f64,
    pub anti_windup: AntiWindup,
}

impl Default for AltitudeHoldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kp: 0.004,
            ki: 0.0005,
            kd: 0.01,
            limit: deg_to_rad(5.0),
            anti_windup: AntiWindup::BackCalculation,
        }
    }
}

/// Scripted session run by the `flyer_sim` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub aircraft_type: AircraftType,
    pub initial: InitialConditions,
    /// Simulated time to run after trim [s]
    pub duration: f64,
    /// Tick fed to the manager [s]
    pub tick: f64,
    pub altitude_hold: AltitudeHoldConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            aircraft_type: AircraftType::GenericLight,
            initial: InitialConditions::default(),
            duration: 10.0,
            tick: NOMINAL_TIMESTEP,
            altitude_hold: AltitudeHoldConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time_step: TimeStepConfig,
    pub trim: TrimSolverConfig,
    pub recorder: RecorderConfig,
    /// Additional airframes available as `AircraftType::Custom(name)`
    pub aircraft: Vec<GenericAircraftConfig>,
    pub scenario: ScenarioConfig,
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ts = &self.time_step;
        if !(ts.min > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "time_step.min must be positive, got {}",
                ts.min
            )));
        }
        if !ts.max.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "time_step.max must be finite, got {}",
                ts.max
            )));
        }
        if ts.min > ts.max {
            return Err(ConfigError::ValidationError(format!(
                "time_step.min ({}) exceeds time_step.max ({})",
                ts.min, ts.max
            )));
        }
        if !(ts.nominal > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "time_step.nominal must be positive, got {}",
                ts.nominal
            )));
        }
        if !(self.recorder.interval > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "recorder.interval must be positive, got {}",
                self.recorder.interval
            )));
        }
        self.trim.validate().map_err(ConfigError::ValidationError)?;
        if !(self.scenario.tick > 0.0) || !(self.scenario.duration >= 0.0) {
            return Err(ConfigError::ValidationError(
                "scenario needs a positive tick and a non-negative duration".into(),
            ));
        }
        let hold = &self.scenario.altitude_hold;
        if ![hold.kp, hold.ki, hold.kd].iter().all(|g| g.is_finite())
            || !(hold.limit.is_finite() && hold.limit > 0.0)
        {
            return Err(ConfigError::ValidationError(
                "scenario.altitude_hold needs finite gains and a positive limit".into(),
            ));
        }
        for aircraft in &self.aircraft {
            aircraft
                .validate()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }
        Ok(())
    }
}
