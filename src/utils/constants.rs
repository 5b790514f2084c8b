pub const GRAVITY: f64 = 9.80665; // m/s^2
pub const AIR_GAS_CONSTANT: f64 = 287.05287; // J/(kg·K)
pub const ISA_SEA_LEVEL_TEMP: f64 = 288.15; // K
pub const ISA_SEA_LEVEL_PRESSURE: f64 = 101325.0; // Pa
pub const ISA_LAPSE_RATE: f64 = -0.0065; // K/m
pub const ISA_TROPOPAUSE: f64 = 11000.0; // m

pub const MAX_TIMESTEP: f64 = 1.0 / 30.0; // Maximum physics timestep
pub const MIN_TIMESTEP: f64 = 1.0 / 1000.0; // Minimum physics timestep
pub const NOMINAL_TIMESTEP: f64 = 1.0 / 100.0;

// Slack used when comparing accumulated simulation time against a sampling interval
pub const TIME_EPSILON: f64 = 1e-9;
