use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::components::RecorderMode;

/// Recorder session opened when a simulation leaves Init
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub mode: RecorderMode,
    pub path: PathBuf,
    /// Sampling interval in record mode [s]
    pub interval: f64,
    /// Decimal places written for telemetry channels
    pub precision: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            mode: RecorderMode::Disabled,
            path: PathBuf::from("flight.csv"),
            interval: 0.1,
            precision: 6,
        }
    }
}
