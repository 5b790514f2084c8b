use std::io;
use thiserror::Error;

use crate::components::RecorderError;
use crate::physics::PhysicsError;
use crate::resources::ConfigError;

/// Broad category of a [`SimError`], for callers that only need to decide
/// whether to retry, fix input or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Numerical,
    Recorder,
    Io,
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to create aircraft {aircraft}: {source}")]
    AircraftCreation {
        aircraft: String,
        #[source]
        source: PhysicsError,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Non-finite {quantity} on aircraft {aircraft} during {phase}")]
    NonFinite {
        aircraft: String,
        phase: &'static str,
        quantity: &'static str,
    },

    #[error("Non-finite time step {0}")]
    InvalidTimeStep(f64),

    #[error("Physics error during {context}: {source}")]
    Physics {
        context: String,
        #[source]
        source: PhysicsError,
    },

    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::AircraftCreation { .. } | SimError::Config(_) => ErrorKind::Configuration,
            SimError::NonFinite { .. } | SimError::InvalidTimeStep(_) => ErrorKind::Numerical,
            SimError::Physics { source, .. } => {
                if source.is_numerical() {
                    ErrorKind::Numerical
                } else {
                    ErrorKind::Configuration
                }
            }
            SimError::Recorder(RecorderError::Open { .. } | RecorderError::Io(_)) => ErrorKind::Io,
            SimError::Recorder(e) if e.is_configuration() => ErrorKind::Configuration,
            SimError::Recorder(_) => ErrorKind::Recorder,
            SimError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = SimError::AircraftCreation {
            aircraft: "Zeppelin".into(),
            source: PhysicsError::UnsupportedAircraft("Zeppelin".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("Zeppelin"));

        let err = SimError::Physics {
            context: "work step".into(),
            source: PhysicsError::ComputationError("singular".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Numerical);

        let err: SimError = RecorderError::NonMonotonic {
            line: 4,
            previous: 0.3,
            time: 0.2,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Recorder);

        let err: SimError = RecorderError::DuplicateVariable("pos_n".into()).into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: SimError = io::Error::new(io::ErrorKind::Other, "disk").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
