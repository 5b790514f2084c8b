use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Non-finite {quantity} in {context}")]
    NonFinite {
        quantity: &'static str,
        context: String,
    },

    #[error("Physics computation error: {0}")]
    ComputationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported aircraft type: {0}")]
    UnsupportedAircraft(String),

    #[error("Model configuration error: {0}")]
    ConfigError(String),
}

impl PhysicsError {
    /// True for faults caused by corrupted numeric state rather than bad input.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            PhysicsError::NonFinite { .. } | PhysicsError::ComputationError(_)
        )
    }
}
