use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Failed to open recorder store {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error on recorder store: {0}")]
    Io(#[from] io::Error),

    #[error("Duplicate recorder variable '{0}'")]
    DuplicateVariable(String),

    #[error("Invalid recorder variable name '{0}'")]
    InvalidName(String),

    #[error("Cannot register '{0}' while a session is active")]
    SessionActive(String),

    #[error("Invalid sampling interval {0}")]
    InvalidInterval(f64),

    #[error("Replay store {path:?} has no header")]
    MissingHeader { path: PathBuf },

    #[error("Replay store {path:?} has no column for variable '{name}'")]
    MissingColumn { path: PathBuf, name: String },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Non-monotonic timestamp at line {line}: {time} follows {previous}")]
    NonMonotonic { line: usize, previous: f64, time: f64 },
}

impl RecorderError {
    /// Errors caused by how the session was set up rather than by the file contents
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RecorderError::DuplicateVariable(_)
                | RecorderError::InvalidName(_)
                | RecorderError::SessionActive(_)
                | RecorderError::InvalidInterval(_)
                | RecorderError::MissingHeader { .. }
                | RecorderError::MissingColumn { .. }
        )
    }
}
