mod error;
mod variable;

pub use error::RecorderError;
pub use variable::{Binding, SampleValue, Variable};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderMode {
    #[default]
    Disabled,
    Record,
    Replay,
}
