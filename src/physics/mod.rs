mod error;
mod ground;
mod traits;

pub use error::PhysicsError;
pub use ground::{FlatGround, Ground, SlopedGround};
pub use traits::{Aircraft, AircraftFactory};
