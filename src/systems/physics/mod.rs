mod integrator;

pub use integrator::{integrate_state, world_acceleration};
