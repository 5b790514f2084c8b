mod aircraft;
mod config;
mod factory;

pub use aircraft::GenericAircraft;
pub use config::{AeroCoefficients, AircraftGeometry, GearConfig, GenericAircraftConfig, MassModel};
pub use factory::BuiltinAircraftFactory;
