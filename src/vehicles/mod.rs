pub mod aircraft;

pub use aircraft::{
    AeroCoefficients, AircraftGeometry, BuiltinAircraftFactory, GearConfig, GenericAircraft,
    GenericAircraftConfig, MassModel,
};
