use nalgebra::Vector3;

use crate::components::{AircraftControlSurfaces, AircraftType, PhysicsComponent, SpatialComponent};
use crate::physics::{Ground, PhysicsError};

/// The flight model driven by the simulation manager.
///
/// Forces and moments are body-axis totals, gravity and ground reactions
/// included, so a trimmed aircraft reports zero for both.
pub trait Aircraft {
    fn name(&self) -> &str;
    fn mass(&self) -> f64;
    /// Length used to normalise moments, usually the wing span [m]
    fn reference_length(&self) -> f64;
    /// Gear contact points in body axes relative to the reference point [m]
    fn contact_points(&self) -> &[Vector3<f64>];

    fn spatial(&self) -> &SpatialComponent;
    fn set_spatial(&mut self, spatial: SpatialComponent);
    fn controls(&self) -> &AircraftControlSurfaces;
    fn set_controls(&mut self, controls: AircraftControlSurfaces);
    /// Loads from the most recent evaluation or step
    fn physics(&self) -> &PhysicsComponent;

    /// Net body force and moment for an arbitrary state, without advancing time.
    fn evaluate(
        &self,
        spatial: &SpatialComponent,
        controls: &AircraftControlSurfaces,
        ground: &dyn Ground,
    ) -> Result<(Vector3<f64>, Vector3<f64>), PhysicsError>;

    /// Advance the aircraft by `dt` seconds.
    fn step(&mut self, dt: f64, ground: &dyn Ground) -> Result<(), PhysicsError>;

    /// World-frame acceleration over the last step [m/s^2]
    fn acceleration(&self) -> Vector3<f64>;
}

pub trait AircraftFactory {
    fn create(&self, aircraft_type: &AircraftType) -> Result<Box<dyn Aircraft>, PhysicsError>;
}
