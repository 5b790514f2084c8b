use nalgebra::{DVector, Vector3};

use crate::components::{AircraftControlSurfaces, GroundBounds, SpatialComponent};
use crate::physics::{Aircraft, Ground, PhysicsError};
use crate::systems::trim::TrimProblem;
use crate::utils::euler_to_quaternion;

/// Places a parked aircraft so its lowest contact point touches the terrain.
///
/// The single unknown is the NED `z` of the reference point.
pub struct GroundTrim<'a> {
    aircraft: &'a dyn Aircraft,
    ground: &'a dyn Ground,
    template: SpatialComponent,
    bounds: GroundBounds,
}

impl<'a> GroundTrim<'a> {
    pub fn new(
        aircraft: &'a dyn Aircraft,
        ground: &'a dyn Ground,
        north: f64,
        east: f64,
        heading: f64,
        bounds: GroundBounds,
    ) -> Self {
        let template = SpatialComponent {
            position: Vector3::new(north, east, -ground.elevation(north, east)),
            attitude: euler_to_quaternion(0.0, 0.0, heading),
            ..Default::default()
        };

        Self {
            aircraft,
            ground,
            template,
            bounds,
        }
    }

    pub fn spatial_for(&self, params: &DVector<f64>) -> SpatialComponent {
        let mut spatial = self.template.clone();
        spatial.position.z = params[0];
        spatial
    }

    pub fn controls_for(&self, _params: &DVector<f64>) -> AircraftControlSurfaces {
        AircraftControlSurfaces::default()
    }

    /// Height of the lowest contact point above the terrain [m]
    fn clearance(&self, spatial: &SpatialComponent) -> f64 {
        let points = self.aircraft.contact_points();
        if points.is_empty() {
            return self.ground.height_above(&spatial.position);
        }
        points
            .iter()
            .map(|p| {
                let world = spatial.position + spatial.attitude * p;
                self.ground.height_above(&world)
            })
            .fold(f64::INFINITY, f64::min)
    }
}

impl TrimProblem for GroundTrim<'_> {
    fn bounds(&self) -> Vec<(f64, f64)> {
        let terrain_z = self.template.position.z;
        let (low, high) = self.bounds.height_range;
        vec![(terrain_z - high, terrain_z - low)]
    }

    fn initial_guess(&self) -> DVector<f64> {
        DVector::from_element(1, self.template.position.z)
    }

    fn residuals(&mut self, params: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
        let spatial = self.spatial_for(params);
        Ok(DVector::from_element(1, self.clearance(&spatial)))
    }
}
