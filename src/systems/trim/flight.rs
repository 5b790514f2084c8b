use nalgebra::{DVector, Vector3};

use crate::components::{AircraftControlSurfaces, FlightTrimState, SpatialComponent, TrimBounds};
use crate::physics::{Aircraft, Ground, PhysicsError};
use crate::systems::trim::TrimProblem;
use crate::utils::{euler_to_quaternion, GRAVITY};

/// Wings-level, unaccelerated flight at a given airspeed, altitude and heading.
///
/// Pitch equals angle of attack so the flight path stays level. Residuals are
/// the body forces over weight and the body moments over weight times the
/// reference length.
pub struct FlightTrim<'a> {
    aircraft: &'a dyn Aircraft,
    ground: &'a dyn Ground,
    position: Vector3<f64>,
    airspeed: f64,
    heading: f64,
    bounds: TrimBounds,
    initial: FlightTrimState,
}

impl<'a> FlightTrim<'a> {
    pub fn new(
        aircraft: &'a dyn Aircraft,
        ground: &'a dyn Ground,
        north: f64,
        east: f64,
        altitude: f64,
        airspeed: f64,
        heading: f64,
        bounds: TrimBounds,
    ) -> Self {
        Self {
            aircraft,
            ground,
            position: Vector3::new(north, east, -altitude),
            airspeed,
            heading,
            bounds,
            initial: FlightTrimState::default(),
        }
    }

    pub fn spatial_for(&self, params: &DVector<f64>) -> SpatialComponent {
        let state = FlightTrimState::from_vector(params);
        let (alpha, beta) = (state.alpha, state.beta);

        let body_velocity = Vector3::new(
            self.airspeed * alpha.cos() * beta.cos(),
            self.airspeed * beta.sin(),
            self.airspeed * alpha.sin() * beta.cos(),
        );
        let attitude = euler_to_quaternion(0.0, alpha, self.heading);

        SpatialComponent {
            position: self.position,
            velocity: attitude * body_velocity,
            attitude,
            angular_velocity: Vector3::zeros(),
        }
    }

    pub fn controls_for(&self, params: &DVector<f64>) -> AircraftControlSurfaces {
        FlightTrimState::from_vector(params).controls()
    }
}

impl TrimProblem for FlightTrim<'_> {
    fn bounds(&self) -> Vec<(f64, f64)> {
        let lon = &self.bounds.longitudinal_bounds;
        let lat = &self.bounds.lateral_bounds;
        vec![
            lon.alpha_range,
            lat.beta_range,
            lon.elevator_range,
            lat.aileron_range,
            lat.rudder_range,
            lon.throttle_range,
        ]
    }

    fn initial_guess(&self) -> DVector<f64> {
        self.initial.to_vector()
    }

    fn residuals(&mut self, params: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
        let spatial = self.spatial_for(params);
        let controls = self.controls_for(params);
        let (force, moment) = self.aircraft.evaluate(&spatial, &controls, self.ground)?;

        let weight = self.aircraft.mass() * GRAVITY;
        let moment_scale = weight * self.aircraft.reference_length();

        Ok(DVector::from_vec(vec![
            force.x / weight,
            force.y / weight,
            force.z / weight,
            moment.x / moment_scale,
            moment.y / moment_scale,
            moment.z / moment_scale,
        ]))
    }
}
