use flyer_core::{
    components::{AircraftControlSurfaces, AircraftType, PhysicsComponent, SpatialComponent},
    physics::{Aircraft, AircraftFactory, Ground, PhysicsError},
    vehicles::{GenericAircraft, GenericAircraftConfig},
};
use nalgebra::Vector3;

/// Generic light aircraft whose reported loads turn to NaN after a number of steps
pub struct FaultyAircraft {
    inner: GenericAircraft,
    physics: PhysicsComponent,
    healthy_steps: usize,
    steps: usize,
}

impl Aircraft for FaultyAircraft {
    fn name(&self) -> &str {
        "faulty"
    }

    fn mass(&self) -> f64 {
        self.inner.mass()
    }

    fn reference_length(&self) -> f64 {
        self.inner.reference_length()
    }

    fn contact_points(&self) -> &[Vector3<f64>] {
        self.inner.contact_points()
    }

    fn spatial(&self) -> &SpatialComponent {
        self.inner.spatial()
    }

    fn set_spatial(&mut self, spatial: SpatialComponent) {
        self.inner.set_spatial(spatial);
    }

    fn controls(&self) -> &AircraftControlSurfaces {
        self.inner.controls()
    }

    fn set_controls(&mut self, controls: AircraftControlSurfaces) {
        self.inner.set_controls(controls);
    }

    fn physics(&self) -> &PhysicsComponent {
        &self.physics
    }

    fn evaluate(
        &self,
        spatial: &SpatialComponent,
        controls: &AircraftControlSurfaces,
        ground: &dyn Ground,
    ) -> Result<(Vector3<f64>, Vector3<f64>), PhysicsError> {
        self.inner.evaluate(spatial, controls, ground)
    }

    fn step(&mut self, dt: f64, ground: &dyn Ground) -> Result<(), PhysicsError> {
        self.inner.step(dt, ground)?;
        self.steps += 1;
        self.physics = self.inner.physics().clone();
        if self.steps > self.healthy_steps {
            self.physics.net_force.x = f64::NAN;
        }
        Ok(())
    }

    fn acceleration(&self) -> Vector3<f64> {
        self.inner.acceleration()
    }
}

/// Builds [`FaultyAircraft`] for every requested type
pub struct FaultyFactory {
    pub healthy_steps: usize,
}

impl AircraftFactory for FaultyFactory {
    fn create(&self, _aircraft_type: &AircraftType) -> Result<Box<dyn Aircraft>, PhysicsError> {
        let inner = GenericAircraft::new(GenericAircraftConfig::generic_light())?;
        let physics = inner.physics().clone();
        Ok(Box::new(FaultyAircraft {
            inner,
            physics,
            healthy_steps: self.healthy_steps,
            steps: 0,
        }))
    }
}
