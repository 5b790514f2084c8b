use nalgebra::Vector3;

use super::config::GenericAircraftConfig;
use crate::components::{AircraftControlSurfaces, PhysicsComponent, SpatialComponent};
use crate::physics::{Aircraft, Ground, PhysicsError};
use crate::systems::physics::{integrate_state, world_acceleration};
use crate::utils::{isa_density, GRAVITY};

/// Speeds below this are treated as still air for the aerodynamic model [m/s]
const MIN_AIRSPEED: f64 = 0.5;
/// Tangential contact speed below which friction is regularised [m/s]
const FRICTION_SLIP_SPEED: f64 = 0.1;

/// Rigid-body aircraft with linear aerodynamics, a single thrust line along
/// the body x axis and spring-damper gear contacts.
#[derive(Debug, Clone)]
pub struct GenericAircraft {
    config: GenericAircraftConfig,
    contact_points: Vec<Vector3<f64>>,
    spatial: SpatialComponent,
    controls: AircraftControlSurfaces,
    physics: PhysicsComponent,
    acceleration: Vector3<f64>,
}

impl GenericAircraft {
    pub fn new(config: GenericAircraftConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        let contact_points = config
            .gear
            .contact_points
            .iter()
            .map(|p| Vector3::new(p[0], p[1], p[2]))
            .collect();
        let physics = PhysicsComponent::new(config.mass.mass, config.mass.inertia());

        Ok(Self {
            config,
            contact_points,
            spatial: SpatialComponent::default(),
            controls: AircraftControlSurfaces::default(),
            physics,
            acceleration: Vector3::zeros(),
        })
    }

    pub fn config(&self) -> &GenericAircraftConfig {
        &self.config
    }

    fn aerodynamic_loads(
        &self,
        spatial: &SpatialComponent,
        controls: &AircraftControlSurfaces,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let v_body = spatial.body_velocity();
        let airspeed = v_body.norm();
        if airspeed < MIN_AIRSPEED {
            return (Vector3::zeros(), Vector3::zeros());
        }

        let coef = &self.config.aero_coef;
        let geom = &self.config.geometry;
        let alpha = v_body.z.atan2(v_body.x);
        let beta = (v_body.y / airspeed).clamp(-1.0, 1.0).asin();
        let qbar = 0.5 * isa_density(spatial.altitude()) * airspeed * airspeed;

        let omega = spatial.angular_velocity;
        let p_hat = omega.x * geom.wing_span / (2.0 * airspeed);
        let q_hat = omega.y * geom.mac / (2.0 * airspeed);
        let r_hat = omega.z * geom.wing_span / (2.0 * airspeed);

        let c_l = coef.c_L_0
            + coef.c_L_alpha * alpha
            + coef.c_L_q * q_hat
            + coef.c_L_deltae * controls.elevator;
        let c_d = coef.c_D_0 + coef.c_D_k * c_l * c_l;
        let c_y = coef.c_Y_beta * beta
            + coef.c_Y_p * p_hat
            + coef.c_Y_r * r_hat
            + coef.c_Y_deltar * controls.rudder;

        let c_roll = coef.c_l_beta * beta
            + coef.c_l_p * p_hat
            + coef.c_l_r * r_hat
            + coef.c_l_deltaa * controls.aileron
            + coef.c_l_deltar * controls.rudder;
        let c_pitch = coef.c_m_0
            + coef.c_m_alpha * alpha
            + coef.c_m_q * q_hat
            + coef.c_m_deltae * controls.elevator;
        let c_yaw = coef.c_n_beta * beta
            + coef.c_n_p * p_hat
            + coef.c_n_r * r_hat
            + coef.c_n_deltaa * controls.aileron
            + coef.c_n_deltar * controls.rudder;

        let qs = qbar * geom.wing_area;
        let (sin_a, cos_a) = alpha.sin_cos();
        let force = Vector3::new(
            qs * (-c_d * cos_a + c_l * sin_a),
            qs * c_y,
            qs * (-c_d * sin_a - c_l * cos_a),
        );
        let moment = Vector3::new(
            qs * geom.wing_span * c_roll,
            qs * geom.mac * c_pitch,
            qs * geom.wing_span * c_yaw,
        );
        (force, moment)
    }

    fn gear_loads(
        &self,
        spatial: &SpatialComponent,
        ground: &dyn Ground,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let gear = &self.config.gear;
        let mut force = Vector3::zeros();
        let mut moment = Vector3::zeros();

        for point in &self.contact_points {
            let world_point = spatial.position + spatial.attitude.transform_vector(point);
            let penetration = -ground.height_above(&world_point);
            if penetration <= 0.0 {
                continue;
            }

            let normal = ground.normal(world_point.x, world_point.y);
            let point_velocity = spatial.velocity
                + spatial
                    .attitude
                    .transform_vector(&spatial.angular_velocity.cross(point));
            let normal_speed = point_velocity.dot(&normal);
            let reaction = (gear.stiffness * penetration - gear.damping * normal_speed).max(0.0);

            let tangential = point_velocity - normal * normal_speed;
            let slip = tangential.norm().max(FRICTION_SLIP_SPEED);
            let friction = -tangential * (gear.rolling_friction * reaction / slip);

            let world_force = normal * reaction + friction;
            let body_force = spatial.attitude.inverse_transform_vector(&world_force);
            force += body_force;
            moment += point.cross(&body_force);
        }
        (force, moment)
    }
}

impl Aircraft for GenericAircraft {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn mass(&self) -> f64 {
        self.config.mass.mass
    }

    fn reference_length(&self) -> f64 {
        self.config.geometry.wing_span
    }

    fn contact_points(&self) -> &[Vector3<f64>] {
        &self.contact_points
    }

    fn spatial(&self) -> &SpatialComponent {
        &self.spatial
    }

    fn set_spatial(&mut self, spatial: SpatialComponent) {
        self.spatial = spatial;
    }

    fn controls(&self) -> &AircraftControlSurfaces {
        &self.controls
    }

    fn set_controls(&mut self, controls: AircraftControlSurfaces) {
        self.controls = controls;
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
        let (aero_force, aero_moment) = self.aerodynamic_loads(spatial, controls);
        let (gear_force, gear_moment) = self.gear_loads(spatial, ground);

        let thrust = Vector3::new(
            controls.power_lever.clamp(0.0, 1.0) * self.config.max_thrust,
            0.0,
            0.0,
        );
        let weight = spatial
            .attitude
            .inverse_transform_vector(&Vector3::new(0.0, 0.0, self.mass() * GRAVITY));

        Ok((
            aero_force + gear_force + thrust + weight,
            aero_moment + gear_moment,
        ))
    }

    fn step(&mut self, dt: f64, ground: &dyn Ground) -> Result<(), PhysicsError> {
        if dt <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "time step must be positive, got {}",
                dt
            )));
        }

        let (force, moment) = self.evaluate(&self.spatial, &self.controls, ground)?;
        self.physics.set_loads(force, moment);
        self.acceleration = world_acceleration(&self.physics, &self.spatial.attitude);
        integrate_state(&self.physics, &mut self.spatial, dt);
        Ok(())
    }

    fn acceleration(&self) -> Vector3<f64> {
        self.acceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::FlatGround;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn aircraft() -> GenericAircraft {
        GenericAircraft::new(GenericAircraftConfig::generic_light()).unwrap()
    }

    #[test]
    fn test_free_fall_when_stationary_in_air() {
        let mut ac = aircraft();
        ac.set_spatial(SpatialComponent::at_position(Vector3::new(0.0, 0.0, -500.0)));
        ac.step(0.01, &FlatGround::default()).unwrap();
        assert_relative_eq!(ac.acceleration().z, GRAVITY, epsilon = 1e-9);
        assert!(ac.spatial().velocity.z > 0.0);
    }

    #[test]
    fn test_gear_supports_weight_when_compressed() {
        let ac = aircraft();
        let ground = FlatGround::default();
        let config = ac.config().gear.clone();
        // Compress each of the three legs by an equal share of the weight
        let deflection = ac.mass() * GRAVITY / (3.0 * config.stiffness);
        let spatial = SpatialComponent::at_position(Vector3::new(0.0, 0.0, -(1.1 - deflection)));
        let (force, _) = ac
            .evaluate(&spatial, &AircraftControlSurfaces::default(), &ground)
            .unwrap();
        assert_relative_eq!(force.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lift_opposes_weight_in_cruise() {
        let ac = aircraft();
        let spatial = SpatialComponent {
            position: Vector3::new(0.0, 0.0, -1000.0),
            velocity: Vector3::new(55.0, 0.0, 0.0),
            attitude: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
        };
        let (aero, _) = ac.aerodynamic_loads(&spatial, &AircraftControlSurfaces::default());
        assert!(aero.z < 0.0, "lift should point up (negative body z)");
        assert!(aero.x < 0.0, "drag should oppose motion");
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let mut ac = aircraft();
        assert!(ac.step(0.0, &FlatGround::default()).is_err());
    }
}
