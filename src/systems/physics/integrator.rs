use nalgebra::{UnitQuaternion, Vector3};

use crate::components::{PhysicsComponent, SpatialComponent};

/// Structure to hold state derivatives for RK integration
struct StateDerivatives {
    velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
    angular_acceleration: Vector3<f64>,
}

/// World-frame linear acceleration for body-axis net force
pub fn world_acceleration(physics: &PhysicsComponent, attitude: &UnitQuaternion<f64>) -> Vector3<f64> {
    attitude.transform_vector(&physics.net_force) / physics.mass
}

/// Calculate derivatives for the current state. Loads are held constant
/// across the stages of one step.
fn calculate_derivatives(
    physics: &PhysicsComponent,
    velocity: &Vector3<f64>,
    attitude: &UnitQuaternion<f64>,
    angular_velocity: &Vector3<f64>,
) -> StateDerivatives {
    let acceleration = world_acceleration(physics, attitude);

    let omega = *angular_velocity;
    let gyro_term = omega.cross(&(physics.inertia * omega));
    let angular_acceleration = physics.inertia_inv * (physics.net_moment - gyro_term);

    StateDerivatives {
        velocity: *velocity,
        acceleration,
        angular_acceleration,
    }
}

fn rotate(attitude: &UnitQuaternion<f64>, angular_velocity: &Vector3<f64>, dt: f64) -> UnitQuaternion<f64> {
    if angular_velocity.norm() > 0.0 {
        // Body rates, so the increment is applied on the right
        attitude * UnitQuaternion::from_scaled_axis(angular_velocity * dt)
    } else {
        *attitude
    }
}

/// Classic RK4 step of position, velocity, attitude and body rates.
pub fn integrate_state(physics: &PhysicsComponent, spatial: &mut SpatialComponent, dt: f64) {
    let initial_position = spatial.position;
    let initial_velocity = spatial.velocity;
    let initial_attitude = spatial.attitude;
    let initial_angular_velocity = spatial.angular_velocity;

    let k1 = calculate_derivatives(
        physics,
        &initial_velocity,
        &initial_attitude,
        &initial_angular_velocity,
    );

    let k2_velocity = initial_velocity + k1.acceleration * (dt / 2.0);
    let k2_angular_vel = initial_angular_velocity + k1.angular_acceleration * (dt / 2.0);
    let k2_attitude = rotate(&initial_attitude, &initial_angular_velocity, dt / 2.0);
    let k2 = calculate_derivatives(physics, &k2_velocity, &k2_attitude, &k2_angular_vel);

    let k3_velocity = initial_velocity + k2.acceleration * (dt / 2.0);
    let k3_angular_vel = initial_angular_velocity + k2.angular_acceleration * (dt / 2.0);
    let k3_attitude = rotate(&initial_attitude, &k2_angular_vel, dt / 2.0);
    let k3 = calculate_derivatives(physics, &k3_velocity, &k3_attitude, &k3_angular_vel);

    let k4_velocity = initial_velocity + k3.acceleration * dt;
    let k4_angular_vel = initial_angular_velocity + k3.angular_acceleration * dt;
    let k4_attitude = rotate(&initial_attitude, &k3_angular_vel, dt);
    let k4 = calculate_derivatives(physics, &k4_velocity, &k4_attitude, &k4_angular_vel);

    spatial.position = initial_position
        + (dt / 6.0) * (k1.velocity + 2.0 * k2.velocity + 2.0 * k3.velocity + k4.velocity);
    spatial.velocity = initial_velocity
        + (dt / 6.0)
            * (k1.acceleration + 2.0 * k2.acceleration + 2.0 * k3.acceleration + k4.acceleration);
    spatial.angular_velocity = initial_angular_velocity
        + (dt / 6.0)
            * (k1.angular_acceleration
                + 2.0 * k2.angular_acceleration
                + 2.0 * k3.angular_acceleration
                + k4.angular_acceleration);

    let omega_avg = (1.0 / 6.0)
        * (initial_angular_velocity + 2.0 * k2_angular_vel + 2.0 * k3_angular_vel + k4_angular_vel);
    let attitude = rotate(&initial_attitude, &omega_avg, dt);
    spatial.attitude = UnitQuaternion::from_quaternion(attitude.into_inner().normalize());
}
