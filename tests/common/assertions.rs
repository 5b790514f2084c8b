use approx::assert_relative_eq;
use flyer_core::DataOut;
use nalgebra::Vector3;

/// Assert that every telemetry field of an output frame is finite
#[track_caller]
pub fn assert_output_finite(out: &DataOut) {
    assert!(out.position.iter().all(|x| x.is_finite()), "Position is not finite");
    assert!(out.velocity.iter().all(|x| x.is_finite()), "Velocity is not finite");
    assert!(out.attitude.iter().all(|x| x.is_finite()), "Attitude is not finite");
    assert!(
        out.angular_rates.iter().all(|x| x.is_finite()),
        "Angular rates are not finite"
    );
    assert!(out.airspeed.is_finite(), "Airspeed is not finite");
}

#[track_caller]
pub fn assert_position_eq(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}
