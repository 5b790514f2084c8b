use tracing::debug;

use crate::components::PidController;
use crate::resources::AltitudeHoldConfig;

/// Holds a target altitude with an elevator increment on top of the trimmed
/// controls.
///
/// The PID acts on `target - altitude`; positive elevator pitches the nose
/// down, so the increment is the negated controller output.
#[derive(Debug, Clone)]
pub struct AltitudeHold {
    pid: PidController,
    target: f64,
}

impl AltitudeHold {
    pub fn new(config: &AltitudeHoldConfig, target: f64) -> Self {
        let pid = PidController::new(config.kp, config.ki, config.kd)
            .with_saturation(-config.limit, config.limit)
            .with_anti_windup(config.anti_windup);
        Self { pid, target }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Move the target without a jump in the commanded elevator
    pub fn set_target(&mut self, target: f64, altitude: f64) {
        let value = self.pid.output();
        self.target = target;
        self.pid.set_value(target - altitude, value);
        debug!(target, altitude, "altitude hold retargeted");
    }

    /// Elevator increment for the current altitude [rad]
    pub fn update(&mut self, dt: f64, altitude: f64) -> f64 {
        -self.pid.update(dt, self.target - altitude)
    }

    /// Last commanded elevator increment [rad]
    pub fn elevator(&self) -> f64 {
        -self.pid.output()
    }

    pub fn reset(&mut self) {
        self.pid.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hold(target: f64) -> AltitudeHold {
        AltitudeHold::new(&AltitudeHoldConfig::default(), target)
    }

    #[test]
    fn test_pitches_toward_target() {
        let mut low = hold(1000.0);
        assert!(low.update(0.01, 990.0) < 0.0);

        let mut high = hold(1000.0);
        assert!(high.update(0.01, 1010.0) > 0.0);

        let mut level = hold(1000.0);
        assert_relative_eq!(level.update(0.01, 1000.0), 0.0);
    }

    #[test]
    fn test_increment_is_limited() {
        let config = AltitudeHoldConfig::default();
        let mut hold = AltitudeHold::new(&config, 1000.0);
        for _ in 0..500 {
            hold.update(0.01, 500.0);
        }
        assert_relative_eq!(hold.elevator(), -config.limit);

        // Leaves the limit as soon as the error changes sign
        let elevator = hold.update(0.01, 1020.0);
        assert!(elevator > -config.limit);
    }

    #[test]
    fn test_retarget_is_bumpless() {
        let mut hold = hold(1000.0);
        for _ in 0..50 {
            hold.update(0.01, 995.0);
        }
        let before = hold.elevator();

        hold.set_target(1100.0, 995.0);
        assert_eq!(hold.target(), 1100.0);
        assert_relative_eq!(hold.elevator(), before);

        hold.reset();
        assert_eq!(hold.elevator(), 0.0);
    }
}
