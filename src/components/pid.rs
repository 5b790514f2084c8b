use serde::{Deserialize, Serialize};

/// Integral correction applied once the output saturates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntiWindup {
    #[default]
    None,
    /// Integral term recomputed from the clamped output minus P and D
    BackCalculation,
    /// Integration step rolled back whenever clamping changed the output
    ConditionalIntegration,
    /// Raw-minus-saturated delta fed back into the next integration step
    Filtering,
}

/// Discrete PID controller.
///
/// The integral is a forward-Euler sum of `error * dt`; the derivative is an
/// unfiltered backward difference, so noisy errors produce noisy D terms.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    kaw: f64,
    anti_windup: AntiWindup,
    saturation: Option<(f64, f64)>,

    error_i: f64,
    error_prev: f64,
    error_d: f64,
    delta: f64,
    value: f64,
    primed: bool,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            kaw: 1.0,
            anti_windup: AntiWindup::None,
            saturation: None,
            error_i: 0.0,
            error_prev: 0.0,
            error_d: 0.0,
            delta: 0.0,
            value: 0.0,
            primed: false,
        }
    }

    /// Clamp the output to `[min, max]`. Bounds given in reverse are swapped.
    pub fn with_saturation(mut self, min: f64, max: f64) -> Self {
        self.set_saturation(min, max);
        self
    }

    pub fn with_anti_windup(mut self, mode: AntiWindup) -> Self {
        self.anti_windup = mode;
        self
    }

    /// Feedback gain for [`AntiWindup::Filtering`]
    pub fn with_feedback_gain(mut self, kaw: f64) -> Self {
        self.kaw = kaw;
        self
    }

    pub fn set_saturation(&mut self, min: f64, max: f64) {
        self.saturation = Some((min.min(max), min.max(max)));
    }

    pub fn clear_saturation(&mut self) {
        self.saturation = None;
    }

    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    pub fn anti_windup(&self) -> AntiWindup {
        self.anti_windup
    }

    pub fn output(&self) -> f64 {
        self.value
    }

    /// Integrated error (not multiplied by `ki`)
    pub fn integral(&self) -> f64 {
        self.error_i
    }

    pub fn derivative(&self) -> f64 {
        self.error_d
    }

    pub fn saturated(&self) -> bool {
        self.delta != 0.0
    }

    /// Advance the controller by `dt` seconds. A non-positive step leaves
    /// the state untouched and returns the previous output.
    pub fn update(&mut self, dt: f64, error: f64) -> f64 {
        if dt <= 0.0 || !dt.is_finite() {
            return self.value;
        }

        let error_i_prev = self.error_i;
        let feedback = match self.anti_windup {
            AntiWindup::Filtering => self.kaw * self.delta,
            _ => 0.0,
        };
        self.error_i += (error - feedback) * dt;
        self.error_d = if self.primed {
            (error - self.error_prev) / dt
        } else {
            0.0
        };
        self.error_prev = error;
        self.primed = true;

        let value_p = self.kp * error;
        let value_d = self.kd * self.error_d;
        let raw = value_p + self.ki * self.error_i + value_d;

        let Some((min, max)) = self.saturation else {
            self.delta = 0.0;
            self.value = raw;
            return raw;
        };

        let value = raw.clamp(min, max);
        self.delta = raw - value;

        match self.anti_windup {
            AntiWindup::BackCalculation => {
                if self.ki != 0.0 {
                    self.error_i = (value - value_p - value_d) / self.ki;
                }
            }
            AntiWindup::ConditionalIntegration => {
                if self.delta != 0.0 {
                    self.error_i = error_i_prev;
                }
            }
            AntiWindup::None | AntiWindup::Filtering => {}
        }

        self.value = value;
        value
    }

    /// Seed the controller so that it currently produces `value` for `error`
    /// (bumpless transfer). The integral absorbs whatever P does not explain.
    pub fn set_value(&mut self, error: f64, value: f64) {
        self.error_prev = error;
        self.error_d = 0.0;
        self.primed = true;
        self.delta = 0.0;
        self.error_i = if self.ki != 0.0 {
            (value - self.kp * error) / self.ki
        } else {
            0.0
        };
        self.value = value;
    }

    /// Zero the dynamic state, keeping gains, limits and mode.
    pub fn reset(&mut self) {
        self.error_i = 0.0;
        self.error_prev = 0.0;
        self.error_d = 0.0;
        self.delta = 0.0;
        self.value = 0.0;
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pure_proportional() {
        let mut pid = PidController::new(2.5, 0.0, 0.0);
        for (i, error) in [0.3, -1.2, 4.0, 0.0, 7.5].iter().enumerate() {
            let dt = 0.01 * (i + 1) as f64;
            assert_relative_eq!(pid.update(dt, *error), 2.5 * error);
        }
    }

    #[test]
    fn test_integral_accumulates_forward_euler() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.update(0.1, 1.0);
        let out = pid.update(0.1, 1.0);
        assert_relative_eq!(out, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_is_backward_difference() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        assert_eq!(pid.update(0.1, 1.0), 0.0);
        assert_relative_eq!(pid.update(0.1, 1.5), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_positive_step_is_ignored() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        let out = pid.update(0.1, 2.0);
        assert_eq!(pid.update(0.0, 100.0), out);
        assert_eq!(pid.update(-0.1, 100.0), out);
    }

    fn wind_up(mode: AntiWindup) -> PidController {
        let mut pid = PidController::new(1.0, 1.0, 0.0)
            .with_saturation(-1.0, 1.0)
            .with_anti_windup(mode);
        for _ in 0..100 {
            pid.update(0.01, 5.0);
        }
        pid
    }

    #[test]
    fn test_back_calculation_recovers_immediately() {
        let mut naive = wind_up(AntiWindup::None);
        let mut back = wind_up(AntiWindup::BackCalculation);
        assert_eq!(naive.output(), 1.0);
        assert_eq!(back.output(), 1.0);

        // Error reverses sign: the naive controller stays pinned at the limit
        let naive_out = naive.update(0.01, -0.5);
        let back_out = back.update(0.01, -0.5);
        assert_eq!(naive_out, 1.0);
        assert!(back_out < 1.0, "back calculation output {}", back_out);

        // The naive integral keeps the output saturated for many more steps
        let mut naive_steps = 1;
        while naive.update(0.01, -0.5) >= 1.0 {
            naive_steps += 1;
        }
        assert!(naive_steps > 100);
    }

    #[test]
    fn test_conditional_integration_freezes_integral() {
        let pid = wind_up(AntiWindup::ConditionalIntegration);
        assert_eq!(pid.integral(), 0.0);
        assert!(pid.saturated());
    }

    #[test]
    fn test_filtering_bleeds_integral() {
        let naive = wind_up(AntiWindup::None);
        let filtered = wind_up(AntiWindup::Filtering);
        assert!(filtered.integral() < naive.integral());
    }

    #[test]
    fn test_set_value_is_bumpless() {
        let mut pid = PidController::new(0.8, 0.5, 0.1);
        pid.set_value(0.2, 3.0);
        assert_eq!(pid.output(), 3.0);
        let out = pid.update(1e-3, 0.2);
        assert_relative_eq!(out, 3.0 + 0.5 * 0.2 * 1e-3, epsilon = 1e-9);
    }

    #[test]
    fn test_reset_keeps_gains() {
        let mut pid = PidController::new(1.0, 2.0, 3.0).with_saturation(-5.0, 5.0);
        pid.update(0.1, 1.0);
        pid.update(0.1, 2.0);
        pid.reset();
        assert_eq!(pid.output(), 0.0);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.gains(), (1.0, 2.0, 3.0));
        assert_relative_eq!(pid.update(0.1, 1.0), 1.0 + 2.0 * 0.1, epsilon = 1e-12);
    }
}
