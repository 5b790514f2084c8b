use serde::{Deserialize, Serialize};

/// Running aggregates of a scalar sample stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
    sum_sq: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Population variance; rounding can push the raw difference below zero.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Statistics over the raw tick durations handed to the manager and the
/// clamped durations actually used for integration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeStepStatistics {
    pub raw: RunningStats,
    pub clamped: RunningStats,
    pub below_nominal: u64,
    pub above_nominal: u64,
}

impl TimeStepStatistics {
    /// Record one tick. Returns the clamped step.
    pub fn record(&mut self, raw: f64, min: f64, max: f64, nominal: f64) -> f64 {
        let clamped = raw.clamp(min, max);
        self.raw.push(raw);
        self.clamped.push(clamped);
        if raw < nominal {
            self.below_nominal += 1;
        } else if raw > nominal {
            self.above_nominal += 1;
        }
        clamped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> TimeStepSnapshot {
        TimeStepSnapshot {
            count: self.raw.count(),
            raw_min: self.raw.min(),
            raw_mean: self.raw.mean(),
            raw_max: self.raw.max(),
            raw_std_dev: self.raw.std_dev(),
            clamped_min: self.clamped.min(),
            clamped_mean: self.clamped.mean(),
            clamped_max: self.clamped.max(),
            clamped_std_dev: self.clamped.std_dev(),
            below_nominal: self.below_nominal,
            above_nominal: self.above_nominal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeStepSnapshot {
    pub count: u64,
    pub raw_min: f64,
    pub raw_mean: f64,
    pub raw_max: f64,
    pub raw_std_dev: f64,
    pub clamped_min: f64,
    pub clamped_mean: f64,
    pub clamped_max: f64,
    pub clamped_std_dev: f64,
    pub below_nominal: u64,
    pub above_nominal: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = RunningStats::default();
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.min(), 0.0);
        assert_eq!(stats.max(), 0.0);
        assert_eq!(stats.std_dev(), 0.0);
    }

    #[test]
    fn test_running_mean_and_variance() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 8);
        assert_relative_eq!(stats.mean(), 5.0);
        assert_relative_eq!(stats.std_dev(), 2.0, epsilon = 1e-12);
        assert_eq!(stats.min(), 2.0);
        assert_eq!(stats.max(), 9.0);
    }

    #[test]
    fn test_record_clamps_and_counts() {
        let mut stats = TimeStepStatistics::default();
        let samples = [0.0001, 0.01, 0.02, 0.5, 0.005];
        let mut sum = 0.0;
        for &s in &samples {
            let clamped = stats.record(s, 0.001, 0.05, 0.01);
            assert!((0.001..=0.05).contains(&clamped));
            sum += s;
        }
        assert_relative_eq!(stats.raw.mean(), sum / samples.len() as f64, epsilon = 1e-12);
        assert_eq!(stats.clamped.max(), 0.05);
        assert_eq!(stats.clamped.min(), 0.001);
        assert_eq!(stats.below_nominal, 2);
        assert_eq!(stats.above_nominal, 2);

        let snap = stats.snapshot();
        assert_eq!(snap.count, 5);
        assert_eq!(snap.raw_max, 0.5);
    }
}
