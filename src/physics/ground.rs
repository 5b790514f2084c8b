use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Terrain capability injected into the simulation.
///
/// Positions are NED metres; elevation is positive up from the datum.
pub trait Ground {
    /// Terrain elevation at the given horizontal location [m]
    fn elevation(&self, north: f64, east: f64) -> f64;

    /// Unit surface normal in NED, pointing away from the terrain (negative down component)
    fn normal(&self, north: f64, east: f64) -> Vector3<f64>;

    /// Height of a NED point above the terrain, measured along gravity
    fn height_above(&self, point: &Vector3<f64>) -> f64 {
        -point.z - self.elevation(point.x, point.y)
    }
}

/// Level terrain at a constant elevation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatGround {
    pub elevation: f64,
}

impl FlatGround {
    pub fn new(elevation: f64) -> Self {
        Self { elevation }
    }
}

impl Ground for FlatGround {
    fn elevation(&self, _north: f64, _east: f64) -> f64 {
        self.elevation
    }

    fn normal(&self, _north: f64, _east: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -1.0)
    }
}

/// Planar terrain rising `grade_north` metres per metre northwards and
/// `grade_east` per metre eastwards from `elevation` at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlopedGround {
    pub elevation: f64,
    pub grade_north: f64,
    pub grade_east: f64,
}

impl Ground for SlopedGround {
    fn elevation(&self, north: f64, east: f64) -> f64 {
        self.elevation + self.grade_north * north + self.grade_east * east
    }

    fn normal(&self, _north: f64, _east: f64) -> Vector3<f64> {
        Vector3::new(-self.grade_north, -self.grade_east, -1.0).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_ground_height() {
        let ground = FlatGround::new(120.0);
        let point = Vector3::new(10.0, -5.0, -150.0);
        assert_relative_eq!(ground.height_above(&point), 30.0);
        assert_eq!(ground.normal(0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_sloped_ground() {
        let ground = SlopedGround {
            elevation: 10.0,
            grade_north: 0.1,
            grade_east: 0.0,
        };
        assert_relative_eq!(ground.elevation(100.0, 50.0), 20.0);
        let n = ground.normal(0.0, 0.0);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert!(n.x < 0.0 && n.z < 0.0);
    }
}
