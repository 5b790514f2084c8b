mod flight;
mod ground;
mod solver;

pub use flight::FlightTrim;
pub use ground::GroundTrim;
pub use solver::{TrimProblem, TrimSolver};

use crate::components::{AircraftControlSurfaces, SpatialComponent, TrimCondition, TrimResult};
use crate::physics::{Aircraft, Ground, PhysicsError};

/// Solver output together with the state it describes
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub result: TrimResult,
    pub spatial: SpatialComponent,
    pub controls: AircraftControlSurfaces,
}

/// Run the problem variant matching `condition` and decode its best estimate.
pub fn trim_aircraft(
    solver: &TrimSolver,
    aircraft: &dyn Aircraft,
    ground: &dyn Ground,
    condition: &TrimCondition,
) -> Result<TrimOutcome, PhysicsError> {
    let bounds = solver.config().bounds;
    match *condition {
        TrimCondition::Ground {
            north,
            east,
            heading,
        } => {
            let mut problem =
                GroundTrim::new(aircraft, ground, north, east, heading, bounds.ground_bounds);
            let result = solver.solve(&mut problem)?;
            Ok(TrimOutcome {
                spatial: problem.spatial_for(&result.params),
                controls: problem.controls_for(&result.params),
                result,
            })
        }
        TrimCondition::StraightAndLevel {
            north,
            east,
            airspeed,
            altitude,
            heading,
        } => {
            let mut problem =
                FlightTrim::new(aircraft, ground, north, east, altitude, airspeed, heading, bounds);
            let result = solver.solve(&mut problem)?;
            Ok(TrimOutcome {
                spatial: problem.spatial_for(&result.params),
                controls: problem.controls_for(&result.params),
                result,
            })
        }
    }
}
