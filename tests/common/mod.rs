#![allow(dead_code)]

mod assertions;
mod fixtures;
mod test_sim;

pub use assertions::{assert_output_finite, assert_position_eq};
pub use fixtures::*;
pub use test_sim::{TestSim, TestSimBuilder};
