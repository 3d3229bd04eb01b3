mod approach_finder;
mod error;
pub mod frames;
mod parsing;
mod propagation;
mod types;

pub use approach_finder::{
    find_closest_approach, find_closest_approach_parallel, ApproachSearch, SampleTimes,
};
pub use error::PredictError;
pub use parsing::{parse_tle, parse_tle_lines};
pub use propagation::{sidereal_time, OrbitalState, Propagate, DEFAULT_MAX_ELEMENT_AGE};
pub use types::{
    ClosestApproach, FixedPosition, GeodeticCoordinate, InertialPosition, OrbitRegime,
    StateVector,
};
