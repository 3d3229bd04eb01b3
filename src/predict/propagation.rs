use std::fmt;

use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::types::{InertialPosition, OrbitRegime, StateVector};

/// Orbital periods at or above this use the deep-space (SDP4) branch.
const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;
const MINUTES_PER_DAY: f64 = 1440.0;

pub const DEFAULT_MAX_ELEMENT_AGE: Duration = Duration::days(30);

/// Greenwich mean sidereal angle (radians) at `at`, IAU 1982 model.
pub fn sidereal_time(at: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()))
}

/// Anything that can produce an inertial state for an absolute instant.
pub trait Propagate {
    fn propagate(&self, at: DateTime<Utc>) -> Result<StateVector, PredictError>;

    fn sidereal_time(&self, at: DateTime<Utc>) -> f64 {
        sidereal_time(at)
    }
}

/// Mean elements decoded from one TLE, ready for repeated SGP4/SDP4 calls.
pub struct OrbitalState {
    elements: Elements,
    constants: Constants,
    max_age: Duration,
}

impl OrbitalState {
    pub fn from_elements(elements: Elements) -> Result<Self, PredictError> {
        let constants = Constants::from_elements(&elements)
            .map_err(|e| PredictError::malformed(2, e.to_string()))?;
        Ok(Self {
            elements,
            constants,
            max_age: DEFAULT_MAX_ELEMENT_AGE,
        })
    }

    /// Samples further than `max_age` from the element epoch (either direction)
    /// are refused.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn period_minutes(&self) -> f64 {
        MINUTES_PER_DAY / self.elements.mean_motion
    }

    pub fn regime(&self) -> OrbitRegime {
        if self.period_minutes() >= DEEP_SPACE_PERIOD_MINUTES {
            OrbitRegime::DeepSpace
        } else {
            OrbitRegime::NearEarth
        }
    }
}

impl Propagate for OrbitalState {
    fn propagate(&self, at: DateTime<Utc>) -> Result<StateVector, PredictError> {
        let failed = |message: String| PredictError::Propagation { time: at, message };

        let age = at - self.epoch();
        if age.abs() > self.max_age {
            return Err(failed(format!(
                "elements are {:.1} days from epoch {}, limit is {} days",
                age.num_seconds() as f64 / 86_400.0,
                self.epoch(),
                self.max_age.num_days()
            )));
        }

        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| failed(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| failed(e.to_string()))?;

        Ok(StateVector {
            position: InertialPosition(prediction.position),
            velocity_km_s: prediction.velocity,
        })
    }
}

impl fmt::Debug for OrbitalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalState")
            .field("name", &self.elements.object_name)
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .field("mean_motion", &self.elements.mean_motion)
            .field("max_age", &self.max_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::parsing::parse_tle;

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    const GEO: &str = "GEO TEST
1 28884U 05041A   20194.50000000 -.00000100  00000-0  00000-0 0  9993
2 28884   0.0512 100.2000 0002000 200.0000 160.0000  1.00270000 55026";

    #[test]
    fn iss_is_near_earth() {
        let state = parse_tle(ISS).unwrap();
        assert_eq!(state.regime(), OrbitRegime::NearEarth);
        assert!((state.period_minutes() - 92.93).abs() < 0.1);
    }

    #[test]
    fn geostationary_is_deep_space() {
        let state = parse_tle(GEO).unwrap();
        assert_eq!(state.regime(), OrbitRegime::DeepSpace);
        let sv = state.propagate(state.epoch()).unwrap();
        let r = sv.position.radius_km();
        assert!(r > 42_000.0 && r < 42_300.0, "radius {r}");
    }

    #[test]
    fn iss_radius_at_epoch() {
        let state = parse_tle(ISS).unwrap();
        let sv = state.propagate(state.epoch()).unwrap();
        let r = sv.position.radius_km();
        assert!(r > 6_700.0 && r < 6_850.0, "radius {r}");
        let speed = (sv.velocity_km_s[0].powi(2)
            + sv.velocity_km_s[1].powi(2)
            + sv.velocity_km_s[2].powi(2))
        .sqrt();
        assert!((speed - 7.66).abs() < 0.1, "speed {speed}");
    }

    #[test]
    fn refuses_stale_elements() {
        let state = parse_tle(ISS).unwrap().with_max_age(Duration::days(3));
        let at = state.epoch() + Duration::days(4);
        match state.propagate(at) {
            Err(PredictError::Propagation { time, .. }) => assert_eq!(time, at),
            other => panic!("expected propagation error, got {:?}", other),
        }
        let before = state.epoch() - Duration::days(4);
        assert!(state.propagate(before).is_err());
        assert!(state.propagate(state.epoch() + Duration::days(3)).is_ok());
    }

    #[test]
    fn sidereal_time_is_pure() {
        let at = DateTime::parse_from_rfc3339("2024-03-20T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(sidereal_time(at), sidereal_time(at));
        let later = sidereal_time(at + Duration::hours(1));
        let delta = (later - sidereal_time(at)).rem_euclid(std::f64::consts::TAU);
        // one hour of rotation, ~15.04 degrees
        assert!((delta.to_degrees() - 15.041).abs() < 0.01, "delta {delta}");
    }
}
