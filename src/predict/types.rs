use chrono::{DateTime, Utc};
use serde::Serialize;

/// A point on or above the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeodeticCoordinate {
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub height_km: f64,
}

impl Default for GeodeticCoordinate {
    fn default() -> Self {
        Self {
            latitude_rad: 0.0,
            longitude_rad: 0.0,
            height_km: 0.0,
        }
    }
}

impl GeodeticCoordinate {
    pub fn from_degrees(latitude_deg: f64, longitude_deg: f64, height_km: f64) -> Self {
        Self {
            latitude_rad: latitude_deg.to_radians(),
            longitude_rad: longitude_deg.to_radians(),
            height_km,
        }
    }

    /// Parses `"lat,lon"` in degrees.
    pub fn from_coordinates(coordinates: &str, height_km: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some(Self::from_degrees(lat, lon, height_km.unwrap_or(0.0)))
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_rad.to_degrees()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_rad.to_degrees()
    }
}

/// Earth-centered inertial (TEME) position in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InertialPosition(pub [f64; 3]);

/// Earth-centered Earth-fixed position in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixedPosition(pub [f64; 3]);

impl InertialPosition {
    pub fn radius_km(&self) -> f64 {
        norm(self.0)
    }
}

impl FixedPosition {
    pub fn distance_km(&self, other: &FixedPosition) -> f64 {
        let d = [
            self.0[0] - other.0[0],
            self.0[1] - other.0[1],
            self.0[2] - other.0[2],
        ];
        norm(d)
    }
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Propagator output at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: InertialPosition,
    pub velocity_km_s: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitRegime {
    NearEarth,
    DeepSpace,
}

/// The sample of minimum distance found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosestApproach {
    pub time: DateTime<Utc>,
    pub sample_index: usize,
    pub position: GeodeticCoordinate,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_pair() {
        let coord = GeodeticCoordinate::from_coordinates(" 16.043, 45.703 ", None).unwrap();
        assert!((coord.latitude_deg() - 16.043).abs() < 1e-12);
        assert!((coord.longitude_deg() - 45.703).abs() < 1e-12);
        assert_eq!(coord.height_km, 0.0);
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(GeodeticCoordinate::from_coordinates("16.0", None).is_none());
        assert!(GeodeticCoordinate::from_coordinates("north,45", None).is_none());
        assert!(GeodeticCoordinate::from_coordinates("91.0,45", None).is_none());
    }

    #[test]
    fn fixed_distance_is_euclidean() {
        let a = FixedPosition([1.0, 2.0, 2.0]);
        let b = FixedPosition([0.0, 0.0, 0.0]);
        assert_eq!(a.distance_km(&b), 3.0);
        assert_eq!(b.distance_km(&a), 3.0);
    }
}
