use crate::predict::types::{FixedPosition, GeodeticCoordinate, InertialPosition};

// WGS-84
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_ECCENTRICITY_SQ: f64 = 0.00669437999014;

const GEODETIC_MAX_ITERATIONS: usize = 20;
const GEODETIC_TOLERANCE_RAD: f64 = 1e-12;

pub fn geodetic_to_fixed(coord: &GeodeticCoordinate) -> FixedPosition {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let e2 = EARTH_ECCENTRICITY_SQ;
    let sin_lat = coord.latitude_rad.sin();
    let cos_lat = coord.latitude_rad.cos();
    let sin_lon = coord.longitude_rad.sin();
    let cos_lon = coord.longitude_rad.cos();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let h = coord.height_km;
    FixedPosition([
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - e2) + h) * sin_lat,
    ])
}

/// Rotates an inertial position into the Earth-fixed frame. `sidereal` must be
/// the Greenwich sidereal angle for the instant `pos` refers to.
pub fn inertial_to_fixed(pos: &InertialPosition, sidereal: f64) -> FixedPosition {
    let cos_gmst = sidereal.cos();
    let sin_gmst = sidereal.sin();
    let p = pos.0;
    FixedPosition([
        p[0] * cos_gmst + p[1] * sin_gmst,
        -p[0] * sin_gmst + p[1] * cos_gmst,
        p[2],
    ])
}

pub fn fixed_to_inertial(pos: &FixedPosition, sidereal: f64) -> InertialPosition {
    let cos_gmst = sidereal.cos();
    let sin_gmst = sidereal.sin();
    let p = pos.0;
    InertialPosition([
        p[0] * cos_gmst - p[1] * sin_gmst,
        p[0] * sin_gmst + p[1] * cos_gmst,
        p[2],
    ])
}

/// Projects an inertial position onto the ellipsoid. Longitude is in [-pi, pi].
pub fn inertial_to_geodetic(pos: &InertialPosition, sidereal: f64) -> GeodeticCoordinate {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let e2 = EARTH_ECCENTRICITY_SQ;
    let [x, y, z] = inertial_to_fixed(pos, sidereal).0;

    let longitude = y.atan2(x);
    let p = x.hypot(y);

    let mut latitude = z.atan2(p * (1.0 - e2));
    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + n * e2 * sin_lat).atan2(p);
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < GEODETIC_TOLERANCE_RAD {
            break;
        }
    }

    let sin_lat = latitude.sin();
    let cos_lat = latitude.cos();
    let height = p * cos_lat + z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

    GeodeticCoordinate {
        latitude_rad: latitude,
        longitude_rad: longitude,
        height_km: height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS_RAD: f64 = 1e-6;

    #[test]
    fn equator_prime_meridian_is_on_x_axis() {
        let fixed = geodetic_to_fixed(&GeodeticCoordinate::default());
        assert_eq!(fixed.0, [EARTH_EQUATORIAL_RADIUS_KM, 0.0, 0.0]);
    }

    #[test]
    fn pole_uses_polar_radius() {
        let fixed = geodetic_to_fixed(&GeodeticCoordinate::from_degrees(90.0, 0.0, 0.0));
        assert!(fixed.0[0].abs() < 1e-9);
        assert!((fixed.0[2] - 6356.752).abs() < 1e-3);
    }

    #[test]
    fn rotation_by_quarter_turn() {
        let fixed = inertial_to_fixed(&InertialPosition([1.0, 0.0, 0.0]), FRAC_PI_2);
        assert!(fixed.0[0].abs() < 1e-15);
        assert!((fixed.0[1] + 1.0).abs() < 1e-15);
        assert_eq!(fixed.0[2], 0.0);
    }

    #[test]
    fn inverse_rotation_restores_inertial() {
        let inertial = InertialPosition([4000.0, -2500.0, 3100.0]);
        let back = fixed_to_inertial(&inertial_to_fixed(&inertial, 1.234), 1.234);
        for k in 0..3 {
            assert!((back.0[k] - inertial.0[k]).abs() < 1e-9);
        }
    }

    #[test]
    fn geodetic_round_trip() {
        let cases = [
            (16.043, 45.703, 0.0),
            (-33.9, 151.2, 0.05),
            (51.4778, -0.0015, 0.0),
            (-89.5, 10.0, 0.0),
            (0.0, 179.9, 700.0),
            (45.0, -120.0, 35786.0),
        ];
        for (lat, lon, h) in cases {
            let coord = GeodeticCoordinate::from_degrees(lat, lon, h);
            let fixed = geodetic_to_fixed(&coord);
            let back = inertial_to_geodetic(&InertialPosition(fixed.0), 0.0);
            assert!((back.latitude_rad - coord.latitude_rad).abs() < EPS_RAD, "{lat},{lon}");
            assert!((back.longitude_rad - coord.longitude_rad).abs() < EPS_RAD, "{lat},{lon}");
            assert!((back.height_km - h).abs() < 1e-6, "{lat},{lon}");
        }
    }

    #[test]
    fn geodetic_accounts_for_sidereal_angle() {
        let coord = GeodeticCoordinate::from_degrees(10.0, 20.0, 400.0);
        let sidereal = 2.5;
        let inertial = fixed_to_inertial(&geodetic_to_fixed(&coord), sidereal);
        let back = inertial_to_geodetic(&inertial, sidereal);
        assert!((back.latitude_deg() - 10.0).abs() < 1e-6);
        assert!((back.longitude_deg() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn longitude_is_wrapped() {
        let coord = inertial_to_geodetic(&InertialPosition([-7000.0, -1.0, 0.0]), 0.0);
        assert!(coord.longitude_rad >= -PI && coord.longitude_rad <= PI);
        assert!(coord.longitude_rad < 0.0);
    }
}
