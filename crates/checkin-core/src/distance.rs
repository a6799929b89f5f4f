//! Great-circle distance.

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two latitude/longitude pairs given in degrees.
///
/// Ignores the ellipsoidal shape of the Earth, which is well inside tolerance
/// for sub-kilometer geofence checks.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        for (lat, lon) in [(0.0, 0.0), (51.5007, -0.1246), (-33.8568, 151.2153), (89.9, 179.9)] {
            assert_eq!(distance_meters(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_symmetric() {
        let ab = distance_meters(40.7128, -74.0060, 34.0522, -118.2437);
        let ba = distance_meters(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // 1 degree along a meridian is R * pi / 180
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_known_city_pair() {
        // New York to Los Angeles is roughly 3936 km by haversine
        let d = distance_meters(40.7128, -74.0060, 34.0522, -118.2437);
        assert!((d / 1000.0 - 3936.0).abs() < 5.0, "got {} km", d / 1000.0);
    }

    #[test]
    fn test_short_geofence_distance() {
        // ~0.0045 degrees of latitude is about 500 m
        let d = distance_meters(10.0, 20.0, 10.0045, 20.0);
        assert!((d - 500.4).abs() < 1.0, "got {} m", d);
    }
}
